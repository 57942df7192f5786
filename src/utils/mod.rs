pub mod logging;
pub mod render;
pub mod url;
