//! Lumon is a terminal client for a plant-identification chat assistant.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the chat session: the transcript, the text and image
//!   request lifecycles, client-side image validation, and the backend trait
//!   the session talks through.
//! - [`api`] defines the JSON payloads exchanged with the `/chat`,
//!   `/predict`, and `/health` endpoints.
//! - [`cli`] parses the command line and drives a session from the terminal.
//! - [`utils`] holds URL helpers and the optional transcript log file.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
