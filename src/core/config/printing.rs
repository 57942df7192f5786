use crate::core::config::data::{Config, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset, using {DEFAULT_BASE_URL})"),
        }
        match self.timeout_secs {
            Some(secs) => println!("  timeout: {secs}s"),
            None => println!("  timeout: (unset, using {DEFAULT_TIMEOUT_SECS}s)"),
        }
        match &self.welcome_message {
            Some(message) => println!("  welcome-message: {message}"),
            None => println!("  welcome-message: (unset)"),
        }
    }
}
