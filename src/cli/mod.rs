//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod chat;
pub mod oneshot;
pub mod settings;


use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cli::chat::run_chat;
use crate::cli::oneshot::{run_ask, run_health, run_identify};
use crate::cli::settings::{apply_set, apply_unset};
use crate::core::clock::SystemClock;
use crate::core::config::{Config, BASE_URL_ENV};
use crate::core::constants::WELCOME_MESSAGE;
use crate::core::ids::SequentialIds;
use crate::core::{ChatSession, HttpBackend};

/// Environment variable holding the `tracing` filter (e.g. `lumon=debug`).
pub const LOG_FILTER_ENV: &str = "LUMON_LOG";

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "lumon")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Chat with Lumon, a botanical assistant that identifies plants from photos")]
#[command(
    long_about = "Lumon is a terminal client for a plant-identification assistant. Ask plant-care \
questions in plain text, or send a photo to find out what you are growing.\n\n\
Environment Variables:\n\
  LUMON_BASE_URL    Server URL (overrides the config file)\n\
  LUMON_LOG         Diagnostic log filter, e.g. 'lumon=debug' (default: warn)\n\n\
Chat commands:\n\
  /image <path>     Identify the plant in a PNG, JPG, GIF, or WEBP photo (max 16 MB)\n\
  /new              Start a new conversation\n\
  /log <filename>   Enable transcript logging to the specified file\n\
  /log              Toggle transcript logging pause/resume\n\
  /help             Show chat commands\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server URL, e.g. http://127.0.0.1:5000
    #[arg(short = 'u', long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Append the chat transcript to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat (default)
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Identify the plant in a photo and print the result
    Identify {
        /// Path to a PNG, JPG, GIF, or WEBP image
        image: PathBuf,
    },
    /// Check that the server is reachable
    Health,
    /// Set configuration values, or print them when no key is given
    Set {
        /// Configuration key to set (base-url, timeout, welcome-message)
        key: Option<String>,
        /// Value to set for the key (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded in another binary.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let Some(key) = key else {
                config.print_all();
                return Ok(());
            };
            let value = value.unwrap_or_default().join(" ");
            match apply_set(&mut config, &key, &value) {
                Ok(confirmation) => {
                    config.save()?;
                    println!("✅ {confirmation}");
                }
                Err(err) => {
                    err.print();
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match apply_unset(&mut config, &key) {
                Ok(confirmation) => {
                    config.save()?;
                    println!("✅ {confirmation}");
                }
                Err(err) => {
                    err.print();
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        command => {
            let config = Config::load()?;
            let base_url = match config.resolve_base_url(args.base_url.as_deref()) {
                Ok(base_url) => base_url,
                Err(reason) => {
                    eprintln!("❌ Invalid server URL: {reason}");
                    eprintln!("   Check --base-url, {BASE_URL_ENV}, or `lumon set base-url`.");
                    std::process::exit(1);
                }
            };
            let backend = HttpBackend::new(base_url, config.timeout())?;
            match command {
                Commands::Health => run_health(&backend).await,
                Commands::Ask { prompt } => run_ask(new_session(backend, &config), prompt).await,
                Commands::Identify { image } => {
                    run_identify(new_session(backend, &config), &image).await
                }
                _ => run_chat(new_session(backend, &config), args.log).await,
            }
        }
    }
}

fn new_session(backend: HttpBackend, config: &Config) -> ChatSession<HttpBackend> {
    let welcome = config
        .welcome_message
        .clone()
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| WELCOME_MESSAGE.to_string());
    ChatSession::with_collaborators(
        backend,
        Box::new(SystemClock),
        Box::new(SequentialIds::new()),
        welcome,
    )
}
