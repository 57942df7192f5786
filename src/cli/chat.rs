//! Line-oriented interactive chat.

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::core::image::ImageUpload;
use crate::core::message::{MessageId, PendingOperation};
use crate::core::{ChatSession, PlantBackend, SessionError};
use crate::utils::logging::LoggingState;
use crate::utils::render::{pending_label, render_message};

const HELP_TEXT: &str = "Type a plant question and press Enter.\n\
  /image <path>     Identify the plant in a photo\n\
  /new              Start a new conversation\n\
  /log <filename>   Log the transcript to a file\n\
  /log              Pause or resume logging\n\
  /log status       Show whether logging is on\n\
  /help             Show this help\n\
  /quit             Leave the chat";

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Empty,
    Text(String),
    Image(PathBuf),
    NewChat,
    Log(Option<String>),
    LogStatus,
    Help,
    Quit,
    /// A slash command that could not be used, with the reason.
    Invalid(String),
}

pub fn parse_chat_input(line: &str) -> ChatInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ChatInput::Empty;
    }
    let Some(command_line) = trimmed.strip_prefix('/') else {
        return ChatInput::Text(trimmed.to_string());
    };

    let (command, argument) = match command_line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, Some(rest.trim()).filter(|rest| !rest.is_empty())),
        None => (command_line, None),
    };

    match (command.to_ascii_lowercase().as_str(), argument) {
        ("quit" | "exit" | "q", _) => ChatInput::Quit,
        ("new" | "reset" | "clear", _) => ChatInput::NewChat,
        ("help" | "?", _) => ChatInput::Help,
        ("log", Some(argument)) if argument.eq_ignore_ascii_case("status") => {
            ChatInput::LogStatus
        }
        ("log", argument) => ChatInput::Log(argument.map(str::to_string)),
        ("image" | "img" | "identify", Some(path)) => ChatInput::Image(PathBuf::from(path)),
        ("image" | "img" | "identify", None) => {
            ChatInput::Invalid("Usage: /image <path-to-photo>".to_string())
        }
        _ => ChatInput::Invalid(format!(
            "Unknown command: /{command}. Type /help for the list of commands."
        )),
    }
}

/// Prints transcript entries as they settle and mirrors them to the log.
struct ChatView<B> {
    session: ChatSession<B>,
    logging: LoggingState,
    last_shown: Option<MessageId>,
}

impl<B: PlantBackend> ChatView<B> {
    fn show_new_entries(&mut self) {
        let mut last_shown = self.last_shown;
        for message in self.session.transcript().since(self.last_shown) {
            last_shown = Some(message.id());
            let Some(rendered) = render_message(message) else {
                continue;
            };
            println!("{rendered}\n");
            if let Err(err) = self.logging.log_entry(message) {
                eprintln!("⚠️  Failed to log message: {err}");
            }
        }
        self.last_shown = last_shown;
    }

    fn show_pending(operation: PendingOperation) {
        println!("{}", pending_label(operation));
    }

    async fn send_text(&mut self, text: &str) {
        Self::show_pending(PendingOperation::Converse);
        match self.session.submit_text(text).await {
            Ok(_) => self.show_new_entries(),
            Err(SessionError::EmptyMessage) => {}
        }
    }

    async fn send_image(&mut self, path: PathBuf) {
        let image = match ImageUpload::from_path(&path).await {
            Ok(image) => image,
            Err(err) => {
                eprintln!("❌ Could not read {}: {err}", path.display());
                return;
            }
        };
        if image.validate().is_ok() {
            Self::show_pending(PendingOperation::Identify);
        }
        self.session.submit_image(&image).await;
        self.show_new_entries();
    }

    fn new_chat(&mut self) {
        self.session.reset();
        self.last_shown = None;
        if let Err(err) = self.logging.log_message("## New conversation") {
            eprintln!("⚠️  Failed to log message: {err}");
        }
        self.show_new_entries();
    }

    fn update_logging(&mut self, path: Option<String>) {
        let result = match path {
            Some(path) => self.logging.set_log_file(path),
            None => self.logging.toggle_logging(),
        };
        match result {
            Ok(status) => println!("ℹ️  {status}\n"),
            Err(err) => eprintln!("❌ {err}\n"),
        }
    }
}

pub async fn run_chat<B: PlantBackend>(
    session: ChatSession<B>,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let mut view = ChatView {
        session,
        logging: LoggingState::new(log_file)?,
        last_shown: None,
    };
    view.show_new_entries();
    println!("Type /help for commands.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_chat_input(&line) {
            ChatInput::Empty => {}
            ChatInput::Text(text) => view.send_text(&text).await,
            ChatInput::Image(path) => view.send_image(path).await,
            ChatInput::NewChat => view.new_chat(),
            ChatInput::Log(path) => view.update_logging(path),
            ChatInput::LogStatus => {
                println!("ℹ️  Logging: {}\n", view.logging.get_status_string())
            }
            ChatInput::Help => println!("{HELP_TEXT}\n"),
            ChatInput::Quit => break,
            ChatInput::Invalid(reason) => eprintln!("⚠️  {reason}\n"),
        }
    }

    Ok(())
}
