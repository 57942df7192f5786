use crate::core::message::Message;
use crate::utils::render::render_message;
use std::error::Error;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Optional plain-text copy of the transcript, appended as entries settle.
pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn Error>> {
        let mut logging = LoggingState {
            file_path: None,
            is_active: false,
        };
        if let Some(path) = log_file {
            logging.set_log_file(path)?;
        }
        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn Error>> {
        // Test if we can create/write to the file
        self.test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;

        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn Error>> {
        match &self.file_path {
            Some(path) => {
                if self.is_active {
                    self.log_message("## Logging paused")?;
                    self.is_active = false;
                    Ok(format!("Logging paused (file: {path})"))
                } else {
                    self.is_active = true;
                    Ok(format!("Logging resumed to: {path}"))
                }
            }
            None => {
                Err("No log file specified. Use /log <filename> to enable logging first.".into())
            }
        }
    }

    /// Append a transcript entry. Pending indicators are skipped.
    pub fn log_entry(&self, message: &Message) -> Result<(), Box<dyn Error>> {
        match render_message(message) {
            Some(rendered) => self.log_message(&rendered),
            None => Ok(()),
        }
    }

    pub fn log_message(&self, content: &str) -> Result<(), Box<dyn Error>> {
        match (&self.file_path, self.is_active) {
            (Some(path), true) => Self::write_to_log(path, content),
            _ => Ok(()),
        }
    }

    fn write_to_log(file_path: &str, content: &str) -> Result<(), Box<dyn Error>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Blank line between entries, matching the terminal output.
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    pub fn get_status_string(&self) -> String {
        let file_name = |path: &str| {
            Path::new(path)
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        };
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", file_name(path)),
            (Some(path), false) => format!("paused ({})", file_name(path)),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{Author, MessageId, Payload, PendingOperation};
    use chrono::{DateTime, Utc};
    use tempfile::TempDir;

    fn entry(id: u64, author: Author, payload: Payload) -> Message {
        Message::new(MessageId::new(id), author, payload, DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn entries_are_appended_with_blank_separators() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("chat.log");
        let logging =
            LoggingState::new(Some(path.to_string_lossy().into_owned())).expect("should open");
        assert_eq!(logging.get_status_string(), "active (chat.log)");

        logging
            .log_entry(&entry(1, Author::User, Payload::Text("hello".to_string())))
            .unwrap();
        logging
            .log_entry(&entry(
                2,
                Author::Assistant,
                Payload::Pending(PendingOperation::Converse),
            ))
            .unwrap();
        logging
            .log_entry(&entry(
                3,
                Author::Assistant,
                Payload::Text("line one\nline two".to_string()),
            ))
            .unwrap();

        let contents = std::fs::read_to_string(&path).expect("log should exist");
        assert_eq!(contents, "You: hello\n\nLumon: line one\nline two\n\n");
    }

    #[test]
    fn toggling_pauses_and_resumes() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("chat.log");
        let mut logging = LoggingState::new(None).expect("should build");
        assert_eq!(logging.get_status_string(), "disabled");
        assert!(logging.toggle_logging().is_err());

        logging
            .set_log_file(path.to_string_lossy().into_owned())
            .expect("should enable");
        assert_eq!(logging.get_status_string(), "active (chat.log)");

        logging.toggle_logging().expect("should pause");
        assert_eq!(logging.get_status_string(), "paused (chat.log)");
        logging.log_message("dropped").unwrap();

        logging.toggle_logging().expect("should resume");
        logging.log_message("kept").unwrap();

        let contents = std::fs::read_to_string(&path).expect("log should exist");
        assert_eq!(contents, "## Logging paused\n\nkept\n\n");
    }
}
