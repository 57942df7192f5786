use std::fmt;

use chrono::{DateTime, Utc};

use crate::api::Identification;

/// Position of a message within a session, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl MessageId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Author {
    User,
    Assistant,
}

impl Author {
    pub fn as_str(self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Text,
    ImageQuery,
    IdentificationResult,
    StatusPending,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::ImageQuery => "image-query",
            MessageKind::IdentificationResult => "identification-result",
            MessageKind::StatusPending => "status-pending",
        }
    }
}

/// Which backend call a pending indicator is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingOperation {
    Converse,
    Identify,
}

/// What the transcript remembers about a submitted image. The bytes
/// themselves are not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub file_name: String,
    pub media_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Image(ImageRef),
    Identification(Identification),
    Pending(PendingOperation),
}

impl Payload {
    pub fn kind(&self) -> MessageKind {
        match self {
            Payload::Text(_) => MessageKind::Text,
            Payload::Image(_) => MessageKind::ImageQuery,
            Payload::Identification(_) => MessageKind::IdentificationResult,
            Payload::Pending(_) => MessageKind::StatusPending,
        }
    }
}

/// A transcript entry. Messages are immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: MessageId,
    author: Author,
    payload: Payload,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub(crate) fn new(
        id: MessageId,
        author: Author,
        payload: Payload,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author,
            payload,
            timestamp,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }

    pub fn is_assistant(&self) -> bool {
        self.author == Author::Assistant
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.payload, Payload::Pending(_))
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn identification(&self) -> Option<&Identification> {
        match &self.payload {
            Payload::Identification(identification) => Some(identification),
            _ => None,
        }
    }
}
