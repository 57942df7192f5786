//! The chat session: transcript ownership plus the text and image request
//! lifecycles.
//!
//! Every submission follows the same shape. The user's entry and a pending
//! indicator are appended, the backend is called, then the indicator is
//! retired and exactly one assistant entry takes its place. Failures never
//! escape as errors; they become apology entries and are reported through
//! `tracing`.
//!
//! The `begin_*`/`finish_*` pairs split a submission around the network call
//! so a front end can keep several requests in flight, each with its own
//! indicator. [`ChatSession::submit_text`] and [`ChatSession::submit_image`]
//! run one exchange end to end through the injected backend.


use std::error::Error as StdError;
use std::fmt;

use tracing::{debug, info, warn};

use crate::api::{ChatRequest, ChatResponse, IdentifyResponse};
use crate::core::backend::{BackendError, PlantBackend};
use crate::core::clock::{Clock, SystemClock};
use crate::core::constants::{
    identify_failure_message, CHAT_APOLOGY, CONNECTION_APOLOGY, IDENTIFY_APOLOGY,
    WELCOME_MESSAGE,
};
use crate::core::ids::{new_conversation_id, IdGenerator, SequentialIds};
use crate::core::image::ImageUpload;
use crate::core::message::{Author, Message, MessageId, Payload, PendingOperation};
use crate::core::transcript::Transcript;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The text was empty once surrounding whitespace was removed.
    EmptyMessage,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyMessage => write!(f, "Message is empty"),
        }
    }
}

impl StdError for SessionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeStatus {
    /// The backend answered and its answer was appended.
    Answered,
    /// The backend failed or reported an error; an apology was appended.
    Failed,
    /// The input failed client-side validation; nothing was sent.
    Rejected,
    /// The session was reset while the request was in flight; nothing was
    /// appended.
    Discarded,
}

/// How a submission ended and which assistant entry closed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub status: ExchangeStatus,
    pub reply: Option<MessageId>,
}

impl Exchange {
    fn closed(status: ExchangeStatus, reply: MessageId) -> Self {
        Self {
            status,
            reply: Some(reply),
        }
    }

    fn discarded() -> Self {
        Self {
            status: ExchangeStatus::Discarded,
            reply: None,
        }
    }
}

#[derive(Debug)]
struct Ticket {
    query: MessageId,
    pending: MessageId,
    generation: u64,
}

/// An in-flight chat message. Pass it back to [`ChatSession::finish_text`].
#[must_use = "an unfinished request leaves its pending indicator in the transcript"]
#[derive(Debug)]
pub struct PendingText {
    ticket: Ticket,
    request: ChatRequest,
}

impl PendingText {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    pub fn query_id(&self) -> MessageId {
        self.ticket.query
    }

    pub fn pending_id(&self) -> MessageId {
        self.ticket.pending
    }
}

/// An in-flight identification. Pass it back to [`ChatSession::finish_image`].
#[must_use = "an unfinished request leaves its pending indicator in the transcript"]
#[derive(Debug)]
pub struct PendingImage {
    ticket: Ticket,
}

impl PendingImage {
    pub fn query_id(&self) -> MessageId {
        self.ticket.query
    }

    pub fn pending_id(&self) -> MessageId {
        self.ticket.pending
    }
}

#[derive(Debug)]
pub enum ImageStart {
    /// The image passed validation; send it and finish with the result.
    Dispatch(PendingImage),
    /// The image was refused and a notice appended in its place.
    Rejected(Exchange),
}

pub struct ChatSession<B> {
    backend: B,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    transcript: Transcript,
    welcome: String,
    conversation_id: String,
    generation: u64,
}

impl<B: PlantBackend> ChatSession<B> {
    pub fn new(backend: B) -> Self {
        Self::with_collaborators(
            backend,
            Box::new(SystemClock),
            Box::new(SequentialIds::new()),
            WELCOME_MESSAGE,
        )
    }

    pub fn with_collaborators(
        backend: B,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdGenerator>,
        welcome: impl Into<String>,
    ) -> Self {
        let mut session = Self {
            backend,
            clock,
            ids,
            transcript: Transcript::new(),
            welcome: welcome.into(),
            conversation_id: new_conversation_id(),
            generation: 0,
        };
        session.append_welcome();
        session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Sent as `session_id` so the server can keep conversation memory.
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn has_pending(&self) -> bool {
        self.transcript.pending_count() > 0
    }

    /// Append the user's text and a pending indicator, and build the request
    /// to send.
    pub fn begin_text(&mut self, text: &str) -> Result<PendingText, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let query = self.append(Author::User, Payload::Text(text.to_string()));
        let pending = self.append(
            Author::Assistant,
            Payload::Pending(PendingOperation::Converse),
        );
        debug!(%query, %pending, "chat message queued");

        Ok(PendingText {
            ticket: self.ticket(query, pending),
            request: ChatRequest {
                message: text.to_string(),
                session_id: Some(self.conversation_id.clone()),
            },
        })
    }

    pub fn finish_text(
        &mut self,
        pending: PendingText,
        result: Result<ChatResponse, BackendError>,
    ) -> Exchange {
        if !self.retire(&pending.ticket) {
            return Exchange::discarded();
        }

        let (status, reply) = match result {
            Ok(response) => {
                if response.is_warning() {
                    debug!("server flagged the question as off-topic");
                }
                match response {
                    ChatResponse::Reply { response, .. } => (ExchangeStatus::Answered, response),
                    ChatResponse::Failure { error } => {
                        warn!(%error, "chat request rejected by server");
                        (ExchangeStatus::Failed, CHAT_APOLOGY.to_string())
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "chat request failed");
                (ExchangeStatus::Failed, chat_apology_for(&err).to_string())
            }
        };

        let id = self.append(Author::Assistant, Payload::Text(reply));
        Exchange::closed(status, id)
    }

    pub async fn submit_text(&mut self, text: &str) -> Result<Exchange, SessionError> {
        let pending = self.begin_text(text)?;
        let result = self.backend.converse(pending.request()).await;
        Ok(self.finish_text(pending, result))
    }

    /// Validate the image; on success append the query and a pending
    /// indicator, otherwise append a notice explaining the refusal.
    pub fn begin_image(&mut self, image: &ImageUpload) -> ImageStart {
        if let Err(rejection) = image.validate() {
            info!(file = image.file_name(), %rejection, "image refused before upload");
            let id = self.append(Author::Assistant, Payload::Text(rejection.to_string()));
            return ImageStart::Rejected(Exchange::closed(ExchangeStatus::Rejected, id));
        }

        let query = self.append(Author::User, Payload::Image(image.to_ref()));
        let pending = self.append(
            Author::Assistant,
            Payload::Pending(PendingOperation::Identify),
        );
        debug!(%query, %pending, "image queued for identification");

        ImageStart::Dispatch(PendingImage {
            ticket: self.ticket(query, pending),
        })
    }

    pub fn finish_image(
        &mut self,
        pending: PendingImage,
        result: Result<IdentifyResponse, BackendError>,
    ) -> Exchange {
        if !self.retire(&pending.ticket) {
            return Exchange::discarded();
        }

        let (status, payload) = match result {
            Ok(IdentifyResponse::Identified(identification)) => {
                info!(
                    plant = %identification.plant_name,
                    confidence = ?identification.confidence,
                    "plant identified"
                );
                (
                    ExchangeStatus::Answered,
                    Payload::Identification(identification),
                )
            }
            Ok(IdentifyResponse::Failure { error }) => {
                warn!(%error, "identification rejected by server");
                (
                    ExchangeStatus::Failed,
                    Payload::Text(identify_failure_message(&error)),
                )
            }
            Err(err) => {
                warn!(error = %err, "identification request failed");
                let apology = if err.is_transport() {
                    CONNECTION_APOLOGY
                } else {
                    IDENTIFY_APOLOGY
                };
                (ExchangeStatus::Failed, Payload::Text(apology.to_string()))
            }
        };

        let id = self.append(Author::Assistant, payload);
        Exchange::closed(status, id)
    }

    pub async fn submit_image(&mut self, image: &ImageUpload) -> Exchange {
        match self.begin_image(image) {
            ImageStart::Rejected(exchange) => exchange,
            ImageStart::Dispatch(pending) => {
                let result = self.backend.identify(image).await;
                self.finish_image(pending, result)
            }
        }
    }

    /// Start a new conversation: only the welcome entry survives, ids start
    /// over, and requests still in flight are discarded when they finish.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.ids.reset();
        self.generation = self.generation.wrapping_add(1);
        self.conversation_id = new_conversation_id();
        self.append_welcome();
        info!("started a new conversation");
    }

    fn append_welcome(&mut self) {
        let welcome = self.welcome.clone();
        self.append(Author::Assistant, Payload::Text(welcome));
    }

    fn append(&mut self, author: Author, payload: Payload) -> MessageId {
        let id = self.ids.next_id();
        let message = Message::new(id, author, payload, self.clock.now());
        self.transcript.push(message);
        id
    }

    fn ticket(&self, query: MessageId, pending: MessageId) -> Ticket {
        Ticket {
            query,
            pending,
            generation: self.generation,
        }
    }

    /// Remove the ticket's pending indicator. False when the ticket predates
    /// the last reset.
    fn retire(&mut self, ticket: &Ticket) -> bool {
        if ticket.generation != self.generation {
            debug!(pending = %ticket.pending, "dropping result for a reset conversation");
            return false;
        }
        let removed = self.transcript.remove_pending(ticket.pending);
        debug_assert!(removed, "pending indicator {} missing", ticket.pending);
        true
    }
}

fn chat_apology_for(err: &BackendError) -> &'static str {
    if err.is_transport() {
        CONNECTION_APOLOGY
    } else {
        CHAT_APOLOGY
    }
}
