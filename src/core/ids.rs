use crate::core::message::MessageId;

/// Hands out message ids for one session.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> MessageId;

    /// Return to the initial counter value.
    fn reset(&mut self);
}

/// Counts up from zero.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next);
        self.next += 1;
        id
    }

    fn reset(&mut self) {
        self.next = 0;
    }
}

/// Random 128-bit hex id sent to the server as `session_id` so it can keep
/// per-conversation memory.
pub fn new_conversation_id() -> String {
    let mut bytes = [0_u8; 16];
    if getrandom::fill(&mut bytes).is_err() {
        let nanos = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_le_bytes();
        bytes[..8].copy_from_slice(&nanos);
    }
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
