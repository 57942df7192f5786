use std::collections::VecDeque;

use crate::core::message::{Message, MessageId};

/// Ordered, append-only list of the messages exchanged in one session.
///
/// The only removals are pending indicators being retired and a full clear
/// when the session starts over.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: VecDeque<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push_back(message);
    }

    /// Remove the pending indicator with `id`. Entries that are not pending
    /// are left alone.
    pub(crate) fn remove_pending(&mut self, id: MessageId) -> bool {
        // Pending entries sit near the tail.
        let position = self
            .messages
            .iter()
            .rposition(|message| message.id() == id && message.is_pending());
        match position {
            Some(index) => {
                self.messages.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> + '_ {
        self.messages.iter()
    }

    pub fn first(&self) -> Option<&Message> {
        self.messages.front()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id() == id)
    }

    pub fn pending_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| message.is_pending())
            .count()
    }

    /// Messages created after `id`, in transcript order.
    pub fn since(&self, id: Option<MessageId>) -> impl Iterator<Item = &Message> + '_ {
        self.messages
            .iter()
            .filter(move |message| id.is_none_or(|seen| message.id() > seen))
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::collections::vec_deque::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
