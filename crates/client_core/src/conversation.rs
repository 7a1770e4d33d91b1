//! Append-only transcript plus the in-flight exchange flag.

use shared::domain::Message;

/// Shown in place of a reply when an exchange fails.
pub const EXCHANGE_ERROR_TEXT: &str = "⚠️ Error connecting to server";

#[derive(Debug, Default, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    pending: Option<u64>,
    next_ticket: u64,
}

impl Conversation {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Optimistically records the user's text and marks an exchange as
    /// outstanding. Returns the ticket the settle step must present, or
    /// `None` when another exchange is still pending.
    pub fn begin_exchange(&mut self, text: &str) -> Option<u64> {
        if self.pending.is_some() {
            return None;
        }
        self.messages.push(Message::user(text));
        self.next_ticket += 1;
        self.pending = Some(self.next_ticket);
        Some(self.next_ticket)
    }

    /// Closes the exchange identified by `ticket` with an assistant message.
    /// A stale ticket leaves the transcript untouched.
    pub fn settle(&mut self, ticket: u64, reply: impl Into<String>) -> Option<&Message> {
        if self.pending != Some(ticket) {
            return None;
        }
        self.pending = None;
        self.messages.push(Message::assistant(reply));
        self.messages.last()
    }

    pub fn settle_failed(&mut self, ticket: u64) -> Option<&Message> {
        self.settle(ticket, EXCHANGE_ERROR_TEXT)
    }

    pub fn pending_ticket(&self) -> Option<u64> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_appends_user_message_and_blocks_second_exchange() {
        let mut conversation = Conversation::default();
        let ticket = conversation.begin_exchange("Hello").expect("first exchange");
        assert!(conversation.is_pending());
        assert_eq!(conversation.begin_exchange("again"), None);
        assert_eq!(conversation.messages(), &[Message::user("Hello")]);

        conversation.settle(ticket, "Hi there");
        assert!(!conversation.is_pending());
        assert_eq!(
            conversation.messages(),
            &[Message::user("Hello"), Message::assistant("Hi there")]
        );
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut conversation = Conversation::default();
        let first = conversation.begin_exchange("one").expect("first");
        conversation.settle_failed(first);
        let second = conversation.begin_exchange("two").expect("second");

        assert!(conversation.settle(first, "late").is_none());
        assert_eq!(conversation.pending_ticket(), Some(second));
        assert_eq!(
            conversation.messages(),
            &[
                Message::user("one"),
                Message::assistant(EXCHANGE_ERROR_TEXT),
                Message::user("two"),
            ]
        );
    }
}
