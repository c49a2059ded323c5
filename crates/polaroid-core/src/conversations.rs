use polaroid_db::models::now;
use polaroid_types::models::{ConversationSummary, Message};
use tracing::debug;
use uuid::Uuid;

use crate::{Error, Result, Service};

pub const MAX_MESSAGE_CHARS: usize = 4000;

impl Service {
    /// One row per match with at least one message, most recently active first.
    pub fn list_conversations(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>> {
        Ok(self.db.get_conversations(user_id)?)
    }

    pub fn send_message(&self, match_id: Uuid, sender_id: Uuid, text: &str) -> Result<Message> {
        self.authenticated(sender_id)?;

        if text.trim().is_empty() {
            return Err(Error::invalid("message text is empty"));
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(Error::invalid("message text is too long"));
        }

        self.participant_match(sender_id, match_id)?;

        let message = Message {
            id: Uuid::new_v4(),
            match_id,
            sender_id,
            text: text.to_string(),
            created_at: now(),
            read: false,
        };
        self.db.insert_message(&message)?;
        debug!("Message {} sent in match {}", message.id, match_id);

        self.events.thread_updated(match_id);
        Ok(message)
    }

    /// The full thread, oldest first. Participants only.
    pub fn thread(&self, user_id: Uuid, match_id: Uuid) -> Result<Vec<Message>> {
        self.participant_match(user_id, match_id)?;
        Ok(self.db.get_thread(match_id)?)
    }

    /// Mark everything the other participant sent as read.
    pub fn mark_thread_read(&self, user_id: Uuid, match_id: Uuid) -> Result<usize> {
        self.authenticated(user_id)?;
        self.participant_match(user_id, match_id)?;

        let updated = self.db.mark_thread_read(match_id, user_id)?;
        if updated > 0 {
            self.events.thread_updated(match_id);
        }
        Ok(updated)
    }
}
