//! Swipe & match rules: the ledger of swipe decisions, the feed built from
//! it, mutual-like detection, notifications and match conversations.
//!
//! Everything hangs off [`Service`]. Its methods are synchronous and do
//! blocking SQLite I/O; async callers run them on a blocking thread.

pub mod accounts;
pub mod cards;
pub mod conversations;
pub mod error;
pub mod events;
pub mod feed;
pub mod ledger;
pub mod matching;
pub mod notify;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use polaroid_db::Database;
use uuid::Uuid;

pub use error::{Error, LikeStep, Result};
pub use events::EventSink;
pub use feed::Page;
pub use matching::LikeOutcome;

/// Hard cap on feed page size regardless of configuration.
pub const MAX_FEED_PAGE: u32 = 200;

#[derive(Debug, Clone)]
pub struct Settings {
    /// How many times an idempotent swipe write is attempted before giving up.
    pub swipe_write_attempts: u32,
    /// Feed page size when the caller does not ask for one.
    pub feed_page_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            swipe_write_attempts: 3,
            feed_page_limit: 50,
        }
    }
}

pub struct Service {
    db: Database,
    events: Arc<dyn EventSink>,
    settings: Settings,
}

impl Service {
    pub fn new(db: Database, events: Arc<dyn EventSink>, settings: Settings) -> Self {
        Self { db, events, settings }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Mutating operations refuse callers that do not resolve to a user.
    fn authenticated(&self, user_id: Uuid) -> Result<()> {
        if self.db.user_exists(user_id)? {
            Ok(())
        } else {
            Err(Error::NotAuthenticated)
        }
    }
}
