use chrono::{DateTime, Utc};
use polaroid_types::models::{Card, CardView};
use uuid::Uuid;

use crate::{MAX_FEED_PAGE, Result, Service};

/// Feed paging, newest first. To continue from the last card seen, pass its
/// `created_at` as `before` and its id as `before_id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
    pub limit: Option<u32>,
    pub before: Option<DateTime<Utc>>,
    pub before_id: Option<Uuid>,
}

impl Page {
    /// The page following `card`.
    pub fn after(card: &Card, limit: Option<u32>) -> Self {
        Self {
            limit,
            before: Some(card.created_at),
            before_id: Some(card.id),
        }
    }
}

impl Service {
    /// Cards `user_id` has not swiped yet, excluding their own, with owner
    /// usernames resolved. Empty once everything has been swiped.
    pub fn get_feed(&self, user_id: Uuid, page: Page) -> Result<Vec<CardView>> {
        let limit = page
            .limit
            .unwrap_or(self.settings.feed_page_limit)
            .clamp(1, MAX_FEED_PAGE);
        let before = page.before.map(|t| t.timestamp_millis());

        Ok(self.db.get_feed(user_id, limit, before, page.before_id)?)
    }
}
