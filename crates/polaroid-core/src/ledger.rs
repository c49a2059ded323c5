use polaroid_db::queries::swipes::StoredSwipe;
use polaroid_types::models::{Card, CardView, SwipeKind};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::matching::LikeOutcome;
use crate::{Error, Result, Service};

impl Service {
    /// Entry point for a swipe of any kind. Likes go through the match
    /// engine; bookmarks and rejects are only recorded.
    pub fn swipe(&self, user_id: Uuid, card_id: Uuid, kind: SwipeKind) -> Result<LikeOutcome> {
        match kind {
            SwipeKind::Like => self.on_like(user_id, card_id),
            SwipeKind::Bookmark | SwipeKind::Reject => {
                let swipe_id = self.record_swipe(user_id, card_id, kind)?;
                Ok(LikeOutcome {
                    swipe_id,
                    match_id: None,
                })
            }
        }
    }

    /// Record `user_id`'s decision on `card_id`. Swiping the same card again
    /// replaces the earlier decision and returns the same id.
    pub fn record_swipe(&self, user_id: Uuid, card_id: Uuid, kind: SwipeKind) -> Result<Uuid> {
        self.authenticated(user_id)?;
        let card = self.swipeable_card(user_id, card_id)?;
        Ok(self.write_swipe(user_id, &card, kind)?.swipe.id)
    }

    /// Forget every swipe of `kind`, making those cards eligible for the feed again.
    pub fn reset_swipes(&self, user_id: Uuid, kind: SwipeKind) -> Result<usize> {
        self.authenticated(user_id)?;
        let removed = self.db.delete_swipes(user_id, kind)?;
        info!("Reset {} {} swipes for {}", removed, kind, user_id);
        Ok(removed)
    }

    /// Cards the user swiped with `kind`, most recent first.
    pub fn swiped_cards(&self, user_id: Uuid, kind: SwipeKind) -> Result<Vec<CardView>> {
        Ok(self.db.get_swiped_cards(user_id, kind)?)
    }

    pub(crate) fn swipeable_card(&self, user_id: Uuid, card_id: Uuid) -> Result<Card> {
        let card = self.db.get_card(card_id)?.ok_or(Error::NotFound("card"))?;
        if card.owner_id == user_id {
            return Err(Error::invalid("cannot swipe your own card"));
        }
        Ok(card)
    }

    /// The write is keyed on (user, card), so retrying it is safe.
    pub(crate) fn write_swipe(&self, user_id: Uuid, card: &Card, kind: SwipeKind) -> Result<StoredSwipe> {
        let id = Uuid::new_v4();
        let attempts = self.settings.swipe_write_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.db.record_swipe(id, user_id, card.id, kind) {
                Ok(stored) => {
                    debug!("{} swiped {} on card {}", user_id, kind, card.id);
                    return Ok(stored);
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        "Swipe write failed (attempt {}/{}), retrying: {}",
                        attempt, attempts, e
                    );
                    attempt += 1;
                }
                Err(e) => return Err(Error::Persistence(e)),
            }
        }
    }
}
