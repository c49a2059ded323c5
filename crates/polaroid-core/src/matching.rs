use polaroid_db::models::now;
use polaroid_db::queries::{matches, swipes};
use polaroid_types::models::{Card, Match, MatchDetail, NotificationKind, SwipeKind};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{Error, LikeStep, Result, Service};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub swipe_id: Uuid,
    /// The pair's match, if the like made (or found) one.
    pub match_id: Option<Uuid>,
}

impl Service {
    /// Record a like and, if the card owner already likes one of the liker's
    /// cards, create their match.
    ///
    /// The like is committed first. A failure in any later step surfaces as
    /// [`Error::PartialFailure`] with the earlier effects left in place.
    pub fn on_like(&self, from_user_id: Uuid, card_id: Uuid) -> Result<LikeOutcome> {
        self.authenticated(from_user_id)?;
        let card = self.swipeable_card(from_user_id, card_id)?;

        let stored = self.write_swipe(from_user_id, &card, SwipeKind::Like)?;
        let swipe_id = stored.swipe.id;

        // A repeated like is a no-op for the owner.
        if stored.previous != Some(SwipeKind::Like) {
            self.notify(card.owner_id, from_user_id, NotificationKind::Like { card_id: card.id })
                .map_err(Error::partial(LikeStep::NotifyLike))?;
        }

        let found = self
            .create_match_if_mutual(from_user_id, &card)
            .map_err(Error::partial(LikeStep::MatchCheck))?;

        let Some((match_id, created)) = found else {
            return Ok(LikeOutcome {
                swipe_id,
                match_id: None,
            });
        };

        if created {
            info!("Match {} created between {} and {}", match_id, from_user_id, card.owner_id);
            for (to, from) in [(from_user_id, card.owner_id), (card.owner_id, from_user_id)] {
                self.notify(to, from, NotificationKind::Match { match_id })
                    .map_err(Error::partial(LikeStep::NotifyMatch))?;
            }
        }

        Ok(LikeOutcome {
            swipe_id,
            match_id: Some(match_id),
        })
    }

    /// Check-and-create in one write transaction. The pair key makes the
    /// insert a no-op when the pair already has a match, so two likes racing
    /// each other still produce a single match.
    fn create_match_if_mutual(&self, liker_id: Uuid, card: &Card) -> Result<Option<(Uuid, bool)>> {
        let found = self.db.transaction(|tx| {
            let liked_back = swipes::liked_cards_owned_by(tx, card.owner_id, liker_id)?;
            if liked_back.is_empty() {
                return Ok(None);
            }

            let candidate = Match {
                id: Uuid::new_v4(),
                user_a_id: liker_id,
                user_b_id: card.owner_id,
                user_a_matching_card_ids: vec![card.id],
                user_b_matching_card_ids: liked_back,
                created_at: now(),
            };
            matches::insert_match_if_absent(tx, &candidate).map(Some)
        })?;

        Ok(found)
    }

    /// Matches the user takes part in, newest first.
    pub fn list_matches(&self, user_id: Uuid) -> Result<Vec<Match>> {
        Ok(self.db.get_matches_for_user(user_id)?)
    }

    /// A match from `user_id`'s side, with the first card each of them liked
    /// on the other's profile. Cards that no longer resolve are left empty.
    pub fn get_match(&self, user_id: Uuid, match_id: Uuid) -> Result<MatchDetail> {
        let matched = self.participant_match(user_id, match_id)?;
        let other_user_id = matched
            .other_participant(user_id)
            .ok_or(Error::Forbidden)?;

        let other_username = self.username_or_placeholder(other_user_id);
        let card_i_liked = self.first_card(matched.cards_liked_by(user_id));
        let card_they_liked = self.first_card(matched.cards_liked_by(other_user_id));

        Ok(MatchDetail {
            matched,
            other_user_id,
            other_username,
            card_i_liked,
            card_they_liked,
        })
    }

    pub(crate) fn participant_match(&self, user_id: Uuid, match_id: Uuid) -> Result<Match> {
        let matched = self.db.get_match(match_id)?.ok_or(Error::NotFound("match"))?;
        if !matched.involves(user_id) {
            return Err(Error::Forbidden);
        }
        Ok(matched)
    }

    fn first_card(&self, ids: &[Uuid]) -> Option<Card> {
        let id = *ids.first()?;
        self.db.get_card(id).unwrap_or_else(|e| {
            warn!("Failed to load matched card {}: {}", id, e);
            None
        })
    }
}
