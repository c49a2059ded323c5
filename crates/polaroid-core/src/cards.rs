use polaroid_db::models::now;
use polaroid_types::api::CreateCardRequest;
use polaroid_types::models::Card;
use tracing::debug;
use uuid::Uuid;

use crate::{Error, Result, Service};

/// Inline image payloads are stored in the row, so keep them small.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
const MAX_TITLE_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 2000;

impl Service {
    pub fn create_card(&self, owner_id: Uuid, req: CreateCardRequest) -> Result<Card> {
        self.authenticated(owner_id)?;

        if req.image_ref.trim().is_empty() {
            return Err(Error::invalid("an image is required"));
        }
        if req.image_ref.len() > MAX_IMAGE_BYTES {
            return Err(Error::invalid("image is too large"));
        }
        if req.title.chars().count() > MAX_TITLE_CHARS || req.actor.chars().count() > MAX_TITLE_CHARS {
            return Err(Error::invalid("title and actor are limited to 200 characters"));
        }
        if req.description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(Error::invalid("description is limited to 2000 characters"));
        }

        let card = Card {
            id: Uuid::new_v4(),
            owner_id,
            actor: req.actor,
            title: req.title,
            image_ref: req.image_ref,
            description: req.description,
            filter: req.filter,
            created_at: now(),
        };
        self.db.insert_card(&card)?;
        debug!("Card {} created by {}", card.id, owner_id);

        Ok(card)
    }

    pub fn get_card(&self, card_id: Uuid) -> Result<Card> {
        self.db.get_card(card_id)?.ok_or(Error::NotFound("card"))
    }

    /// The caller's own uploads, newest first.
    pub fn list_own_cards(&self, owner_id: Uuid) -> Result<Vec<Card>> {
        Ok(self.db.get_cards_by_owner(owner_id)?)
    }
}
