//! Typed queries, one module per table.
//!
//! Single-statement operations are methods on [`crate::Database`]. Functions
//! taking a `&Connection` are building blocks for multi-statement work run
//! inside [`crate::Database::transaction`].

pub mod cards;
pub mod matches;
pub mod messages;
pub mod notifications;
pub mod swipes;
pub mod users;

use anyhow::Result;

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Test fixtures shared by the query modules.
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Utc};
    use polaroid_types::models::{Card, CardFilter};
    use uuid::Uuid;

    use crate::Database;
    use crate::models::now_millis;

    pub fn user(db: &Database, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        db.create_user(id, username, &format!("{}@example.com", username), "hash")
            .unwrap();
        id
    }

    pub fn card(db: &Database, owner_id: Uuid, title: &str) -> Card {
        card_at(db, owner_id, title, now_millis())
    }

    pub fn card_at(db: &Database, owner_id: Uuid, title: &str, millis: i64) -> Card {
        let card = Card {
            id: Uuid::new_v4(),
            owner_id,
            actor: "Kim Rihyun".into(),
            title: title.into(),
            image_ref: "data:image/jpeg;base64,AAAA".into(),
            description: String::new(),
            filter: CardFilter::None,
            created_at: DateTime::<Utc>::from_timestamp_millis(millis).unwrap(),
        };
        db.insert_card(&card).unwrap();
        card
    }
}
