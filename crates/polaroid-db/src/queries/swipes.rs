use anyhow::Result;
use polaroid_types::models::{SwipeEvent, SwipeKind};
use rusqlite::{Connection, Row};
use uuid::Uuid;

use super::OptionalExt;
use crate::Database;
use crate::models::{now_millis, parse_col, time_col, uuid_col};

/// A swipe as written, with the kind it replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSwipe {
    pub swipe: SwipeEvent,
    /// `None` for the first swipe on the card.
    pub previous: Option<SwipeKind>,
}

impl Database {
    /// Record `user_id`'s decision on `card_id`, replacing any earlier one.
    /// A first swipe is stored under `id`; a re-swipe keeps the original id.
    ///
    /// Reading the previous kind and writing the new one share a write
    /// transaction, so of two identical concurrent swipes exactly one sees
    /// `previous == None`.
    pub fn record_swipe(&self, id: Uuid, user_id: Uuid, card_id: Uuid, kind: SwipeKind) -> Result<StoredSwipe> {
        self.transaction(|tx| {
            let previous = tx
                .query_row(
                    "SELECT kind FROM swipes WHERE user_id = ?1 AND card_id = ?2",
                    [user_id.to_string(), card_id.to_string()],
                    |row| parse_col(row, 0),
                )
                .optional()?;
            let swipe = upsert_swipe(tx, id, user_id, card_id, kind)?;
            Ok(StoredSwipe { swipe, previous })
        })
    }

    /// Delete every swipe of `kind` by `user_id` in one transaction.
    pub fn delete_swipes(&self, user_id: Uuid, kind: SwipeKind) -> Result<usize> {
        self.transaction(|tx| {
            let removed = tx.execute(
                "DELETE FROM swipes WHERE user_id = ?1 AND kind = ?2",
                [user_id.to_string(), kind.as_str().to_string()],
            )?;
            Ok(removed)
        })
    }
}

fn upsert_swipe(conn: &Connection, id: Uuid, user_id: Uuid, card_id: Uuid, kind: SwipeKind) -> Result<SwipeEvent> {
    let stored = conn.query_row(
        "INSERT INTO swipes (id, user_id, card_id, kind, created_at) VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id, card_id) DO UPDATE SET kind = excluded.kind, created_at = excluded.created_at
         RETURNING id, user_id, card_id, kind, created_at",
        rusqlite::params![
            id.to_string(),
            user_id.to_string(),
            card_id.to_string(),
            kind.as_str(),
            now_millis(),
        ],
        map_swipe,
    )?;
    Ok(stored)
}

/// Cards owned by `owner_id` that `liker_id` currently likes, oldest like first.
pub fn liked_cards_owned_by(conn: &Connection, liker_id: Uuid, owner_id: Uuid) -> Result<Vec<Uuid>> {
    let mut stmt = conn.prepare(
        "SELECT s.card_id
         FROM swipes s
         JOIN cards c ON c.id = s.card_id
         WHERE s.user_id = ?1 AND s.kind = 'like' AND c.owner_id = ?2
         ORDER BY s.created_at, s.rowid",
    )?;
    let ids = stmt
        .query_map([liker_id.to_string(), owner_id.to_string()], |row| uuid_col(row, 0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

fn map_swipe(row: &Row<'_>) -> rusqlite::Result<SwipeEvent> {
    Ok(SwipeEvent {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        card_id: uuid_col(row, 2)?,
        kind: parse_col(row, 3)?,
        created_at: time_col(row, 4)?,
    })
}
