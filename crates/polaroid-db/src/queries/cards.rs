use anyhow::Result;
use polaroid_types::models::{Card, CardView, SwipeKind, UNKNOWN_USERNAME};
use rusqlite::{Connection, Row};
use uuid::Uuid;

use super::OptionalExt;
use crate::Database;
use crate::models::{parse_col, time_col, uuid_col};

const CARD_COLUMNS: &str =
    "c.id, c.owner_id, c.actor, c.title, c.image_ref, c.description, c.filter, c.created_at";

impl Database {
    pub fn insert_card(&self, card: &Card) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO cards (id, owner_id, actor, title, image_ref, description, filter, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    card.id.to_string(),
                    card.owner_id.to_string(),
                    card.actor,
                    card.title,
                    card.image_ref,
                    card.description,
                    card.filter.as_str(),
                    card.created_at.timestamp_millis(),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_card(&self, id: Uuid) -> Result<Option<Card>> {
        self.with_conn(|conn| query_card(conn, id))
    }

    /// Cards uploaded by `owner_id`, newest first.
    pub fn get_cards_by_owner(&self, owner_id: Uuid) -> Result<Vec<Card>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM cards c WHERE c.owner_id = ?1 ORDER BY c.created_at DESC, c.rowid DESC",
                CARD_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([owner_id.to_string()], map_card)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Cards `user_id` may still swipe: not their own, not already swiped.
    ///
    /// Ordered by `(created_at DESC, id)`. The next page starts after the
    /// last card seen: pass its `created_at` (Unix millis) as `before` and its
    /// id as `before_id`. Without `before_id` the cursor is strict on time.
    pub fn get_feed(
        &self,
        user_id: Uuid,
        limit: u32,
        before: Option<i64>,
        before_id: Option<Uuid>,
    ) -> Result<Vec<CardView>> {
        self.with_conn(|conn| {
            // Anti-join on swipes + owner join replaces a client-side scan (N+1).
            let sql = format!(
                "SELECT {}, u.username
                 FROM cards c
                 LEFT JOIN users u ON u.id = c.owner_id
                 WHERE c.owner_id != ?1
                   AND NOT EXISTS (SELECT 1 FROM swipes s WHERE s.user_id = ?1 AND s.card_id = c.id)
                   AND (?2 IS NULL
                        OR c.created_at < ?2
                        OR (c.created_at = ?2 AND ?3 IS NOT NULL AND c.id > ?3))
                 ORDER BY c.created_at DESC, c.id
                 LIMIT ?4",
                CARD_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    rusqlite::params![user_id.to_string(), before, before_id.map(|id| id.to_string()), limit],
                    map_card_view,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Cards `user_id` swiped with `kind`, most recent swipe first.
    pub fn get_swiped_cards(&self, user_id: Uuid, kind: SwipeKind) -> Result<Vec<CardView>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {}, u.username
                 FROM swipes s
                 JOIN cards c ON c.id = s.card_id
                 LEFT JOIN users u ON u.id = c.owner_id
                 WHERE s.user_id = ?1 AND s.kind = ?2
                 ORDER BY s.created_at DESC, s.rowid DESC",
                CARD_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![user_id.to_string(), kind.as_str()], map_card_view)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_card(conn: &Connection, id: Uuid) -> Result<Option<Card>> {
    let sql = format!("SELECT {} FROM cards c WHERE c.id = ?1", CARD_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([id.to_string()], map_card).optional()?;
    Ok(row)
}

fn map_card(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: uuid_col(row, 0)?,
        owner_id: uuid_col(row, 1)?,
        actor: row.get(2)?,
        title: row.get(3)?,
        image_ref: row.get(4)?,
        description: row.get(5)?,
        filter: parse_col(row, 6)?,
        created_at: time_col(row, 7)?,
    })
}

fn map_card_view(row: &Row<'_>) -> rusqlite::Result<CardView> {
    Ok(CardView {
        card: map_card(row)?,
        owner_username: row
            .get::<_, Option<String>>(8)?
            .unwrap_or_else(|| UNKNOWN_USERNAME.to_string()),
    })
}
