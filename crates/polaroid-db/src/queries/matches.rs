use anyhow::Result;
use polaroid_types::models::Match;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use super::OptionalExt;
use crate::Database;
use crate::models::{time_col, uuid_col, uuid_list_col};

const MATCH_COLUMNS: &str = "id, user_a_id, user_b_id, user_a_cards, user_b_cards, created_at";

impl Database {
    pub fn get_match(&self, id: Uuid) -> Result<Option<Match>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM matches WHERE id = ?1", MATCH_COLUMNS);
            let row = conn.query_row(&sql, [id.to_string()], map_match).optional()?;
            Ok(row)
        })
    }

    /// Matches `user_id` takes part in, newest first.
    pub fn get_matches_for_user(&self, user_id: Uuid) -> Result<Vec<Match>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM matches
                 WHERE user_a_id = ?1 OR user_b_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
                MATCH_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], map_match)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

/// Atomic create-if-absent keyed on the unordered participant pair.
/// Returns the id of the match for the pair and whether this call created it.
pub fn insert_match_if_absent(conn: &Connection, m: &Match) -> Result<(Uuid, bool)> {
    let inserted = conn.execute(
        "INSERT INTO matches (id, pair_key, user_a_id, user_b_id, user_a_cards, user_b_cards, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(pair_key) DO NOTHING",
        rusqlite::params![
            m.id.to_string(),
            Match::pair_key(m.user_a_id, m.user_b_id),
            m.user_a_id.to_string(),
            m.user_b_id.to_string(),
            serde_json::to_string(&m.user_a_matching_card_ids)?,
            serde_json::to_string(&m.user_b_matching_card_ids)?,
            m.created_at.timestamp_millis(),
        ],
    )?;

    if inserted == 1 {
        return Ok((m.id, true));
    }

    let existing = query_match_by_pair(conn, m.user_a_id, m.user_b_id)?
        .ok_or_else(|| anyhow::anyhow!("match for pair vanished after conflict"))?;
    Ok((existing.id, false))
}

pub fn query_match_by_pair(conn: &Connection, a: Uuid, b: Uuid) -> Result<Option<Match>> {
    let sql = format!("SELECT {} FROM matches WHERE pair_key = ?1", MATCH_COLUMNS);
    let row = conn
        .query_row(&sql, [Match::pair_key(a, b)], map_match)
        .optional()?;
    Ok(row)
}

fn map_match(row: &Row<'_>) -> rusqlite::Result<Match> {
    Ok(Match {
        id: uuid_col(row, 0)?,
        user_a_id: uuid_col(row, 1)?,
        user_b_id: uuid_col(row, 2)?,
        user_a_matching_card_ids: uuid_list_col(row, 3)?,
        user_b_matching_card_ids: uuid_list_col(row, 4)?,
        created_at: time_col(row, 5)?,
    })
}
