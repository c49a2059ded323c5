use anyhow::Result;
use polaroid_types::models::{ConversationSummary, Message, UNKNOWN_USERNAME};
use rusqlite::Row;
use uuid::Uuid;

use crate::Database;
use crate::models::{time_col, uuid_col};

impl Database {
    pub fn insert_message(&self, m: &Message) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (id, match_id, sender_id, text, created_at, read)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    m.id.to_string(),
                    m.match_id.to_string(),
                    m.sender_id.to_string(),
                    m.text,
                    m.created_at.timestamp_millis(),
                    m.read,
                ],
            )?;
            Ok(())
        })
    }

    /// The whole thread of a match, oldest first.
    pub fn get_thread(&self, match_id: Uuid) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, match_id, sender_id, text, created_at, read
                 FROM messages
                 WHERE match_id = ?1
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt
                .query_map([match_id.to_string()], map_message)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Mark every unread message in the thread not sent by `reader_id` as read.
    pub fn mark_thread_read(&self, match_id: Uuid, reader_id: Uuid) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE messages SET read = 1
                 WHERE match_id = ?1 AND sender_id != ?2 AND read = 0",
                [match_id.to_string(), reader_id.to_string()],
            )?;
            Ok(updated)
        })
    }

    /// One summary per match of `user_id` that has at least one message,
    /// most recently active first.
    pub fn get_conversations(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>> {
        self.with_conn(|conn| {
            // Last message and unread count are correlated subqueries so the
            // whole list is one round trip instead of three per match.
            let mut stmt = conn.prepare(
                "WITH mine AS (
                     SELECT id,
                            CASE WHEN user_a_id = ?1 THEN user_b_id ELSE user_a_id END AS other_id
                     FROM matches
                     WHERE user_a_id = ?1 OR user_b_id = ?1
                 )
                 SELECT mine.id, mine.other_id, u.username, last.text, last.created_at,
                        (SELECT COUNT(*) FROM messages x
                         WHERE x.match_id = mine.id AND x.sender_id = mine.other_id AND x.read = 0)
                 FROM mine
                 JOIN messages last ON last.rowid = (
                     SELECT rowid FROM messages
                     WHERE match_id = mine.id
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT 1
                 )
                 LEFT JOIN users u ON u.id = mine.other_id
                 ORDER BY last.created_at DESC, last.rowid DESC",
            )?;
            let rows = stmt
                .query_map([user_id.to_string()], |row| {
                    Ok(ConversationSummary {
                        match_id: uuid_col(row, 0)?,
                        other_user_id: uuid_col(row, 1)?,
                        other_username: row
                            .get::<_, Option<String>>(2)?
                            .unwrap_or_else(|| UNKNOWN_USERNAME.to_string()),
                        last_message: row.get(3)?,
                        last_timestamp: time_col(row, 4)?,
                        unread_count: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn map_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: uuid_col(row, 0)?,
        match_id: uuid_col(row, 1)?,
        sender_id: uuid_col(row, 2)?,
        text: row.get(3)?,
        created_at: time_col(row, 4)?,
        read: row.get(5)?,
    })
}
