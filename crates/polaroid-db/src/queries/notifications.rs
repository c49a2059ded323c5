use anyhow::Result;
use polaroid_types::models::{Notification, NotificationKind, NotificationView, UNKNOWN_USERNAME};
use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::Database;
use crate::models::{opt_uuid_col, time_col, uuid_col};

impl Database {
    pub fn insert_notification(&self, n: &Notification) -> Result<()> {
        self.with_conn_mut(|conn| insert_notification(conn, n))
    }

    /// Notifications addressed to `user_id`, newest first, with sender names.
    pub fn get_notifications(&self, user_id: Uuid) -> Result<Vec<NotificationView>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT n.id, n.to_user_id, n.from_user_id, n.kind, n.card_id, n.match_id,
                        n.is_read, n.created_at, u.username
                 FROM notifications n
                 LEFT JOIN users u ON u.id = n.from_user_id
                 WHERE n.to_user_id = ?1
                 ORDER BY n.created_at DESC, n.rowid DESC",
            )?;
            let rows = stmt
                .query_map([user_id.to_string()], |row| {
                    Ok(NotificationView {
                        notification: map_notification(row)?,
                        from_username: row
                            .get::<_, Option<String>>(8)?
                            .unwrap_or_else(|| UNKNOWN_USERNAME.to_string()),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn mark_notifications_read(&self, user_id: Uuid) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE to_user_id = ?1 AND is_read = 0",
                [user_id.to_string()],
            )?;
            Ok(updated)
        })
    }
}

fn insert_notification(conn: &Connection, n: &Notification) -> Result<()> {
    let (card_id, match_id) = match n.kind {
        NotificationKind::Like { card_id } => (Some(card_id.to_string()), None),
        NotificationKind::Match { match_id } => (None, Some(match_id.to_string())),
    };
    conn.execute(
        "INSERT INTO notifications (id, to_user_id, from_user_id, kind, card_id, match_id, is_read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            n.id.to_string(),
            n.to_user_id.to_string(),
            n.from_user_id.to_string(),
            n.kind.as_str(),
            card_id,
            match_id,
            n.is_read,
            n.created_at.timestamp_millis(),
        ],
    )?;
    Ok(())
}

fn map_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
    let kind: String = row.get(3)?;
    let kind = match (kind.as_str(), opt_uuid_col(row, 4)?, opt_uuid_col(row, 5)?) {
        ("like", Some(card_id), _) => NotificationKind::Like { card_id },
        ("match", _, Some(match_id)) => NotificationKind::Match { match_id },
        _ => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("malformed notification of kind {:?}", kind).into(),
            ));
        }
    };

    Ok(Notification {
        id: uuid_col(row, 0)?,
        to_user_id: uuid_col(row, 1)?,
        from_user_id: uuid_col(row, 2)?,
        kind,
        is_read: row.get(6)?,
        created_at: time_col(row, 7)?,
    })
}
