use anyhow::Result;
use polaroid_types::models::UNKNOWN_USERNAME;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use super::OptionalExt;
use crate::Database;
use crate::models::{UserRow, now_millis, time_col, uuid_col};

const USER_COLUMNS: &str = "id, username, email, password, created_at";

impl Database {
    pub fn create_user(&self, id: Uuid, username: &str, email: &str, password_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id.to_string(), username, email, password_hash, now_millis()],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", &id.to_string()))
    }

    pub fn user_exists(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| user_exists(conn, id))
    }

    /// Username for `id`, or the placeholder when the user is gone.
    pub fn get_username_by_id(&self, id: Uuid) -> Result<String> {
        self.with_conn(|conn| username_of(conn, id))
    }
}

fn user_exists(conn: &Connection, id: Uuid) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM users WHERE id = ?1", [id.to_string()], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn username_of(conn: &Connection, id: Uuid) -> Result<String> {
    let name: Option<String> = conn
        .query_row("SELECT username FROM users WHERE id = ?1", [id.to_string()], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(name.unwrap_or_else(|| UNKNOWN_USERNAME.to_string()))
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is always one of the literals above, never user input.
    let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column);
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([value], map_user).optional()?;
    Ok(row)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: uuid_col(row, 0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        created_at: time_col(row, 4)?,
    })
}
