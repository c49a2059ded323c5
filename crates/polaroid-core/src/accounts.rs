use polaroid_db::models::UserRow;
use polaroid_types::models::User;
use tracing::info;
use uuid::Uuid;

use crate::{Error, Result, Service};

const MAX_EMAIL_LEN: usize = 254;

impl Service {
    /// Create a user. `password_hash` is produced by the caller; the core
    /// never sees plaintext passwords.
    pub fn register(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let name_len = username.chars().count();
        if !(3..=32).contains(&name_len) {
            return Err(Error::invalid("username must be 3 to 32 characters"));
        }
        if email.len() > MAX_EMAIL_LEN || !email.contains('@') {
            return Err(Error::invalid("email address is malformed"));
        }

        // Uniqueness is decided by the UNIQUE constraints on insert.
        let id = Uuid::new_v4();
        if let Err(e) = self.db.create_user(id, username, email, password_hash) {
            if !polaroid_db::is_unique_violation(&e) {
                return Err(Error::Persistence(e));
            }
            let taken = if self.db.get_user_by_username(username)?.is_some() {
                "username"
            } else {
                "email"
            };
            return Err(Error::Conflict(taken));
        }
        info!("Registered user {} ({})", username, id);

        self.user(id)
    }

    /// Stored credentials for a login attempt.
    pub fn credentials(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self.db.get_user_by_email(email)?)
    }

    pub fn user(&self, id: Uuid) -> Result<User> {
        self.db
            .get_user_by_id(id)?
            .map(UserRow::into_user)
            .ok_or(Error::NotFound("user"))
    }
}
