use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_at  INTEGER NOT NULL
            );

            CREATE TABLE cards (
                id          TEXT PRIMARY KEY,
                owner_id    TEXT NOT NULL REFERENCES users(id),
                actor       TEXT NOT NULL,
                title       TEXT NOT NULL,
                image_ref   TEXT NOT NULL,
                description TEXT NOT NULL,
                filter      TEXT NOT NULL DEFAULT 'none',
                created_at  INTEGER NOT NULL
            );

            CREATE INDEX idx_cards_owner ON cards(owner_id, created_at);
            CREATE INDEX idx_cards_created ON cards(created_at);

            -- One row per (user, card): re-swiping replaces the decision.
            CREATE TABLE swipes (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                card_id     TEXT NOT NULL REFERENCES cards(id),
                kind        TEXT NOT NULL,
                created_at  INTEGER NOT NULL,
                UNIQUE(user_id, card_id)
            );

            CREATE INDEX idx_swipes_user_kind ON swipes(user_id, kind);

            -- pair_key = min(user):max(user); at most one match per pair.
            CREATE TABLE matches (
                id          TEXT PRIMARY KEY,
                pair_key    TEXT NOT NULL UNIQUE,
                user_a_id   TEXT NOT NULL REFERENCES users(id),
                user_b_id   TEXT NOT NULL REFERENCES users(id),
                user_a_cards TEXT NOT NULL,
                user_b_cards TEXT NOT NULL,
                created_at  INTEGER NOT NULL
            );

            CREATE INDEX idx_matches_user_a ON matches(user_a_id);
            CREATE INDEX idx_matches_user_b ON matches(user_b_id);

            CREATE TABLE notifications (
                id          TEXT PRIMARY KEY,
                to_user_id  TEXT NOT NULL REFERENCES users(id),
                from_user_id TEXT NOT NULL REFERENCES users(id),
                kind        TEXT NOT NULL,
                card_id     TEXT,
                match_id    TEXT,
                is_read     INTEGER NOT NULL DEFAULT 0,
                created_at  INTEGER NOT NULL
            );

            CREATE INDEX idx_notifications_to ON notifications(to_user_id, created_at);

            CREATE TABLE messages (
                id          TEXT PRIMARY KEY,
                match_id    TEXT NOT NULL REFERENCES matches(id),
                sender_id   TEXT NOT NULL REFERENCES users(id),
                text        TEXT NOT NULL,
                created_at  INTEGER NOT NULL,
                read        INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_messages_match ON messages(match_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
