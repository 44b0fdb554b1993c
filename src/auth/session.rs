use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rusqlite::{params, OptionalExtension};

use crate::state::DbPool;
use crate::store::StoreResult;

/// Create a new session for a user. Returns the session token.
pub fn create_session(pool: &DbPool, user_id: &str, hours: u64) -> StoreResult<String> {
    let conn = pool.get()?;

    let token = generate_token();
    let id = uuid::Uuid::now_v7().to_string();
    let expires_at = (Utc::now() + Duration::hours(hours as i64)).to_rfc3339();

    conn.execute(
        "INSERT INTO sessions (id, user_id, token, expires_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, user_id, token, expires_at],
    )?;

    Ok(token)
}

/// Resolve a token to its user id. Expired or unknown tokens resolve to
/// `None`; an unparseable stored expiry counts as expired.
pub fn resolve_session(
    pool: &DbPool,
    token: &str,
    now: DateTime<Utc>,
) -> StoreResult<Option<String>> {
    let conn = pool.get()?;

    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
            params![token],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    Ok(row.and_then(|(user_id, expires_at)| {
        let expires = DateTime::parse_from_rfc3339(&expires_at).ok()?;
        if expires.with_timezone(&Utc) > now {
            Some(user_id)
        } else {
            None
        }
    }))
}

/// Delete a session by token.
pub fn delete_session(pool: &DbPool, token: &str) -> StoreResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Purge sessions that expired before `before` (returns count deleted).
/// Expiries are stored as UTC RFC 3339, so string comparison is ordering.
pub fn purge_expired(pool: &DbPool, before: DateTime<Utc>) -> StoreResult<u64> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "DELETE FROM sessions WHERE expires_at < ?1",
        params![before.to_rfc3339()],
    )?;
    Ok(rows as u64)
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
