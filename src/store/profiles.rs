use rusqlite::{params, Connection, Row};
use serde::Deserialize;

use crate::db::models::Profile;
use crate::state::DbPool;
use crate::store::{StoreError, StoreResult};

/// Patchable profile fields. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

pub fn get_profile(pool: &DbPool, user_id: &str) -> StoreResult<Profile> {
    let conn = pool.get()?;
    fetch_profile(&conn, user_id)
}

/// Username collisions surface as `UniqueViolation` and are not retried.
pub fn update_profile(
    pool: &DbPool,
    user_id: &str,
    updates: &ProfileUpdate,
) -> StoreResult<Profile> {
    let conn = pool.get()?;

    let rows = conn.execute(
        "UPDATE profiles SET
            username = COALESCE(?2, username),
            display_name = COALESCE(?3, display_name),
            bio = COALESCE(?4, bio),
            avatar_url = COALESCE(?5, avatar_url),
            updated_at = datetime('now')
         WHERE id = ?1",
        params![
            user_id,
            updates.username,
            updates.display_name,
            updates.bio,
            updates.avatar_url
        ],
    )?;
    if rows == 0 {
        return Err(StoreError::NotFound);
    }

    fetch_profile(&conn, user_id)
}

fn fetch_profile(conn: &Connection, user_id: &str) -> StoreResult<Profile> {
    let profile = conn.query_row(
        "SELECT id, username, display_name, bio, avatar_url, created_at, updated_at
         FROM profiles WHERE id = ?1",
        params![user_id],
        |row| profile_from_row(row, 0),
    )?;
    Ok(profile)
}

/// Maps a full profile projection starting at column `start`.
pub(crate) fn profile_from_row(row: &Row, start: usize) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(start)?,
        username: row.get(start + 1)?,
        display_name: row.get(start + 2)?,
        bio: row.get(start + 3)?,
        avatar_url: row.get(start + 4)?,
        created_at: row.get(start + 5)?,
        updated_at: row.get(start + 6)?,
    })
}
