use rusqlite::params;

use crate::db::models::{Profile, UserFollow};
use crate::state::DbPool;
use crate::store::{profiles, StoreResult};

/// Creates a follow edge. Following the same user twice surfaces
/// `UniqueViolation`; self-follows are rejected by the schema.
pub fn follow_user(
    pool: &DbPool,
    follower_id: &str,
    following_id: &str,
) -> StoreResult<UserFollow> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO user_follows (id, follower_id, following_id) VALUES (?1, ?2, ?3)",
        params![id, follower_id, following_id],
    )?;

    let follow = conn.query_row(
        "SELECT id, follower_id, following_id, created_at FROM user_follows WHERE id = ?1",
        params![id],
        |row| {
            Ok(UserFollow {
                id: row.get(0)?,
                follower_id: row.get(1)?,
                following_id: row.get(2)?,
                created_at: row.get(3)?,
            })
        },
    )?;
    Ok(follow)
}

/// Removes the edge. Returns whether one existed.
pub fn unfollow_user(pool: &DbPool, follower_id: &str, following_id: &str) -> StoreResult<bool> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "DELETE FROM user_follows WHERE follower_id = ?1 AND following_id = ?2",
        params![follower_id, following_id],
    )?;
    Ok(rows > 0)
}

pub fn get_followers(pool: &DbPool, user_id: &str) -> StoreResult<Vec<Profile>> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT u.id, u.username, u.display_name, u.bio, u.avatar_url, u.created_at, u.updated_at
         FROM user_follows f
         JOIN profiles u ON u.id = f.follower_id
         WHERE f.following_id = ?1
         ORDER BY f.created_at DESC, f.id DESC",
    )?;

    let followers = stmt
        .query_map(params![user_id], |row| profiles::profile_from_row(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(followers)
}

pub fn get_following(pool: &DbPool, user_id: &str) -> StoreResult<Vec<Profile>> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT u.id, u.username, u.display_name, u.bio, u.avatar_url, u.created_at, u.updated_at
         FROM user_follows f
         JOIN profiles u ON u.id = f.following_id
         WHERE f.follower_id = ?1
         ORDER BY f.created_at DESC, f.id DESC",
    )?;

    let following = stmt
        .query_map(params![user_id], |row| profiles::profile_from_row(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(following)
}

/// Single EXISTS predicate; no row fetch.
pub fn is_following(pool: &DbPool, follower_id: &str, following_id: &str) -> StoreResult<bool> {
    let conn = pool.get()?;
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM user_follows WHERE follower_id = ?1 AND following_id = ?2)",
        params![follower_id, following_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}
