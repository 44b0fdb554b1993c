use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::db;
use crate::state::DbPool;

/// In-memory pool with the full schema applied. Single connection so every
/// call in a test sees the same in-memory database.
pub(crate) fn test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    }
    db::run_migrations(&pool).unwrap();
    pool
}

pub(crate) fn seed_user(pool: &DbPool, username: &str) -> String {
    let id = uuid::Uuid::now_v7().to_string();
    let conn = pool.get().unwrap();
    conn.execute(
        "INSERT INTO profiles (id, username, display_name, password_hash) VALUES (?1, ?2, ?2, 'x')",
        params![id, username],
    )
    .unwrap();
    id
}

pub(crate) fn seed_movie(pool: &DbPool, imdb_id: &str, title: &str) -> String {
    let id = uuid::Uuid::now_v7().to_string();
    let conn = pool.get().unwrap();
    conn.execute(
        "INSERT INTO movies (id, imdb_id, title, year) VALUES (?1, ?2, ?3, '1999')",
        params![id, imdb_id, title],
    )
    .unwrap();
    id
}
