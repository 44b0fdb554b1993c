use rusqlite::{params, Row};

use crate::db::models::{ListCategory, SavedMovie, SavedMovieWithMovie};
use crate::state::DbPool;
use crate::store::{movies, StoreResult};

/// Saves a movie into one of the caller's typed lists. Saving the same
/// movie into the same list twice surfaces `UniqueViolation`.
pub fn add_to_list(
    pool: &DbPool,
    user_id: &str,
    movie_id: &str,
    list: ListCategory,
) -> StoreResult<SavedMovie> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO saved_movies (id, user_id, movie_id, list_type) VALUES (?1, ?2, ?3, ?4)",
        params![id, user_id, movie_id, list.as_str()],
    )?;

    let saved = conn.query_row(
        "SELECT id, user_id, movie_id, list_type, created_at FROM saved_movies WHERE id = ?1",
        params![id],
        saved_from_row,
    )?;
    Ok(saved)
}

/// Removes the caller's entry for (movie, list). Returns whether one
/// existed.
pub fn remove_from_list(
    pool: &DbPool,
    user_id: &str,
    movie_id: &str,
    list: ListCategory,
) -> StoreResult<bool> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "DELETE FROM saved_movies WHERE user_id = ?1 AND movie_id = ?2 AND list_type = ?3",
        params![user_id, movie_id, list.as_str()],
    )?;
    Ok(rows > 0)
}

/// A user's saved entries for one list, newest first, with full movie
/// records.
pub fn get_user_list(
    pool: &DbPool,
    user_id: &str,
    list: ListCategory,
) -> StoreResult<Vec<SavedMovieWithMovie>> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT s.id, s.user_id, s.movie_id, s.list_type, s.created_at,
                m.id, m.imdb_id, m.title, m.year, m.poster_url, m.plot, m.genre, m.director,
                m.actors, m.imdb_rating, m.created_at, m.updated_at
         FROM saved_movies s
         JOIN movies m ON m.id = s.movie_id
         WHERE s.user_id = ?1 AND s.list_type = ?2
         ORDER BY s.created_at DESC, s.id DESC",
    )?;

    let entries = stmt
        .query_map(params![user_id, list.as_str()], |row| {
            Ok(SavedMovieWithMovie {
                saved: saved_from_row(row)?,
                movie: movies::movie_from_row(row, 5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

fn saved_from_row(row: &Row) -> rusqlite::Result<SavedMovie> {
    let list_type: String = row.get(3)?;
    let list_type = list_type.parse().map_err(|_| {
        rusqlite::Error::InvalidColumnType(3, "list_type".into(), rusqlite::types::Type::Text)
    })?;
    Ok(SavedMovie {
        id: row.get(0)?,
        user_id: row.get(1)?,
        movie_id: row.get(2)?,
        list_type,
        created_at: row.get(4)?,
    })
}
