use rusqlite::{params, Row};
use serde::Deserialize;

use crate::db::models::Movie;
use crate::state::DbPool;
use crate::store::StoreResult;

/// Movie fields as delivered by the external metadata source, mapped to
/// internal column names on insert.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieSource {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster_url: Option<String>,
    pub plot: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub imdb_rating: Option<String>,
}

/// Returns the internal id for the movie with this imdb_id, inserting it
/// first if unknown. The insert and the lookup run on one connection and
/// the insert is conflict-tolerant, so two racing calls for a new imdb_id
/// both resolve to the single row the winner created.
pub fn get_or_create_movie(pool: &DbPool, source: &MovieSource) -> StoreResult<String> {
    let conn = pool.get()?;

    conn.execute(
        "INSERT INTO movies (id, imdb_id, title, year, poster_url, plot, genre, director, actors, imdb_rating)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(imdb_id) DO NOTHING",
        params![
            uuid::Uuid::now_v7().to_string(),
            source.imdb_id,
            source.title,
            source.year,
            source.poster_url,
            source.plot,
            source.genre,
            source.director,
            source.actors,
            source.imdb_rating
        ],
    )?;

    let id = conn.query_row(
        "SELECT id FROM movies WHERE imdb_id = ?1",
        params![source.imdb_id],
        |row| row.get(0),
    )?;
    Ok(id)
}

pub fn get_movie(pool: &DbPool, movie_id: &str) -> StoreResult<Movie> {
    let conn = pool.get()?;
    let movie = conn.query_row(
        "SELECT id, imdb_id, title, year, poster_url, plot, genre, director, actors, imdb_rating,
                created_at, updated_at
         FROM movies WHERE id = ?1",
        params![movie_id],
        |row| movie_from_row(row, 0),
    )?;
    Ok(movie)
}

/// Maps a full movie projection starting at column `start`.
pub(crate) fn movie_from_row(row: &Row, start: usize) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get(start)?,
        imdb_id: row.get(start + 1)?,
        title: row.get(start + 2)?,
        year: row.get(start + 3)?,
        poster_url: row.get(start + 4)?,
        plot: row.get(start + 5)?,
        genre: row.get(start + 6)?,
        director: row.get(start + 7)?,
        actors: row.get(start + 8)?,
        imdb_rating: row.get(start + 9)?,
        created_at: row.get(start + 10)?,
        updated_at: row.get(start + 11)?,
    })
}
