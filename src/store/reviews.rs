use rusqlite::{params, Connection, Row};
use serde::Deserialize;

use crate::db::models::{
    MovieSummary, ProfileSummary, Review, ReviewWithDetails, ReviewWithFullDetails,
    ReviewWithMovie,
};
use crate::state::DbPool;
use crate::store::{movies, profiles, StoreError, StoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewDraft {
    pub movie_id: String,
    pub rating: i64,
    pub review_text: Option<String>,
    pub is_public: bool,
}

/// Patchable review fields. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewUpdate {
    pub rating: Option<i64>,
    pub review_text: Option<String>,
    pub is_public: Option<bool>,
}

pub fn create_review(pool: &DbPool, user_id: &str, draft: &ReviewDraft) -> StoreResult<Review> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO reviews (id, user_id, movie_id, rating, review_text, is_public)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            user_id,
            draft.movie_id,
            draft.rating,
            draft.review_text,
            draft.is_public
        ],
    )?;

    fetch_review(&conn, &id)
}

/// Public reviews, newest first, joined with minimal profile and movie
/// projections.
pub fn get_public_reviews(pool: &DbPool, limit: i64) -> StoreResult<Vec<ReviewWithDetails>> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT r.id, r.user_id, r.movie_id, r.rating, r.review_text, r.is_public,
                r.created_at, r.updated_at,
                u.username, u.display_name, u.avatar_url,
                m.id, m.title, m.poster_url, m.year
         FROM reviews r
         JOIN profiles u ON u.id = r.user_id
         JOIN movies m ON m.id = r.movie_id
         WHERE r.is_public = 1
         ORDER BY r.created_at DESC, r.id DESC
         LIMIT ?1",
    )?;

    let reviews = stmt
        .query_map(params![limit], |row| {
            Ok(ReviewWithDetails {
                review: review_from_row(row, 0)?,
                user: ProfileSummary {
                    username: row.get(8)?,
                    display_name: row.get(9)?,
                    avatar_url: row.get(10)?,
                },
                movie: MovieSummary {
                    id: row.get(11)?,
                    title: row.get(12)?,
                    poster_url: row.get(13)?,
                    year: row.get(14)?,
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(reviews)
}

/// Single review with full profile and movie records. Private or absent
/// reviews are indistinguishable: both are `NotFound`.
pub fn get_review(pool: &DbPool, review_id: &str) -> StoreResult<ReviewWithFullDetails> {
    let conn = pool.get()?;

    let review = conn.query_row(
        "SELECT r.id, r.user_id, r.movie_id, r.rating, r.review_text, r.is_public,
                r.created_at, r.updated_at,
                u.id, u.username, u.display_name, u.bio, u.avatar_url, u.created_at, u.updated_at,
                m.id, m.imdb_id, m.title, m.year, m.poster_url, m.plot, m.genre, m.director,
                m.actors, m.imdb_rating, m.created_at, m.updated_at
         FROM reviews r
         JOIN profiles u ON u.id = r.user_id
         JOIN movies m ON m.id = r.movie_id
         WHERE r.id = ?1 AND r.is_public = 1",
        params![review_id],
        |row| {
            Ok(ReviewWithFullDetails {
                review: review_from_row(row, 0)?,
                user: profiles::profile_from_row(row, 8)?,
                movie: movies::movie_from_row(row, 15)?,
            })
        },
    )?;
    Ok(review)
}

/// A user's public reviews, newest first, with the minimal movie
/// projection.
pub fn get_user_reviews(pool: &DbPool, user_id: &str) -> StoreResult<Vec<ReviewWithMovie>> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT r.id, r.user_id, r.movie_id, r.rating, r.review_text, r.is_public,
                r.created_at, r.updated_at,
                m.id, m.title, m.poster_url, m.year
         FROM reviews r
         JOIN movies m ON m.id = r.movie_id
         WHERE r.user_id = ?1 AND r.is_public = 1
         ORDER BY r.created_at DESC, r.id DESC",
    )?;

    let reviews = stmt
        .query_map(params![user_id], |row| {
            Ok(ReviewWithMovie {
                review: review_from_row(row, 0)?,
                movie: MovieSummary {
                    id: row.get(8)?,
                    title: row.get(9)?,
                    poster_url: row.get(10)?,
                    year: row.get(11)?,
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(reviews)
}

/// Owner-scoped patch: a non-owner's update matches zero rows and surfaces
/// `NotFound`, the same result an absent review gives.
pub fn update_review(
    pool: &DbPool,
    review_id: &str,
    user_id: &str,
    updates: &ReviewUpdate,
) -> StoreResult<Review> {
    let conn = pool.get()?;

    let rows = conn.execute(
        "UPDATE reviews SET
            rating = COALESCE(?3, rating),
            review_text = COALESCE(?4, review_text),
            is_public = COALESCE(?5, is_public),
            updated_at = datetime('now')
         WHERE id = ?1 AND user_id = ?2",
        params![
            review_id,
            user_id,
            updates.rating,
            updates.review_text,
            updates.is_public
        ],
    )?;
    if rows == 0 {
        return Err(StoreError::NotFound);
    }

    fetch_review(&conn, review_id)
}

/// Owner-scoped delete. Returns whether a row was removed.
pub fn delete_review(pool: &DbPool, review_id: &str, user_id: &str) -> StoreResult<bool> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "DELETE FROM reviews WHERE id = ?1 AND user_id = ?2",
        params![review_id, user_id],
    )?;
    Ok(rows > 0)
}

fn fetch_review(conn: &Connection, review_id: &str) -> StoreResult<Review> {
    let review = conn.query_row(
        "SELECT id, user_id, movie_id, rating, review_text, is_public, created_at, updated_at
         FROM reviews WHERE id = ?1",
        params![review_id],
        |row| review_from_row(row, 0),
    )?;
    Ok(review)
}

pub(crate) fn review_from_row(row: &Row, start: usize) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(start)?,
        user_id: row.get(start + 1)?,
        movie_id: row.get(start + 2)?,
        rating: row.get(start + 3)?,
        review_text: row.get(start + 4)?,
        is_public: row.get(start + 5)?,
        created_at: row.get(start + 6)?,
        updated_at: row.get(start + 7)?,
    })
}
