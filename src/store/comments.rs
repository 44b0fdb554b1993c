use rusqlite::{params, Row};

use crate::db::models::{Comment, CommentWithUser, ProfileSummary};
use crate::realtime::{CommentEvent, EventHub};
use crate::state::DbPool;
use crate::store::StoreResult;

/// Creates a comment and publishes the insert to the review's live feed.
pub fn create_comment(
    pool: &DbPool,
    events: &EventHub,
    user_id: &str,
    review_id: &str,
    text: &str,
) -> StoreResult<CommentWithUser> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO comments (id, review_id, user_id, comment_text) VALUES (?1, ?2, ?3, ?4)",
        params![id, review_id, user_id, text],
    )?;

    let created = conn.query_row(
        "SELECT c.id, c.review_id, c.user_id, c.comment_text, c.created_at, c.updated_at,
                u.username, u.display_name, u.avatar_url
         FROM comments c
         JOIN profiles u ON u.id = c.user_id
         WHERE c.id = ?1",
        params![id],
        comment_with_user_from_row,
    )?;

    events.publish_comment(CommentEvent {
        review_id: review_id.to_string(),
        comment: created.comment.clone(),
    });

    Ok(created)
}

/// All comments on a review, oldest first.
pub fn get_review_comments(pool: &DbPool, review_id: &str) -> StoreResult<Vec<CommentWithUser>> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT c.id, c.review_id, c.user_id, c.comment_text, c.created_at, c.updated_at,
                u.username, u.display_name, u.avatar_url
         FROM comments c
         JOIN profiles u ON u.id = c.user_id
         WHERE c.review_id = ?1
         ORDER BY c.created_at ASC, c.id ASC",
    )?;

    let comments = stmt
        .query_map(params![review_id], comment_with_user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(comments)
}

/// Owner-scoped delete. Returns whether a row was removed.
pub fn delete_comment(pool: &DbPool, comment_id: &str, user_id: &str) -> StoreResult<bool> {
    let conn = pool.get()?;
    let rows = conn.execute(
        "DELETE FROM comments WHERE id = ?1 AND user_id = ?2",
        params![comment_id, user_id],
    )?;
    Ok(rows > 0)
}

fn comment_with_user_from_row(row: &Row) -> rusqlite::Result<CommentWithUser> {
    Ok(CommentWithUser {
        comment: Comment {
            id: row.get(0)?,
            review_id: row.get(1)?,
            user_id: row.get(2)?,
            comment_text: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        },
        user: ProfileSummary {
            username: row.get(6)?,
            display_name: row.get(7)?,
            avatar_url: row.get(8)?,
        },
    })
}
