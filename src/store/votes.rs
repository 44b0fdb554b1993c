use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::{CommentVote, Polarity, VoteCounts};
use crate::realtime::{ChangeKind, EventHub, VoteEvent};
use crate::state::DbPool;
use crate::store::{StoreError, StoreResult};

/// Upserts the caller's vote on a comment: a second vote replaces the
/// stored polarity instead of adding a row. Publishes an insert or update
/// event to the comment's live feed.
pub fn vote_on_comment(
    pool: &DbPool,
    events: &EventHub,
    user_id: &str,
    comment_id: &str,
    polarity: Polarity,
) -> StoreResult<CommentVote> {
    let conn = pool.get()?;

    let old = fetch_vote(&conn, comment_id, user_id)?;

    conn.execute(
        "INSERT INTO comment_votes (id, comment_id, user_id, vote_type)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(comment_id, user_id) DO UPDATE SET vote_type = excluded.vote_type",
        params![
            uuid::Uuid::now_v7().to_string(),
            comment_id,
            user_id,
            polarity.value()
        ],
    )?;

    let vote = fetch_vote(&conn, comment_id, user_id)?.ok_or(StoreError::NotFound)?;

    events.publish_vote(VoteEvent {
        comment_id: comment_id.to_string(),
        kind: if old.is_some() {
            ChangeKind::Update
        } else {
            ChangeKind::Insert
        },
        old,
        new: Some(vote.clone()),
    });

    Ok(vote)
}

/// Deletes the caller's vote row for a comment, publishing a delete event
/// when a row actually existed. Returns whether a row was removed.
pub fn remove_vote(
    pool: &DbPool,
    events: &EventHub,
    user_id: &str,
    comment_id: &str,
) -> StoreResult<bool> {
    let conn = pool.get()?;

    let old = fetch_vote(&conn, comment_id, user_id)?;
    let rows = conn.execute(
        "DELETE FROM comment_votes WHERE comment_id = ?1 AND user_id = ?2",
        params![comment_id, user_id],
    )?;

    if rows > 0 {
        events.publish_vote(VoteEvent {
            comment_id: comment_id.to_string(),
            kind: ChangeKind::Delete,
            old,
            new: None,
        });
    }

    Ok(rows > 0)
}

/// Aggregated counts, computed in SQL so concurrent votes never produce a
/// stale client-side sum.
pub fn get_comment_votes(pool: &DbPool, comment_id: &str) -> StoreResult<VoteCounts> {
    let conn = pool.get()?;

    let counts = conn.query_row(
        "SELECT COUNT(CASE WHEN vote_type = 1 THEN 1 END),
                COUNT(CASE WHEN vote_type = -1 THEN 1 END)
         FROM comment_votes WHERE comment_id = ?1",
        params![comment_id],
        |row| {
            Ok(VoteCounts {
                upvotes: row.get(0)?,
                downvotes: row.get(1)?,
            })
        },
    )?;
    Ok(counts)
}

fn fetch_vote(
    conn: &Connection,
    comment_id: &str,
    user_id: &str,
) -> StoreResult<Option<CommentVote>> {
    let vote = conn
        .query_row(
            "SELECT id, comment_id, user_id, vote_type, created_at
             FROM comment_votes WHERE comment_id = ?1 AND user_id = ?2",
            params![comment_id, user_id],
            vote_from_row,
        )
        .optional()?;
    Ok(vote)
}

fn vote_from_row(row: &Row) -> rusqlite::Result<CommentVote> {
    Ok(CommentVote {
        id: row.get(0)?,
        comment_id: row.get(1)?,
        user_id: row.get(2)?,
        vote_type: row.get(3)?,
        created_at: row.get(4)?,
    })
}
