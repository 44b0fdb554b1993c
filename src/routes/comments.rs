use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use futures::stream::{self, Stream};
use serde::Deserialize;
use std::convert::Infallible;

use crate::db::models::{CommentVote, Polarity, VoteCounts};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;
use crate::store::{comments, votes};

#[derive(Deserialize)]
struct VoteRequest {
    vote_type: i64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/comments/{id}", delete(delete_comment))
        .route("/comments/{id}/vote", put(vote).delete(remove_vote))
        .route("/comments/{id}/votes", get(vote_counts))
        .route("/comments/{id}/votes/live", get(votes_live))
}

async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if comments::delete_comment(&state.db, &id, &user.id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn vote(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<Json<CommentVote>> {
    let polarity = Polarity::from_value(req.vote_type)
        .ok_or_else(|| AppError::BadRequest("Vote must be 1 or -1".into()))?;

    Ok(Json(votes::vote_on_comment(
        &state.db,
        &state.events,
        &user.id,
        &id,
        polarity,
    )?))
}

async fn remove_vote(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if votes::remove_vote(&state.db, &state.events, &user.id, &id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn vote_counts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<VoteCounts>> {
    Ok(Json(votes::get_comment_votes(&state.db, &id)?))
}

/// SSE feed of vote changes on this comment: one `vote` event per
/// insert/update/delete, carrying the old/new row state.
async fn votes_live(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let feed = state.events.subscribe_comment_votes(&id);

    let stream = stream::unfold(feed, |mut feed| async move {
        match feed.recv().await {
            Some(event) => {
                let data = serde_json::to_string(&event).unwrap_or_default();
                let event = Event::default().event("vote").data(data);
                Some((Ok(event), feed))
            }
            None => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
