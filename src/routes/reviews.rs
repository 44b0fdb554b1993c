use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::stream::{self, Stream};
use serde::Deserialize;
use std::convert::Infallible;

use crate::db::models::{CommentWithUser, Review, ReviewWithDetails, ReviewWithFullDetails};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;
use crate::store::{comments, reviews};

const DEFAULT_FEED_LIMIT: i64 = 10;
const MAX_FEED_LIMIT: i64 = 100;
const MAX_REVIEW_TEXT: usize = 5000;
const MAX_COMMENT_TEXT: usize = 500;

#[derive(Deserialize)]
struct FeedQuery {
    limit: Option<i64>,
}

#[derive(Deserialize)]
struct CreateReviewRequest {
    movie_id: String,
    rating: i64,
    review_text: Option<String>,
    #[serde(default = "default_public")]
    is_public: bool,
}

fn default_public() -> bool {
    true
}

#[derive(Deserialize)]
struct CreateCommentRequest {
    comment_text: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(public_feed).post(create_review))
        .route(
            "/reviews/{id}",
            get(get_review).patch(update_review).delete(delete_review),
        )
        .route(
            "/reviews/{id}/comments",
            get(list_comments).post(create_comment),
        )
        .route("/reviews/{id}/comments/live", get(comments_live))
}

async fn public_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Vec<ReviewWithDetails>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_FEED_LIMIT)
        .clamp(1, MAX_FEED_LIMIT);
    Ok(Json(reviews::get_public_reviews(&state.db, limit)?))
}

async fn create_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateReviewRequest>,
) -> AppResult<Response> {
    if !(1..=10).contains(&req.rating) {
        return Err(AppError::BadRequest("Rating must be between 1 and 10".into()));
    }
    if let Some(ref text) = req.review_text {
        if text.len() > MAX_REVIEW_TEXT {
            return Err(AppError::BadRequest(
                "Review must be 5000 characters or less".into(),
            ));
        }
    }

    let review = reviews::create_review(
        &state.db,
        &user.id,
        &reviews::ReviewDraft {
            movie_id: req.movie_id,
            rating: req.rating,
            review_text: req.review_text,
            is_public: req.is_public,
        },
    )?;

    Ok((StatusCode::CREATED, Json(review)).into_response())
}

async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ReviewWithFullDetails>> {
    Ok(Json(reviews::get_review(&state.db, &id)?))
}

async fn update_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(updates): Json<reviews::ReviewUpdate>,
) -> AppResult<Json<Review>> {
    if let Some(rating) = updates.rating {
        if !(1..=10).contains(&rating) {
            return Err(AppError::BadRequest("Rating must be between 1 and 10".into()));
        }
    }
    if let Some(ref text) = updates.review_text {
        if text.len() > MAX_REVIEW_TEXT {
            return Err(AppError::BadRequest(
                "Review must be 5000 characters or less".into(),
            ));
        }
    }

    Ok(Json(reviews::update_review(&state.db, &id, &user.id, &updates)?))
}

async fn delete_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if reviews::delete_review(&state.db, &id, &user.id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<CommentWithUser>>> {
    Ok(Json(comments::get_review_comments(&state.db, &id)?))
}

async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<Response> {
    let text = req.comment_text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::BadRequest("Comment cannot be empty".into()));
    }
    if text.len() > MAX_COMMENT_TEXT {
        return Err(AppError::BadRequest(
            "Comment must be 500 characters or less".into(),
        ));
    }

    let comment = comments::create_comment(&state.db, &state.events, &user.id, &id, &text)?;
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

/// SSE feed of comments inserted on this review, one `comment` event per
/// insert, for as long as the client stays connected.
async fn comments_live(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let feed = state.events.subscribe_review_comments(&id);

    let stream = stream::unfold(feed, |mut feed| async move {
        match feed.recv().await {
            Some(comment) => {
                let data = serde_json::to_string(&comment).unwrap_or_default();
                let event = Event::default().event("comment").data(data);
                Some((Ok(event), feed))
            }
            None => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
