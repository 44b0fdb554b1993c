use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::json;

use crate::db::models::{
    CustomListWithCount, ListCategory, Profile, ReviewWithMovie, SavedMovieWithMovie,
};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;
use crate::store::{custom_lists, follows, profiles, reviews, saved_movies, StoreError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profiles/me", patch(update_profile))
        .route("/profiles/{id}", get(get_profile))
        .route("/profiles/{id}/reviews", get(user_reviews))
        .route("/profiles/{id}/followers", get(followers))
        .route("/profiles/{id}/following", get(following))
        .route(
            "/profiles/{id}/follow",
            post(follow).delete(unfollow).get(follow_status),
        )
        .route("/profiles/{id}/library/{list}", get(library))
        .route("/profiles/{id}/lists", get(user_lists))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Profile>> {
    Ok(Json(profiles::get_profile(&state.db, &id)?))
}

async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(updates): Json<profiles::ProfileUpdate>,
) -> AppResult<Json<Profile>> {
    if let Some(ref username) = updates.username {
        let trimmed = username.trim();
        if trimmed.is_empty() || trimmed.len() > 32 {
            return Err(AppError::BadRequest(
                "Username must be 1-32 characters".into(),
            ));
        }
    }

    match profiles::update_profile(&state.db, &user.id, &updates) {
        Err(StoreError::UniqueViolation(_)) => {
            Err(AppError::Conflict("Username already taken".into()))
        }
        other => Ok(Json(other?)),
    }
}

async fn user_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<ReviewWithMovie>>> {
    Ok(Json(reviews::get_user_reviews(&state.db, &id)?))
}

async fn followers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Profile>>> {
    Ok(Json(follows::get_followers(&state.db, &id)?))
}

async fn following(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Profile>>> {
    Ok(Json(follows::get_following(&state.db, &id)?))
}

async fn follow(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    if id == user.id {
        return Err(AppError::BadRequest("Cannot follow yourself".into()));
    }

    match follows::follow_user(&state.db, &user.id, &id) {
        Err(StoreError::UniqueViolation(_)) => Err(AppError::Conflict("Already following".into())),
        other => Ok((StatusCode::CREATED, Json(other?)).into_response()),
    }
}

async fn unfollow(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if follows::unfollow_user(&state.db, &user.id, &id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn follow_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let following = follows::is_following(&state.db, &user.id, &id)?;
    Ok(Json(json!({ "following": following })).into_response())
}

async fn library(
    State(state): State<AppState>,
    Path((id, list)): Path<(String, String)>,
) -> AppResult<Json<Vec<SavedMovieWithMovie>>> {
    let list: ListCategory = list
        .parse()
        .map_err(|_| AppError::BadRequest("Unknown list category".into()))?;
    Ok(Json(saved_movies::get_user_list(&state.db, &id, list)?))
}

async fn user_lists(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<CustomListWithCount>>> {
    Ok(Json(custom_lists::get_user_custom_lists(&state.db, &id)?))
}
