use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::models::{
    CustomList, CustomListWithMovies, CustomListWithOwner, ListCategory,
};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::state::AppState;
use crate::store::{custom_lists, saved_movies, StoreError};

const DEFAULT_BROWSE_LIMIT: i64 = 20;
const MAX_BROWSE_LIMIT: i64 = 100;
const MAX_LIST_NAME: usize = 100;

#[derive(Deserialize)]
struct BrowseQuery {
    limit: Option<i64>,
}

#[derive(Deserialize)]
struct SaveMovieRequest {
    movie_id: String,
    list: ListCategory,
}

#[derive(Deserialize)]
struct CreateListRequest {
    name: String,
    description: Option<String>,
    #[serde(default)]
    is_public: bool,
}

#[derive(Deserialize)]
struct AddListMovieRequest {
    movie_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/library", post(save_movie))
        .route("/library/{movie_id}/{list}", delete(unsave_movie))
        .route("/lists", post(create_list))
        .route("/lists/public", get(browse_public))
        .route(
            "/lists/{id}",
            get(get_list).patch(update_list).delete(delete_list),
        )
        .route("/lists/{id}/movies", post(add_movie))
        .route("/lists/{id}/movies/{movie_id}", delete(remove_movie))
}

async fn save_movie(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<SaveMovieRequest>,
) -> AppResult<Response> {
    match saved_movies::add_to_list(&state.db, &user.id, &req.movie_id, req.list) {
        Err(StoreError::UniqueViolation(_)) => Err(AppError::Conflict("Already in list".into())),
        other => Ok((StatusCode::CREATED, Json(other?)).into_response()),
    }
}

async fn unsave_movie(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((movie_id, list)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let list: ListCategory = list
        .parse()
        .map_err(|_| AppError::BadRequest("Unknown list category".into()))?;

    if saved_movies::remove_from_list(&state.db, &user.id, &movie_id, list)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn create_list(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateListRequest>,
) -> AppResult<Response> {
    let name = req.name.trim().to_string();
    if name.is_empty() || name.len() > MAX_LIST_NAME {
        return Err(AppError::BadRequest(
            "List name must be 1-100 characters".into(),
        ));
    }

    let list = custom_lists::create_custom_list(
        &state.db,
        &user.id,
        &custom_lists::CustomListDraft {
            name,
            description: req.description,
            is_public: req.is_public,
        },
    )?;

    Ok((StatusCode::CREATED, Json(list)).into_response())
}

async fn browse_public(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<Vec<CustomListWithOwner>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_BROWSE_LIMIT)
        .clamp(1, MAX_BROWSE_LIMIT);
    Ok(Json(custom_lists::get_public_custom_lists(&state.db, limit)?))
}

async fn get_list(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> AppResult<Json<CustomListWithMovies>> {
    let viewer = user.as_ref().map(|u| u.id.as_str());
    Ok(Json(custom_lists::get_custom_list(&state.db, &id, viewer)?))
}

async fn update_list(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(updates): Json<custom_lists::CustomListUpdate>,
) -> AppResult<Json<CustomList>> {
    if let Some(ref name) = updates.name {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_LIST_NAME {
            return Err(AppError::BadRequest(
                "List name must be 1-100 characters".into(),
            ));
        }
    }

    Ok(Json(custom_lists::update_custom_list(
        &state.db, &id, &user.id, &updates,
    )?))
}

async fn delete_list(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if custom_lists::delete_custom_list(&state.db, &id, &user.id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn add_movie(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<AddListMovieRequest>,
) -> AppResult<Response> {
    match custom_lists::add_movie_to_custom_list(&state.db, &id, &req.movie_id, &user.id) {
        Err(StoreError::UniqueViolation(_)) => {
            Err(AppError::Conflict("Movie already in list".into()))
        }
        other => Ok((StatusCode::CREATED, Json(other?)).into_response()),
    }
}

async fn remove_movie(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, movie_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    if custom_lists::remove_movie_from_custom_list(&state.db, &id, &movie_id, &user.id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
