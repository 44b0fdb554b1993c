use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::db::models::Movie;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;
use crate::store::movies::{self, MovieSource};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movies", post(resolve_movie))
        .route("/movies/{id}", get(get_movie))
}

/// Get-or-create from external source data. Returns the internal id only;
/// callers needing the full record fetch it separately.
async fn resolve_movie(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(source): Json<MovieSource>,
) -> AppResult<Response> {
    if source.imdb_id.trim().is_empty() {
        return Err(AppError::BadRequest("imdb_id is required".into()));
    }
    if source.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".into()));
    }

    let id = movies::get_or_create_movie(&state.db, &source)?;
    Ok((StatusCode::OK, Json(json!({ "id": id }))).into_response())
}

async fn get_movie(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Movie>> {
    Ok(Json(movies::get_movie(&state.db, &id)?))
}
