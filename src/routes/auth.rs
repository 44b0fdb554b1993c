use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::{params, OptionalExtension};
use serde::Deserialize;

use crate::auth::{self, session};
use crate::db::models::Profile;
use crate::error::{AppError, AppResult};
use crate::extractors::{session_token_from_headers, CurrentUser};
use crate::state::AppState;
use crate::store::{self, StoreError};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    let username = req.username.trim().to_string();
    if username.is_empty() || username.len() > 32 {
        return Err(AppError::BadRequest(
            "Username must be 1-32 characters".into(),
        ));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".into(),
        ));
    }

    let password_hash = auth::hash_password(&req.password)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
    let user_id = uuid::Uuid::now_v7().to_string();
    {
        let conn = state.db.get()?;
        // New accounts start with display_name mirroring the username
        let result = conn.execute(
            "INSERT INTO profiles (id, username, display_name, password_hash) VALUES (?1, ?2, ?2, ?3)",
            params![user_id, username, password_hash],
        );
        if let Err(err) = result {
            let err = StoreError::from(err);
            if err.is_unique_violation() {
                return Err(AppError::Conflict("Username already taken".into()));
            }
            return Err(err.into());
        }
    }

    let token = session::create_session(&state.db, &user_id, state.config.auth.session_hours)?;
    let profile = store::profiles::get_profile(&state.db, &user_id)?;
    let cookie = session_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.config.auth.session_hours,
    );

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(profile),
    )
        .into_response())
}

async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> AppResult<Response> {
    let row: Option<(String, String)> = {
        let conn = state.db.get()?;
        conn.query_row(
            "SELECT id, password_hash FROM profiles WHERE username = ?1",
            params![req.username.trim()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
    };

    // Unknown username and wrong password are indistinguishable
    let (user_id, hash) = row.ok_or(AppError::Unauthorized)?;
    if !auth::verify_password(&req.password, &hash) {
        return Err(AppError::Unauthorized);
    }

    let token = session::create_session(&state.db, &user_id, state.config.auth.session_hours)?;
    let profile = store::profiles::get_profile(&state.db, &user_id)?;
    let cookie = session_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.config.auth.session_hours,
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(profile),
    )
        .into_response())
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = session_token_from_headers(&headers, &state.config.auth.cookie_name) {
        session::delete_session(&state.db, token)?;
    }

    let cleared = format!(
        "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0",
        state.config.auth.cookie_name
    );
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cleared)]).into_response())
}

async fn me(State(state): State<AppState>, user: CurrentUser) -> AppResult<Json<Profile>> {
    Ok(Json(store::profiles::get_profile(&state.db, &user.id)?))
}

fn session_cookie(cookie_name: &str, token: &str, hours: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        cookie_name,
        token,
        hours * 3600
    )
}
