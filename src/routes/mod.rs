pub mod auth;
pub mod comments;
pub mod lists;
pub mod movies;
pub mod profiles;
pub mod reviews;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(profiles::router())
        .merge(movies::router())
        .merge(reviews::router())
        .merge(comments::router())
        .merge(lists::router())
}
