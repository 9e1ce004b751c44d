//! Page endpoints.

mod about;
mod auth;
mod posts;
mod profile;

use axum::Router;

use crate::middleware::AppState;

/// Create the page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(posts::router())
        .merge(profile::router())
        .merge(auth::router())
        .merge(about::router())
}
