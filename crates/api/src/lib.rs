//! HTTP layer for yatube.
//!
//! - **Endpoints**: feeds, post detail and forms, profiles, follows, auth
//! - **Extractors**: authenticated and optional viewer identity
//! - **Middleware**: session authentication and the cross-site form guard
//!
//! Built on Axum 0.8. Every page is a JSON document.

pub mod endpoints;
pub mod errors;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::{AppState, SiteSettings};

/// Router with authentication, the origin check and the 404 fallback.
pub fn app(state: AppState) -> Router {
    router()
        .fallback(errors::not_found)
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .layer(from_fn_with_state(state.clone(), middleware::csrf_middleware))
        .with_state(state)
}
