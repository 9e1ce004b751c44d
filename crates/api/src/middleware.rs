//! Application state and request middleware.

#![allow(missing_docs)]

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use url::Url;
use yatube_common::{AppError, Config, SharedPageCache};
use yatube_core::{CommentService, FollowService, GroupService, PostService, UserService};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "yatube_session";

/// Site-wide settings the handlers need at request time.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Public URL; mutating requests from any other origin are refused.
    pub server_url: String,
    /// How long the home feed stays cached.
    pub index_ttl: Duration,
}

impl SiteSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            server_url: config.server.url.clone(),
            index_ttl: Duration::from_secs(config.cache.index_ttl_secs),
        }
    }
}

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub follow_service: FollowService,
    pub group_service: GroupService,
    pub page_cache: SharedPageCache,
    pub site: SiteSettings,
}

/// Authentication middleware.
///
/// Accepts a `Bearer` token or the session cookie and stores the user in the
/// request extensions for the extractors.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = session_token(&req)
        && let Ok(user) = state.user_service.authenticate_by_token(&token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

fn session_token(req: &Request<Body>) -> Option<String> {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.to_string());
    }

    CookieJar::from_headers(req.headers())
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Cross-site form post guard.
///
/// A mutating request that carries an `Origin` header must come from the
/// configured server origin.
pub async fn csrf_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if is_mutating(req.method())
        && let Some(origin) = req.headers().get(header::ORIGIN)
    {
        let origin = origin.to_str().unwrap_or_default();
        if !same_origin(origin, &state.site.server_url) {
            tracing::warn!(origin = %origin, path = %req.uri().path(), "Rejected cross-site request");
            return AppError::Csrf(format!(
                "Origin checking failed - {origin} does not match any trusted origins."
            ))
            .into_response();
        }
    }

    next.run(req).await
}

fn is_mutating(method: &Method) -> bool {
    !matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Compare scheme, host and port of two URLs.
fn same_origin(origin: &str, server_url: &str) -> bool {
    match (Url::parse(origin), Url::parse(server_url)) {
        (Ok(a), Ok(b)) => a.origin() == b.origin(),
        _ => false,
    }
}
