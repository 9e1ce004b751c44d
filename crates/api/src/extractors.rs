//! Request extractors.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use yatube_db::entities::user;

use crate::response::Found;

/// Login page path.
pub const LOGIN_PATH: &str = "/auth/login/";

/// Authenticated user extractor.
///
/// Anonymous requests are redirected to the login page with the original
/// path and query in `next`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

/// Rejection for [`AuthUser`].
#[derive(Debug)]
pub struct LoginRedirect(String);

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        Found(login_url(&self.0)).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get user from request extensions (set by auth middleware)
        if let Some(user) = parts.extensions.get::<user::Model>() {
            return Ok(Self(user.clone()));
        }

        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);
        let next = uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), ToString::to_string);
        Err(LoginRedirect(next))
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl MaybeAuthUser {
    /// ID of the viewer, if logged in.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.as_ref().map(|u| u.id.as_str())
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// Login URL returning to `next` afterwards. Slashes stay readable.
#[must_use]
pub fn login_url(next: &str) -> String {
    format!(
        "{LOGIN_PATH}?next={}",
        urlencoding::encode(next).replace("%2F", "/")
    )
}

/// `next` if it is a local absolute path, otherwise `/`.
#[must_use]
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_keeps_path_and_query() {
        assert_eq!(login_url("/create/"), "/auth/login/?next=/create/");
        assert_eq!(
            login_url("/follow/?page=2"),
            "/auth/login/?next=/follow/%3Fpage%3D2"
        );
    }

    #[test]
    fn test_login_url_round_trips() {
        let next = "/posts/01hx/edit/?a=1&b=two words";
        let url = login_url(next);
        let encoded = url.strip_prefix("/auth/login/?next=").unwrap_or_default();
        assert_eq!(urlencoding::decode(encoded).unwrap_or_default(), next);
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/follow/")), "/follow/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
