//! Page documents and redirects.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use validator::ValidationErrors;
use yatube_common::Page;
use yatube_core::{CommentWithAuthor, FeedPost};
use yatube_db::entities::{group, user};

/// `302 Found` redirect.
#[derive(Debug, Clone)]
pub struct Found(pub String);

impl Found {
    /// Redirect to `location`.
    pub fn to(location: impl Into<String>) -> Self {
        Self(location.into())
    }
}

impl IntoResponse for Found {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.0)]).into_response()
    }
}

/// Serialize a page document.
pub fn page<T: Serialize>(body: T) -> Response {
    Json(body).into_response()
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorResponse {
    /// User ID.
    pub id: String,
    /// Login name, also the profile URL segment.
    pub username: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// First and last name; empty when neither is set.
    pub full_name: String,
}

impl From<&user::Model> for AuthorResponse {
    fn from(user: &user::Model) -> Self {
        let full_name = format!("{} {}", user.first_name, user.last_name)
            .trim()
            .to_string();
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name,
        }
    }
}

/// Public view of a group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupResponse {
    /// Group ID.
    pub id: String,
    /// URL segment of the group feed.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
}

impl From<&group::Model> for GroupResponse {
    fn from(group: &group::Model) -> Self {
        Self {
            id: group.id.clone(),
            slug: group.slug.clone(),
            title: group.title.clone(),
            description: group.description.clone(),
        }
    }
}

/// A post as listed in feeds.
#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    /// Post ID.
    pub id: String,
    /// Post body.
    pub text: String,
    /// Publication time.
    pub pub_date: DateTime<FixedOffset>,
    /// Who wrote it.
    pub author: AuthorResponse,
    /// Group the post belongs to, if any.
    pub group: Option<GroupResponse>,
    /// Image storage key, if any.
    pub image: Option<String>,
}

impl From<FeedPost> for PostResponse {
    fn from(feed: FeedPost) -> Self {
        Self {
            author: AuthorResponse::from(&feed.author),
            group: feed.group.as_ref().map(GroupResponse::from),
            id: feed.post.id,
            text: feed.post.text,
            pub_date: feed.post.created_at,
            image: feed.post.image,
        }
    }
}

/// A comment under a post.
#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    /// Comment ID.
    pub id: String,
    /// Comment body.
    pub text: String,
    /// When the comment was written.
    pub created: DateTime<FixedOffset>,
    /// Who wrote it.
    pub author: AuthorResponse,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(item: CommentWithAuthor) -> Self {
        Self {
            author: AuthorResponse::from(&item.author),
            id: item.comment.id,
            text: item.comment.text,
            created: item.comment.created_at,
        }
    }
}

/// Convert a page of feed posts for display.
#[must_use]
pub fn post_page(page: Page<FeedPost>) -> Page<PostResponse> {
    page.map(PostResponse::from)
}

/// Field errors of a submitted form, keyed by field name.
///
/// Errors that belong to no single field go under `__all__`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FormErrors(pub BTreeMap<String, Vec<String>>);

impl FormErrors {
    /// Key for errors not tied to a field.
    pub const NON_FIELD: &'static str = "__all__";

    /// Collect the messages of a failed validation.
    #[must_use]
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut out = BTreeMap::new();
        for (field, field_errors) in errors.field_errors() {
            let messages = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| format!("Invalid value ({}).", e.code), ToString::to_string)
                })
                .collect();
            out.insert(field.to_string(), messages);
        }
        Self(out)
    }

    /// Parse a `field: message` validation error raised by a service.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        let (field, text) = match message.split_once(": ") {
            Some((field, text)) if !field.contains(' ') => (field, text),
            _ => (Self::NON_FIELD, message),
        };
        let mut out = BTreeMap::new();
        out.insert(field.to_string(), vec![text.to_string()]);
        Self(out)
    }

    /// A single error not tied to a field.
    #[must_use]
    pub fn non_field(message: &str) -> Self {
        let mut out = BTreeMap::new();
        out.insert(Self::NON_FIELD.to_string(), vec![message.to_string()]);
        Self(out)
    }

    /// Whether the form has no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A form with its submitted values and errors.
#[derive(Debug, Clone, Serialize)]
pub struct FormView<F: Serialize> {
    /// Values to show in the form.
    pub fields: F,
    /// Messages per field.
    pub errors: FormErrors,
}

impl<F: Serialize> FormView<F> {
    /// A form with no errors.
    pub fn new(fields: F) -> Self {
        Self {
            fields,
            errors: FormErrors::default(),
        }
    }

    /// A form redisplayed with errors.
    pub const fn with_errors(fields: F, errors: FormErrors) -> Self {
        Self { fields, errors }
    }
}
