//! Static about pages.

use axum::{Router, response::Response, routing::get};
use serde_json::json;

use crate::{middleware::AppState, response::page};

async fn author() -> Response {
    page(json!({
        "title": "About the author",
        "text": "Yatube is a small blogging platform: posts, groups, comments and follows.",
    }))
}

async fn tech() -> Response {
    page(json!({
        "title": "Technologies",
        "text": "Rust, axum, sea-orm and PostgreSQL, with an optional Redis page cache.",
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/about/author/", get(author))
        .route("/about/tech/", get(tech))
}
