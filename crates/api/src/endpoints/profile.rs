//! Profile endpoints: author feed, follow graph and account removal.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;
use yatube_common::{AppError, AppResult, Page};

use super::posts::FeedQuery;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::{AppState, SESSION_COOKIE},
    response::{AuthorResponse, Found, PostResponse, page, post_page},
};

#[derive(Serialize)]
struct ProfilePage {
    author: AuthorResponse,
    following: bool,
    page_obj: Page<PostResponse>,
}

#[derive(Serialize)]
struct FollowPage {
    page_obj: Page<PostResponse>,
}

fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

/// Posts of one author.
async fn profile(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(username): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Response> {
    let feed = state
        .post_service
        .profile_feed(&username, viewer.id(), query.page.as_deref())
        .await?;

    Ok(page(ProfilePage {
        author: AuthorResponse::from(&feed.author),
        following: feed.following,
        page_obj: post_page(feed.page),
    }))
}

/// Follow an author.
async fn profile_follow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Response> {
    if user.username != username {
        state.follow_service.follow(&user.id, &username).await?;
    }
    Ok(Found::to(profile_url(&username)).into_response())
}

/// Stop following an author.
async fn profile_unfollow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Response> {
    state.follow_service.unfollow(&user.id, &username).await?;
    Ok(Found::to(profile_url(&username)).into_response())
}

/// Delete one's own account, purge cached pages and go home.
async fn profile_delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    match state.user_service.delete_account(&user.id, &username).await {
        Ok(()) => {
            if let Err(e) = state.page_cache.clear().await {
                tracing::warn!(error = %e, "Failed to clear page cache");
            }
            let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
            Ok((jar, Found::to("/")).into_response())
        }
        Err(AppError::Forbidden(_)) => Ok(Found::to(profile_url(&username)).into_response()),
        Err(e) => Err(e),
    }
}

/// Posts by the authors the viewer follows.
async fn follow_index(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<FeedQuery>,
) -> AppResult<Response> {
    let feed = state
        .post_service
        .follow_feed(&user.id, query.page.as_deref())
        .await?;

    Ok(page(FollowPage {
        page_obj: post_page(feed),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow/", get(follow_index))
        .route("/profile/{username}/", get(profile))
        .route(
            "/profile/{username}/follow/",
            get(profile_follow).post(profile_follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            get(profile_unfollow).post(profile_unfollow),
        )
        .route(
            "/profile/{username}/delete/",
            get(profile_delete).post(profile_delete),
        )
}
