//! End-to-end tests against a real database.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test e2e -- --ignored`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use yatube_api::{AppState, SiteSettings, app};
use yatube_common::config::{CacheConfig, Config, DatabaseConfig, FeedConfig, ServerConfig};
use yatube_common::{MemoryPageCache, PageCache};
use yatube_core::{
    CommentService, CreateGroupInput, FollowService, GroupService, PostInput, PostService,
    Session, SignupInput, UserService,
};
use yatube_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};
use yatube_db::test_utils::TestDatabase;

struct Site {
    _db: TestDatabase,
    router: Router,
    state: AppState,
    cache: MemoryPageCache,
    posts: PostRepository,
    follows: FollowRepository,
}

async fn setup() -> Site {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    let conn: Arc<DatabaseConnection> = Arc::new(
        sea_orm::Database::connect(&db.config.database_url())
            .await
            .expect("Failed to connect"),
    );

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            url: "http://testserver".to_string(),
        },
        database: DatabaseConfig {
            url: db.config.database_url(),
            max_connections: 5,
            min_connections: 1,
        },
        redis: None,
        cache: CacheConfig::default(),
        feed: FeedConfig::default(),
    };

    let user_repo = UserRepository::new(Arc::clone(&conn));
    let group_repo = GroupRepository::new(Arc::clone(&conn));
    let post_repo = PostRepository::new(Arc::clone(&conn));
    let comment_repo = CommentRepository::new(Arc::clone(&conn));
    let follow_repo = FollowRepository::new(conn);

    let cache = MemoryPageCache::new();
    let state = AppState {
        user_service: UserService::new(user_repo.clone()),
        post_service: PostService::new(
            post_repo.clone(),
            user_repo.clone(),
            group_repo.clone(),
            comment_repo.clone(),
            follow_repo.clone(),
            config.feed.page_size,
        ),
        comment_service: CommentService::new(comment_repo, post_repo.clone()),
        follow_service: FollowService::new(follow_repo.clone(), user_repo),
        group_service: GroupService::new(group_repo),
        page_cache: Arc::new(cache.clone()),
        site: SiteSettings::from_config(&config),
    };

    Site {
        _db: db,
        router: app(state.clone()),
        state,
        cache,
        posts: post_repo,
        follows: follow_repo,
    }
}

async fn signup(site: &Site, username: &str) -> Session {
    site.state
        .user_service
        .signup(SignupInput {
            first_name: String::new(),
            last_name: String::new(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password1: "correct-horse".to_string(),
            password2: "correct-horse".to_string(),
        })
        .await
        .unwrap()
}

async fn publish(site: &Site, author: &Session, text: &str, group: Option<&str>) -> String {
    site.state
        .post_service
        .create(
            &author.user.id,
            PostInput {
                text: text.to_string(),
                group: group.map(str::to_string),
                image: None,
            },
        )
        .await
        .unwrap()
        .id
}

async fn send(site: &Site, request: Request<Body>) -> axum::response::Response {
    site.router.clone().oneshot(request).await.unwrap()
}

fn get_as(uri: &str, session: Option<&Session>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(session) = session {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", session.token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_as(uri: &str, session: &Session, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::AUTHORIZATION, format!("Bearer {}", session.token))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_create_post_adds_one_and_redirects_to_profile() {
    let site = setup().await;
    let leo = signup(&site, "leo").await;
    let group = site
        .state
        .group_service
        .create(CreateGroupInput {
            title: "Cats".to_string(),
            slug: "cats".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

    let before = site.posts.count().await.unwrap();
    let response = send(
        &site,
        post_as("/create/", &leo, &format!("text=Hello&group={}", group.id)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/profile/leo/");
    assert_eq!(site.posts.count().await.unwrap(), before + 1);

    let body = json_body(send(&site, get_as("/group/cats/", None)).await).await;
    assert_eq!(body["page_obj"]["count"], 1);
    assert_eq!(body["page_obj"]["object_list"][0]["text"], "Hello");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_non_author_cannot_edit_or_delete() {
    let site = setup().await;
    let leo = signup(&site, "leo").await;
    let anna = signup(&site, "anna").await;
    let post_id = publish(&site, &leo, "Original", None).await;

    let response = send(
        &site,
        post_as(&format!("/posts/{post_id}/edit/"), &anna, "text=Hijacked"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/posts/{post_id}/"));

    let response = send(
        &site,
        post_as(&format!("/posts/{post_id}/delete/"), &anna, ""),
    )
    .await;
    assert_eq!(location(&response), format!("/posts/{post_id}/"));

    let post = site.posts.get_by_id(&post_id).await.unwrap();
    assert_eq!(post.text, "Original");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_author_deletes_post() {
    let site = setup().await;
    let leo = signup(&site, "leo").await;
    let post_id = publish(&site, &leo, "Short-lived", None).await;

    send(&site, get_as("/", None)).await;
    assert!(!site.cache.is_empty().await);
    let before = site.posts.count().await.unwrap();

    let response = send(
        &site,
        post_as(&format!("/posts/{post_id}/delete/"), &leo, ""),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
    assert_eq!(site.posts.count().await.unwrap(), before - 1);
    assert!(site.cache.is_empty().await);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_author_edits_post() {
    let site = setup().await;
    let leo = signup(&site, "leo").await;
    let post_id = publish(&site, &leo, "Draft", None).await;

    let response = send(
        &site,
        post_as(&format!("/posts/{post_id}/edit/"), &leo, "text=Final"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/posts/{post_id}/"));
    assert_eq!(site.posts.get_by_id(&post_id).await.unwrap().text, "Final");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_follow_unfollow_and_follow_feed() {
    let site = setup().await;
    let leo = signup(&site, "leo").await;
    let anna = signup(&site, "anna").await;
    let _bob = signup(&site, "bob").await;
    publish(&site, &leo, "By leo", None).await;

    // Following twice keeps one edge
    for _ in 0..2 {
        let response = send(&site, get_as("/profile/leo/follow/", Some(&anna))).await;
        assert_eq!(location(&response), "/profile/leo/");
    }
    assert_eq!(site.follows.count().await.unwrap(), 1);

    let feed = json_body(send(&site, get_as("/follow/", Some(&anna))).await).await;
    assert_eq!(feed["page_obj"]["count"], 1);
    assert_eq!(feed["page_obj"]["object_list"][0]["text"], "By leo");

    let profile = json_body(send(&site, get_as("/profile/leo/", Some(&anna))).await).await;
    assert_eq!(profile["following"], true);

    // Self-follow is ignored
    send(&site, get_as("/profile/leo/follow/", Some(&leo))).await;
    assert_eq!(site.follows.count().await.unwrap(), 1);

    send(&site, get_as("/profile/leo/unfollow/", Some(&anna))).await;
    assert_eq!(site.follows.count().await.unwrap(), 0);

    let feed = json_body(send(&site, get_as("/follow/", Some(&anna))).await).await;
    assert_eq!(feed["page_obj"]["count"], 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_feeds_hold_ten_posts_per_page() {
    let site = setup().await;
    let leo = signup(&site, "leo").await;
    for n in 0..13 {
        publish(&site, &leo, &format!("Post {n}"), None).await;
    }

    let first = json_body(send(&site, get_as("/profile/leo/", None)).await).await;
    assert_eq!(first["page_obj"]["object_list"].as_array().unwrap().len(), 10);
    assert_eq!(first["page_obj"]["object_list"][0]["text"], "Post 12");

    let second = json_body(send(&site, get_as("/profile/leo/?page=2", None)).await).await;
    assert_eq!(second["page_obj"]["object_list"].as_array().unwrap().len(), 3);

    // Out of range and garbage page numbers fall back
    let last = json_body(send(&site, get_as("/profile/leo/?page=99", None)).await).await;
    assert_eq!(last["page_obj"]["number"], 2);
    let garbage = json_body(send(&site, get_as("/profile/leo/?page=abc", None)).await).await;
    assert_eq!(garbage["page_obj"]["number"], 1);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_index_cache_survives_until_cleared() {
    let site = setup().await;
    let leo = signup(&site, "leo").await;
    let post_id = publish(&site, &leo, "Cached", None).await;

    let before = json_body(send(&site, get_as("/", None)).await).await;
    assert_eq!(before["page_obj"]["count"], 1);

    // Bypass the endpoint so nothing clears the cache
    site.posts.delete(&post_id).await.unwrap();
    let cached = json_body(send(&site, get_as("/", None)).await).await;
    assert_eq!(cached, before);

    site.cache.clear().await.unwrap();
    let fresh = json_body(send(&site, get_as("/", None)).await).await;
    assert_eq!(fresh["page_obj"]["count"], 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_search_matches_group_slug_without_duplicates() {
    let site = setup().await;
    let leo = signup(&site, "leo").await;
    let group = site
        .state
        .group_service
        .create(CreateGroupInput {
            title: "Kittens".to_string(),
            slug: "kittens".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    let post_id = publish(&site, &leo, "Two comments here", Some(&group.id)).await;
    publish(&site, &leo, "Unrelated", None).await;

    for text in ["first", "second"] {
        send(
            &site,
            post_as(&format!("/posts/{post_id}/comment/"), &leo, &format!("text={text}")),
        )
        .await;
    }

    let body = json_body(send(&site, get_as("/?search=KITT", None)).await).await;
    assert_eq!(body["page_obj"]["count"], 1);
    assert_eq!(body["page_obj"]["object_list"][0]["id"], post_id.as_str());
    assert_eq!(body["search"], "KITT");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_detail_lists_comments() {
    let site = setup().await;
    let leo = signup(&site, "leo").await;
    let anna = signup(&site, "anna").await;
    let post_id = publish(&site, &leo, "Discuss", None).await;

    let response = send(
        &site,
        post_as(&format!("/posts/{post_id}/comment/"), &anna, "text=Nice"),
    )
    .await;
    assert_eq!(location(&response), format!("/posts/{post_id}/"));

    // Blank comments are dropped, and GET never stores one
    for body in ["text=", "text=+++"] {
        send(
            &site,
            post_as(&format!("/posts/{post_id}/comment/"), &anna, body),
        )
        .await;
    }
    send(
        &site,
        get_as(&format!("/posts/{post_id}/comment/?text=spam"), Some(&anna)),
    )
    .await;

    let body = json_body(send(&site, get_as(&format!("/posts/{post_id}/"), Some(&leo))).await).await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body["comments"][0]["text"], "Nice");
    assert_eq!(body["comments"][0]["author"]["username"], "anna");
    assert_eq!(body["author_posts"], 1);
    assert_eq!(body["can_edit"], true);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_login_then_logout() {
    let site = setup().await;
    signup(&site, "leo").await;

    let request = Request::builder()
        .uri("/auth/login/")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=leo&password=correct-horse&next=/follow/"))
        .unwrap();
    let response = send(&site, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/follow/");
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let request = Request::builder()
        .uri("/follow/")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&site, request).await.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/auth/logout/")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    send(&site, request).await;

    let request = Request::builder()
        .uri("/follow/")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&site, request).await.status(), StatusCode::FOUND);
}
