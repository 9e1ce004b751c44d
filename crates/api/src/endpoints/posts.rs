//! Post endpoints: home feed, group feed, detail and authored changes.

use axum::{
    Form, Router,
    extract::{OriginalUri, Path, Query, State, rejection::FormRejection},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use validator::Validate;
use yatube_common::{AppError, AppResult, Page};
use yatube_core::{CommentInput, PostInput};
use yatube_db::entities::post;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{
        CommentResponse, FormErrors, FormView, Found, GroupResponse, PostResponse,
        page, post_page,
    },
};

/// `?page=` and `?search=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub page: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize)]
struct IndexPage {
    page_obj: Page<PostResponse>,
    search: Option<String>,
}

#[derive(Serialize)]
struct GroupPage {
    group: GroupResponse,
    page_obj: Page<PostResponse>,
}

#[derive(Serialize)]
struct DetailPage {
    post: PostResponse,
    author_posts: u64,
    comments: Vec<CommentResponse>,
    form: FormView<CommentFields>,
    can_edit: bool,
}

#[derive(Serialize)]
struct CommentFields {
    text: String,
}

/// Values shown in the post form.
#[derive(Debug, Default, Serialize)]
struct PostFields {
    text: String,
    group: Option<String>,
    image: Option<String>,
}

impl From<&PostInput> for PostFields {
    fn from(input: &PostInput) -> Self {
        Self {
            text: input.text.clone(),
            group: input.group.clone(),
            image: input.image.clone(),
        }
    }
}

impl From<&post::Model> for PostFields {
    fn from(post: &post::Model) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.clone(),
            image: post.image.clone(),
        }
    }
}

#[derive(Serialize)]
struct PostFormPage {
    form: FormView<PostFields>,
    is_edit: bool,
    post_id: Option<String>,
    groups: Vec<GroupResponse>,
}

fn detail_url(post_id: &str) -> String {
    format!("/posts/{post_id}/")
}

/// Home feed. The whole document is cached per path and query.
async fn index(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<FeedQuery>,
) -> AppResult<Response> {
    let key = format!(
        "index:{}",
        uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str())
    );

    match state.page_cache.get(&key).await {
        Ok(Some(body)) => return Ok(json_body(body)),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Page cache read failed"),
    }

    let search = query.search.filter(|s| !s.is_empty());
    let feed = state
        .post_service
        .index(search.as_deref(), query.page.as_deref())
        .await?;
    let body = serde_json::to_string(&IndexPage {
        page_obj: post_page(feed),
        search,
    })
    .map_err(|e| AppError::Internal(e.to_string()))?;

    if let Err(e) = state
        .page_cache
        .set(&key, &body, state.site.index_ttl)
        .await
    {
        tracing::warn!(error = %e, "Page cache write failed");
    }

    Ok(json_body(body))
}

fn json_body(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Posts of one group.
async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Response> {
    let feed = state
        .post_service
        .group_feed(&slug, query.page.as_deref())
        .await?;

    Ok(page(GroupPage {
        group: GroupResponse::from(&feed.group),
        page_obj: post_page(feed.page),
    }))
}

/// A post with its comments and the comment form.
async fn post_detail(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let detail = state.post_service.detail(&post_id).await?;
    let can_edit = viewer.id() == Some(detail.post.author.id.as_str());

    Ok(page(DetailPage {
        post: PostResponse::from(detail.post),
        author_posts: detail.author_posts,
        comments: detail.comments.into_iter().map(CommentResponse::from).collect(),
        form: FormView::new(CommentFields {
            text: String::new(),
        }),
        can_edit,
    }))
}

async fn post_form(
    state: &AppState,
    form: FormView<PostFields>,
    post_id: Option<String>,
) -> AppResult<Response> {
    let groups = state
        .group_service
        .list()
        .await?
        .iter()
        .map(GroupResponse::from)
        .collect();

    Ok(page(PostFormPage {
        form,
        is_edit: post_id.is_some(),
        post_id,
        groups,
    }))
}

/// Empty post form.
async fn post_create_form(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> AppResult<Response> {
    post_form(&state, FormView::new(PostFields::default()), None).await
}

/// Publish a post and go to the author's profile.
async fn post_create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Form(input): Form<PostInput>,
) -> AppResult<Response> {
    if let Err(errors) = input.validate() {
        let form = FormView::with_errors(
            PostFields::from(&input),
            FormErrors::from_validation(&errors),
        );
        return post_form(&state, form, None).await;
    }

    let fields = PostFields::from(&input);
    match state.post_service.create(&user.id, input).await {
        Ok(_) => Ok(Found::to(format!("/profile/{}/", user.username)).into_response()),
        Err(AppError::Validation(message)) => {
            let form = FormView::with_errors(fields, FormErrors::from_message(&message));
            post_form(&state, form, None).await
        }
        Err(e) => Err(e),
    }
}

/// The post form filled with the current values. Authors only.
async fn post_edit_form(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    match state.post_service.get_own(&post_id, &user.id).await {
        Ok(post) => {
            let form = FormView::new(PostFields::from(&post));
            post_form(&state, form, Some(post.id)).await
        }
        Err(AppError::Forbidden(_)) => Ok(Found::to(detail_url(&post_id)).into_response()),
        Err(e) => Err(e),
    }
}

/// Save an edited post. Non-authors are sent back to the post unchanged.
async fn post_edit(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    Form(input): Form<PostInput>,
) -> AppResult<Response> {
    let fields = PostFields::from(&input);
    if let Err(errors) = input.validate() {
        return match state.post_service.get_own(&post_id, &user.id).await {
            Ok(_) => {
                let form = FormView::with_errors(fields, FormErrors::from_validation(&errors));
                post_form(&state, form, Some(post_id)).await
            }
            Err(AppError::Forbidden(_)) => Ok(Found::to(detail_url(&post_id)).into_response()),
            Err(e) => Err(e),
        };
    }

    match state.post_service.update(&post_id, &user.id, input).await {
        Ok(post) => Ok(Found::to(detail_url(&post.id)).into_response()),
        Err(AppError::Forbidden(_)) => Ok(Found::to(detail_url(&post_id)).into_response()),
        Err(AppError::Validation(message)) => {
            let form = FormView::with_errors(fields, FormErrors::from_message(&message));
            post_form(&state, form, Some(post_id)).await
        }
        Err(e) => Err(e),
    }
}

/// Delete a post, purge cached pages and go home.
async fn post_delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    match state.post_service.delete(&post_id, &user.id).await {
        Ok(()) => {
            if let Err(e) = state.page_cache.clear().await {
                tracing::warn!(error = %e, "Failed to clear page cache");
            }
            Ok(Found::to("/").into_response())
        }
        Err(AppError::Forbidden(_)) => Ok(Found::to(detail_url(&post_id)).into_response()),
        Err(e) => Err(e),
    }
}

/// Comment on a post. Invalid comments are dropped; the reader lands on
/// the post either way.
async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    form: Result<Form<CommentInput>, FormRejection>,
) -> AppResult<Response> {
    let input = form.map(|Form(input)| input).unwrap_or_default();
    match state.comment_service.add(&post_id, &user.id, input).await {
        Ok(_) | Err(AppError::Validation(_)) => {
            Ok(Found::to(detail_url(&post_id)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// A GET on the comment URL stores nothing and leads back to the post.
async fn comment_redirect(AuthUser(_user): AuthUser, Path(post_id): Path<String>) -> Response {
    Found::to(detail_url(&post_id)).into_response()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/group/{slug}/", get(group_posts))
        .route("/create/", get(post_create_form).post(post_create))
        .route("/posts/{post_id}/", get(post_detail))
        .route("/posts/{post_id}/edit/", get(post_edit_form).post(post_edit))
        .route("/posts/{post_id}/delete/", get(post_delete).post(post_delete))
        .route(
            "/posts/{post_id}/comment/",
            get(comment_redirect).post(add_comment),
        )
}
