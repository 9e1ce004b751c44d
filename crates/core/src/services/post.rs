//! Post service: feeds, search and authored CRUD.

use std::collections::HashMap;

use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use yatube_common::{AppError, AppResult, IdGenerator, Page};
use yatube_db::{
    entities::{comment, group, post, user},
    repositories::{
        CommentRepository, FollowRepository, GroupRepository, PostFilter, PostRepository,
        UserRepository,
    },
};

use super::{FollowService, validate_non_blank};

/// A post together with the rows it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPost {
    pub post: post::Model,
    pub author: user::Model,
    pub group: Option<group::Model>,
}

/// A comment with its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentWithAuthor {
    pub comment: comment::Model,
    pub author: user::Model,
}

/// Group feed.
#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: group::Model,
    pub page: Page<FeedPost>,
}

/// Author feed, with the viewer's relationship to the author.
#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub author: user::Model,
    pub following: bool,
    pub page: Page<FeedPost>,
}

/// Post detail with its comments, oldest first.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: FeedPost,
    /// Number of posts the author has published.
    pub author_posts: u64,
    pub comments: Vec<CommentWithAuthor>,
}

/// Submitted post form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostInput {
    #[serde(default)]
    #[validate(custom(function = "validate_non_blank"))]
    pub text: String,

    /// Group ID; empty means no group.
    #[serde(default)]
    pub group: Option<String>,

    /// Image storage key; empty means no image.
    #[serde(default)]
    pub image: Option<String>,
}

impl PostInput {
    fn group_id(&self) -> Option<&str> {
        self.group.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn image_key(&self) -> Option<String> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    comment_repo: CommentRepository,
    follow_service: FollowService,
    id_gen: IdGenerator,
    page_size: u64,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        comment_repo: CommentRepository,
        follow_repo: FollowRepository,
        page_size: u64,
    ) -> Self {
        let follow_service = FollowService::new(follow_repo, user_repo.clone());
        Self {
            post_repo,
            user_repo,
            group_repo,
            comment_repo,
            follow_service,
            id_gen: IdGenerator::new(),
            page_size,
        }
    }

    /// Home feed, optionally narrowed by a free-text search.
    pub async fn index(
        &self,
        search: Option<&str>,
        page: Option<&str>,
    ) -> AppResult<Page<FeedPost>> {
        self.feed(&PostFilter::search(search), page).await
    }

    /// Feed of one group.
    pub async fn group_feed(&self, slug: &str, page: Option<&str>) -> AppResult<GroupFeed> {
        let group = self.group_repo.get_by_slug(slug).await?;
        let page = self.feed(&PostFilter::group(&group.id), page).await?;
        Ok(GroupFeed { group, page })
    }

    /// Feed of one author. `following` is false for anonymous viewers.
    pub async fn profile_feed(
        &self,
        username: &str,
        viewer_id: Option<&str>,
        page: Option<&str>,
    ) -> AppResult<ProfileFeed> {
        let author = self.user_repo.get_by_username(username).await?;
        let following = match viewer_id {
            Some(viewer_id) => self.follow_service.is_following(viewer_id, &author.id).await?,
            None => false,
        };
        let page = self.feed(&PostFilter::author(&author.id), page).await?;
        Ok(ProfileFeed {
            author,
            following,
            page,
        })
    }

    /// Posts by the authors `viewer_id` follows.
    pub async fn follow_feed(
        &self,
        viewer_id: &str,
        page: Option<&str>,
    ) -> AppResult<Page<FeedPost>> {
        self.feed(&PostFilter::followed_by(viewer_id), page).await
    }

    /// A post with its comments.
    pub async fn detail(&self, post_id: &str) -> AppResult<PostDetail> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let author = self.user_repo.get_by_id(&post.author_id).await?;
        let author_posts = self.post_repo.count_by_author(&author.id).await?;
        let group = match &post.group_id {
            Some(group_id) => self.group_repo.find_by_id(group_id).await?,
            None => None,
        };

        let comments = self.comment_repo.find_by_post(&post.id).await?;
        let author_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let comments = comments
            .into_iter()
            .filter_map(|comment| {
                let author = authors.get(&comment.author_id)?.clone();
                Some(CommentWithAuthor { comment, author })
            })
            .collect();

        Ok(PostDetail {
            post: FeedPost {
                post,
                author,
                group,
            },
            author_posts,
            comments,
        })
    }

    /// Get a post the user may edit.
    pub async fn get_own(&self, post_id: &str, user_id: &str) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can change this post".to_string(),
            ));
        }
        Ok(post)
    }

    /// Publish a new post.
    pub async fn create(&self, author_id: &str, input: PostInput) -> AppResult<post::Model> {
        input.validate()?;
        let group_id = self.resolve_group(&input).await?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            text: Set(input.text.clone()),
            author_id: Set(author_id.to_string()),
            group_id: Set(group_id),
            image: Set(input.image_key()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let post = self.post_repo.create(model).await?;
        tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");
        Ok(post)
    }

    /// Rewrite a post. Only its author may do so.
    pub async fn update(
        &self,
        post_id: &str,
        user_id: &str,
        input: PostInput,
    ) -> AppResult<post::Model> {
        let post = self.get_own(post_id, user_id).await?;
        input.validate()?;
        let group_id = self.resolve_group(&input).await?;

        let mut active: post::ActiveModel = post.into();
        active.text = Set(input.text.clone());
        active.group_id = Set(group_id);
        if let Some(image) = input.image_key() {
            active.image = Set(Some(image));
        }

        let post = self.post_repo.update(active).await?;
        tracing::info!(post_id = %post.id, "Post updated");
        Ok(post)
    }

    /// Delete a post. Only its author may do so.
    pub async fn delete(&self, post_id: &str, user_id: &str) -> AppResult<()> {
        let post = self.get_own(post_id, user_id).await?;
        self.post_repo.delete(&post.id).await?;
        tracing::info!(post_id = %post.id, "Post deleted");
        Ok(())
    }

    async fn resolve_group(&self, input: &PostInput) -> AppResult<Option<String>> {
        let Some(group_id) = input.group_id() else {
            return Ok(None);
        };
        match self.group_repo.find_by_id(group_id).await? {
            Some(group) => Ok(Some(group.id)),
            None => Err(AppError::Validation(
                "group: Select a valid choice.".to_string(),
            )),
        }
    }

    async fn feed(&self, filter: &PostFilter, page: Option<&str>) -> AppResult<Page<FeedPost>> {
        let page = self.post_repo.find_page(filter, page, self.page_size).await?;
        self.hydrate(page).await
    }

    /// Attach authors and groups to a page of posts with one query each.
    async fn hydrate(&self, page: Page<post::Model>) -> AppResult<Page<FeedPost>> {
        let mut author_ids: Vec<String> =
            page.object_list.iter().map(|p| p.author_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();

        let mut group_ids: Vec<String> = page
            .object_list
            .iter()
            .filter_map(|p| p.group_id.clone())
            .collect();
        group_ids.sort();
        group_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        let groups: HashMap<String, group::Model> = self
            .group_repo
            .find_by_ids(&group_ids)
            .await?
            .into_iter()
            .map(|g| (g.id.clone(), g))
            .collect();

        let Page {
            number,
            num_pages,
            count,
            has_next,
            has_previous,
            object_list,
        } = page;

        // A post whose author vanished between the two queries is skipped
        let object_list = object_list
            .into_iter()
            .filter_map(|post| {
                let author = authors.get(&post.author_id)?.clone();
                let group = post.group_id.as_ref().and_then(|id| groups.get(id).cloned());
                Some(FeedPost {
                    post,
                    author,
                    group,
                })
            })
            .collect();

        Ok(Page {
            number,
            num_pages,
            count,
            has_next,
            has_previous,
            object_list,
        })
    }
}
