//! Follow service: the follower graph.

use sea_orm::Set;
use yatube_common::{AppResult, IdGenerator};
use yatube_db::{
    entities::{follow, user},
    repositories::{FollowRepository, UserRepository},
};

/// What a follow request changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowResult {
    /// A new edge was created.
    Followed,
    /// The edge already existed.
    AlreadyFollowing,
    /// Follower and author are the same user; nothing was stored.
    SelfFollow,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow the author named `username`.
    ///
    /// Idempotent: a second call leaves the single existing edge in place.
    pub async fn follow(&self, follower_id: &str, username: &str) -> AppResult<FollowResult> {
        let author = self.user_repo.get_by_username(username).await?;
        self.follow_user(follower_id, &author).await
    }

    /// Follow an already loaded author.
    pub async fn follow_user(
        &self,
        follower_id: &str,
        author: &user::Model,
    ) -> AppResult<FollowResult> {
        if follower_id == author.id {
            return Ok(FollowResult::SelfFollow);
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(author.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        if self.follow_repo.insert_if_absent(model).await? {
            tracing::info!(follower_id = %follower_id, followee_id = %author.id, "Followed");
            Ok(FollowResult::Followed)
        } else {
            Ok(FollowResult::AlreadyFollowing)
        }
    }

    /// Stop following the author named `username`. Missing edges are fine.
    pub async fn unfollow(&self, follower_id: &str, username: &str) -> AppResult<bool> {
        let author = self.user_repo.get_by_username(username).await?;
        let removed = self
            .follow_repo
            .delete_by_pair(follower_id, &author.id)
            .await?;

        if removed > 0 {
            tracing::info!(follower_id = %follower_id, followee_id = %author.id, "Unfollowed");
        }
        Ok(removed > 0)
    }

    /// Whether `follower_id` follows `followee_id`.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, followee_id).await
    }
}
