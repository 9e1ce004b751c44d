//! Comment service.

use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use yatube_common::{AppResult, IdGenerator};
use yatube_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository},
};

use super::validate_non_blank;

/// Submitted comment form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentInput {
    #[serde(default)]
    #[validate(custom(function = "validate_non_blank"))]
    pub text: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a post.
    pub async fn add(
        &self,
        post_id: &str,
        author_id: &str,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        input.validate()?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id),
            author_id: Set(author_id.to_string()),
            text: Set(input.text),
            created_at: Set(chrono::Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::debug!(comment_id = %comment.id, post_id = %comment.post_id, "Comment added");
        Ok(comment)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;
    use yatube_common::AppError;
    use yatube_db::entities::post;

    fn create_test_post(id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            text: "hello".to_string(),
            author_id: "u1".to_string(),
            group_id: None,
            image: None,
            created_at: Utc::now().into(),
        }
    }

    fn service(db: DatabaseConnection) -> CommentService {
        let db = Arc::new(db);
        CommentService::new(CommentRepository::new(db.clone()), PostRepository::new(db))
    }

    #[tokio::test]
    async fn test_add_comment() {
        let stored = comment::Model {
            id: "c1".to_string(),
            post_id: "p1".to_string(),
            author_id: "u2".to_string(),
            text: "nice".to_string(),
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![create_test_post("p1")]])
            .append_query_results([vec![stored]])
            .into_connection();

        let input = CommentInput {
            text: "nice".to_string(),
        };
        let comment = service(db).add("p1", "u2", input).await.unwrap();

        assert_eq!(comment.post_id, "p1");
        assert_eq!(comment.text, "nice");
    }

    #[tokio::test]
    async fn test_empty_comment_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![create_test_post("p1")]])
            .into_connection();

        let result = service(db).add("p1", "u2", CommentInput::default()).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_whitespace_comment_is_invalid() {
        let input = CommentInput {
            text: "   ".to_string(),
        };
        let errors = input.validate().unwrap_err();

        assert!(errors.field_errors().contains_key("text"));
    }

    #[tokio::test]
    async fn test_whitespace_comment_is_not_stored() {
        // Only the post lookup runs
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![create_test_post("p1")]])
            .into_connection();

        let input = CommentInput {
            text: " \n\t ".to_string(),
        };
        let result = service(db).add("p1", "u2", input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let input = CommentInput {
            text: "nice".to_string(),
        };
        let result = service(db).add("nope", "u2", input).await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }
}
