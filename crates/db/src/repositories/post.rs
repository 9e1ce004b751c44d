//! Post repository.
//!
//! Every post listing goes through [`PostRepository::feed_query`], which
//! combines the optional scopes of a [`PostFilter`] with the free-text search.

use std::sync::Arc;

use crate::entities::{Post, comment, follow, group, post, user};
use crate::pagination::paginate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
    sea_query::{Alias, Expr, Func, Query, SimpleExpr},
};
use yatube_common::{AppError, AppResult, Page};

/// Scopes applied to a post listing. All set scopes must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Case-insensitive substring searched across post, group, author and
    /// comment fields. Empty strings are ignored.
    pub search: Option<String>,
    /// Only posts in this group.
    pub group_id: Option<String>,
    /// Only posts by this author.
    pub author_id: Option<String>,
    /// Only posts by authors this user follows.
    pub followed_by: Option<String>,
}

impl PostFilter {
    /// Home feed, optionally searched.
    #[must_use]
    pub fn search(query: Option<&str>) -> Self {
        Self {
            search: query.map(str::to_string),
            ..Self::default()
        }
    }

    /// Posts in one group.
    #[must_use]
    pub fn group(group_id: &str) -> Self {
        Self {
            group_id: Some(group_id.to_string()),
            ..Self::default()
        }
    }

    /// Posts by one author.
    #[must_use]
    pub fn author(author_id: &str) -> Self {
        Self {
            author_id: Some(author_id.to_string()),
            ..Self::default()
        }
    }

    /// Posts by the authors `user_id` follows.
    #[must_use]
    pub fn followed_by(user_id: &str) -> Self {
        Self {
            followed_by: Some(user_id.to_string()),
            ..Self::default()
        }
    }

    fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post. Its comments go with it.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all posts.
    pub async fn count(&self) -> AppResult<u64> {
        Post::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts by one author.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// One page of the listing described by `filter`, newest first.
    pub async fn find_page(
        &self,
        filter: &PostFilter,
        requested: Option<&str>,
        per_page: u64,
    ) -> AppResult<Page<post::Model>> {
        paginate(self.db.as_ref(), Self::feed_query(filter), requested, per_page).await
    }

    /// Build the select for a listing.
    ///
    /// Searching joins author, group and comments, so the result is made
    /// distinct by post row.
    #[must_use]
    pub fn feed_query(filter: &PostFilter) -> Select<post::Entity> {
        let mut query = Post::find();

        if let Some(group_id) = &filter.group_id {
            query = query.filter(post::Column::GroupId.eq(group_id.as_str()));
        }

        if let Some(author_id) = &filter.author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id.as_str()));
        }

        if let Some(follower_id) = &filter.followed_by {
            query = query.filter(
                post::Column::AuthorId.in_subquery(
                    Query::select()
                        .column(follow::Column::FolloweeId)
                        .from(follow::Entity)
                        .and_where(follow::Column::FollowerId.eq(follower_id.as_str()))
                        .to_owned(),
                ),
            );
        }

        if let Some(term) = filter.search_term() {
            let pattern = like_pattern(term);
            query = query
                .join(JoinType::InnerJoin, post::Relation::Author.def())
                .join(JoinType::LeftJoin, post::Relation::Group.def())
                .join(JoinType::LeftJoin, post::Relation::Comments.def())
                .filter(
                    Condition::any()
                        .add(ilike(Expr::col((post::Entity, post::Column::Text)), &pattern))
                        .add(ilike(Expr::col((group::Entity, group::Column::Slug)), &pattern))
                        .add(ilike(Expr::col((user::Entity, user::Column::Username)), &pattern))
                        .add(ilike(Expr::col((user::Entity, user::Column::FirstName)), &pattern))
                        .add(ilike(Expr::col((user::Entity, user::Column::LastName)), &pattern))
                        .add(ilike(
                            Func::cast_as(
                                Expr::col((post::Entity, post::Column::CreatedAt)),
                                Alias::new("TEXT"),
                            ),
                            &pattern,
                        ))
                        .add(ilike(Expr::col((comment::Entity, comment::Column::Text)), &pattern)),
                )
                .distinct();
        }

        query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
    }
}

/// `LOWER(expr) LIKE pattern`; `pattern` is already lowercased.
fn ilike<E>(expr: E, pattern: &str) -> SimpleExpr
where
    E: Into<SimpleExpr>,
{
    Expr::expr(Func::lower(expr)).like(pattern)
}

/// Lowercase `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
