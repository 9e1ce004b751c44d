//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

pub use comment::{CommentInput, CommentService};
pub use follow::{FollowResult, FollowService};
pub use group::{CreateGroupInput, GroupService};
pub use post::{
    CommentWithAuthor, FeedPost, GroupFeed, PostDetail, PostInput, PostService, ProfileFeed,
};
pub use user::{LoginInput, Session, SignupInput, UserService};

use validator::ValidationError;

/// Required text field: whitespace alone does not count.
fn validate_non_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        Err(ValidationError::new("required").with_message("This field is required.".into()))
    } else {
        Ok(())
    }
}
