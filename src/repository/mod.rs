use crate::{
    error::AppResult,
    models::{
        BlogStats, Comment, CommentStatus, NewComment, NewPost, NewUser, Post, UpdatePostRequest,
        UpdateProfileRequest, UpdateUserRequest, User,
    },
    query::{Paging, PostFilter},
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Repository Trait
///
/// The data-access boundary. Services hand it normalized predicates and
/// resolved inserts; it never makes authorization decisions itself.
///
/// `Option` means "no row for that id"; `Err` is reserved for storage failures.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> AppResult<User>;
    async fn list_users(&self) -> AppResult<Vec<User>>;
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> AppResult<Option<User>>;
    async fn update_user(&self, id: Uuid, req: UpdateUserRequest) -> AppResult<Option<User>>;

    // --- Posts ---
    async fn create_post(&self, post: NewPost) -> AppResult<Post>;
    /// One page of posts matching `filter`, plus the unpaginated match count.
    async fn list_posts(&self, filter: &PostFilter, paging: &Paging) -> AppResult<(Vec<Post>, i64)>;
    async fn get_post(&self, id: Uuid) -> AppResult<Option<Post>>;
    /// Bumps the view counter and returns the updated row.
    async fn record_post_view(&self, id: Uuid) -> AppResult<Option<Post>>;
    async fn get_posts_by_author(&self, author_id: Uuid) -> AppResult<Vec<Post>>;
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> AppResult<Option<Post>>;
    async fn delete_post(&self, id: Uuid) -> AppResult<bool>;
    async fn get_stats(&self) -> AppResult<BlogStats>;

    // --- Comments ---
    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment>;
    async fn get_comment(&self, id: Uuid) -> AppResult<Option<Comment>>;
    async fn get_comments_by_author(&self, author_id: Uuid) -> AppResult<Vec<Comment>>;
    /// Visible comments of a post, oldest first.
    async fn get_visible_comments(&self, post_id: Uuid) -> AppResult<Vec<Comment>>;
    async fn update_comment(&self, id: Uuid, content: String) -> AppResult<Option<Comment>>;
    async fn set_comment_status(&self, id: Uuid, status: CommentStatus) -> AppResult<Option<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> AppResult<bool>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
