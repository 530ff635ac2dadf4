use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        BlogStats, Comment, CommentStatus, NewComment, NewPost, NewUser, Post, PostStatus,
        UpdatePostRequest, UpdateProfileRequest, UpdateUserRequest, User, UserRole, UserStatus,
    },
    query::{Paging, PostFilter, SortField, SortOrder},
};

#[derive(Default)]
struct Store {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    /// Counts calls that change state; lets tests assert that nothing was written.
    writes: u64,
}

/// InMemoryRepository
///
/// A `Repository` held entirely in process memory. Evaluates `PostFilter`
/// with `PostFilter::matches`, so listing semantics are the same predicate the
/// Postgres implementation renders to SQL.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts fixtures as-is, bypassing id and timestamp generation.
    pub async fn insert_user(&self, user: User) {
        self.store.write().await.users.insert(user.id, user);
    }

    pub async fn insert_post(&self, post: Post) {
        self.store.write().await.posts.insert(post.id, post);
    }

    pub async fn insert_comment(&self, comment: Comment) {
        self.store.write().await.comments.insert(comment.id, comment);
    }

    /// Number of state-changing repository calls so far (fixture inserts excluded).
    pub async fn write_count(&self) -> u64 {
        self.store.read().await.writes
    }
}

fn compare(a: &Post, b: &Post, field: SortField) -> std::cmp::Ordering {
    let primary = match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Views => a.views.cmp(&b.views),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut store = self.store.write().await;
        if store.users.contains_key(&user.id)
            || store.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Conflict("user already exists".to_string()));
        }
        let now = Utc::now();
        let created = User {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            status: UserStatus::Active,
            phone: user.phone,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(created.id, created.clone());
        store.writes += 1;
        Ok(created)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.store.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> AppResult<Option<User>> {
        let mut store = self.store.write().await;
        let Some(user) = store.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            user.name = name;
        }
        if let Some(phone) = req.phone {
            user.phone = Some(phone);
        }
        user.updated_at = Utc::now();
        let updated = user.clone();
        store.writes += 1;
        Ok(Some(updated))
    }

    async fn update_user(&self, id: Uuid, req: UpdateUserRequest) -> AppResult<Option<User>> {
        let mut store = self.store.write().await;
        let Some(user) = store.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(role) = req.role {
            user.role = role;
        }
        if let Some(status) = req.status {
            user.status = status;
        }
        user.updated_at = Utc::now();
        let updated = user.clone();
        store.writes += 1;
        Ok(Some(updated))
    }

    async fn create_post(&self, post: NewPost) -> AppResult<Post> {
        let now = Utc::now();
        let created = Post {
            id: Uuid::new_v4(),
            title: post.title,
            content: post.content,
            thumbnail: post.thumbnail,
            tags: post.tags,
            is_featured: post.is_featured,
            status: post.status,
            views: 0,
            author_id: post.author_id,
            created_at: now,
            updated_at: now,
        };
        let mut store = self.store.write().await;
        store.posts.insert(created.id, created.clone());
        store.writes += 1;
        Ok(created)
    }

    async fn list_posts(&self, filter: &PostFilter, paging: &Paging) -> AppResult<(Vec<Post>, i64)> {
        let store = self.store.read().await;
        let mut matched: Vec<Post> = store
            .posts
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matched.sort_by(|a, b| match paging.sort_order {
            SortOrder::Asc => compare(a, b, paging.sort_by),
            SortOrder::Desc => compare(b, a, paging.sort_by),
        });
        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(paging.skip.max(0) as usize)
            .take(paging.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn get_post(&self, id: Uuid) -> AppResult<Option<Post>> {
        Ok(self.store.read().await.posts.get(&id).cloned())
    }

    async fn record_post_view(&self, id: Uuid) -> AppResult<Option<Post>> {
        let mut store = self.store.write().await;
        let Some(post) = store.posts.get_mut(&id) else {
            return Ok(None);
        };
        post.views += 1;
        let viewed = post.clone();
        store.writes += 1;
        Ok(Some(viewed))
    }

    async fn get_posts_by_author(&self, author_id: Uuid) -> AppResult<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .store
            .read()
            .await
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| compare(b, a, SortField::CreatedAt));
        Ok(posts)
    }

    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> AppResult<Option<Post>> {
        let mut store = self.store.write().await;
        let Some(post) = store.posts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            post.title = title;
        }
        if let Some(content) = req.content {
            post.content = content;
        }
        if let Some(thumbnail) = req.thumbnail {
            post.thumbnail = Some(thumbnail);
        }
        if let Some(tags) = req.tags {
            post.tags = tags;
        }
        if let Some(flag) = req.is_featured {
            post.is_featured = flag;
        }
        if let Some(status) = req.status {
            post.status = status;
        }
        post.updated_at = Utc::now();
        let updated = post.clone();
        store.writes += 1;
        Ok(Some(updated))
    }

    async fn delete_post(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let removed = store.posts.remove(&id).is_some();
        if removed {
            // Mirrors ON DELETE CASCADE on comments.post_id.
            store.comments.retain(|_, c| c.post_id != id);
            store.writes += 1;
        }
        Ok(removed)
    }

    async fn get_stats(&self) -> AppResult<BlogStats> {
        let store = self.store.read().await;
        let posts_with = |status: PostStatus| store.posts.values().filter(|p| p.status == status).count() as i64;
        let comments_with =
            |status: CommentStatus| store.comments.values().filter(|c| c.status == status).count() as i64;

        Ok(BlogStats {
            total_posts: store.posts.len() as i64,
            published_posts: posts_with(PostStatus::Published),
            draft_posts: posts_with(PostStatus::Draft),
            archived_posts: posts_with(PostStatus::Archived),
            featured_posts: store.posts.values().filter(|p| p.is_featured).count() as i64,
            total_views: store.posts.values().map(|p| p.views).sum(),
            total_comments: store.comments.len() as i64,
            visible_comments: comments_with(CommentStatus::Visible),
            hidden_comments: comments_with(CommentStatus::Hidden),
            total_users: store.users.len() as i64,
            admin_count: store.users.values().filter(|u| u.role == UserRole::Admin).count() as i64,
        })
    }

    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment> {
        let now = Utc::now();
        let created = Comment {
            id: Uuid::new_v4(),
            content: comment.content,
            author_id: comment.author_id,
            post_id: comment.post_id,
            status: CommentStatus::Visible,
            created_at: now,
            updated_at: now,
        };
        let mut store = self.store.write().await;
        store.comments.insert(created.id, created.clone());
        store.writes += 1;
        Ok(created)
    }

    async fn get_comment(&self, id: Uuid) -> AppResult<Option<Comment>> {
        Ok(self.store.read().await.comments.get(&id).cloned())
    }

    async fn get_comments_by_author(&self, author_id: Uuid) -> AppResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .store
            .read()
            .await
            .comments
            .values()
            .filter(|c| c.author_id == author_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(comments)
    }

    async fn get_visible_comments(&self, post_id: Uuid) -> AppResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .store
            .read()
            .await
            .comments
            .values()
            .filter(|c| c.post_id == post_id && c.status == CommentStatus::Visible)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn update_comment(&self, id: Uuid, content: String) -> AppResult<Option<Comment>> {
        let mut store = self.store.write().await;
        let Some(comment) = store.comments.get_mut(&id) else {
            return Ok(None);
        };
        comment.content = content;
        comment.updated_at = Utc::now();
        let updated = comment.clone();
        store.writes += 1;
        Ok(Some(updated))
    }

    async fn set_comment_status(&self, id: Uuid, status: CommentStatus) -> AppResult<Option<Comment>> {
        let mut store = self.store.write().await;
        let Some(comment) = store.comments.get_mut(&id) else {
            return Ok(None);
        };
        comment.status = status;
        comment.updated_at = Utc::now();
        let updated = comment.clone();
        store.writes += 1;
        Ok(Some(updated))
    }

    async fn delete_comment(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let removed = store.comments.remove(&id).is_some();
        if removed {
            store.writes += 1;
        }
        Ok(removed)
    }
}
