#![allow(dead_code)]

use std::sync::Arc;

use blog_backend::{
    AppState, InMemoryRepository, MockIdentityProvider,
    auth::AuthUser,
    config::AppConfig,
    models::{Comment, CommentStatus, Post, PostStatus, User, UserRole, UserStatus},
};
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

pub const ALICE: Uuid = Uuid::from_u128(5);
pub const BOB: Uuid = Uuid::from_u128(9);
pub const ADMIN: Uuid = Uuid::from_u128(1);
pub const BANNED: Uuid = Uuid::from_u128(13);

pub fn at(offset_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + offset_secs, 0).unwrap()
}

pub fn user(id: Uuid, name: &str, role: UserRole, status: UserStatus) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@blog.test", name.to_lowercase()),
        role,
        status,
        phone: None,
        created_at: at(0),
        updated_at: at(0),
    }
}

pub fn actor(id: Uuid, role: UserRole) -> AuthUser {
    AuthUser { id, role }
}

pub fn alice() -> AuthUser {
    actor(ALICE, UserRole::User)
}

pub fn bob() -> AuthUser {
    actor(BOB, UserRole::User)
}

pub fn admin() -> AuthUser {
    actor(ADMIN, UserRole::Admin)
}

pub fn post(n: u128, author_id: Uuid, title: &str, tags: &[&str]) -> Post {
    Post {
        id: Uuid::from_u128(1000 + n),
        title: title.to_string(),
        content: format!("Body of {title}"),
        thumbnail: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        is_featured: false,
        status: PostStatus::Published,
        views: 0,
        author_id,
        created_at: at(n as i64 * 60),
        updated_at: at(n as i64 * 60),
    }
}

pub fn comment(n: u128, post_id: Uuid, author_id: Uuid, content: &str) -> Comment {
    Comment {
        id: Uuid::from_u128(5000 + n),
        content: content.to_string(),
        author_id,
        post_id,
        status: CommentStatus::Visible,
        created_at: at(n as i64 * 30),
        updated_at: at(n as i64 * 30),
    }
}

/// Three users plus a banned one, four posts and two comments.
///
/// | post | author | tags           | featured | status    |
/// |------|--------|----------------|----------|-----------|
/// | 1    | alice  | rust, web      | yes      | PUBLISHED |
/// | 2    | alice  | rust           | no       | DRAFT     |
/// | 3    | bob    | web, css       | no       | PUBLISHED |
/// | 4    | bob    | Cooking        | yes      | ARCHIVED  |
pub async fn seeded_repo() -> Arc<InMemoryRepository> {
    let repo = Arc::new(InMemoryRepository::new());
    repo.insert_user(user(ALICE, "Alice", UserRole::User, UserStatus::Active)).await;
    repo.insert_user(user(BOB, "Bob", UserRole::User, UserStatus::Active)).await;
    repo.insert_user(user(ADMIN, "Admin", UserRole::Admin, UserStatus::Active)).await;
    repo.insert_user(user(BANNED, "Mallory", UserRole::User, UserStatus::Banned)).await;

    let mut p1 = post(1, ALICE, "Ownership in Rust", &["rust", "web"]);
    p1.is_featured = true;
    let mut p2 = post(2, ALICE, "Lifetimes draft", &["rust"]);
    p2.status = PostStatus::Draft;
    let p3 = post(3, BOB, "Styling with CSS grid", &["css", "web"]);
    let mut p4 = post(4, BOB, "Sourdough notes", &["Cooking"]);
    p4.is_featured = true;
    p4.status = PostStatus::Archived;
    p4.content = "Flour, water, salt and FOOD science".to_string();

    for p in [p1, p2, p3, p4] {
        repo.insert_post(p).await;
    }

    repo.insert_comment(comment(1, post_id(1), BOB, "Great read")).await;
    repo.insert_comment(comment(2, post_id(1), ALICE, "Thanks!")).await;
    repo
}

pub fn post_id(n: u128) -> Uuid {
    Uuid::from_u128(1000 + n)
}

pub fn comment_id(n: u128) -> Uuid {
    Uuid::from_u128(5000 + n)
}

pub fn test_state(repo: Arc<InMemoryRepository>) -> AppState {
    AppState::new(repo, Arc::new(MockIdentityProvider::new()), AppConfig::default())
}
