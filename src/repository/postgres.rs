use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::Repository;
use crate::{
    error::AppResult,
    models::{
        BlogStats, Comment, CommentStatus, NewComment, NewPost, NewUser, Post, UpdatePostRequest,
        UpdateProfileRequest, UpdateUserRequest, User, UserStatus,
    },
    query::{Paging, PostClause, PostFilter, like_pattern},
};

const USER_COLUMNS: &str = "id, name, email, role, status, phone, created_at, updated_at";
const POST_COLUMNS: &str =
    "id, title, content, thumbnail, tags, is_featured, status, views, author_id, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, content, author_id, post_id, status, created_at, updated_at";

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations in `./migrations`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// push_filter
///
/// Renders a `PostFilter` as a WHERE clause. Every value is bound; only fixed
/// SQL fragments are pushed as text.
fn push_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &PostFilter) {
    builder.push(" WHERE TRUE");

    for clause in &filter.clauses {
        match clause {
            PostClause::Search(term) => {
                let pattern = like_pattern(term);
                builder.push(" AND (title ILIKE ");
                builder.push_bind(pattern.clone());
                builder.push(" OR content ILIKE ");
                builder.push_bind(pattern);
                builder.push(" OR EXISTS (SELECT 1 FROM unnest(tags) AS t(tag) WHERE lower(t.tag) = lower(");
                builder.push_bind(term.clone());
                builder.push(")))");
            }
            PostClause::HasAllTags(tags) => {
                builder.push(" AND tags @> ");
                builder.push_bind(tags.iter().cloned().collect::<Vec<String>>());
                builder.push("::text[]");
            }
            PostClause::Featured(flag) => {
                builder.push(" AND is_featured = ");
                builder.push_bind(*flag);
            }
            PostClause::Status(status) => {
                builder.push(" AND status = ");
                builder.push_bind(*status);
            }
            PostClause::Author(author_id) => {
                builder.push(" AND author_id = ");
                builder.push_bind(*author_id);
            }
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// create_user
    ///
    /// Mirrors the identity-provider account into `users`. New accounts are ACTIVE.
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO users (id, name, email, role, status, phone, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(user.id)
        .bind(user.name)
        .bind(user.email)
        .bind(user.role)
        .bind(UserStatus::Active)
        .bind(user.phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"UPDATE users
               SET name = COALESCE($2, name),
                   phone = COALESCE($3, phone),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(id)
        .bind(req.name)
        .bind(req.phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, req: UpdateUserRequest) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"UPDATE users
               SET role = COALESCE($2, role),
                   status = COALESCE($3, status),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(id)
        .bind(req.role)
        .bind(req.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    // --- POSTS ---

    async fn create_post(&self, post: NewPost) -> AppResult<Post> {
        let created = sqlx::query_as::<_, Post>(&format!(
            r#"INSERT INTO posts (id, title, content, thumbnail, tags, is_featured, status, views, author_id, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, NOW(), NOW())
               RETURNING {POST_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(post.title)
        .bind(post.content)
        .bind(post.thumbnail)
        .bind(post.tags)
        .bind(post.is_featured)
        .bind(post.status)
        .bind(post.author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// list_posts
    ///
    /// Two queries built from the same predicate: the page itself and the total
    /// match count for pagination metadata. The sort column comes from a closed
    /// enum, so pushing it as text is safe.
    async fn list_posts(&self, filter: &PostFilter, paging: &Paging) -> AppResult<(Vec<Post>, i64)> {
        let mut count: QueryBuilder<'static, Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM posts");
        push_filter(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut page: QueryBuilder<'static, Postgres> =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts"));
        push_filter(&mut page, filter);
        page.push(format!(
            " ORDER BY {} {}, id {}",
            paging.sort_by.column(),
            paging.sort_order.keyword(),
            paging.sort_order.keyword()
        ));
        page.push(" LIMIT ");
        page.push_bind(paging.limit);
        page.push(" OFFSET ");
        page.push_bind(paging.skip);

        let posts = page.build_query_as::<Post>().fetch_all(&self.pool).await?;
        Ok((posts, total))
    }

    async fn get_post(&self, id: Uuid) -> AppResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn record_post_view(&self, id: Uuid) -> AppResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts SET views = views + 1 WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn get_posts_by_author(&self, author_id: Uuid) -> AppResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = $1 ORDER BY created_at DESC"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    /// update_post
    ///
    /// Uses `COALESCE` so that only fields present in `req` are written.
    /// `author_id` is not part of the statement.
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> AppResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"UPDATE posts
               SET title = COALESCE($2, title),
                   content = COALESCE($3, content),
                   thumbnail = COALESCE($4, thumbnail),
                   tags = COALESCE($5, tags),
                   is_featured = COALESCE($6, is_featured),
                   status = COALESCE($7, status),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {POST_COLUMNS}"#
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.content)
        .bind(req.thumbnail)
        .bind(req.tags)
        .bind(req.is_featured)
        .bind(req.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn delete_post(&self, id: Uuid) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// get_stats
    ///
    /// Compiles every dashboard counter in a single round trip.
    async fn get_stats(&self) -> AppResult<BlogStats> {
        let stats = sqlx::query_as::<_, BlogStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM posts) AS total_posts,
                (SELECT COUNT(*) FROM posts WHERE status = 'PUBLISHED') AS published_posts,
                (SELECT COUNT(*) FROM posts WHERE status = 'DRAFT') AS draft_posts,
                (SELECT COUNT(*) FROM posts WHERE status = 'ARCHIVED') AS archived_posts,
                (SELECT COUNT(*) FROM posts WHERE is_featured) AS featured_posts,
                (SELECT COALESCE(SUM(views), 0)::BIGINT FROM posts) AS total_views,
                (SELECT COUNT(*) FROM comments) AS total_comments,
                (SELECT COUNT(*) FROM comments WHERE status = 'VISIBLE') AS visible_comments,
                (SELECT COUNT(*) FROM comments WHERE status = 'HIDDEN') AS hidden_comments,
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM users WHERE role = 'ADMIN') AS admin_count
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    // --- COMMENTS ---

    async fn create_comment(&self, comment: NewComment) -> AppResult<Comment> {
        let created = sqlx::query_as::<_, Comment>(&format!(
            r#"INSERT INTO comments (id, content, author_id, post_id, status, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
               RETURNING {COMMENT_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(comment.content)
        .bind(comment.author_id)
        .bind(comment.post_id)
        .bind(CommentStatus::Visible)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn get_comment(&self, id: Uuid) -> AppResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn get_comments_by_author(&self, author_id: Uuid) -> AppResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE author_id = $1 ORDER BY created_at DESC"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn get_visible_comments(&self, post_id: Uuid) -> AppResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            r#"SELECT {COMMENT_COLUMNS} FROM comments
               WHERE post_id = $1 AND status = $2
               ORDER BY created_at ASC"#
        ))
        .bind(post_id)
        .bind(CommentStatus::Visible)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn update_comment(&self, id: Uuid, content: String) -> AppResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"UPDATE comments SET content = $2, updated_at = NOW()
               WHERE id = $1
               RETURNING {COMMENT_COLUMNS}"#
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn set_comment_status(&self, id: Uuid, status: CommentStatus) -> AppResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"UPDATE comments SET status = $2, updated_at = NOW()
               WHERE id = $1
               RETURNING {COMMENT_COLUMNS}"#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
