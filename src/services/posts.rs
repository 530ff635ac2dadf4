use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    guard::{authorize, require_admin, require_identity},
    models::{
        BlogStats, CreatePostRequest, NewPost, PageMeta, Post, PostDetail, PostPage,
        UpdatePostRequest, normalize_tags,
    },
    query::{Paging, PostFilterParams, build_post_filter},
    repository::RepositoryState,
};

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// PostService
///
/// Orchestrates post reads and writes. Reads go through the query builder;
/// every write on an existing post loads its owner and runs the guard first.
#[derive(Clone)]
pub struct PostService {
    repo: RepositoryState,
}

impl PostService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// create_post
    ///
    /// The author is always the acting identity; the request type has no
    /// author field to spoof.
    pub async fn create_post(
        &self,
        actor: Option<&AuthUser>,
        req: CreatePostRequest,
    ) -> AppResult<Post> {
        let actor = require_identity(actor)?;
        require_text("title", &req.title)?;
        require_text("content", &req.content)?;

        let post = self
            .repo
            .create_post(NewPost {
                title: req.title,
                content: req.content,
                thumbnail: req.thumbnail,
                tags: normalize_tags(&req.tags),
                is_featured: req.is_featured,
                status: req.status,
                author_id: actor.id,
            })
            .await?;

        tracing::info!(post_id = %post.id, author_id = %actor.id, "post created");
        Ok(post)
    }

    /// get_all_posts
    ///
    /// Filtered, sorted and paginated listing with total-count metadata.
    pub async fn get_all_posts(
        &self,
        params: &PostFilterParams,
        paging: &Paging,
    ) -> AppResult<PostPage> {
        let filter = build_post_filter(params);
        let (data, total) = self.repo.list_posts(&filter, paging).await?;
        Ok(PostPage {
            data,
            pagination: PageMeta::new(total, paging.page, paging.limit),
        })
    }

    /// get_post_by_id
    ///
    /// Counts a view, then attaches the post's visible comments.
    pub async fn get_post_by_id(&self, id: Uuid) -> AppResult<PostDetail> {
        let post = self
            .repo
            .record_post_view(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {id}")))?;
        let comments = self.repo.get_visible_comments(id).await?;
        Ok(PostDetail {
            comment_count: comments.len() as i64,
            post,
            comments,
        })
    }

    pub async fn get_my_posts(&self, actor: Option<&AuthUser>) -> AppResult<Vec<Post>> {
        let actor = require_identity(actor)?;
        self.repo.get_posts_by_author(actor.id).await
    }

    async fn load_owned(&self, actor: Option<&AuthUser>, id: Uuid) -> AppResult<Post> {
        let actor = require_identity(actor)?;
        let post = self
            .repo
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {id}")))?;
        authorize(Some(actor), post.author_id)
            .into_result()
            .inspect_err(|_| {
                tracing::warn!(post_id = %id, actor_id = %actor.id, "post mutation denied");
            })?;
        Ok(post)
    }

    /// update_post
    ///
    /// Owner-or-admin. On denial nothing is written.
    pub async fn update_post(
        &self,
        actor: Option<&AuthUser>,
        id: Uuid,
        mut patch: UpdatePostRequest,
    ) -> AppResult<Post> {
        self.load_owned(actor, id).await?;

        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        if let Some(content) = &patch.content {
            require_text("content", content)?;
        }
        patch.tags = patch.tags.map(normalize_tags);

        self.repo
            .update_post(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {id}")))
    }

    /// delete_post
    ///
    /// Owner-or-admin. Comments on the post go with it.
    pub async fn delete_post(&self, actor: Option<&AuthUser>, id: Uuid) -> AppResult<()> {
        self.load_owned(actor, id).await?;
        if !self.repo.delete_post(id).await? {
            return Err(AppError::NotFound(format!("post {id}")));
        }
        tracing::info!(post_id = %id, "post deleted");
        Ok(())
    }

    pub async fn get_stats(&self, actor: Option<&AuthUser>) -> AppResult<BlogStats> {
        require_admin(actor).into_result()?;
        self.repo.get_stats().await
    }
}
