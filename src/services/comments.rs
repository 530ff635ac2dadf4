use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    guard::{authorize, require_admin, require_identity},
    models::{
        Comment, CommentStatus, CreateCommentRequest, ModerateCommentRequest, NewComment,
        UpdateCommentRequest,
    },
    repository::RepositoryState,
};

fn require_content(content: &str) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }
    Ok(())
}

/// CommentService
///
/// Same owner-or-admin discipline as posts, plus the admin-only moderation
/// transition.
#[derive(Clone)]
pub struct CommentService {
    repo: RepositoryState,
}

impl CommentService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn create_comment(
        &self,
        actor: Option<&AuthUser>,
        req: CreateCommentRequest,
    ) -> AppResult<Comment> {
        let actor = require_identity(actor)?;
        require_content(&req.content)?;

        if self.repo.get_post(req.post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {}", req.post_id)));
        }

        let comment = self
            .repo
            .create_comment(NewComment {
                content: req.content,
                post_id: req.post_id,
                author_id: actor.id,
            })
            .await?;
        tracing::info!(comment_id = %comment.id, post_id = %comment.post_id, "comment created");
        Ok(comment)
    }

    async fn load(&self, id: Uuid) -> AppResult<Comment> {
        self.repo
            .get_comment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {id}")))
    }

    /// get_comment_by_id
    ///
    /// A hidden comment reads as not found unless the actor wrote it or is
    /// an admin.
    pub async fn get_comment_by_id(
        &self,
        actor: Option<&AuthUser>,
        id: Uuid,
    ) -> AppResult<Comment> {
        let comment = self.load(id).await?;
        if comment.status == CommentStatus::Hidden
            && !authorize(actor, comment.author_id).is_allowed()
        {
            return Err(AppError::NotFound(format!("comment {id}")));
        }
        Ok(comment)
    }

    /// Hidden comments are only listed for their author or an admin.
    pub async fn get_comments_by_author(
        &self,
        actor: Option<&AuthUser>,
        author_id: Uuid,
    ) -> AppResult<Vec<Comment>> {
        let mut comments = self.repo.get_comments_by_author(author_id).await?;
        if !authorize(actor, author_id).is_allowed() {
            comments.retain(|c| c.status == CommentStatus::Visible);
        }
        Ok(comments)
    }

    async fn load_owned(&self, actor: Option<&AuthUser>, id: Uuid) -> AppResult<Comment> {
        let actor = require_identity(actor)?;
        let comment = self.load(id).await?;
        authorize(Some(actor), comment.author_id)
            .into_result()
            .inspect_err(|_| {
                tracing::warn!(comment_id = %id, actor_id = %actor.id, "comment mutation denied");
            })?;
        Ok(comment)
    }

    pub async fn update_comment(
        &self,
        actor: Option<&AuthUser>,
        id: Uuid,
        patch: UpdateCommentRequest,
    ) -> AppResult<Comment> {
        self.load_owned(actor, id).await?;
        require_content(&patch.content)?;
        self.repo
            .update_comment(id, patch.content)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {id}")))
    }

    pub async fn delete_comment(&self, actor: Option<&AuthUser>, id: Uuid) -> AppResult<()> {
        self.load_owned(actor, id).await?;
        if !self.repo.delete_comment(id).await? {
            return Err(AppError::NotFound(format!("comment {id}")));
        }
        Ok(())
    }

    /// moderate_comment
    ///
    /// Admin-only, re-checked here even though the route is admin-gated.
    /// Moderation is one-way: `VISIBLE -> HIDDEN`. Asking for the current
    /// status, or for `HIDDEN -> VISIBLE`, is a conflict.
    pub async fn moderate_comment(
        &self,
        actor: Option<&AuthUser>,
        id: Uuid,
        decision: ModerateCommentRequest,
    ) -> AppResult<Comment> {
        require_admin(actor).into_result()?;
        let comment = self.load(id).await?;

        match (comment.status, decision.status) {
            (CommentStatus::Visible, CommentStatus::Hidden) => {}
            (current, requested) if current == requested => {
                return Err(AppError::Conflict(format!(
                    "comment is already {requested:?}"
                )));
            }
            _ => {
                return Err(AppError::Conflict(
                    "hidden comments cannot be restored".to_string(),
                ));
            }
        }

        let moderated = self
            .repo
            .set_comment_status(id, decision.status)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {id}")))?;
        tracing::info!(comment_id = %id, "comment hidden by moderator");
        Ok(moderated)
    }
}
