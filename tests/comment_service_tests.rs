mod common;

use blog_backend::{
    AppError, CommentService,
    models::{CommentStatus, CreateCommentRequest, ModerateCommentRequest, UpdateCommentRequest},
    repository::Repository,
};
use common::{ALICE, BOB, admin, alice, bob, comment_id, post_id, seeded_repo};
use tokio::test;
use uuid::Uuid;

fn hide() -> ModerateCommentRequest {
    ModerateCommentRequest {
        status: CommentStatus::Hidden,
    }
}

#[test]
async fn create_comment_forces_actor_as_author() {
    let repo = seeded_repo().await;
    let service = CommentService::new(repo.clone());

    let req: CreateCommentRequest = serde_json::from_value(serde_json::json!({
        "postId": post_id(3),
        "content": "Nice grid tricks",
        "authorId": BOB,
    }))
    .unwrap();
    let comment = service.create_comment(Some(&alice()), req).await.unwrap();

    assert_eq!(comment.author_id, ALICE);
    assert_eq!(comment.post_id, post_id(3));
    assert_eq!(comment.status, CommentStatus::Visible);
}

#[test]
async fn create_comment_on_missing_post_is_not_found() {
    let repo = seeded_repo().await;
    let service = CommentService::new(repo.clone());

    let err = service
        .create_comment(
            Some(&alice()),
            CreateCommentRequest {
                post_id: Uuid::new_v4(),
                content: "Hello?".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(repo.write_count().await, 0);
}

#[test]
async fn create_comment_requires_identity_and_content() {
    let service = CommentService::new(seeded_repo().await);
    let req = CreateCommentRequest {
        post_id: post_id(1),
        content: "  ".into(),
    };

    assert_eq!(
        service.create_comment(None, req.clone()).await.unwrap_err(),
        AppError::Unauthorized
    );
    assert!(matches!(
        service.create_comment(Some(&bob()), req).await,
        Err(AppError::Validation(_))
    ));
}

#[test]
async fn only_owner_or_admin_may_edit_or_delete() {
    let repo = seeded_repo().await;
    let service = CommentService::new(repo.clone());
    let bobs_comment = comment_id(1);

    let err = service
        .update_comment(
            Some(&alice()),
            bobs_comment,
            UpdateCommentRequest {
                content: "edited by alice".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = service
        .delete_comment(Some(&alice()), bobs_comment)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(repo.write_count().await, 0);

    let edited = service
        .update_comment(
            Some(&bob()),
            bobs_comment,
            UpdateCommentRequest {
                content: "Great read, bookmarked".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.content, "Great read, bookmarked");
    assert_eq!(edited.author_id, BOB);

    service
        .delete_comment(Some(&admin()), bobs_comment)
        .await
        .unwrap();
    assert!(repo.get_comment(bobs_comment).await.unwrap().is_none());
}

#[test]
async fn unknown_comment_is_not_found() {
    let service = CommentService::new(seeded_repo().await);
    let ghost = Uuid::new_v4();

    assert!(matches!(
        service.get_comment_by_id(Some(&admin()), ghost).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_comment(Some(&admin()), ghost).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.moderate_comment(Some(&admin()), ghost, hide()).await,
        Err(AppError::NotFound(_))
    ));
}

#[test]
async fn comments_by_author() {
    let service = CommentService::new(seeded_repo().await);
    let bobs = service.get_comments_by_author(None, BOB).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].id, comment_id(1));

    assert!(
        service
            .get_comments_by_author(None, Uuid::new_v4())
            .await
            .unwrap()
            .is_empty()
    );
}

#[test]
async fn moderation_is_admin_only() {
    let repo = seeded_repo().await;
    let service = CommentService::new(repo.clone());

    assert!(matches!(
        service
            .moderate_comment(Some(&alice()), comment_id(1), hide())
            .await,
        Err(AppError::Forbidden(_))
    ));
    assert_eq!(
        service
            .moderate_comment(None, comment_id(1), hide())
            .await
            .unwrap_err(),
        AppError::Unauthorized
    );
    assert_eq!(repo.write_count().await, 0);
}

#[test]
async fn moderation_hides_once_and_never_restores() {
    let repo = seeded_repo().await;
    let service = CommentService::new(repo.clone());

    let hidden = service
        .moderate_comment(Some(&admin()), comment_id(1), hide())
        .await
        .unwrap();
    assert_eq!(hidden.status, CommentStatus::Hidden);

    let again = service
        .moderate_comment(Some(&admin()), comment_id(1), hide())
        .await
        .unwrap_err();
    assert!(matches!(again, AppError::Conflict(_)));

    let restore = service
        .moderate_comment(
            Some(&admin()),
            comment_id(1),
            ModerateCommentRequest {
                status: CommentStatus::Visible,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(restore, AppError::Conflict(_)));

    // Hidden comments drop out of the post's public thread.
    let visible = repo.get_visible_comments(post_id(1)).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, comment_id(2));
}

#[test]
async fn hidden_comment_is_withheld_from_public_reads() {
    let service = CommentService::new(seeded_repo().await);
    service
        .moderate_comment(Some(&admin()), comment_id(1), hide())
        .await
        .unwrap();

    assert!(matches!(
        service.get_comment_by_id(None, comment_id(1)).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.get_comment_by_id(Some(&alice()), comment_id(1)).await,
        Err(AppError::NotFound(_))
    ));
    assert!(
        service
            .get_comments_by_author(None, BOB)
            .await
            .unwrap()
            .is_empty()
    );

    // The author and admins still see it.
    let own = service
        .get_comment_by_id(Some(&bob()), comment_id(1))
        .await
        .unwrap();
    assert_eq!(own.status, CommentStatus::Hidden);
    assert!(
        service
            .get_comment_by_id(Some(&admin()), comment_id(1))
            .await
            .is_ok()
    );
    assert_eq!(
        service
            .get_comments_by_author(Some(&bob()), BOB)
            .await
            .unwrap()
            .len(),
        1
    );

    // Other authors' listings are unaffected.
    assert_eq!(
        service
            .get_comments_by_author(None, ALICE)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[test]
async fn moderating_visible_to_visible_is_conflict() {
    let service = CommentService::new(seeded_repo().await);
    let err = service
        .moderate_comment(
            Some(&admin()),
            comment_id(2),
            ModerateCommentRequest {
                status: CommentStatus::Visible,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}
