use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, ErrorBody},
    models::{
        BlogStats, Comment, CreateCommentRequest, CreatePostRequest, ModerateCommentRequest, Post,
        PostDetail, PostPage, RegisterUserRequest, UpdateCommentRequest, UpdatePostRequest,
        UpdateProfileRequest, UpdateUserRequest, User,
    },
    query::{ListPostsQuery, PostFilterParams, resolve_paging},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

// --- Posts ---

/// get_posts
///
/// [Public Route] Lists posts with search, tag, featured, status and author
/// filters, sorted and paginated.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Paginated posts", body = PostPage),
        (status = 400, description = "Invalid status or authorId", body = ErrorBody)
    )
)]
pub async fn get_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostPage>, AppError> {
    let params = PostFilterParams::from_query(&query)?;
    let paging = resolve_paging(&query.paging());
    Ok(Json(state.posts.get_all_posts(&params, &paging).await?))
}

/// get_post
///
/// [Public Route] A single post with its visible comments. Counts as a view.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = PostDetail),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostDetail>, AppError> {
    Ok(Json(state.posts.get_post_by_id(id).await?))
}

/// create_post
///
/// [Authenticated Route] The author is taken from the session, never the body.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let post = state.posts.create_post(Some(&user), payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// get_my_posts
///
/// [Authenticated Route] Every post owned by the caller, drafts included.
#[utoipa::path(
    get,
    path = "/api/v1/posts/my-posts",
    responses((status = 200, description = "My posts", body = [Post]))
)]
pub async fn get_my_posts(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(state.posts.get_my_posts(Some(&user)).await?))
}

/// update_post
///
/// [Authenticated Route] Owner or admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 403, description = "Not owner or admin", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, AppError> {
    Ok(Json(state.posts.update_post(Some(&user), id, payload).await?))
}

/// delete_post
///
/// [Authenticated Route] Owner or admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not owner or admin", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.posts.delete_post(Some(&user), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// get_stats
///
/// [Admin Route] Dashboard counters.
#[utoipa::path(
    get,
    path = "/api/v1/posts/stats",
    responses(
        (status = 200, description = "Stats", body = BlogStats),
        (status = 403, description = "Not admin", body = ErrorBody)
    )
)]
pub async fn get_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<BlogStats>, AppError> {
    Ok(Json(state.posts.get_stats(Some(&user)).await?))
}

// --- Comments ---

#[utoipa::path(
    post,
    path = "/api/v1/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Created", body = Comment),
        (status = 404, description = "Post not found", body = ErrorBody)
    )
)]
pub async fn create_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = state.comments.create_comment(Some(&user), payload).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Found", body = Comment),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
/// [Public Route] Hidden comments read as 404.
pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Comment>, AppError> {
    Ok(Json(state.comments.get_comment_by_id(None, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/author/{author_id}",
    params(("author_id" = Uuid, Path, description = "Author ID")),
    responses((status = 200, description = "Comments by author", body = [Comment]))
)]
/// [Public Route] Visible comments only.
pub async fn get_comments_by_author(
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(state.comments.get_comments_by_author(None, author_id).await?))
}

/// update_comment
///
/// [Authenticated Route] Owner or admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Updated", body = Comment),
        (status = 403, description = "Not owner or admin", body = ErrorBody)
    )
)]
pub async fn update_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, AppError> {
    Ok(Json(
        state.comments.update_comment(Some(&user), id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not owner or admin", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.comments.delete_comment(Some(&user), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// moderate_comment
///
/// [Admin Route] Hides a comment. One-way.
#[utoipa::path(
    patch,
    path = "/api/v1/comments/{id}/moderate",
    params(("id" = Uuid, Path, description = "Comment ID")),
    request_body = ModerateCommentRequest,
    responses(
        (status = 200, description = "Moderated", body = Comment),
        (status = 403, description = "Not admin", body = ErrorBody),
        (status = 409, description = "Transition not allowed", body = ErrorBody)
    )
)]
pub async fn moderate_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModerateCommentRequest>,
) -> Result<Json<Comment>, AppError> {
    Ok(Json(
        state.comments.moderate_comment(Some(&user), id, payload).await?,
    ))
}

// --- Users ---

/// register_user
///
/// [Public Route] Creates the account at the identity provider, then mirrors
/// the profile locally under the provider's id.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = User),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.users.register_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses((status = 200, description = "Profile", body = User))
)]
pub async fn get_me(user: AuthUser, State(state): State<AppState>) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get_me(Some(&user)).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/me",
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Profile updated", body = User))
)]
pub async fn update_me(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.update_me(Some(&user), payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 403, description = "Not admin", body = ErrorBody)
    )
)]
pub async fn get_users(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.list_users(Some(&user)).await?))
}

/// update_user
///
/// [Admin Route] Changes another account's role or status.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 403, description = "Not admin", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.update_user(Some(&user), id, payload).await?))
}
