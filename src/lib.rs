use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod query;
pub mod repository;
pub mod services;

// Routing grouped by access level (public, authenticated, admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use identity::{HttpIdentityProvider, IdentityProviderState, MockIdentityProvider};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use services::{CommentService, PostService, UserService};

/// ApiDoc
///
/// OpenAPI description of every route, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_posts, handlers::get_post, handlers::create_post, handlers::get_my_posts,
        handlers::update_post, handlers::delete_post, handlers::get_stats,
        handlers::create_comment, handlers::get_comment, handlers::get_comments_by_author,
        handlers::update_comment, handlers::delete_comment, handlers::moderate_comment,
        handlers::register_user, handlers::get_me, handlers::update_me,
        handlers::get_users, handlers::update_user
    ),
    components(
        schemas(
            models::User, models::UserRole, models::UserStatus,
            models::Post, models::PostStatus, models::PostPage, models::PostDetail, models::PageMeta,
            models::CreatePostRequest, models::UpdatePostRequest,
            models::Comment, models::CommentStatus, models::CreateCommentRequest,
            models::UpdateCommentRequest, models::ModerateCommentRequest,
            models::RegisterUserRequest, models::UpdateProfileRequest, models::UpdateUserRequest,
            models::BlogStats, error::ErrorBody, error::ErrorKind,
        )
    ),
    tags(
        (name = "blog", description = "Blog posts, comments and moderation API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container of services and configuration, cloned into
/// every request.
#[derive(Clone)]
pub struct AppState {
    /// Data access, shared by the services and the `AuthUser` extractor.
    pub repo: RepositoryState,
    pub identity: IdentityProviderState,
    pub config: AppConfig,
    pub posts: PostService,
    pub comments: CommentService,
    pub users: UserService,
}

impl AppState {
    /// Wires the services on top of one repository and identity provider.
    pub fn new(repo: RepositoryState, identity: IdentityProviderState, config: AppConfig) -> Self {
        Self {
            posts: PostService::new(repo.clone()),
            comments: CommentService::new(repo.clone()),
            users: UserService::new(repo.clone(), identity.clone()),
            repo,
            identity,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects the request unless `AuthUser` resolves. The extractor's rejection
/// (401/403 JSON body) is returned as-is.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// admin_middleware
///
/// Authentication plus the ADMIN role.
async fn admin_middleware(
    auth_user: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    guard::require_admin(Some(&auth_user)).into_result()?;
    Ok(next.run(request).await)
}

/// create_router
///
/// Assembles the routing tree under `/api/v1`, applies the access layers per
/// route group, and adds the observability and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = match state.config.app_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let api = Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_middleware)),
        );

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", api)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span per request carrying method, URI and the `x-request-id`, so every log
/// line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
