use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
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

// Core application services and components.
pub mod auth;
pub mod codes;
pub mod config;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod password;
pub mod policy;
pub mod repository;
pub mod services;
pub mod slug;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use policy::AdminCaller;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use memory::MemoryRepository;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the
/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::register, handlers::auth::login, handlers::auth::refresh_token,
        handlers::auth::get_me,
        handlers::roles::list_roles, handlers::roles::get_role, handlers::roles::create_role,
        handlers::roles::update_role, handlers::roles::delete_role,
        handlers::users::list_users, handlers::users::get_user, handlers::users::create_user,
        handlers::users::update_user, handlers::users::delete_user,
        handlers::blog::list_categories, handlers::blog::get_category,
        handlers::blog::create_category, handlers::blog::update_category,
        handlers::blog::delete_category,
        handlers::blog::list_blogs, handlers::blog::get_blog, handlers::blog::create_blog,
        handlers::blog::update_blog, handlers::blog::delete_blog,
    ),
    components(
        schemas(
            models::Role, models::UserProfile, models::AdminUser, models::TokenPair,
            models::AuthResponse, models::RegisterRequest, models::LoginRequest,
            models::RefreshRequest, models::RefreshResponse, models::AdminCreateUserRequest,
            models::AdminUpdateUserRequest, models::RoleRequest, models::RoleUpdate,
            models::BlogCategory, models::CategoryRequest, models::CategoryUpdate,
            models::BlogStatus, models::BlogFields, models::Blog, models::CreateBlogRequest,
            models::UpdateBlogRequest,
        )
    ),
    tags(
        (name = "rolepress", description = "Roles, accounts and blog API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared state handed to every handler: persistence behind a
/// trait object, plus the immutable configuration.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Postgres in production, in-memory in tests.
    pub repo: RepositoryState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Handlers and extractors pull only the pieces of AppState they need.

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
/// Guards `authenticated_routes`. Extracting `AuthUser` verifies the bearer
/// token and loads the user; any failure rejects with 401 before the handler
/// runs. The resolved identity is stored in the request extensions so the
/// handler's own `AuthUser` extraction does not hit the database again.
async fn auth_middleware(caller: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(caller);
    next.run(request).await
}

/// admin_middleware
///
/// Guards `admin_routes`: authentication as above, then the admin policy
/// (403 for everyone else).
async fn admin_middleware(
    AdminCaller(caller): AdminCaller,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(caller);
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree, applies scoped and global middleware, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: No middleware applied.
        .merge(public::public_routes())
        // Authenticated Routes: token required; mutating handlers take an
        // AdminCaller.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Admin Routes: token and admin policy required for every method.
        .merge(
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                admin_middleware,
            )),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with its id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request tracing span from the method, URI and the
/// `x-request-id` header, so every log line of a request can be correlated.
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
