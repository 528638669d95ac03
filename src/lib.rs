use axum::{
    Router,
    extract::FromRef,
    http::{HeaderName, HeaderValue},
    routing::get,
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

// Configuration, errors and request plumbing.
pub mod config;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod validation;

// Domain, persistence and business rules.
pub mod dto;
pub mod models;
pub mod repository;
pub mod services;

// HTTP surface.
pub mod handlers;
pub mod routes;

use routes::{emitter_owners, emitter_types, emitters};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use pagination::PageResolver;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use services::{EmitterOwnerService, EmitterService, EmitterTypeService};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the OpenAPI document
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::emitters::get_emitters_page, handlers::emitters::get_all_emitters,
        handlers::emitters::get_emitter, handlers::emitters::create_emitter,
        handlers::emitters::update_emitter, handlers::emitters::delete_emitter,
        handlers::emitter_owners::get_owners_page, handlers::emitter_owners::get_all_owners,
        handlers::emitter_owners::get_owner, handlers::emitter_owners::create_owner,
        handlers::emitter_owners::update_owner, handlers::emitter_owners::delete_owner,
        handlers::emitter_types::get_types_page, handlers::emitter_types::get_all_types,
        handlers::emitter_types::get_type, handlers::emitter_types::create_type,
        handlers::emitter_types::update_type, handlers::emitter_types::delete_type,
    ),
    components(
        schemas(
            dto::EmitterRequest, dto::EmitterResponse, dto::EmitterOwnerRequest,
            dto::EmitterOwnerResponse, dto::EmitterTypeRequest, dto::EmitterTypeResponse,
            models::EmitterSpec, error::ApiErrorResponse, error::FormValidationErrorResponse,
        )
    ),
    tags(
        (name = "emitters", description = "Emitters under verification tracking"),
        (name = "emitter-owners", description = "Organisations owning emitters"),
        (name = "emitter-types", description = "Emitter categories")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container shared by every request: the repository, the loaded
/// configuration, the page resolver built from it, and one service per resource. All of
/// it is cheap to clone (`Arc`s and small values).
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
    pub pages: PageResolver,
    pub types: EmitterTypeService,
    pub owners: EmitterOwnerService,
    pub emitters: EmitterService,
}

impl AppState {
    /// Wires the services and page resolver around `repo` and `config`.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self {
            pages: PageResolver::new(config.page.clone()),
            types: EmitterTypeService::new(repo.clone()),
            owners: EmitterOwnerService::new(repo.clone()),
            emitters: EmitterService::new(repo.clone()),
            repo,
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

impl FromRef<AppState> for PageResolver {
    fn from_ref(app_state: &AppState) -> PageResolver {
        app_state.pages.clone()
    }
}

/// create_router
///
/// Assembles the API routes, Swagger UI and health probe, registers the state, and wraps
/// everything in the request-id, tracing and CORS layers.
///
/// # Panics
/// Panics if `CORS_ORIGIN` is set to something that is not a valid header value. This runs
/// once at startup.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = match state.config.cors_origin.as_deref() {
        Some(origin) => CorsLayer::new().allow_origin(
            origin
                .parse::<HeaderValue>()
                .expect("FATAL: CORS_ORIGIN is not a valid origin"),
        ),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods(Any)
    .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let api = Router::new()
        .nest("/emitters", emitters::emitter_routes())
        .nest("/owners", emitter_owners::emitter_owner_routes())
        .nest("/types", emitter_types::emitter_type_routes());

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .with_state(state);

    // 3. Observability and Correlation Layers
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
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the `http_request` span for `TraceLayer`, tagging it with the method, URI and the
/// `x-request-id` set by `SetRequestIdLayer`, so every log line of a request correlates.
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
