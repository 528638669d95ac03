//! HTTP handlers, one module per resource.
//!
//! Handlers stay thin: extract, resolve pagination, call the service, convert records into
//! response DTOs. Every failure is an `AppError`, rendered by its `IntoResponse` impl.

pub mod emitter_owners;
pub mod emitter_types;
pub mod emitters;

/// health
///
/// Liveness probe for monitoring and load balancer checks.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}
