use crate::{AppState, handlers::emitter_types};
use axum::{Router, routing::get};

/// Emitter Type Routes
///
/// Mounted under `/api/v1/types`.
pub fn emitter_type_routes() -> Router<AppState> {
    Router::new()
        // GET /?page=&size=&field=&direction=   POST /
        .route(
            "/",
            get(emitter_types::get_types_page).post(emitter_types::create_type),
        )
        // GET /all
        // Registered before `/{id}` so that "all" is never parsed as an id.
        .route("/all", get(emitter_types::get_all_types))
        .route(
            "/{id}",
            get(emitter_types::get_type)
                .put(emitter_types::update_type)
                .delete(emitter_types::delete_type),
        )
}
