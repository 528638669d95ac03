use crate::{AppState, handlers::emitters};
use axum::{Router, routing::get};

/// Emitter Routes
///
/// Mounted under `/api/v1/emitters`. Writes resolve `emitterTypeId`/`emitterOwnerId`
/// against the other two resources.
pub fn emitter_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(emitters::get_emitters_page).post(emitters::create_emitter),
        )
        .route("/all", get(emitters::get_all_emitters))
        .route(
            "/{id}",
            get(emitters::get_emitter)
                .put(emitters::update_emitter)
                .delete(emitters::delete_emitter),
        )
}
