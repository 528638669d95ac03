use crate::{AppState, handlers::emitter_owners};
use axum::{Router, routing::get};

/// Emitter Owner Routes
///
/// Mounted under `/api/v1/owners`.
pub fn emitter_owner_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(emitter_owners::get_owners_page).post(emitter_owners::create_owner),
        )
        .route("/all", get(emitter_owners::get_all_owners))
        .route(
            "/{id}",
            get(emitter_owners::get_owner)
                .put(emitter_owners::update_owner)
                .delete(emitter_owners::delete_owner),
        )
}
