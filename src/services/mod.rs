//! Business rules for the three registry resources.
//!
//! Services sit between the HTTP handlers and the `Repository`: they turn missing rows into
//! `NotFound`, constraint violations into `Conflict`, and run the emitter frequency-band
//! check before every write.

use crate::error::AppError;
use crate::repository::StoreError;

mod emitter_owners;
mod emitter_types;
mod emitters;

pub use emitter_owners::EmitterOwnerService;
pub use emitter_types::EmitterTypeService;
pub use emitters::EmitterService;

/// Maps a store failure on a write. Unique violations become a `Conflict` carrying
/// `duplicate`, which names the value the client tried to store.
fn write_error(err: StoreError, duplicate: impl FnOnce() -> String) -> AppError {
    match err {
        StoreError::UniqueViolation(constraint) => {
            tracing::debug!(%constraint, "Unique constraint rejected write");
            AppError::Conflict(duplicate())
        }
        StoreError::ForeignKeyViolation(constraint) => {
            tracing::debug!(%constraint, "Foreign key rejected write");
            AppError::Conflict(format!(
                "The operation conflicts with records that reference it ({constraint})"
            ))
        }
        other => AppError::Store(other),
    }
}
