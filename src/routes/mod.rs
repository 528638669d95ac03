//! Router Module Index
//!
//! One router per resource. `create_router` nests each of them under `/api/v1`.

/// `/api/v1/emitters`
pub mod emitters;

/// `/api/v1/owners`
pub mod emitter_owners;

/// `/api/v1/types`
pub mod emitter_types;
