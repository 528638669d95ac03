use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{
    Emitter, EmitterData, EmitterOwner, EmitterOwnerData, EmitterType, EmitterTypeData,
};
use crate::pagination::{Page, PageQuery};

mod in_memory;
mod postgres;

pub use in_memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// StoreError
///
/// Persistence failures, classified so that services can turn constraint violations into
/// client errors. Anything else stays an opaque `Database` error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Carries the violated constraint name, when the backend reports one.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or_default().to_string();
            if db.is_unique_violation() {
                return StoreError::UniqueViolation(constraint);
            }
            if db.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(constraint);
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository Trait
///
/// The persistence contract for the three emitter tables. Services talk to this trait only,
/// so the same business rules run against Postgres in production and the in-memory store
/// in tests.
///
/// Lookups return `Ok(None)` (and deletes `Ok(false)`) when the row does not exist; turning
/// that into a 404 is the caller's job.
///
/// **Send + Sync + async_trait** are required to share the trait object (`Arc<dyn Repository>`)
/// across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Emitter Types ---
    async fn list_types(&self) -> StoreResult<Vec<EmitterType>>;
    async fn find_type(&self, id: i64) -> StoreResult<Option<EmitterType>>;
    async fn page_types(&self, query: &PageQuery) -> StoreResult<Page<EmitterType>>;
    async fn insert_type(&self, data: &EmitterTypeData) -> StoreResult<EmitterType>;
    async fn update_type(&self, id: i64, data: &EmitterTypeData)
    -> StoreResult<Option<EmitterType>>;
    async fn delete_type(&self, id: i64) -> StoreResult<bool>;

    // --- Emitter Owners ---
    async fn list_owners(&self) -> StoreResult<Vec<EmitterOwner>>;
    async fn find_owner(&self, id: i64) -> StoreResult<Option<EmitterOwner>>;
    async fn page_owners(&self, query: &PageQuery) -> StoreResult<Page<EmitterOwner>>;
    async fn insert_owner(&self, data: &EmitterOwnerData) -> StoreResult<EmitterOwner>;
    async fn update_owner(
        &self,
        id: i64,
        data: &EmitterOwnerData,
    ) -> StoreResult<Option<EmitterOwner>>;
    async fn delete_owner(&self, id: i64) -> StoreResult<bool>;

    // --- Emitters ---
    // Reads return the emitter with its type and owner joined in.
    async fn list_emitters(&self) -> StoreResult<Vec<Emitter>>;
    async fn find_emitter(&self, id: i64) -> StoreResult<Option<Emitter>>;
    async fn page_emitters(&self, query: &PageQuery) -> StoreResult<Page<Emitter>>;
    async fn insert_emitter(&self, data: &EmitterData) -> StoreResult<Emitter>;
    async fn update_emitter(&self, id: i64, data: &EmitterData) -> StoreResult<Option<Emitter>>;
    async fn delete_emitter(&self, id: i64) -> StoreResult<bool>;

    // --- Reference Checks ---
    // Used to refuse deleting a type/owner that emitters still point at.
    async fn count_emitters_with_type(&self, type_id: i64) -> StoreResult<i64>;
    async fn count_emitters_with_owner(&self, owner_id: i64) -> StoreResult<i64>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
