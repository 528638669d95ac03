use crate::error::{AppError, AppResult};
use crate::models::{Emitter, EmitterData};
use crate::pagination::{Page, PageParams};
use crate::repository::RepositoryState;

use super::write_error;

#[derive(Clone)]
pub struct EmitterService {
    repo: RepositoryState,
}

impl EmitterService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> AppResult<Vec<Emitter>> {
        Ok(self.repo.list_emitters().await?)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Emitter> {
        tracing::debug!(id, "Loading emitter");
        self.repo.find_emitter(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn get_page(&self, params: &PageParams) -> AppResult<Page<Emitter>> {
        let query = params.to_query(Emitter::SORT_COLUMNS)?;
        tracing::debug!(?query, "Paging emitters");
        Ok(self.repo.page_emitters(&query).await?)
    }

    /// create
    ///
    /// Fails with `NotFound` when the referenced type or owner is missing, and with
    /// `BadRequest` when the frequency bands do not match `hasInternalGenerator`.
    pub async fn create(&self, data: EmitterData) -> AppResult<Emitter> {
        self.check_references(&data).await?;
        data.spec.check_frequency_bands()?;

        let created = self
            .repo
            .insert_emitter(&data)
            .await
            .map_err(|err| write_error(err, || duplicate(&data.spec.factory_number)))?;

        tracing::info!(
            id = created.id,
            factory_number = %created.spec.factory_number,
            emitter_type_id = data.emitter_type_id,
            emitter_owner_id = data.emitter_owner_id,
            "Emitter created"
        );
        Ok(created)
    }

    /// update
    ///
    /// Full replacement: every mutable field, including both references, is overwritten.
    pub async fn update(&self, id: i64, data: EmitterData) -> AppResult<Emitter> {
        self.get_by_id(id).await?;
        self.check_references(&data).await?;
        data.spec.check_frequency_bands()?;

        let updated = self
            .repo
            .update_emitter(id, &data)
            .await
            .map_err(|err| write_error(err, || duplicate(&data.spec.factory_number)))?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(id, factory_number = %updated.spec.factory_number, "Emitter updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.repo.delete_emitter(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(id, "Emitter deleted");
        Ok(())
    }

    async fn check_references(&self, data: &EmitterData) -> AppResult<()> {
        if self.repo.find_type(data.emitter_type_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Emitter type with id {} not found",
                data.emitter_type_id
            )));
        }
        if self.repo.find_owner(data.emitter_owner_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Emitter owner with id {} not found",
                data.emitter_owner_id
            )));
        }
        Ok(())
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Emitter with id {id} not found"))
}

fn duplicate(factory_number: &str) -> String {
    format!("Emitter with factory number \"{factory_number}\" already exists")
}
