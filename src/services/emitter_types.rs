use crate::error::{AppError, AppResult};
use crate::models::{EmitterType, EmitterTypeData};
use crate::pagination::{Page, PageParams};
use crate::repository::RepositoryState;

use super::write_error;

#[derive(Clone)]
pub struct EmitterTypeService {
    repo: RepositoryState,
}

impl EmitterTypeService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> AppResult<Vec<EmitterType>> {
        Ok(self.repo.list_types().await?)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<EmitterType> {
        tracing::debug!(id, "Loading emitter type");
        self.repo.find_type(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn get_page(&self, params: &PageParams) -> AppResult<Page<EmitterType>> {
        let query = params.to_query(EmitterType::SORT_COLUMNS)?;
        tracing::debug!(?query, "Paging emitter types");
        Ok(self.repo.page_types(&query).await?)
    }

    pub async fn create(&self, data: EmitterTypeData) -> AppResult<EmitterType> {
        let created = self
            .repo
            .insert_type(&data)
            .await
            .map_err(|err| write_error(err, || duplicate(&data.name)))?;

        tracing::info!(id = created.id, name = %created.name, "Emitter type created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, data: EmitterTypeData) -> AppResult<EmitterType> {
        let updated = self
            .repo
            .update_type(id, &data)
            .await
            .map_err(|err| write_error(err, || duplicate(&data.name)))?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(id, name = %updated.name, "Emitter type updated");
        Ok(updated)
    }

    /// delete
    ///
    /// Refuses with `Conflict` while any emitter still has this type.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.get_by_id(id).await?;

        let in_use = self.repo.count_emitters_with_type(id).await?;
        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "Emitter type with id {id} is used by {in_use} emitter(s) and cannot be deleted"
            )));
        }

        let deleted = self
            .repo
            .delete_type(id)
            .await
            .map_err(|err| write_error(err, String::new))?;
        if !deleted {
            return Err(not_found(id));
        }

        tracing::info!(id, "Emitter type deleted");
        Ok(())
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Emitter type with id {id} not found"))
}

fn duplicate(name: &str) -> String {
    format!("Emitter type with name \"{name}\" already exists")
}
