use crate::error::{AppError, AppResult};
use crate::models::{EmitterOwner, EmitterOwnerData};
use crate::pagination::{Page, PageParams};
use crate::repository::RepositoryState;

use super::write_error;

#[derive(Clone)]
pub struct EmitterOwnerService {
    repo: RepositoryState,
}

impl EmitterOwnerService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> AppResult<Vec<EmitterOwner>> {
        Ok(self.repo.list_owners().await?)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<EmitterOwner> {
        tracing::debug!(id, "Loading emitter owner");
        self.repo.find_owner(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn get_page(&self, params: &PageParams) -> AppResult<Page<EmitterOwner>> {
        let query = params.to_query(EmitterOwner::SORT_COLUMNS)?;
        tracing::debug!(?query, "Paging emitter owners");
        Ok(self.repo.page_owners(&query).await?)
    }

    pub async fn create(&self, data: EmitterOwnerData) -> AppResult<EmitterOwner> {
        let created = self
            .repo
            .insert_owner(&data)
            .await
            .map_err(|err| write_error(err, || duplicate(&data.name)))?;

        tracing::info!(id = created.id, name = %created.name, "Emitter owner created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, data: EmitterOwnerData) -> AppResult<EmitterOwner> {
        let updated = self
            .repo
            .update_owner(id, &data)
            .await
            .map_err(|err| write_error(err, || duplicate(&data.name)))?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(id, name = %updated.name, "Emitter owner updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.get_by_id(id).await?;

        let in_use = self.repo.count_emitters_with_owner(id).await?;
        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "Emitter owner with id {id} owns {in_use} emitter(s) and cannot be deleted"
            )));
        }

        let deleted = self
            .repo
            .delete_owner(id)
            .await
            .map_err(|err| write_error(err, String::new))?;
        if !deleted {
            return Err(not_found(id));
        }

        tracing::info!(id, "Emitter owner deleted");
        Ok(())
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Emitter owner with id {id} not found"))
}

fn duplicate(name: &str) -> String {
    format!("Emitter owner with name \"{name}\" already exists")
}
