use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Repository, StoreError, StoreResult};
use crate::models::{
    Emitter, EmitterData, EmitterOwner, EmitterOwnerData, EmitterType, EmitterTypeData,
};
use crate::pagination::{Page, PageQuery};

#[derive(Default)]
struct Tables {
    types: BTreeMap<i64, EmitterType>,
    owners: BTreeMap<i64, EmitterOwner>,
    emitters: BTreeMap<i64, EmitterData>,
    last_type_id: i64,
    last_owner_id: i64,
    last_emitter_id: i64,
}

impl Tables {
    fn resolve(&self, id: i64, data: &EmitterData) -> Option<Emitter> {
        Some(Emitter {
            id,
            spec: data.spec.clone(),
            emitter_type: self.types.get(&data.emitter_type_id)?.clone(),
            emitter_owner: self.owners.get(&data.emitter_owner_id)?.clone(),
        })
    }

    fn all_emitters(&self) -> Vec<Emitter> {
        self.emitters
            .iter()
            .filter_map(|(id, data)| self.resolve(*id, data))
            .collect()
    }

    fn type_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.types
            .values()
            .any(|record| record.name == name && Some(record.id) != except)
    }

    fn owner_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.owners
            .values()
            .any(|record| record.name == name && Some(record.id) != except)
    }

    /// Mirrors the `UNIQUE` and `REFERENCES` constraints on the `emitter` table.
    fn check_emitter(&self, data: &EmitterData, except: Option<i64>) -> StoreResult<()> {
        let duplicate = self.emitters.iter().any(|(id, stored)| {
            stored.spec.factory_number == data.spec.factory_number && Some(*id) != except
        });
        if duplicate {
            return Err(StoreError::UniqueViolation(
                "emitter_factory_number_key".to_string(),
            ));
        }
        if !self.types.contains_key(&data.emitter_type_id) {
            return Err(StoreError::ForeignKeyViolation(
                "emitter_emitter_type_id_fkey".to_string(),
            ));
        }
        if !self.owners.contains_key(&data.emitter_owner_id) {
            return Err(StoreError::ForeignKeyViolation(
                "emitter_emitter_owner_id_fkey".to_string(),
            ));
        }
        Ok(())
    }
}

/// InMemoryRepository
///
/// A `Repository` kept entirely in process memory. It enforces the same unique and
/// foreign-key rules as the Postgres schema and sorts the same way, so service and router
/// tests observe production behaviour without a database.
///
/// Ids start at 1 per table and are never reused.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Slices `records`, already sorted, into the page described by `query`.
fn paginate<T>(records: Vec<T>, query: &PageQuery) -> Page<T> {
    let total = records.len() as i64;
    let skip = usize::try_from(query.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(query.page_size).unwrap_or(usize::MAX);
    let content = records.into_iter().skip(skip).take(take).collect();
    Page::new(query, total, content)
}

/// Applies the direction to the primary ordering and breaks ties by ascending id.
fn directed(primary: Ordering, ascending: bool, a_id: i64, b_id: i64) -> Ordering {
    let primary = if ascending { primary } else { primary.reverse() };
    primary.then(a_id.cmp(&b_id))
}

fn compare_emitters(a: &Emitter, b: &Emitter, field: &str) -> Ordering {
    match field {
        "factoryNumber" => a.spec.factory_number.cmp(&b.spec.factory_number),
        "manufactureDate" => a.spec.manufacture_date.cmp(&b.spec.manufacture_date),
        "verificationPeriodicityInMonths" => a
            .spec
            .verification_periodicity_in_months
            .cmp(&b.spec.verification_periodicity_in_months),
        "forExternalUse" => a.spec.for_external_use.cmp(&b.spec.for_external_use),
        "hasInternalGenerator" => a
            .spec
            .has_internal_generator
            .cmp(&b.spec.has_internal_generator),
        "emitterType" => a.emitter_type.name.cmp(&b.emitter_type.name),
        "emitterOwner" => a.emitter_owner.name.cmp(&b.emitter_owner.name),
        _ => a.id.cmp(&b.id),
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_types(&self) -> StoreResult<Vec<EmitterType>> {
        Ok(self.tables.read().await.types.values().cloned().collect())
    }

    async fn find_type(&self, id: i64) -> StoreResult<Option<EmitterType>> {
        Ok(self.tables.read().await.types.get(&id).cloned())
    }

    async fn page_types(&self, query: &PageQuery) -> StoreResult<Page<EmitterType>> {
        let mut records: Vec<EmitterType> =
            self.tables.read().await.types.values().cloned().collect();
        records.sort_by(|a, b| {
            let primary = match query.sort_field {
                "name" => a.name.cmp(&b.name),
                _ => a.id.cmp(&b.id),
            };
            directed(primary, query.ascending, a.id, b.id)
        });
        Ok(paginate(records, query))
    }

    async fn insert_type(&self, data: &EmitterTypeData) -> StoreResult<EmitterType> {
        let mut tables = self.tables.write().await;
        if tables.type_name_taken(&data.name, None) {
            return Err(StoreError::UniqueViolation(
                "emitter_type_type_name_key".to_string(),
            ));
        }
        tables.last_type_id += 1;
        let record = EmitterType {
            id: tables.last_type_id,
            name: data.name.clone(),
        };
        tables.types.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_type(
        &self,
        id: i64,
        data: &EmitterTypeData,
    ) -> StoreResult<Option<EmitterType>> {
        let mut tables = self.tables.write().await;
        if !tables.types.contains_key(&id) {
            return Ok(None);
        }
        if tables.type_name_taken(&data.name, Some(id)) {
            return Err(StoreError::UniqueViolation(
                "emitter_type_type_name_key".to_string(),
            ));
        }
        let record = EmitterType {
            id,
            name: data.name.clone(),
        };
        tables.types.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_type(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.emitters.values().any(|e| e.emitter_type_id == id) {
            return Err(StoreError::ForeignKeyViolation(
                "emitter_emitter_type_id_fkey".to_string(),
            ));
        }
        Ok(tables.types.remove(&id).is_some())
    }

    async fn list_owners(&self) -> StoreResult<Vec<EmitterOwner>> {
        Ok(self.tables.read().await.owners.values().cloned().collect())
    }

    async fn find_owner(&self, id: i64) -> StoreResult<Option<EmitterOwner>> {
        Ok(self.tables.read().await.owners.get(&id).cloned())
    }

    async fn page_owners(&self, query: &PageQuery) -> StoreResult<Page<EmitterOwner>> {
        let mut records: Vec<EmitterOwner> =
            self.tables.read().await.owners.values().cloned().collect();
        records.sort_by(|a, b| {
            let primary = match query.sort_field {
                "name" => a.name.cmp(&b.name),
                _ => a.id.cmp(&b.id),
            };
            directed(primary, query.ascending, a.id, b.id)
        });
        Ok(paginate(records, query))
    }

    async fn insert_owner(&self, data: &EmitterOwnerData) -> StoreResult<EmitterOwner> {
        let mut tables = self.tables.write().await;
        if tables.owner_name_taken(&data.name, None) {
            return Err(StoreError::UniqueViolation(
                "emitter_owner_owner_name_key".to_string(),
            ));
        }
        tables.last_owner_id += 1;
        let record = EmitterOwner {
            id: tables.last_owner_id,
            name: data.name.clone(),
        };
        tables.owners.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_owner(
        &self,
        id: i64,
        data: &EmitterOwnerData,
    ) -> StoreResult<Option<EmitterOwner>> {
        let mut tables = self.tables.write().await;
        if !tables.owners.contains_key(&id) {
            return Ok(None);
        }
        if tables.owner_name_taken(&data.name, Some(id)) {
            return Err(StoreError::UniqueViolation(
                "emitter_owner_owner_name_key".to_string(),
            ));
        }
        let record = EmitterOwner {
            id,
            name: data.name.clone(),
        };
        tables.owners.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_owner(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.emitters.values().any(|e| e.emitter_owner_id == id) {
            return Err(StoreError::ForeignKeyViolation(
                "emitter_emitter_owner_id_fkey".to_string(),
            ));
        }
        Ok(tables.owners.remove(&id).is_some())
    }

    async fn list_emitters(&self) -> StoreResult<Vec<Emitter>> {
        Ok(self.tables.read().await.all_emitters())
    }

    async fn find_emitter(&self, id: i64) -> StoreResult<Option<Emitter>> {
        let tables = self.tables.read().await;
        Ok(tables
            .emitters
            .get(&id)
            .and_then(|data| tables.resolve(id, data)))
    }

    async fn page_emitters(&self, query: &PageQuery) -> StoreResult<Page<Emitter>> {
        let mut records = self.tables.read().await.all_emitters();
        records.sort_by(|a, b| {
            let primary = compare_emitters(a, b, query.sort_field);
            directed(primary, query.ascending, a.id, b.id)
        });
        Ok(paginate(records, query))
    }

    async fn insert_emitter(&self, data: &EmitterData) -> StoreResult<Emitter> {
        let mut tables = self.tables.write().await;
        tables.check_emitter(data, None)?;
        tables.last_emitter_id += 1;
        let id = tables.last_emitter_id;
        tables.emitters.insert(id, data.clone());
        tables
            .resolve(id, data)
            .ok_or_else(|| StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update_emitter(&self, id: i64, data: &EmitterData) -> StoreResult<Option<Emitter>> {
        let mut tables = self.tables.write().await;
        if !tables.emitters.contains_key(&id) {
            return Ok(None);
        }
        tables.check_emitter(data, Some(id))?;
        tables.emitters.insert(id, data.clone());
        Ok(tables.resolve(id, data))
    }

    async fn delete_emitter(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.emitters.remove(&id).is_some())
    }

    async fn count_emitters_with_type(&self, type_id: i64) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .emitters
            .values()
            .filter(|e| e.emitter_type_id == type_id)
            .count();
        Ok(count as i64)
    }

    async fn count_emitters_with_owner(&self, owner_id: i64) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .emitters
            .values()
            .filter(|e| e.emitter_owner_id == owner_id)
            .count();
        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::external_generator_spec;

    fn query(field: &'static str, ascending: bool, page_index: i64, page_size: i64) -> PageQuery {
        PageQuery {
            page_index,
            page_size,
            sort_field: field,
            sort_column: field,
            ascending,
        }
    }

    async fn seeded() -> (InMemoryRepository, i64, i64) {
        let repo = InMemoryRepository::new();
        let laser = repo
            .insert_type(&EmitterTypeData {
                name: "Laser".to_string(),
            })
            .await
            .unwrap();
        let lab = repo
            .insert_owner(&EmitterOwnerData {
                name: "Optics lab".to_string(),
            })
            .await
            .unwrap();
        (repo, laser.id, lab.id)
    }

    fn emitter(factory_number: &str, type_id: i64, owner_id: i64) -> EmitterData {
        EmitterData {
            spec: external_generator_spec(factory_number),
            emitter_type_id: type_id,
            emitter_owner_id: owner_id,
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_per_table() {
        let (repo, type_id, owner_id) = seeded().await;
        assert_eq!((type_id, owner_id), (1, 1));

        let second = repo
            .insert_type(&EmitterTypeData {
                name: "Diode".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn duplicate_names_violate_uniqueness() {
        let (repo, type_id, _) = seeded().await;
        let err = repo
            .insert_type(&EmitterTypeData {
                name: "Laser".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));

        // Renaming a record to its own name is not a conflict.
        let same = repo
            .update_type(
                type_id,
                &EmitterTypeData {
                    name: "Laser".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(same.is_some());
    }

    #[tokio::test]
    async fn referenced_lookups_cannot_be_deleted() {
        let (repo, type_id, owner_id) = seeded().await;
        repo.insert_emitter(&emitter("EM-1", type_id, owner_id))
            .await
            .unwrap();

        assert!(matches!(
            repo.delete_type(type_id).await,
            Err(StoreError::ForeignKeyViolation(_))
        ));
        assert!(matches!(
            repo.delete_owner(owner_id).await,
            Err(StoreError::ForeignKeyViolation(_))
        ));
        assert_eq!(repo.count_emitters_with_type(type_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn emitters_require_existing_references() {
        let (repo, type_id, _) = seeded().await;
        let err = repo
            .insert_emitter(&emitter("EM-1", type_id, 99))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
        assert!(repo.list_emitters().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn emitter_pages_sort_by_joined_names() {
        let (repo, laser, lab) = seeded().await;
        let diode = repo
            .insert_type(&EmitterTypeData {
                name: "Diode".to_string(),
            })
            .await
            .unwrap()
            .id;
        repo.insert_emitter(&emitter("EM-1", laser, lab)).await.unwrap();
        repo.insert_emitter(&emitter("EM-2", diode, lab)).await.unwrap();
        repo.insert_emitter(&emitter("EM-3", laser, lab)).await.unwrap();

        let page = repo
            .page_emitters(&query("emitterType", true, 0, 2))
            .await
            .unwrap();
        let numbers: Vec<_> = page
            .content
            .iter()
            .map(|e| e.spec.factory_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["EM-2", "EM-1"]);
        assert_eq!(page.total_pages, 2);

        let last = repo
            .page_emitters(&query("factoryNumber", false, 1, 2))
            .await
            .unwrap();
        assert_eq!(last.page_number, 1);
        assert_eq!(last.content.len(), 1);
        assert_eq!(last.content[0].spec.factory_number, "EM-1");
    }
}
