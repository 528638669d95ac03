use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, postgres::PgRow, query_builder::QueryBuilder};

use super::{Repository, StoreError, StoreResult};
use crate::models::{
    Emitter, EmitterData, EmitterOwner, EmitterOwnerData, EmitterRow, EmitterType,
    EmitterTypeData,
};
use crate::pagination::{Page, PageQuery};

/// Name and table of a `{id, name}` lookup entity.
#[derive(Clone, Copy)]
struct LookupTable {
    table: &'static str,
    name_column: &'static str,
}

const TYPES: LookupTable = LookupTable {
    table: "emitter_type",
    name_column: "type_name",
};

const OWNERS: LookupTable = LookupTable {
    table: "emitter_owner",
    name_column: "owner_name",
};

/// Writable emitter columns, in the order `push_emitter_values` binds them.
const EMITTER_COLUMNS: &str = "factory_number, manufacture_date, \
    verification_periodicity_in_months, for_external_use, has_internal_generator, \
    minimum_pulse_width, maximum_pulse_width, \
    minimum_pulse_frequency_10, maximum_pulse_frequency_10, \
    minimum_pulse_frequency_100, maximum_pulse_frequency_100, \
    minimum_pulse_frequency_1000, maximum_pulse_frequency_1000, \
    minimum_pulse_power, maximum_pulse_power, \
    minimum_radiation_flux_divergence_angle, maximum_radiation_flux_divergence_angle, \
    minimum_non_parallelism_of_axes, maximum_non_parallelism_of_axes, \
    minimum_unevenness_of_radiation_flux, maximum_unevenness_of_radiation_flux, \
    emitter_type_id, emitter_owner_id";

/// Emitter joined with its type and owner, shaped for `EmitterRow`.
const EMITTER_SELECT: &str = r#"
    SELECT
        e.id, e.factory_number, e.manufacture_date,
        e.verification_periodicity_in_months, e.for_external_use, e.has_internal_generator,
        e.minimum_pulse_width, e.maximum_pulse_width,
        e.minimum_pulse_frequency_10, e.maximum_pulse_frequency_10,
        e.minimum_pulse_frequency_100, e.maximum_pulse_frequency_100,
        e.minimum_pulse_frequency_1000, e.maximum_pulse_frequency_1000,
        e.minimum_pulse_power, e.maximum_pulse_power,
        e.minimum_radiation_flux_divergence_angle, e.maximum_radiation_flux_divergence_angle,
        e.minimum_non_parallelism_of_axes, e.maximum_non_parallelism_of_axes,
        e.minimum_unevenness_of_radiation_flux, e.maximum_unevenness_of_radiation_flux,
        e.emitter_type_id, t.type_name AS emitter_type_name,
        e.emitter_owner_id, o.owner_name AS emitter_owner_name
    FROM emitter e
    JOIN emitter_type t ON t.id = e.emitter_type_id
    JOIN emitter_owner o ON o.id = e.emitter_owner_id
"#;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
///
/// All SQL is built at runtime. Sort columns come from the per-entity whitelists in
/// `models`, never from raw user input, so splicing them into `ORDER BY` is safe.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_lookup<T>(&self, lookup: LookupTable) -> StoreResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "SELECT id, {name} FROM {table} ORDER BY id",
            name = lookup.name_column,
            table = lookup.table
        );
        let records = sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?;
        Ok(records)
    }

    async fn find_lookup<T>(&self, lookup: LookupTable, id: i64) -> StoreResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "SELECT id, {name} FROM {table} WHERE id = $1",
            name = lookup.name_column,
            table = lookup.table
        );
        let record = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn page_lookup<T>(&self, lookup: LookupTable, query: &PageQuery) -> StoreResult<Page<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", lookup.table))
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT id, {} FROM {}",
            lookup.name_column, lookup.table
        ));
        push_page_clause(&mut builder, query, "id");

        let content = builder
            .build_query_as::<T>()
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(query, total, content))
    }

    async fn insert_lookup<T>(&self, lookup: LookupTable, name: &str) -> StoreResult<T>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "INSERT INTO {table} ({name}) VALUES ($1) RETURNING id, {name}",
            name = lookup.name_column,
            table = lookup.table
        );
        let record = sqlx::query_as::<_, T>(&sql)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(record)
    }

    async fn update_lookup<T>(
        &self,
        lookup: LookupTable,
        id: i64,
        name: &str,
    ) -> StoreResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "UPDATE {table} SET {name} = $1 WHERE id = $2 RETURNING id, {name}",
            name = lookup.name_column,
            table = lookup.table
        );
        let record = sqlx::query_as::<_, T>(&sql)
            .bind(name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn delete_by_id(&self, table: &str, id: i64) -> StoreResult<bool> {
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_emitters_where(&self, column: &str, id: i64) -> StoreResult<i64> {
        let count = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM emitter WHERE {column} = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

/// Appends `ORDER BY <column> <dir>, <tiebreak> LIMIT .. OFFSET ..`.
///
/// The tiebreak keeps page boundaries stable when the sort column has duplicates.
fn push_page_clause(builder: &mut QueryBuilder<'_, Postgres>, query: &PageQuery, tiebreak: &str) {
    builder.push(" ORDER BY ");
    builder.push(query.sort_column);
    builder.push(if query.ascending { " ASC" } else { " DESC" });
    if query.sort_column != tiebreak {
        builder.push(", ");
        builder.push(tiebreak);
    }
    builder.push(" LIMIT ");
    builder.push_bind(query.page_size);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset());
}

/// Pushes `(v1, v2, ...)` for every column in `EMITTER_COLUMNS`.
fn push_emitter_values(builder: &mut QueryBuilder<'_, Postgres>, data: &EmitterData) {
    let spec = &data.spec;
    builder.push("(");
    let mut values = builder.separated(", ");
    values
        .push_bind(spec.factory_number.clone())
        .push_bind(spec.manufacture_date)
        .push_bind(spec.verification_periodicity_in_months)
        .push_bind(spec.for_external_use)
        .push_bind(spec.has_internal_generator)
        .push_bind(spec.minimum_pulse_width)
        .push_bind(spec.maximum_pulse_width)
        .push_bind(spec.minimum_pulse_frequency_10)
        .push_bind(spec.maximum_pulse_frequency_10)
        .push_bind(spec.minimum_pulse_frequency_100)
        .push_bind(spec.maximum_pulse_frequency_100)
        .push_bind(spec.minimum_pulse_frequency_1000)
        .push_bind(spec.maximum_pulse_frequency_1000)
        .push_bind(spec.minimum_pulse_power)
        .push_bind(spec.maximum_pulse_power)
        .push_bind(spec.minimum_radiation_flux_divergence_angle)
        .push_bind(spec.maximum_radiation_flux_divergence_angle)
        .push_bind(spec.minimum_non_parallelism_of_axes)
        .push_bind(spec.maximum_non_parallelism_of_axes)
        .push_bind(spec.minimum_unevenness_of_radiation_flux)
        .push_bind(spec.maximum_unevenness_of_radiation_flux)
        .push_bind(data.emitter_type_id)
        .push_bind(data.emitter_owner_id);
    values.push_unseparated(")");
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_types(&self) -> StoreResult<Vec<EmitterType>> {
        self.list_lookup(TYPES).await
    }

    async fn find_type(&self, id: i64) -> StoreResult<Option<EmitterType>> {
        self.find_lookup(TYPES, id).await
    }

    async fn page_types(&self, query: &PageQuery) -> StoreResult<Page<EmitterType>> {
        self.page_lookup(TYPES, query).await
    }

    async fn insert_type(&self, data: &EmitterTypeData) -> StoreResult<EmitterType> {
        self.insert_lookup(TYPES, &data.name).await
    }

    async fn update_type(
        &self,
        id: i64,
        data: &EmitterTypeData,
    ) -> StoreResult<Option<EmitterType>> {
        self.update_lookup(TYPES, id, &data.name).await
    }

    async fn delete_type(&self, id: i64) -> StoreResult<bool> {
        self.delete_by_id(TYPES.table, id).await
    }

    async fn list_owners(&self) -> StoreResult<Vec<EmitterOwner>> {
        self.list_lookup(OWNERS).await
    }

    async fn find_owner(&self, id: i64) -> StoreResult<Option<EmitterOwner>> {
        self.find_lookup(OWNERS, id).await
    }

    async fn page_owners(&self, query: &PageQuery) -> StoreResult<Page<EmitterOwner>> {
        self.page_lookup(OWNERS, query).await
    }

    async fn insert_owner(&self, data: &EmitterOwnerData) -> StoreResult<EmitterOwner> {
        self.insert_lookup(OWNERS, &data.name).await
    }

    async fn update_owner(
        &self,
        id: i64,
        data: &EmitterOwnerData,
    ) -> StoreResult<Option<EmitterOwner>> {
        self.update_lookup(OWNERS, id, &data.name).await
    }

    async fn delete_owner(&self, id: i64) -> StoreResult<bool> {
        self.delete_by_id(OWNERS.table, id).await
    }

    async fn list_emitters(&self) -> StoreResult<Vec<Emitter>> {
        let rows = sqlx::query_as::<_, EmitterRow>(&format!("{EMITTER_SELECT} ORDER BY e.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Emitter::from).collect())
    }

    async fn find_emitter(&self, id: i64) -> StoreResult<Option<Emitter>> {
        let row = sqlx::query_as::<_, EmitterRow>(&format!("{EMITTER_SELECT} WHERE e.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Emitter::from))
    }

    /// page_emitters
    ///
    /// Sorting by `emitterType`/`emitterOwner` orders by the referenced name, which is why
    /// the sort columns are qualified with the join aliases.
    async fn page_emitters(&self, query: &PageQuery) -> StoreResult<Page<Emitter>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM emitter")
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(EMITTER_SELECT);
        push_page_clause(&mut builder, query, "e.id");

        let rows = builder
            .build_query_as::<EmitterRow>()
            .fetch_all(&self.pool)
            .await?;
        let content = rows.into_iter().map(Emitter::from).collect();
        Ok(Page::new(query, total, content))
    }

    async fn insert_emitter(&self, data: &EmitterData) -> StoreResult<Emitter> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO emitter ({EMITTER_COLUMNS}) VALUES "));
        push_emitter_values(&mut builder, data);
        builder.push(" RETURNING id");

        let id: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        // Re-read through the join so the caller gets type and owner names.
        self.find_emitter(id)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update_emitter(&self, id: i64, data: &EmitterData) -> StoreResult<Option<Emitter>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("UPDATE emitter SET ({EMITTER_COLUMNS}) = "));
        push_emitter_values(&mut builder, data);
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING id");

        let updated: Option<i64> = builder
            .build_query_scalar()
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(id) => self.find_emitter(id).await,
            None => Ok(None),
        }
    }

    async fn delete_emitter(&self, id: i64) -> StoreResult<bool> {
        self.delete_by_id("emitter", id).await
    }

    async fn count_emitters_with_type(&self, type_id: i64) -> StoreResult<i64> {
        self.count_emitters_where("emitter_type_id", type_id).await
    }

    async fn count_emitters_with_owner(&self, owner_id: i64) -> StoreResult<i64> {
        self.count_emitters_where("emitter_owner_id", owner_id).await
    }
}
