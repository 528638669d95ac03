use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    AppState,
    dto::{EmitterTypeRequest, EmitterTypeResponse, PagedResponse},
    extract::{ApiPath, ApiQuery},
    error::{ApiErrorResponse, AppResult, FormValidationErrorResponse},
    pagination::PageQueryParams,
    validation::ValidatedJson,
};

/// get_types_page
///
/// Paginated, sortable listing. Sortable fields: `id`, `name`.
#[utoipa::path(
    get,
    path = "/api/v1/types",
    tag = "emitter-types",
    params(PageQueryParams),
    responses(
        (status = 200, description = "One page of emitter types", body = PagedResponse<EmitterTypeResponse>),
        (status = 400, description = "Invalid paging parameter", body = ApiErrorResponse)
    )
)]
pub async fn get_types_page(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageQueryParams>,
) -> AppResult<Json<PagedResponse<EmitterTypeResponse>>> {
    let params = state.pages.resolve(&params)?;
    let page = state.types.get_page(&params).await?;
    Ok(Json(page.into()))
}

/// get_all_types
///
/// Every emitter type ordered by id, for populating selection lists.
#[utoipa::path(
    get,
    path = "/api/v1/types/all",
    tag = "emitter-types",
    responses((status = 200, description = "All emitter types", body = [EmitterTypeResponse]))
)]
pub async fn get_all_types(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<EmitterTypeResponse>>> {
    let types = state.types.list().await?;
    Ok(Json(types.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/types/{id}",
    tag = "emitter-types",
    params(("id" = i64, Path, description = "Emitter type ID")),
    responses(
        (status = 200, description = "Found", body = EmitterTypeResponse),
        (status = 404, description = "Not found", body = ApiErrorResponse)
    )
)]
pub async fn get_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<EmitterTypeResponse>> {
    Ok(Json(state.types.get_by_id(id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/types",
    tag = "emitter-types",
    request_body = EmitterTypeRequest,
    responses(
        (status = 201, description = "Created", body = EmitterTypeResponse),
        (status = 400, description = "Invalid body", body = FormValidationErrorResponse),
        (status = 409, description = "Name already taken", body = ApiErrorResponse)
    )
)]
pub async fn create_type(
    State(state): State<AppState>,
    ValidatedJson(data): ValidatedJson<EmitterTypeRequest>,
) -> AppResult<(StatusCode, Json<EmitterTypeResponse>)> {
    let created = state.types.create(data).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/types/{id}",
    tag = "emitter-types",
    params(("id" = i64, Path, description = "Emitter type ID")),
    request_body = EmitterTypeRequest,
    responses(
        (status = 200, description = "Updated", body = EmitterTypeResponse),
        (status = 400, description = "Invalid body", body = FormValidationErrorResponse),
        (status = 404, description = "Not found", body = ApiErrorResponse),
        (status = 409, description = "Name already taken", body = ApiErrorResponse)
    )
)]
pub async fn update_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(data): ValidatedJson<EmitterTypeRequest>,
) -> AppResult<Json<EmitterTypeResponse>> {
    Ok(Json(state.types.update(id, data).await?.into()))
}

/// delete_type
///
/// Rejected with 409 while emitters still reference the type.
#[utoipa::path(
    delete,
    path = "/api/v1/types/{id}",
    tag = "emitter-types",
    params(("id" = i64, Path, description = "Emitter type ID")),
    responses(
        (status = 200, description = "Deleted", body = String),
        (status = 404, description = "Not found", body = ApiErrorResponse),
        (status = 409, description = "Type still in use", body = ApiErrorResponse)
    )
)]
pub async fn delete_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<String> {
    state.types.delete(id).await?;
    Ok(format!("Emitter type with id {id} was deleted"))
}
