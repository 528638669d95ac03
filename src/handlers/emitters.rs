use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    AppState,
    dto::{EmitterRequest, EmitterResponse, PagedResponse},
    extract::{ApiPath, ApiQuery},
    error::{ApiErrorResponse, AppResult, FormValidationErrorResponse},
    pagination::PageQueryParams,
    validation::ValidatedJson,
};

/// get_emitters_page
///
/// Paginated, sortable listing. Sortable fields: `id`, `factoryNumber`, `manufactureDate`,
/// `verificationPeriodicityInMonths`, `forExternalUse`, `hasInternalGenerator`,
/// `emitterType` and `emitterOwner` (the last two sort by name). The measured-range fields
/// (pulse width, frequencies, power and the rest) are not sortable; asking for one is a 400.
#[utoipa::path(
    get,
    path = "/api/v1/emitters",
    tag = "emitters",
    params(PageQueryParams),
    responses(
        (status = 200, description = "One page of emitters", body = PagedResponse<EmitterResponse>),
        (status = 400, description = "Invalid paging parameter", body = ApiErrorResponse)
    )
)]
pub async fn get_emitters_page(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageQueryParams>,
) -> AppResult<Json<PagedResponse<EmitterResponse>>> {
    let params = state.pages.resolve(&params)?;
    let page = state.emitters.get_page(&params).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/emitters/all",
    tag = "emitters",
    responses((status = 200, description = "All emitters", body = [EmitterResponse]))
)]
pub async fn get_all_emitters(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<EmitterResponse>>> {
    let emitters = state.emitters.list().await?;
    Ok(Json(emitters.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/emitters/{id}",
    tag = "emitters",
    params(("id" = i64, Path, description = "Emitter ID")),
    responses(
        (status = 200, description = "Found", body = EmitterResponse),
        (status = 404, description = "Not found", body = ApiErrorResponse)
    )
)]
pub async fn get_emitter(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<EmitterResponse>> {
    Ok(Json(state.emitters.get_by_id(id).await?.into()))
}

/// create_emitter
///
/// Besides field validation (400 with a per-field map), the referenced type and owner must
/// exist (404) and the frequency bands must match `hasInternalGenerator` (400).
#[utoipa::path(
    post,
    path = "/api/v1/emitters",
    tag = "emitters",
    request_body = EmitterRequest,
    responses(
        (status = 201, description = "Created", body = EmitterResponse),
        (status = 400, description = "Invalid body", body = FormValidationErrorResponse),
        (status = 404, description = "Type or owner not found", body = ApiErrorResponse),
        (status = 409, description = "Factory number already taken", body = ApiErrorResponse)
    )
)]
pub async fn create_emitter(
    State(state): State<AppState>,
    ValidatedJson(data): ValidatedJson<EmitterRequest>,
) -> AppResult<(StatusCode, Json<EmitterResponse>)> {
    let created = state.emitters.create(data).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/emitters/{id}",
    tag = "emitters",
    params(("id" = i64, Path, description = "Emitter ID")),
    request_body = EmitterRequest,
    responses(
        (status = 200, description = "Updated", body = EmitterResponse),
        (status = 400, description = "Invalid body", body = FormValidationErrorResponse),
        (status = 404, description = "Emitter, type or owner not found", body = ApiErrorResponse),
        (status = 409, description = "Factory number already taken", body = ApiErrorResponse)
    )
)]
pub async fn update_emitter(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(data): ValidatedJson<EmitterRequest>,
) -> AppResult<Json<EmitterResponse>> {
    Ok(Json(state.emitters.update(id, data).await?.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/emitters/{id}",
    tag = "emitters",
    params(("id" = i64, Path, description = "Emitter ID")),
    responses(
        (status = 200, description = "Deleted", body = String),
        (status = 404, description = "Not found", body = ApiErrorResponse)
    )
)]
pub async fn delete_emitter(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<String> {
    state.emitters.delete(id).await?;
    Ok(format!("Emitter with id {id} was deleted"))
}
