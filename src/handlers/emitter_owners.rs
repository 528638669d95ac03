use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    AppState,
    dto::{EmitterOwnerRequest, EmitterOwnerResponse, PagedResponse},
    extract::{ApiPath, ApiQuery},
    error::{ApiErrorResponse, AppResult, FormValidationErrorResponse},
    pagination::PageQueryParams,
    validation::ValidatedJson,
};

/// get_owners_page
///
/// Paginated, sortable listing. Sortable fields: `id`, `name`.
#[utoipa::path(
    get,
    path = "/api/v1/owners",
    tag = "emitter-owners",
    params(PageQueryParams),
    responses(
        (status = 200, description = "One page of emitter owners", body = PagedResponse<EmitterOwnerResponse>),
        (status = 400, description = "Invalid paging parameter", body = ApiErrorResponse)
    )
)]
pub async fn get_owners_page(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageQueryParams>,
) -> AppResult<Json<PagedResponse<EmitterOwnerResponse>>> {
    let params = state.pages.resolve(&params)?;
    let page = state.owners.get_page(&params).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/owners/all",
    tag = "emitter-owners",
    responses((status = 200, description = "All emitter owners", body = [EmitterOwnerResponse]))
)]
pub async fn get_all_owners(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<EmitterOwnerResponse>>> {
    let owners = state.owners.list().await?;
    Ok(Json(owners.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/owners/{id}",
    tag = "emitter-owners",
    params(("id" = i64, Path, description = "Emitter owner ID")),
    responses(
        (status = 200, description = "Found", body = EmitterOwnerResponse),
        (status = 404, description = "Not found", body = ApiErrorResponse)
    )
)]
pub async fn get_owner(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<EmitterOwnerResponse>> {
    Ok(Json(state.owners.get_by_id(id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/owners",
    tag = "emitter-owners",
    request_body = EmitterOwnerRequest,
    responses(
        (status = 201, description = "Created", body = EmitterOwnerResponse),
        (status = 400, description = "Invalid body", body = FormValidationErrorResponse),
        (status = 409, description = "Name already taken", body = ApiErrorResponse)
    )
)]
pub async fn create_owner(
    State(state): State<AppState>,
    ValidatedJson(data): ValidatedJson<EmitterOwnerRequest>,
) -> AppResult<(StatusCode, Json<EmitterOwnerResponse>)> {
    let created = state.owners.create(data).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/owners/{id}",
    tag = "emitter-owners",
    params(("id" = i64, Path, description = "Emitter owner ID")),
    request_body = EmitterOwnerRequest,
    responses(
        (status = 200, description = "Updated", body = EmitterOwnerResponse),
        (status = 400, description = "Invalid body", body = FormValidationErrorResponse),
        (status = 404, description = "Not found", body = ApiErrorResponse),
        (status = 409, description = "Name already taken", body = ApiErrorResponse)
    )
)]
pub async fn update_owner(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(data): ValidatedJson<EmitterOwnerRequest>,
) -> AppResult<Json<EmitterOwnerResponse>> {
    Ok(Json(state.owners.update(id, data).await?.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/owners/{id}",
    tag = "emitter-owners",
    params(("id" = i64, Path, description = "Emitter owner ID")),
    responses(
        (status = 200, description = "Deleted", body = String),
        (status = 404, description = "Not found", body = ApiErrorResponse),
        (status = 409, description = "Owner still has emitters", body = ApiErrorResponse)
    )
)]
pub async fn delete_owner(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<String> {
    state.owners.delete(id).await?;
    Ok(format!("Emitter owner with id {id} was deleted"))
}
