use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use super::parse_body;
use crate::database::models::{
    Company, CompanyDetail, CompanyFilter, CompanyJobFilter, CompanyUpdate, Job, NewCompany,
};
use crate::error::ApiError;
use crate::filter::UpdatePayload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::routes::AppState;

/// POST /companies - admin only
pub async fn create(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult<Company> {
    let data: NewCompany = parse_body(body)?;
    data.validate().map_err(ApiError::bad_request)?;

    let company = Company::create(&state.pool, &data).await?;
    Ok(ApiResponse::created(company))
}

/// GET /companies?name=&minEmployees=&maxEmployees=
pub async fn list(State(state): State<AppState>, Query(filter): Query<CompanyFilter>) -> ApiResult<Vec<Company>> {
    let companies = Company::find_all(&state.pool, &filter).await?;
    Ok(ApiResponse::success(companies))
}

/// GET /companies/:handle
pub async fn get(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<CompanyDetail> {
    let company = Company::get(&state.pool, &handle).await?;
    Ok(ApiResponse::success(company))
}

/// GET /companies/:handle/jobs?title=&minSalary=&hasEquity=
pub async fn jobs(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(filter): Query<CompanyJobFilter>,
) -> ApiResult<Vec<Job>> {
    let jobs = Job::find_for_company(&state.pool, &handle, &filter).await?;
    Ok(ApiResponse::success(jobs))
}

/// PATCH /companies/:handle - admin only
pub async fn update(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Company> {
    let update: CompanyUpdate = parse_body(body)?;
    update.validate().map_err(ApiError::bad_request)?;

    let company = Company::update(&state.pool, &handle, &UpdatePayload::from(update)).await?;
    Ok(ApiResponse::success(company))
}

/// DELETE /companies/:handle - admin only
pub async fn delete(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<Value> {
    Company::remove(&state.pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "deleted": handle })))
}
