use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use super::parse_body;
use crate::database::models::{Job, JobFilter, JobUpdate, NewJob};
use crate::error::ApiError;
use crate::filter::UpdatePayload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::routes::AppState;

/// POST /jobs - admin only
pub async fn create(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult<Job> {
    let data: NewJob = parse_body(body)?;
    data.validate().map_err(ApiError::bad_request)?;

    let job = Job::create(&state.pool, &data).await?;
    Ok(ApiResponse::created(job))
}

/// GET /jobs?title=&minSalary=&hasEquity=&companyHandle=
pub async fn list(State(state): State<AppState>, Query(filter): Query<JobFilter>) -> ApiResult<Vec<Job>> {
    let jobs = Job::find_all(&state.pool, &filter).await?;
    Ok(ApiResponse::success(jobs))
}

/// GET /jobs/:title
pub async fn get(State(state): State<AppState>, Path(title): Path<String>) -> ApiResult<Job> {
    let job = Job::get(&state.pool, &title).await?;
    Ok(ApiResponse::success(job))
}

/// PATCH /jobs/:title - admin only
pub async fn update(
    State(state): State<AppState>,
    Path(title): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Job> {
    let update: JobUpdate = parse_body(body)?;
    update.validate().map_err(ApiError::bad_request)?;

    let job = Job::update(&state.pool, &title, &UpdatePayload::from(update)).await?;
    Ok(ApiResponse::success(job))
}

/// DELETE /jobs/:title - admin only
pub async fn delete(State(state): State<AppState>, Path(title): Path<String>) -> ApiResult<Value> {
    Job::remove(&state.pool, &title).await?;
    Ok(ApiResponse::success(json!({ "deleted": title })))
}
