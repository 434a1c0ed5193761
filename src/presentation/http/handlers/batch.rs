//! Batch Handlers
//!
//! Batches also carry the enrollment endpoints under `{id}/talents`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::resolve_page;
use crate::application::dto::{
    CreateBatchRequest, DeletedResponse, EnrollTalentsRequest, EnrollmentResponse, ListQuery,
    UpdateBatchRequest,
};
use crate::application::services::{BatchService, BatchServiceImpl};
use crate::domain::Batch;
use crate::infrastructure::repositories::PgRepository;
use crate::presentation::http::extractors::{parse_id, Actor, Paginated};
use crate::shared::error::AppError;
use crate::startup::AppState;

fn service(state: &AppState) -> BatchServiceImpl<PgRepository> {
    BatchServiceImpl::new(state.db.clone(), Arc::new(PgRepository::new()), state.events.clone())
}

pub async fn create_batch(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(tenant_id): Path<String>,
    Json(body): Json<CreateBatchRequest>,
) -> Result<(StatusCode, Json<Batch>), AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let batch = service(&state).create_batch(tenant_id, actor, body).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

pub async fn list_batches(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Paginated<Batch>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let page = resolve_page(&state.settings.pagination, &query);
    let (items, total) = service(&state).list_batches(tenant_id, &query, page).await?;
    Ok(Paginated::new(items, total))
}

pub async fn get_batch(
    State(state): State<AppState>,
    Path((tenant_id, id)): Path<(String, String)>,
) -> Result<Json<Batch>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let id = parse_id(&id, "batch")?;
    Ok(Json(service(&state).get_batch(tenant_id, id).await?))
}

pub async fn update_batch(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((tenant_id, id)): Path<(String, String)>,
    Json(body): Json<UpdateBatchRequest>,
) -> Result<Json<Batch>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let id = parse_id(&id, "batch")?;
    Ok(Json(service(&state).update_batch(tenant_id, id, actor, body).await?))
}

pub async fn delete_batch(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((tenant_id, id)): Path<(String, String)>,
) -> Result<Json<DeletedResponse>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let id = parse_id(&id, "batch")?;
    service(&state).delete_batch(tenant_id, id, actor).await?;
    Ok(Json(DeletedResponse::new(id)))
}

/// `PUT {id}/talents`: make the body's ids the complete enrollment.
pub async fn enroll_talents(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((tenant_id, id)): Path<(String, String)>,
    Json(body): Json<EnrollTalentsRequest>,
) -> Result<Json<EnrollmentResponse>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let id = parse_id(&id, "batch")?;
    let batch = service(&state).enroll_talents(tenant_id, id, actor, body).await?;
    Ok(Json(enrollment(&batch)))
}

/// `DELETE {id}/talents`: withdraw the body's ids.
pub async fn remove_talents(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((tenant_id, id)): Path<(String, String)>,
    Json(body): Json<EnrollTalentsRequest>,
) -> Result<Json<EnrollmentResponse>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let id = parse_id(&id, "batch")?;
    let batch = service(&state).remove_talents(tenant_id, id, actor, body).await?;
    Ok(Json(enrollment(&batch)))
}

fn enrollment(batch: &Batch) -> EnrollmentResponse {
    EnrollmentResponse {
        batch_id: batch.id,
        talent_ids: batch.talents().iter().map(|t| t.id).collect(),
    }
}
