//! Talent Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::resolve_page;
use crate::application::dto::{
    CreateTalentRequest, DeletedResponse, ListQuery, UpdateTalentRequest,
};
use crate::application::services::{TalentService, TalentServiceImpl};
use crate::domain::Talent;
use crate::infrastructure::repositories::PgRepository;
use crate::presentation::http::extractors::{parse_id, Actor, Paginated};
use crate::shared::error::AppError;
use crate::startup::AppState;

fn service(state: &AppState) -> TalentServiceImpl<PgRepository> {
    TalentServiceImpl::new(state.db.clone(), Arc::new(PgRepository::new()))
}

pub async fn create_talent(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(tenant_id): Path<String>,
    Json(body): Json<CreateTalentRequest>,
) -> Result<(StatusCode, Json<Talent>), AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let talent = service(&state).create_talent(tenant_id, actor, body).await?;
    Ok((StatusCode::CREATED, Json(talent)))
}

pub async fn list_talents(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Paginated<Talent>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let page = resolve_page(&state.settings.pagination, &query);
    let (items, total) = service(&state).list_talents(tenant_id, &query, page).await?;
    Ok(Paginated::new(items, total))
}

pub async fn get_talent(
    State(state): State<AppState>,
    Path((tenant_id, id)): Path<(String, String)>,
) -> Result<Json<Talent>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let id = parse_id(&id, "talent")?;
    Ok(Json(service(&state).get_talent(tenant_id, id).await?))
}

pub async fn update_talent(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((tenant_id, id)): Path<(String, String)>,
    Json(body): Json<UpdateTalentRequest>,
) -> Result<Json<Talent>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let id = parse_id(&id, "talent")?;
    Ok(Json(service(&state).update_talent(tenant_id, id, actor, body).await?))
}

pub async fn delete_talent(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((tenant_id, id)): Path<(String, String)>,
) -> Result<Json<DeletedResponse>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let id = parse_id(&id, "talent")?;
    service(&state).delete_talent(tenant_id, id, actor).await?;
    Ok(Json(DeletedResponse::new(id)))
}
