//! Technology Handlers
//!
//! Technologies are a global catalogue shared by every tenant.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::resolve_page;
use crate::application::dto::{
    CreateTechnologyRequest, DeletedResponse, ListQuery, UpdateTechnologyRequest,
};
use crate::application::services::{TechnologyService, TechnologyServiceImpl};
use crate::domain::Technology;
use crate::infrastructure::repositories::PgRepository;
use crate::presentation::http::extractors::{parse_id, Actor, Paginated};
use crate::shared::error::AppError;
use crate::startup::AppState;

fn service(state: &AppState) -> TechnologyServiceImpl<PgRepository> {
    TechnologyServiceImpl::new(state.db.clone(), Arc::new(PgRepository::new()))
}

pub async fn create_technology(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(body): Json<CreateTechnologyRequest>,
) -> Result<(StatusCode, Json<Technology>), AppError> {
    let technology = service(&state).create_technology(actor, body).await?;
    Ok((StatusCode::CREATED, Json(technology)))
}

pub async fn list_technologies(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Paginated<Technology>, AppError> {
    let page = resolve_page(&state.settings.pagination, &query);
    let (items, total) = service(&state).list_technologies(&query, page).await?;
    Ok(Paginated::new(items, total))
}

pub async fn get_technology(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Technology>, AppError> {
    let id = parse_id(&id, "technology")?;
    Ok(Json(service(&state).get_technology(id).await?))
}

pub async fn update_technology(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(body): Json<UpdateTechnologyRequest>,
) -> Result<Json<Technology>, AppError> {
    let id = parse_id(&id, "technology")?;
    Ok(Json(service(&state).update_technology(id, actor, body).await?))
}

pub async fn delete_technology(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = parse_id(&id, "technology")?;
    service(&state).delete_technology(id, actor).await?;
    Ok(Json(DeletedResponse::new(id)))
}
