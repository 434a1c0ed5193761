//! Course Handlers
//!
//! `GET` on a course returns it with its technologies.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::resolve_page;
use crate::application::dto::{
    CreateCourseRequest, DeletedResponse, ListQuery, UpdateCourseRequest,
};
use crate::application::services::{CourseService, CourseServiceImpl};
use crate::domain::Course;
use crate::infrastructure::repositories::PgRepository;
use crate::presentation::http::extractors::{parse_id, Actor, Paginated};
use crate::shared::error::AppError;
use crate::startup::AppState;

fn service(state: &AppState) -> CourseServiceImpl<PgRepository> {
    CourseServiceImpl::new(state.db.clone(), Arc::new(PgRepository::new()))
}

pub async fn create_course(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(tenant_id): Path<String>,
    Json(body): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let course = service(&state).create_course(tenant_id, actor, body).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn list_courses(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Paginated<Course>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let page = resolve_page(&state.settings.pagination, &query);
    let (items, total) = service(&state).list_courses(tenant_id, &query, page).await?;
    Ok(Paginated::new(items, total))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path((tenant_id, id)): Path<(String, String)>,
) -> Result<Json<Course>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let id = parse_id(&id, "course")?;
    Ok(Json(service(&state).get_course(tenant_id, id).await?))
}

pub async fn update_course(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((tenant_id, id)): Path<(String, String)>,
    Json(body): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let id = parse_id(&id, "course")?;
    Ok(Json(service(&state).update_course(tenant_id, id, actor, body).await?))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((tenant_id, id)): Path<(String, String)>,
) -> Result<Json<DeletedResponse>, AppError> {
    let tenant_id = parse_id(&tenant_id, "tenant")?;
    let id = parse_id(&id, "course")?;
    service(&state).delete_course(tenant_id, id, actor).await?;
    Ok(Json(DeletedResponse::new(id)))
}
