//! Custom Extractors
//!
//! Axum extractors for request parsing, and the paginated list responder.

use axum::{
    extract::FromRequestParts,
    http::{header::HeaderName, request::Parts, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::shared::error::AppError;

/// Header carrying the id of the user performing the request.
pub static ACTOR_HEADER: HeaderName = HeaderName::from_static("x-actor-id");

/// Header carrying the total row count of a paginated list.
pub static TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// The user recorded in audit columns.
///
/// Authentication is handled upstream; a request without the header is
/// attributed to the nil id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub Uuid);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(&ACTOR_HEADER) {
            None => Ok(Actor(Uuid::nil())),
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|v| Uuid::parse_str(v.trim()).ok())
                .map(Actor)
                .ok_or_else(|| AppError::BadRequest("Invalid X-Actor-Id header".into())),
        }
    }
}

/// Parse a path segment as a UUID.
pub fn parse_id(value: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value).map_err(|_| AppError::BadRequest(format!("Invalid {} ID", what)))
}

/// A page of rows with the total matching count in `X-Total-Count`.
#[derive(Debug)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64) -> Self {
        Self { items, total }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        let mut response = Json(self.items).into_response();
        response
            .headers_mut()
            .insert(TOTAL_COUNT_HEADER.clone(), HeaderValue::from(self.total));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    async fn extract(header: Option<&str>) -> Result<Actor, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("x-actor-id", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Actor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_missing_actor_is_nil() {
        assert_eq!(extract(None).await.unwrap(), Actor(Uuid::nil()));
    }

    #[tokio::test]
    async fn test_actor_header_is_parsed() {
        let id = Uuid::new_v4();
        assert_eq!(extract(Some(&id.to_string())).await.unwrap(), Actor(id));
        assert!(extract(Some("bob")).await.is_err());
    }

    #[test]
    fn test_paginated_sets_total_header() {
        let response = Paginated::new(vec![1, 2, 3], 42).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-total-count"], "42");
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("not-a-uuid", "course").is_err());
        assert!(parse_id(&Uuid::nil().to_string(), "course").is_ok());
    }
}
