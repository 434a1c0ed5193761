//! Request DTOs
//!
//! Data structures for API request bodies and list query strings.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// `?limit=&offset=` plus the common list filters.
///
/// `offset` is a page index, not a row count.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub course_id: Option<Uuid>,
}

/// Resolved paging for a list call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Every row, no paging.
    pub fn all() -> Self {
        Self { limit: -1, offset: 0 }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTechnologyRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 50, message = "Language must be at most 50 characters"))]
    #[serde(default)]
    pub language: String,

    #[validate(range(min = 0, max = 10, message = "Rating must be between 0 and 10"))]
    #[serde(default)]
    pub rating: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTechnologyRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 50, message = "Language must be at most 50 characters"))]
    pub language: Option<String>,

    #[validate(range(min = 0, max = 10, message = "Rating must be between 0 and 10"))]
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 30, message = "Code must be 1-30 characters"))]
    pub code: String,

    #[serde(default)]
    pub description: String,

    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    #[serde(default)]
    pub duration_hrs: i32,

    #[serde(default)]
    pub technology_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 2, max = 150, message = "Name must be 2-150 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 30, message = "Code must be 1-30 characters"))]
    pub code: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    pub duration_hrs: Option<i32>,

    pub is_active: Option<bool>,

    /// Replaces the full technology set when present.
    pub technology_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTalentRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(max = 20, message = "Contact must be at most 20 characters"))]
    #[serde(default)]
    pub contact: String,

    #[serde(default)]
    pub city: String,

    #[validate(range(min = 0, max = 60, message = "Experience must be 0-60 years"))]
    #[serde(default)]
    pub experience: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTalentRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 20, message = "Contact must be at most 20 characters"))]
    pub contact: Option<String>,

    pub city: Option<String>,

    #[validate(range(min = 0, max = 60, message = "Experience must be 0-60 years"))]
    pub experience: Option<i32>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBatchRequest {
    pub course_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 30, message = "Code must be 1-30 characters"))]
    pub code: String,

    pub start_date: Option<DateTime<Utc>>,

    /// Zero means unlimited.
    #[validate(range(min = 0, message = "Seats cannot be negative"))]
    #[serde(default)]
    pub total_seats: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBatchRequest {
    pub course_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 30, message = "Code must be 1-30 characters"))]
    pub code: Option<String>,

    pub start_date: Option<DateTime<Utc>>,

    #[validate(range(min = 0, message = "Seats cannot be negative"))]
    pub total_seats: Option<i32>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EnrollTalentsRequest {
    #[validate(length(max = 500, message = "At most 500 talents per request"))]
    pub talent_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_talent_rejects_bad_email() {
        let request = CreateTalentRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "not-an-email".into(),
            contact: String::new(),
            city: String::new(),
            experience: 3,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_create_course_defaults_optional_fields() {
        let request: CreateCourseRequest =
            serde_json::from_str(r#"{"name":"Rust Basics","code":"RS-1"}"#).unwrap();
        assert!(request.technology_ids.is_empty());
        assert_eq!(request.duration_hrs, 0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_course_validates_only_present_fields() {
        let request = UpdateCourseRequest {
            duration_hrs: Some(-1),
            ..Default::default()
        };
        assert!(request.validate().is_err());
        assert!(UpdateCourseRequest::default().validate().is_ok());
    }
}
