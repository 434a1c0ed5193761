//! Batch entity.
//!
//! Maps to the tenant-owned `batches` table. A batch belongs to one course
//! and enrolls talents through `batch_talents(batch_id, talent_id)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::audit::Audit;
use super::course::Course;
use super::talent::Talent;
use crate::infrastructure::repositories::{Association, Entity, EntitySchema, Value};

const BATCH_ASSOCIATIONS: &[Association] = &[
    Association::belongs_to("course", "courses", "course_id"),
    Association::many_to_many("talents", "talents", "batch_talents", "batch_id", "talent_id"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Batch {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub course_id: Uuid,
    pub name: String,
    pub code: String,
    pub start_date: Option<DateTime<Utc>>,
    pub total_seats: i32,
    pub is_active: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,

    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<Json<Course>>,

    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub talents: Option<Json<Vec<Talent>>>,
}

impl Batch {
    pub fn new(tenant_id: Uuid, course_id: Uuid, name: impl Into<String>, code: impl Into<String>, actor: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            course_id,
            name: name.into(),
            code: code.into(),
            start_date: None,
            total_seats: 0,
            is_active: true,
            audit: Audit::new(actor),
            course: None,
            talents: None,
        }
    }

    pub fn talents(&self) -> &[Talent] {
        self.talents.as_ref().map(|t| t.0.as_slice()).unwrap_or_default()
    }

    /// Whether `enrolled` more talents still fit.
    pub fn has_seats_for(&self, enrolled: usize) -> bool {
        self.total_seats <= 0 || enrolled <= self.total_seats as usize
    }
}

impl Entity for Batch {
    const SCHEMA: EntitySchema = EntitySchema::new("batches").with_associations(BATCH_ASSOCIATIONS);

    fn id(&self) -> Uuid {
        self.id
    }

    fn tenant_id(&self) -> Option<Uuid> {
        Some(self.tenant_id)
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("id", self.id.into()),
            ("tenant_id", self.tenant_id.into()),
            ("course_id", self.course_id.into()),
            ("name", self.name.clone().into()),
            ("code", self.code.clone().into()),
            ("start_date", self.start_date.into()),
            ("total_seats", self.total_seats.into()),
            ("is_active", self.is_active.into()),
        ];
        values.extend(self.audit.values());
        values
    }
}
