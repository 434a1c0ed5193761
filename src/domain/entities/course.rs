//! Course entity.
//!
//! Maps to the tenant-owned `courses` table. Technologies are linked
//! through `course_technologies(course_id, technology_id)`.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::audit::Audit;
use super::technology::Technology;
use crate::infrastructure::repositories::{Association, Entity, EntitySchema, Value};

const COURSE_ASSOCIATIONS: &[Association] = &[Association::many_to_many(
    "technologies",
    "technologies",
    "course_technologies",
    "course_id",
    "technology_id",
)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    /// Short code, unique among a tenant's live courses
    pub code: String,
    pub description: String,
    pub duration_hrs: i32,
    pub is_active: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,

    /// Present only when the `technologies` association was preloaded.
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Json<Vec<Technology>>>,
}

impl Course {
    pub fn new(tenant_id: Uuid, name: impl Into<String>, code: impl Into<String>, actor: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.into(),
            code: code.into(),
            description: String::new(),
            duration_hrs: 0,
            is_active: true,
            audit: Audit::new(actor),
            technologies: None,
        }
    }

    /// Preloaded technologies, empty when not loaded.
    pub fn technologies(&self) -> &[Technology] {
        self.technologies.as_ref().map(|t| t.0.as_slice()).unwrap_or_default()
    }
}

impl Entity for Course {
    const SCHEMA: EntitySchema = EntitySchema::new("courses").with_associations(COURSE_ASSOCIATIONS);

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
            ("name", self.name.clone().into()),
            ("code", self.code.clone().into()),
            ("description", self.description.clone().into()),
            ("duration_hrs", self.duration_hrs.into()),
            ("is_active", self.is_active.into()),
        ];
        values.extend(self.audit.values());
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::AssociationKind;

    #[test]
    fn test_values_cover_every_written_column() {
        let course = Course::new(Uuid::new_v4(), "Rust", "RS-101", Uuid::new_v4());
        let columns: Vec<&str> = course.values().iter().map(|(c, _)| *c).collect();
        assert_eq!(
            columns,
            vec![
                "id", "tenant_id", "name", "code", "description", "duration_hrs", "is_active",
                "created_at", "created_by", "updated_at", "updated_by",
            ]
        );
    }

    #[test]
    fn test_technologies_association() {
        let association = Course::SCHEMA.association("technologies").unwrap();
        assert!(matches!(
            association.kind,
            AssociationKind::ManyToMany { join_table: "course_technologies", .. }
        ));
    }

    #[test]
    fn test_preloaded_course_deserializes_without_technologies() {
        let course = Course::new(Uuid::new_v4(), "Rust", "RS-101", Uuid::new_v4());
        let json = serde_json::to_value(&course).unwrap();
        assert!(json.get("technologies").is_none());

        let back: Course = serde_json::from_value(json).unwrap();
        assert_eq!(back, course);
        assert!(back.technologies().is_empty());
    }
}
