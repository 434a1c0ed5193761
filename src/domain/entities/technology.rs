//! Technology entity.
//!
//! Maps to the global `technologies` table, shared by every tenant.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::Audit;
use crate::infrastructure::repositories::{Entity, EntitySchema, Value};

/// A technology a course can teach (e.g. "Rust", "PostgreSQL").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Technology {
    pub id: Uuid,
    pub name: String,
    pub language: String,
    /// Popularity rating, 0-10
    pub rating: i32,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

impl Technology {
    pub fn new(name: impl Into<String>, language: impl Into<String>, rating: i32, actor: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            language: language.into(),
            rating,
            audit: Audit::new(actor),
        }
    }
}

impl Entity for Technology {
    const SCHEMA: EntitySchema = EntitySchema::new("technologies").global();

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("id", self.id.into()),
            ("name", self.name.clone().into()),
            ("language", self.language.clone().into()),
            ("rating", self.rating.into()),
        ];
        values.extend(self.audit.values());
        values
    }
}
