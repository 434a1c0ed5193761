//! Talent entity.
//!
//! Maps to the tenant-owned `talents` table.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::Audit;
use crate::infrastructure::repositories::{Entity, EntitySchema, Value};

/// A learner who can be enrolled into batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Talent {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Unique among a tenant's live talents
    pub email: String,
    pub contact: String,
    pub city: String,
    /// Years of experience
    pub experience: i32,
    pub is_active: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

impl Talent {
    pub fn new(
        tenant_id: Uuid,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        actor: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            contact: String::new(),
            city: String::new(),
            experience: 0,
            is_active: true,
            audit: Audit::new(actor),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Talent {
    const SCHEMA: EntitySchema = EntitySchema::new("talents");

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
            ("first_name", self.first_name.clone().into()),
            ("last_name", self.last_name.clone().into()),
            ("email", self.email.clone().into()),
            ("contact", self.contact.clone().into()),
            ("city", self.city.clone().into()),
            ("experience", self.experience.into()),
            ("is_active", self.is_active.into()),
        ];
        values.extend(self.audit.values());
        values
    }
}
