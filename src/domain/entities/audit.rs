//! Audit columns shared by every table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::infrastructure::repositories::Value;

/// Who created, last changed, and soft-deleted a row, and when.
///
/// `deleted_at`/`deleted_by` are only ever written through a soft-delete
/// changeset, so they are not part of [`Audit::values`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Audit {
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

impl Audit {
    pub fn new(actor: Uuid) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            created_by: actor,
            updated_at: now,
            updated_by: actor,
            deleted_at: None,
            deleted_by: None,
        }
    }

    /// Stamp a modification by `actor`.
    pub fn touch(&mut self, actor: Uuid) {
        self.updated_at = Utc::now();
        self.updated_by = actor;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn values(&self) -> [(&'static str, Value); 4] {
        [
            ("created_at", self.created_at.into()),
            ("created_by", self.created_by.into()),
            ("updated_at", self.updated_at.into()),
            ("updated_by", self.updated_by.into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_keeps_creation_stamp() {
        let creator = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let mut audit = Audit::new(creator);
        let created = audit.created_at;

        audit.touch(editor);

        assert_eq!(audit.created_by, creator);
        assert_eq!(audit.created_at, created);
        assert_eq!(audit.updated_by, editor);
        assert!(audit.updated_at >= created);
        assert!(!audit.is_deleted());
    }
}
