//! Entity Schema Mapping
//!
//! Each persisted type declares its table, key, tenant column, soft-delete
//! column and relations through [`Entity::SCHEMA`]. Table and column names
//! are the literal names used by the database schema.

use sqlx::postgres::PgRow;
use sqlx::FromRow;
use uuid::Uuid;

use super::value::{Value, DELETED_AT};

/// Columns written on INSERT but never rewritten by an entity UPDATE.
pub const DEFAULT_INSERT_ONLY: &[&str] = &["id", "tenant_id", "created_at", "created_by"];

/// How an association is linked to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// The owner row holds `foreign_key`, pointing at the related primary key.
    BelongsTo { foreign_key: &'static str },

    /// Related rows hold `foreign_key`, pointing at the owner primary key.
    HasMany { foreign_key: &'static str },

    /// Rows are linked through `join_table(owner_key, related_key)`.
    ManyToMany {
        join_table: &'static str,
        owner_key: &'static str,
        related_key: &'static str,
    },
}

/// A named relation from one entity table to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    pub name: &'static str,
    pub table: &'static str,
    pub kind: AssociationKind,
    /// Soft-delete column of the related table, if it has one.
    pub soft_delete_column: Option<&'static str>,
}

impl Association {
    pub const fn belongs_to(name: &'static str, table: &'static str, foreign_key: &'static str) -> Self {
        Self {
            name,
            table,
            kind: AssociationKind::BelongsTo { foreign_key },
            soft_delete_column: Some(DELETED_AT),
        }
    }

    pub const fn has_many(name: &'static str, table: &'static str, foreign_key: &'static str) -> Self {
        Self {
            name,
            table,
            kind: AssociationKind::HasMany { foreign_key },
            soft_delete_column: Some(DELETED_AT),
        }
    }

    pub const fn many_to_many(
        name: &'static str,
        table: &'static str,
        join_table: &'static str,
        owner_key: &'static str,
        related_key: &'static str,
    ) -> Self {
        Self {
            name,
            table,
            kind: AssociationKind::ManyToMany {
                join_table,
                owner_key,
                related_key,
            },
            soft_delete_column: Some(DELETED_AT),
        }
    }

    /// Related table has no soft-delete column.
    pub const fn without_soft_delete(self) -> Self {
        Self {
            soft_delete_column: None,
            ..self
        }
    }
}

/// Table mapping for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub table: &'static str,
    pub primary_key: &'static str,
    pub tenant_column: Option<&'static str>,
    pub soft_delete_column: Option<&'static str>,
    pub insert_only: &'static [&'static str],
    pub associations: &'static [Association],
}

impl EntitySchema {
    /// A tenant-owned, soft-deletable table keyed by `id`.
    pub const fn new(table: &'static str) -> Self {
        Self {
            table,
            primary_key: "id",
            tenant_column: Some("tenant_id"),
            soft_delete_column: Some(DELETED_AT),
            insert_only: DEFAULT_INSERT_ONLY,
            associations: &[],
        }
    }

    /// Global lookup table shared by every tenant.
    pub const fn global(self) -> Self {
        Self {
            tenant_column: None,
            ..self
        }
    }

    /// Table without a soft-delete column; deletes are always hard.
    pub const fn without_soft_delete(self) -> Self {
        Self {
            soft_delete_column: None,
            ..self
        }
    }

    pub const fn with_associations(self, associations: &'static [Association]) -> Self {
        Self {
            associations,
            ..self
        }
    }

    pub fn association(&self, name: &str) -> Option<&'static Association> {
        let associations: &'static [Association] = self.associations;
        associations.iter().find(|a| a.name == name)
    }

    pub fn is_tenant_owned(&self) -> bool {
        self.tenant_column.is_some()
    }

    /// Whether an entity UPDATE may rewrite `column`.
    pub fn is_updatable(&self, column: &str) -> bool {
        column != self.primary_key
            && Some(column) != self.tenant_column
            && !self.insert_only.iter().any(|c| *c == column)
    }
}

/// A persisted record type.
///
/// `values` must list every column written on INSERT, primary key
/// included, in a stable order. Columns produced only by preloads are
/// not part of it.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static {
    const SCHEMA: EntitySchema;

    fn id(&self) -> Uuid;

    fn tenant_id(&self) -> Option<Uuid> {
        None
    }

    fn values(&self) -> Vec<(&'static str, Value)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINKED: &[Association] = &[
        Association::belongs_to("course", "courses", "course_id"),
        Association::many_to_many("talents", "talents", "batch_talents", "batch_id", "talent_id"),
    ];

    const SCHEMA: EntitySchema = EntitySchema::new("batches").with_associations(LINKED);

    #[test]
    fn test_defaults() {
        assert_eq!(SCHEMA.primary_key, "id");
        assert_eq!(SCHEMA.tenant_column, Some("tenant_id"));
        assert_eq!(SCHEMA.soft_delete_column, Some("deleted_at"));
        assert!(SCHEMA.is_tenant_owned());
    }

    #[test]
    fn test_global_schema_has_no_tenant() {
        let schema = EntitySchema::new("technologies").global();
        assert!(!schema.is_tenant_owned());
        assert_eq!(schema.table, "technologies");
    }

    #[test]
    fn test_association_lookup() {
        let course = SCHEMA.association("course").map(|a| a.kind);
        assert_eq!(
            course,
            Some(AssociationKind::BelongsTo { foreign_key: "course_id" })
        );
        assert!(SCHEMA.association("mentors").is_none());
    }

    #[test]
    fn test_tenant_and_audit_columns_are_not_updatable() {
        assert!(!SCHEMA.is_updatable("id"));
        assert!(!SCHEMA.is_updatable("tenant_id"));
        assert!(!SCHEMA.is_updatable("created_at"));
        assert!(!SCHEMA.is_updatable("created_by"));
        assert!(SCHEMA.is_updatable("name"));
        assert!(SCHEMA.is_updatable("updated_at"));
    }
}
