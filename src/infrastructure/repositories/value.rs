//! Bind Values and Change Sets
//!
//! [`Value`] is the typed bind parameter carried by query fragments. Every
//! scalar variant is nullable so that a NULL can be bound with the column's
//! type (Postgres rejects untyped text NULLs for timestamp columns).

use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::Arguments;
use uuid::Uuid;

use super::error::RepositoryError;

/// Column written when a row is soft-deleted.
pub const DELETED_AT: &str = "deleted_at";

/// Column recording who soft-deleted a row.
pub const DELETED_BY: &str = "deleted_by";

/// A typed SQL bind value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(Option<bool>),
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Uuid(Option<Uuid>),
    Timestamp(Option<DateTime<Utc>>),
    Json(Option<serde_json::Value>),
    UuidList(Vec<Uuid>),
}

impl Value {
    /// Append this value to a Postgres argument buffer.
    pub(crate) fn add_to(self, args: &mut PgArguments) -> Result<(), RepositoryError> {
        let result = match self {
            Value::Bool(v) => args.add(v),
            Value::Int(v) => args.add(v),
            Value::Float(v) => args.add(v),
            Value::Text(v) => args.add(v),
            Value::Uuid(v) => args.add(v),
            Value::Timestamp(v) => args.add(v),
            Value::Json(v) => args.add(v),
            Value::UuidList(v) => args.add(v),
        };
        result.map_err(|e| RepositoryError::Bind(e.to_string()))
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(Some(value.into()))
                }
            }

            impl From<Option<$ty>> for Value {
                fn from(value: Option<$ty>) -> Self {
                    Value::$variant(value.map(Into::into))
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    f32 => Float,
    f64 => Float,
    String => Text,
    &str => Text,
    Uuid => Uuid,
    DateTime<Utc> => Timestamp,
    serde_json::Value => Json,
}

impl From<Vec<Uuid>> for Value {
    fn from(value: Vec<Uuid>) -> Self {
        Value::UuidList(value)
    }
}

impl From<&[Uuid]> for Value {
    fn from(value: &[Uuid]) -> Self {
        Value::UuidList(value.to_vec())
    }
}

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ```rust,ignore
/// filter("status = ? AND created_at > ?", args!["active", cutoff])
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::infrastructure::repositories::Value>::new() };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::infrastructure::repositories::Value::from($value)),+]
    };
}

/// An explicit column -> value map for partial updates.
///
/// Only the columns that were `set` are written, so writing a zero, an empty
/// string or NULL is always distinguishable from leaving a column alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    columns: Vec<(String, Value)>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing any previous value for the same column.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.columns.push((column, value)),
        }
        self
    }

    /// Mark a row deleted now, by `actor`.
    pub fn soft_delete(actor: Uuid) -> Self {
        Self::new()
            .set(DELETED_AT, Utc::now())
            .set(DELETED_BY, actor)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|(name, _)| name == column)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn into_columns(self) -> Vec<(String, Value)> {
        self.columns
    }
}
