//! Repository Implementations
//!
//! A single generic repository serves every entity type. Entities describe
//! their table through [`EntitySchema`]; callers shape queries with
//! composable [`QueryProcessor`]s and run them inside a
//! [`UnitOfWork`](crate::infrastructure::database::UnitOfWork).
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use crate::infrastructure::database::UnitOfWork;
//! use crate::infrastructure::repositories::{filter, paginate, PgRepository, Repository, TotalCount};
//!
//! async fn list_active(pool: &PgPool, tenant_id: Uuid) -> Result<(Vec<Course>, i64), RepositoryError> {
//!     let repo = PgRepository::new();
//!     let mut uow = UnitOfWork::read_only(pool);
//!     let total = TotalCount::new();
//!     let courses: Vec<Course> = repo
//!         .get_all_for_tenant(&mut uow, tenant_id, vec![
//!             filter("courses.is_active = ?", args![true]),
//!             paginate(20, 0, Some(&total)),
//!         ])
//!         .await?;
//!     Ok((courses, total.get()))
//! }
//! ```

pub mod error;
pub mod generic_repository;
pub mod query;
pub mod schema;
pub mod statement;
pub mod value;

pub use error::RepositoryError;
pub use generic_repository::{PgRepository, Repository};
pub use query::{
    distinct, execute_query_processors, filter, filter_if, group_by, having, join, order_by,
    paginate, preload_associations, preload_with_condition, scope_to_tenant, select, table,
    unscoped, Fragment, Preload, QueryProcessor, QueryState, TotalCount,
};
pub use schema::{Association, AssociationKind, Entity, EntitySchema};
pub use statement::{quote_ident, Statement};
pub use value::{Changeset, Value, DELETED_AT, DELETED_BY};
