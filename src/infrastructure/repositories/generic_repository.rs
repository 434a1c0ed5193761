//! Generic Repository
//!
//! CRUD and query primitives shared by every entity type. Each operation
//! has a tenant variant that installs the tenant predicate before any
//! caller-supplied processor; those variants refuse a nil tenant id.

use async_trait::async_trait;
use uuid::Uuid;

use super::error::RepositoryError;
use super::query::{
    execute_query_processors, filter, order_by, scope_to_tenant, unscoped, QueryProcessor,
    QueryState,
};
use super::schema::{AssociationKind, Entity, EntitySchema};
use super::statement::{self, quote_ident};
use super::value::{Changeset, Value};
use crate::infrastructure::database::UnitOfWork;

/// Data access for one entity type.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Fetch exactly one row by primary key.
    async fn get(&self, uow: &mut UnitOfWork, id: Uuid, processors: Vec<QueryProcessor>) -> Result<T, RepositoryError>;

    async fn get_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        id: Uuid,
        processors: Vec<QueryProcessor>,
    ) -> Result<T, RepositoryError>;

    /// Fetch every matching row. Zero rows is not an error.
    async fn get_all(&self, uow: &mut UnitOfWork, processors: Vec<QueryProcessor>) -> Result<Vec<T>, RepositoryError>;

    async fn get_all_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        processors: Vec<QueryProcessor>,
    ) -> Result<Vec<T>, RepositoryError>;

    /// Fetch the first matching row.
    async fn get_record(&self, uow: &mut UnitOfWork, processors: Vec<QueryProcessor>) -> Result<T, RepositoryError>;

    async fn get_record_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        processors: Vec<QueryProcessor>,
    ) -> Result<T, RepositoryError>;

    /// [`Repository::get_all`] with a mandatory ordering.
    async fn get_all_in_order(
        &self,
        uow: &mut UnitOfWork,
        order: &str,
        processors: Vec<QueryProcessor>,
    ) -> Result<Vec<T>, RepositoryError>;

    async fn get_all_in_order_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        order: &str,
        processors: Vec<QueryProcessor>,
    ) -> Result<Vec<T>, RepositoryError>;

    /// Count live rows.
    async fn get_count(&self, uow: &mut UnitOfWork, processors: Vec<QueryProcessor>) -> Result<i64, RepositoryError>;

    async fn get_count_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        processors: Vec<QueryProcessor>,
    ) -> Result<i64, RepositoryError>;

    /// Count rows, soft-deleted ones included.
    async fn get_count_unscoped(&self, uow: &mut UnitOfWork, processors: Vec<QueryProcessor>) -> Result<i64, RepositoryError>;

    async fn get_count_unscoped_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        processors: Vec<QueryProcessor>,
    ) -> Result<i64, RepositoryError>;

    /// Insert a row and return it as stored.
    async fn add(&self, uow: &mut UnitOfWork, entity: &T) -> Result<T, RepositoryError>;

    /// Rewrite every updatable column of a live row, zero values included.
    async fn update(&self, uow: &mut UnitOfWork, entity: &T) -> Result<T, RepositoryError>;

    async fn update_for_tenant(&self, uow: &mut UnitOfWork, tenant_id: Uuid, entity: &T) -> Result<T, RepositoryError>;

    /// Insert or overwrite by primary key.
    async fn save(&self, uow: &mut UnitOfWork, entity: &T) -> Result<T, RepositoryError>;

    /// Write only the columns in `changes` on the matching rows.
    async fn update_with_map(
        &self,
        uow: &mut UnitOfWork,
        changes: Changeset,
        processors: Vec<QueryProcessor>,
    ) -> Result<u64, RepositoryError>;

    async fn update_with_map_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        changes: Changeset,
        processors: Vec<QueryProcessor>,
    ) -> Result<u64, RepositoryError>;

    /// Mark one live row deleted by `actor`.
    async fn soft_delete_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        id: Uuid,
        actor: Uuid,
    ) -> Result<(), RepositoryError>;

    /// Hard-delete matching rows.
    async fn delete(&self, uow: &mut UnitOfWork, processors: Vec<QueryProcessor>) -> Result<u64, RepositoryError>;

    async fn delete_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        processors: Vec<QueryProcessor>,
    ) -> Result<u64, RepositoryError>;

    /// Make `related_ids` the complete set of links for a many-to-many association.
    async fn replace_associations(
        &self,
        uow: &mut UnitOfWork,
        owner: &T,
        association: &str,
        related_ids: &[Uuid],
    ) -> Result<(), RepositoryError>;

    /// Remove the given links of a many-to-many association.
    async fn remove_associations(
        &self,
        uow: &mut UnitOfWork,
        owner: &T,
        association: &str,
        related_ids: &[Uuid],
    ) -> Result<(), RepositoryError>;

    async fn does_record_exist(&self, uow: &mut UnitOfWork, processors: Vec<QueryProcessor>) -> Result<bool, RepositoryError>;

    /// Existence check scoped to a tenant. A nil tenant id is an error,
    /// never a silent `false`.
    async fn does_record_exist_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        processors: Vec<QueryProcessor>,
    ) -> Result<bool, RepositoryError>;
}

/// Postgres implementation of [`Repository`] for every [`Entity`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PgRepository;

impl PgRepository {
    pub fn new() -> Self {
        Self
    }
}

fn ensure_tenant(tenant_id: Uuid) -> Result<(), RepositoryError> {
    if tenant_id.is_nil() {
        return Err(RepositoryError::validation("tenant id must not be nil"));
    }
    Ok(())
}

/// Prepend the tenant scope to caller processors.
fn tenant_scoped(tenant_id: Uuid, processors: Vec<QueryProcessor>) -> Result<Vec<QueryProcessor>, RepositoryError> {
    ensure_tenant(tenant_id)?;
    let mut scoped = Vec::with_capacity(processors.len() + 1);
    scoped.push(scope_to_tenant(tenant_id));
    scoped.extend(processors);
    Ok(scoped)
}

fn by_primary_key(schema: &EntitySchema, id: Uuid) -> QueryProcessor {
    filter(
        format!("{}.{} = ?", quote_ident(schema.table), quote_ident(schema.primary_key)),
        vec![Value::from(id)],
    )
}

fn prepare<T: Entity>(processors: &[QueryProcessor]) -> Result<QueryState, RepositoryError> {
    execute_query_processors(QueryState::for_schema(&T::SCHEMA), &T::SCHEMA, processors)
}

async fn fetch_rows<T: Entity>(uow: &mut UnitOfWork, mut state: QueryState) -> Result<Vec<T>, RepositoryError> {
    if let Some(request) = state.take_count_request() {
        let total = uow.fetch_count(request.snapshot.to_count()).await?;
        request.target.set(total);
    }
    uow.fetch_all(state.to_select()).await
}

async fn fetch_first<T: Entity>(uow: &mut UnitOfWork, mut state: QueryState) -> Result<T, RepositoryError> {
    state.take_count_request();
    state.limit = Some(1);
    state.offset = None;
    uow.fetch_optional(state.to_select())
        .await?
        .ok_or(RepositoryError::NotFound)
}

async fn count<T: Entity>(uow: &mut UnitOfWork, processors: &[QueryProcessor]) -> Result<i64, RepositoryError> {
    let state = prepare::<T>(processors)?;
    uow.fetch_count(state.to_count()).await
}

fn many_to_many<T: Entity>(association: &str) -> Result<(&'static str, &'static str, &'static str), RepositoryError> {
    let found = T::SCHEMA
        .association(association)
        .ok_or_else(|| RepositoryError::UnknownAssociation {
            table: T::SCHEMA.table,
            association: association.to_string(),
        })?;
    match found.kind {
        AssociationKind::ManyToMany {
            join_table,
            owner_key,
            related_key,
        } => Ok((join_table, owner_key, related_key)),
        _ => Err(RepositoryError::validation(format!(
            "`{}` is not a many-to-many association",
            association
        ))),
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for PgRepository {
    async fn get(&self, uow: &mut UnitOfWork, id: Uuid, mut processors: Vec<QueryProcessor>) -> Result<T, RepositoryError> {
        processors.insert(0, by_primary_key(&T::SCHEMA, id));
        let state = prepare::<T>(&processors)?;
        fetch_first(uow, state).await
    }

    async fn get_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        id: Uuid,
        mut processors: Vec<QueryProcessor>,
    ) -> Result<T, RepositoryError> {
        processors.insert(0, by_primary_key(&T::SCHEMA, id));
        let state = prepare::<T>(&tenant_scoped(tenant_id, processors)?)?;
        fetch_first(uow, state).await
    }

    async fn get_all(&self, uow: &mut UnitOfWork, processors: Vec<QueryProcessor>) -> Result<Vec<T>, RepositoryError> {
        let state = prepare::<T>(&processors)?;
        fetch_rows(uow, state).await
    }

    async fn get_all_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        processors: Vec<QueryProcessor>,
    ) -> Result<Vec<T>, RepositoryError> {
        let state = prepare::<T>(&tenant_scoped(tenant_id, processors)?)?;
        fetch_rows(uow, state).await
    }

    async fn get_record(&self, uow: &mut UnitOfWork, processors: Vec<QueryProcessor>) -> Result<T, RepositoryError> {
        let state = prepare::<T>(&processors)?;
        fetch_first(uow, state).await
    }

    async fn get_record_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        processors: Vec<QueryProcessor>,
    ) -> Result<T, RepositoryError> {
        let state = prepare::<T>(&tenant_scoped(tenant_id, processors)?)?;
        fetch_first(uow, state).await
    }

    async fn get_all_in_order(
        &self,
        uow: &mut UnitOfWork,
        order: &str,
        mut processors: Vec<QueryProcessor>,
    ) -> Result<Vec<T>, RepositoryError> {
        processors.insert(0, order_by(order, false));
        Repository::<T>::get_all(self, uow, processors).await
    }

    async fn get_all_in_order_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        order: &str,
        mut processors: Vec<QueryProcessor>,
    ) -> Result<Vec<T>, RepositoryError> {
        processors.insert(0, order_by(order, false));
        Repository::<T>::get_all_for_tenant(self, uow, tenant_id, processors).await
    }

    async fn get_count(&self, uow: &mut UnitOfWork, processors: Vec<QueryProcessor>) -> Result<i64, RepositoryError> {
        count::<T>(uow, &processors).await
    }

    async fn get_count_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        processors: Vec<QueryProcessor>,
    ) -> Result<i64, RepositoryError> {
        count::<T>(uow, &tenant_scoped(tenant_id, processors)?).await
    }

    async fn get_count_unscoped(&self, uow: &mut UnitOfWork, mut processors: Vec<QueryProcessor>) -> Result<i64, RepositoryError> {
        processors.push(unscoped());
        count::<T>(uow, &processors).await
    }

    async fn get_count_unscoped_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        mut processors: Vec<QueryProcessor>,
    ) -> Result<i64, RepositoryError> {
        processors.push(unscoped());
        count::<T>(uow, &tenant_scoped(tenant_id, processors)?).await
    }

    async fn add(&self, uow: &mut UnitOfWork, entity: &T) -> Result<T, RepositoryError> {
        uow.ensure_writable()?;
        let statement = statement::insert(&T::SCHEMA, entity.values())?;
        uow.fetch_optional(statement)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, uow: &mut UnitOfWork, entity: &T) -> Result<T, RepositoryError> {
        uow.ensure_writable()?;
        let statement = statement::update_by_key(&T::SCHEMA, entity.id(), None, entity.values())?;
        uow.fetch_optional(statement)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update_for_tenant(&self, uow: &mut UnitOfWork, tenant_id: Uuid, entity: &T) -> Result<T, RepositoryError> {
        ensure_tenant(tenant_id)?;
        uow.ensure_writable()?;
        if T::SCHEMA.tenant_column.is_none() {
            return Err(RepositoryError::validation(format!(
                "`{}` is not tenant-owned",
                T::SCHEMA.table
            )));
        }
        let statement =
            statement::update_by_key(&T::SCHEMA, entity.id(), Some(tenant_id), entity.values())?;
        uow.fetch_optional(statement)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn save(&self, uow: &mut UnitOfWork, entity: &T) -> Result<T, RepositoryError> {
        uow.ensure_writable()?;
        let statement = statement::upsert(&T::SCHEMA, entity.values())?;
        uow.fetch_optional(statement).await?.ok_or_else(|| {
            RepositoryError::validation(format!(
                "`{}` row {} belongs to another tenant",
                T::SCHEMA.table,
                entity.id()
            ))
        })
    }

    async fn update_with_map(
        &self,
        uow: &mut UnitOfWork,
        changes: Changeset,
        processors: Vec<QueryProcessor>,
    ) -> Result<u64, RepositoryError> {
        let state = prepare::<T>(&processors)?;
        uow.execute(state.to_update(&T::SCHEMA, changes)?).await
    }

    async fn update_with_map_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        changes: Changeset,
        processors: Vec<QueryProcessor>,
    ) -> Result<u64, RepositoryError> {
        let state = prepare::<T>(&tenant_scoped(tenant_id, processors)?)?;
        uow.execute(state.to_update(&T::SCHEMA, changes)?).await
    }

    async fn soft_delete_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        id: Uuid,
        actor: Uuid,
    ) -> Result<(), RepositoryError> {
        if T::SCHEMA.soft_delete_column.is_none() {
            return Err(RepositoryError::validation(format!(
                "`{}` does not support soft delete",
                T::SCHEMA.table
            )));
        }
        let affected = Repository::<T>::update_with_map_for_tenant(
            self,
            uow,
            tenant_id,
            Changeset::soft_delete(actor),
            vec![by_primary_key(&T::SCHEMA, id)],
        )
        .await?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, uow: &mut UnitOfWork, processors: Vec<QueryProcessor>) -> Result<u64, RepositoryError> {
        let state = prepare::<T>(&processors)?;
        uow.execute(state.to_delete()?).await
    }

    async fn delete_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        processors: Vec<QueryProcessor>,
    ) -> Result<u64, RepositoryError> {
        let state = prepare::<T>(&tenant_scoped(tenant_id, processors)?)?;
        uow.execute(state.to_delete()?).await
    }

    async fn replace_associations(
        &self,
        uow: &mut UnitOfWork,
        owner: &T,
        association: &str,
        related_ids: &[Uuid],
    ) -> Result<(), RepositoryError> {
        let (join_table, owner_key, related_key) = many_to_many::<T>(association)?;
        uow.execute(statement::unlink_all(join_table, owner_key, owner.id()))
            .await?;
        if !related_ids.is_empty() {
            uow.execute(statement::link(join_table, owner_key, related_key, owner.id(), related_ids))
                .await?;
        }
        Ok(())
    }

    async fn remove_associations(
        &self,
        uow: &mut UnitOfWork,
        owner: &T,
        association: &str,
        related_ids: &[Uuid],
    ) -> Result<(), RepositoryError> {
        let (join_table, owner_key, related_key) = many_to_many::<T>(association)?;
        if related_ids.is_empty() {
            return Ok(());
        }
        uow.execute(statement::unlink(join_table, owner_key, related_key, owner.id(), related_ids))
            .await?;
        Ok(())
    }

    async fn does_record_exist(&self, uow: &mut UnitOfWork, processors: Vec<QueryProcessor>) -> Result<bool, RepositoryError> {
        Ok(count::<T>(uow, &processors).await? > 0)
    }

    async fn does_record_exist_for_tenant(
        &self,
        uow: &mut UnitOfWork,
        tenant_id: Uuid,
        processors: Vec<QueryProcessor>,
    ) -> Result<bool, RepositoryError> {
        Ok(count::<T>(uow, &tenant_scoped(tenant_id, processors)?).await? > 0)
    }
}
