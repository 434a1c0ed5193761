//! Query Processors
//!
//! A [`QueryProcessor`] is one composable mutation of a [`QueryState`]:
//! a filter, a join, an ordering, pagination, a preload. Repository calls
//! take a list of processors and fold them left to right, each one seeing
//! the cumulative state built by the ones before it.
//!
//! ```rust,ignore
//! let total = TotalCount::new();
//! let talents: Vec<Talent> = repo
//!     .get_all_for_tenant(&mut uow, tenant_id, vec![
//!         filter("talents.city = ?", args!["Pune"]),
//!         order_by("talents.first_name", false),
//!         paginate(20, 0, Some(&total)),
//!     ])
//!     .await?;
//! ```
//!
//! Order matters: [`paginate`] snapshots the filters applied *before* it
//! to compute the total, so filters that should affect the total must come
//! first in the list.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use super::error::RepositoryError;
use super::schema::{Association, EntitySchema};
use super::value::Value;

/// A SQL fragment with `?` placeholders and its positional arguments.
///
/// `??` stands for a literal `?`; question marks inside single-quoted
/// string literals are not placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Fragment {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// A fragment without arguments.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    /// Verify the placeholder count matches the argument count.
    pub fn check(&self) -> Result<(), RepositoryError> {
        let expected = placeholder_count(&self.sql);
        if expected != self.args.len() {
            return Err(RepositoryError::validation(format!(
                "`{}` expects {} argument(s), got {}",
                self.sql,
                expected,
                self.args.len()
            )));
        }
        Ok(())
    }
}

/// Count `?` placeholders, skipping `??` and quoted literals.
pub(crate) fn placeholder_count(sql: &str) -> usize {
    let mut count = 0;
    let mut in_quote = false;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => in_quote = !in_quote,
            '?' if !in_quote => {
                if chars.peek() == Some(&'?') {
                    chars.next();
                } else {
                    count += 1;
                }
            }
            _ => {}
        }
    }
    count
}

/// Shared slot receiving the total row count computed by [`paginate`].
#[derive(Debug, Clone, Default)]
pub struct TotalCount(Arc<AtomicI64>);

impl TotalCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn set(&self, total: i64) {
        self.0.store(total, Ordering::Release);
    }
}

/// An association to fetch eagerly, with an optional extra condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Preload {
    pub association: Association,
    pub condition: Option<Fragment>,
}

/// Count query captured by [`paginate`] before limit/offset were applied.
#[derive(Debug, Clone)]
pub(crate) struct CountRequest {
    pub(crate) target: TotalCount,
    pub(crate) snapshot: Box<QueryState>,
}

/// Accumulated query-builder state for one entity table.
#[derive(Debug, Clone)]
pub struct QueryState {
    pub(crate) table: String,
    pub(crate) primary_key: &'static str,
    pub(crate) soft_delete_column: Option<&'static str>,
    pub(crate) unscoped: bool,
    pub(crate) tenant: Option<(&'static str, Uuid)>,
    pub(crate) select: Vec<String>,
    pub(crate) distinct: Vec<String>,
    pub(crate) joins: Vec<Fragment>,
    pub(crate) filters: Vec<Fragment>,
    pub(crate) group_by: Vec<String>,
    pub(crate) having: Vec<Fragment>,
    pub(crate) order_by: Vec<String>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
    pub(crate) preloads: Vec<Preload>,
    pub(crate) count: Option<CountRequest>,
}

impl QueryState {
    /// Initial state for a schema: its table, soft-delete scoping on.
    pub fn for_schema(schema: &EntitySchema) -> Self {
        Self {
            table: schema.table.to_string(),
            primary_key: schema.primary_key,
            soft_delete_column: schema.soft_delete_column,
            unscoped: false,
            tenant: None,
            select: Vec::new(),
            distinct: Vec::new(),
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            preloads: Vec::new(),
            count: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn tenant(&self) -> Option<Uuid> {
        self.tenant.map(|(_, id)| id)
    }

    pub fn filters(&self) -> &[Fragment] {
        &self.filters
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    pub fn preloads(&self) -> &[Preload] {
        &self.preloads
    }

    pub fn is_unscoped(&self) -> bool {
        self.unscoped
    }

    /// Whether the state restricts rows beyond the default soft-delete scope.
    pub fn has_predicates(&self) -> bool {
        self.tenant.is_some() || !self.filters.is_empty()
    }

    pub(crate) fn take_count_request(&mut self) -> Option<CountRequest> {
        self.count.take()
    }
}

type ProcessorFn =
    dyn Fn(QueryState, &EntitySchema) -> Result<QueryState, RepositoryError> + Send + Sync;

/// One composable query mutation. The default value is a no-op.
#[derive(Clone, Default)]
pub struct QueryProcessor(Option<Arc<ProcessorFn>>);

impl QueryProcessor {
    pub fn new<F>(apply: F) -> Self
    where
        F: Fn(QueryState, &EntitySchema) -> Result<QueryState, RepositoryError>
            + Send
            + Sync
            + 'static,
    {
        Self(Some(Arc::new(apply)))
    }

    /// The nil processor; skipped when folded.
    pub const fn none() -> Self {
        Self(None)
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn apply(&self, state: QueryState, schema: &EntitySchema) -> Result<QueryState, RepositoryError> {
        match &self.0 {
            Some(apply) => apply(state, schema),
            None => Ok(state),
        }
    }
}

impl From<Option<QueryProcessor>> for QueryProcessor {
    fn from(processor: Option<QueryProcessor>) -> Self {
        processor.unwrap_or_default()
    }
}

impl fmt::Debug for QueryProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("QueryProcessor(..)"),
            None => f.write_str("QueryProcessor(none)"),
        }
    }
}

/// Fold `processors` over `state`, stopping at the first error.
pub fn execute_query_processors(
    state: QueryState,
    schema: &EntitySchema,
    processors: &[QueryProcessor],
) -> Result<QueryState, RepositoryError> {
    processors
        .iter()
        .try_fold(state, |state, processor| processor.apply(state, schema))
}

/// Restrict rows to one tenant. Rendered ahead of every other predicate.
pub fn scope_to_tenant(tenant_id: Uuid) -> QueryProcessor {
    QueryProcessor::new(move |mut state, schema| {
        if tenant_id.is_nil() {
            return Err(RepositoryError::validation("tenant id must not be nil"));
        }
        let column = schema.tenant_column.ok_or_else(|| {
            RepositoryError::validation(format!("`{}` is not tenant-owned", schema.table))
        })?;
        if let Some((_, existing)) = state.tenant {
            if existing != tenant_id {
                return Err(RepositoryError::validation(
                    "query is already scoped to another tenant",
                ));
            }
        }
        state.tenant = Some((column, tenant_id));
        Ok(state)
    })
}

/// Append a WHERE predicate. Predicates are AND-ed, each in parentheses.
pub fn filter(condition: impl Into<String>, args: Vec<Value>) -> QueryProcessor {
    let fragment = Fragment::new(condition, args);
    QueryProcessor::new(move |mut state, _| {
        fragment.check()?;
        state.filters.push(fragment.clone());
        Ok(state)
    })
}

/// [`filter`] when `apply` holds, otherwise the nil processor.
pub fn filter_if(apply: bool, condition: impl Into<String>, args: Vec<Value>) -> QueryProcessor {
    if apply {
        filter(condition, args)
    } else {
        QueryProcessor::none()
    }
}

/// Append a join clause, e.g. `JOIN courses ON courses.id = batches.course_id`.
pub fn join(clause: impl Into<String>, args: Vec<Value>) -> QueryProcessor {
    let fragment = Fragment::new(clause, args);
    QueryProcessor::new(move |mut state, _| {
        fragment.check()?;
        state.joins.push(fragment.clone());
        Ok(state)
    })
}

/// Append an ordering expression; `reorder` discards earlier ones first.
pub fn order_by(expression: impl Into<String>, reorder: bool) -> QueryProcessor {
    let expression = expression.into();
    QueryProcessor::new(move |mut state, _| {
        if reorder {
            state.order_by.clear();
        }
        if !expression.trim().is_empty() {
            state.order_by.push(expression.clone());
        }
        Ok(state)
    })
}

pub fn group_by(columns: &[&str]) -> QueryProcessor {
    let columns = to_owned(columns);
    QueryProcessor::new(move |mut state, _| {
        state.group_by.extend(columns.iter().cloned());
        Ok(state)
    })
}

pub fn having(condition: impl Into<String>, args: Vec<Value>) -> QueryProcessor {
    let fragment = Fragment::new(condition, args);
    QueryProcessor::new(move |mut state, _| {
        fragment.check()?;
        state.having.push(fragment.clone());
        Ok(state)
    })
}

/// Restrict the returned columns.
pub fn select(fields: &[&str]) -> QueryProcessor {
    let fields = to_owned(fields);
    QueryProcessor::new(move |mut state, _| {
        state.select = fields.clone();
        Ok(state)
    })
}

/// `SELECT DISTINCT` over the given columns.
pub fn distinct(columns: &[&str]) -> QueryProcessor {
    let columns = to_owned(columns);
    QueryProcessor::new(move |mut state, _| {
        state.distinct = columns.clone();
        Ok(state)
    })
}

/// Page the result: `LIMIT limit OFFSET limit * offset`.
///
/// `offset` is a page index. `limit == -1` disables paging. When `total`
/// is given, the filters accumulated so far are captured as the count
/// query before limit/offset are applied.
pub fn paginate(limit: i64, offset: i64, total: Option<&TotalCount>) -> QueryProcessor {
    let total = total.cloned();
    QueryProcessor::new(move |mut state, _| {
        if limit < -1 {
            return Err(RepositoryError::validation(format!("invalid limit {}", limit)));
        }
        if offset < 0 {
            return Err(RepositoryError::validation(format!("invalid offset {}", offset)));
        }

        if let Some(target) = &total {
            let mut snapshot = state.clone();
            snapshot.count = None;
            snapshot.limit = None;
            snapshot.offset = None;
            state.count = Some(CountRequest {
                target: target.clone(),
                snapshot: Box::new(snapshot),
            });
        }

        if limit != -1 {
            let skip = limit
                .checked_mul(offset)
                .ok_or_else(|| RepositoryError::validation("offset out of range"))?;
            state.limit = Some(limit);
            state.offset = Some(skip);
        }
        Ok(state)
    })
}

/// Eagerly fetch the named associations.
pub fn preload_associations(names: &[&str]) -> QueryProcessor {
    let names = to_owned(names);
    QueryProcessor::new(move |mut state, schema| {
        for name in &names {
            let association = lookup_association(schema, name)?;
            push_preload(&mut state, association, None);
        }
        Ok(state)
    })
}

/// Eagerly fetch associations, each restricted by an extra condition on
/// the related table.
pub fn preload_with_condition<I, S>(conditions: I) -> QueryProcessor
where
    I: IntoIterator<Item = (S, Fragment)>,
    S: Into<String>,
{
    let conditions: Vec<(String, Fragment)> = conditions
        .into_iter()
        .map(|(name, fragment)| (name.into(), fragment))
        .collect();
    QueryProcessor::new(move |mut state, schema| {
        for (name, condition) in &conditions {
            let association = lookup_association(schema, name)?;
            condition.check()?;
            push_preload(&mut state, association, Some(condition.clone()));
        }
        Ok(state)
    })
}

/// Read from `name` instead of the entity's own table.
pub fn table(name: impl Into<String>) -> QueryProcessor {
    let name = name.into();
    QueryProcessor::new(move |mut state, _| {
        state.table = name.clone();
        Ok(state)
    })
}

/// Include soft-deleted rows.
pub fn unscoped() -> QueryProcessor {
    QueryProcessor::new(|mut state, _| {
        state.unscoped = true;
        Ok(state)
    })
}

fn lookup_association(schema: &EntitySchema, name: &str) -> Result<Association, RepositoryError> {
    schema
        .association(name)
        .copied()
        .ok_or_else(|| RepositoryError::UnknownAssociation {
            table: schema.table,
            association: name.to_string(),
        })
}

fn push_preload(state: &mut QueryState, association: Association, condition: Option<Fragment>) {
    state.preloads.retain(|p| p.association.name != association.name);
    state.preloads.push(Preload {
        association,
        condition,
    });
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
