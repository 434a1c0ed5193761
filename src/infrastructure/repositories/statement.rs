//! Statement Rendering
//!
//! Turns a [`QueryState`] (or an entity's values) into Postgres SQL with
//! numbered `$n` placeholders and the matching bind values.

use sqlx::postgres::PgArguments;
use uuid::Uuid;

use super::error::RepositoryError;
use super::query::{Fragment, Preload, QueryState};
use super::schema::{AssociationKind, EntitySchema};
use super::value::{Changeset, Value};

/// Rendered SQL plus its bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub values: Vec<Value>,
}

impl Statement {
    pub(crate) fn into_parts(self) -> Result<(String, PgArguments), RepositoryError> {
        let mut arguments = PgArguments::default();
        for value in self.values {
            value.add_to(&mut arguments)?;
        }
        Ok((self.sql, arguments))
    }
}

/// Double-quote an identifier.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn qualify(table: &str, column: &str) -> String {
    format!("{}.{}", quote_ident(table), quote_ident(column))
}

#[derive(Default)]
struct SqlWriter {
    sql: String,
    values: Vec<Value>,
}

impl SqlWriter {
    fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    fn push_bind(&mut self, value: Value) {
        self.values.push(value);
        self.sql.push_str(&format!("${}", self.values.len()));
    }

    fn push_fragment(&mut self, fragment: &Fragment) {
        let mut args = fragment.args.iter().cloned();
        let mut in_quote = false;
        let mut chars = fragment.sql.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\'' => {
                    in_quote = !in_quote;
                    self.sql.push(c);
                }
                '?' if !in_quote => {
                    if chars.peek() == Some(&'?') {
                        chars.next();
                        self.sql.push('?');
                    } else if let Some(value) = args.next() {
                        self.push_bind(value);
                    } else {
                        self.sql.push('?');
                    }
                }
                _ => self.sql.push(c),
            }
        }
    }

    fn push_joined(&mut self, fragments: &[Fragment], separator: &str) {
        for (i, fragment) in fragments.iter().enumerate() {
            if i > 0 {
                self.push(separator);
            }
            self.push("(");
            self.push_fragment(fragment);
            self.push(")");
        }
    }

    fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            values: self.values,
        }
    }
}

impl QueryState {
    /// WHERE predicates in render order: tenant, soft-delete scope, caller filters.
    fn predicates(&self) -> Vec<Fragment> {
        let mut predicates = Vec::with_capacity(self.filters.len() + 2);
        if let Some((column, tenant_id)) = self.tenant {
            predicates.push(Fragment::new(
                format!("{} = ?", qualify(&self.table, column)),
                vec![Value::from(tenant_id)],
            ));
        }
        if !self.unscoped {
            if let Some(column) = self.soft_delete_column {
                predicates.push(Fragment::raw(format!(
                    "{} IS NULL",
                    qualify(&self.table, column)
                )));
            }
        }
        predicates.extend(self.filters.iter().cloned());
        predicates
    }

    fn push_from_clause(&self, w: &mut SqlWriter) {
        w.push(" FROM ");
        w.push(&quote_ident(&self.table));
        for join in &self.joins {
            w.push(" ");
            w.push_fragment(join);
        }
        let predicates = self.predicates();
        if !predicates.is_empty() {
            w.push(" WHERE ");
            w.push_joined(&predicates, " AND ");
        }
        if !self.group_by.is_empty() {
            w.push(" GROUP BY ");
            w.push(&self.group_by.join(", "));
        }
        if !self.having.is_empty() {
            w.push(" HAVING ");
            w.push_joined(&self.having, " AND ");
        }
    }

    fn push_preload(&self, w: &mut SqlWriter, preload: &Preload) {
        let association = &preload.association;
        let alias = quote_ident(&format!("{}_preload", association.name));
        let related = quote_ident(association.table);
        let owner_key = qualify(&self.table, self.primary_key);

        match association.kind {
            AssociationKind::BelongsTo { foreign_key } => {
                w.push(&format!(
                    "(SELECT row_to_json({alias}) FROM {related} AS {alias} WHERE {alias}.\"id\" = {}",
                    qualify(&self.table, foreign_key)
                ));
            }
            AssociationKind::HasMany { foreign_key } => {
                w.push(&format!(
                    "(SELECT COALESCE(json_agg({alias}), '[]'::json) FROM {related} AS {alias} WHERE {alias}.{} = {owner_key}",
                    quote_ident(foreign_key)
                ));
            }
            AssociationKind::ManyToMany {
                join_table,
                owner_key: link_owner,
                related_key,
            } => {
                w.push(&format!(
                    "(SELECT COALESCE(json_agg({alias}), '[]'::json) FROM {related} AS {alias} WHERE {alias}.\"id\" IN (SELECT {} FROM {} WHERE {} = {owner_key})",
                    qualify(join_table, related_key),
                    quote_ident(join_table),
                    qualify(join_table, link_owner),
                ));
            }
        }

        if let Some(column) = association.soft_delete_column {
            w.push(&format!(" AND {alias}.{} IS NULL", quote_ident(column)));
        }
        if let Some(condition) = &preload.condition {
            w.push(" AND (");
            w.push_fragment(condition);
            w.push(")");
        }
        w.push(") AS ");
        w.push(&quote_ident(association.name));
    }

    /// Render the row query.
    pub fn to_select(&self) -> Statement {
        let mut w = SqlWriter::default();
        w.push("SELECT ");
        if !self.distinct.is_empty() {
            w.push("DISTINCT ");
            w.push(&self.distinct.join(", "));
        } else if !self.select.is_empty() {
            w.push(&self.select.join(", "));
        } else {
            w.push(&format!("{}.*", quote_ident(&self.table)));
        }
        for preload in &self.preloads {
            w.push(", ");
            self.push_preload(&mut w, preload);
        }

        self.push_from_clause(&mut w);

        if !self.order_by.is_empty() {
            w.push(" ORDER BY ");
            w.push(&self.order_by.join(", "));
        }
        if let Some(limit) = self.limit {
            w.push(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            w.push(&format!(" OFFSET {}", offset));
        }
        w.finish()
    }

    /// Render `COUNT(*)` over the same filters, ignoring ordering and paging.
    pub fn to_count(&self) -> Statement {
        let mut w = SqlWriter::default();
        w.push("SELECT COUNT(*) FROM (SELECT ");
        if self.distinct.is_empty() {
            w.push("1");
        } else {
            w.push("DISTINCT ");
            w.push(&self.distinct.join(", "));
        }
        self.push_from_clause(&mut w);
        w.push(") AS \"counted\"");
        w.finish()
    }

    /// Render a partial UPDATE of the rows this state selects.
    pub fn to_update(&self, schema: &EntitySchema, changes: Changeset) -> Result<Statement, RepositoryError> {
        if changes.is_empty() {
            return Err(RepositoryError::validation("no columns to update"));
        }
        if let Some(tenant_column) = schema.tenant_column {
            if changes.contains(tenant_column) {
                return Err(RepositoryError::validation("tenant id cannot be changed"));
            }
        }
        if changes.contains(schema.primary_key) {
            return Err(RepositoryError::validation("primary key cannot be changed"));
        }
        if !self.joins.is_empty() {
            return Err(RepositoryError::validation("joins are not supported in updates"));
        }
        if !self.has_predicates() {
            return Err(RepositoryError::MissingWhereClause("update"));
        }

        let mut w = SqlWriter::default();
        w.push("UPDATE ");
        w.push(&quote_ident(&self.table));
        w.push(" SET ");
        for (i, (column, value)) in changes.into_columns().into_iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push(&quote_ident(&column));
            w.push(" = ");
            w.push_bind(value);
        }
        w.push(" WHERE ");
        w.push_joined(&self.predicates(), " AND ");
        Ok(w.finish())
    }

    /// Render a hard DELETE of the rows this state selects, soft-deleted
    /// rows included.
    pub fn to_delete(&self) -> Result<Statement, RepositoryError> {
        if !self.joins.is_empty() {
            return Err(RepositoryError::validation("joins are not supported in deletes"));
        }
        if !self.has_predicates() {
            return Err(RepositoryError::MissingWhereClause("delete"));
        }

        let mut hard = self.clone();
        hard.unscoped = true;

        let mut w = SqlWriter::default();
        w.push("DELETE FROM ");
        w.push(&quote_ident(&self.table));
        w.push(" WHERE ");
        w.push_joined(&hard.predicates(), " AND ");
        Ok(w.finish())
    }
}

fn push_insert(w: &mut SqlWriter, schema: &EntitySchema, values: Vec<(&'static str, Value)>) {
    let columns: Vec<String> = values.iter().map(|(c, _)| quote_ident(c)).collect();
    w.push("INSERT INTO ");
    w.push(&quote_ident(schema.table));
    w.push(" (");
    w.push(&columns.join(", "));
    w.push(") VALUES (");
    for (i, (_, value)) in values.into_iter().enumerate() {
        if i > 0 {
            w.push(", ");
        }
        w.push_bind(value);
    }
    w.push(")");
}

/// `INSERT ... RETURNING *`.
pub fn insert(schema: &EntitySchema, values: Vec<(&'static str, Value)>) -> Result<Statement, RepositoryError> {
    if values.is_empty() {
        return Err(RepositoryError::validation("no columns to insert"));
    }
    let mut w = SqlWriter::default();
    push_insert(&mut w, schema, values);
    w.push(" RETURNING *");
    Ok(w.finish())
}

/// Rewrite every updatable column of one live row, keyed by primary key
/// and, when given, tenant.
pub fn update_by_key(
    schema: &EntitySchema,
    id: Uuid,
    tenant_id: Option<Uuid>,
    values: Vec<(&'static str, Value)>,
) -> Result<Statement, RepositoryError> {
    let assignments: Vec<(&'static str, Value)> = values
        .into_iter()
        .filter(|(column, _)| schema.is_updatable(column))
        .collect();
    if assignments.is_empty() {
        return Err(RepositoryError::validation("no updatable columns"));
    }

    let mut state = QueryState::for_schema(schema);
    state.filters.push(Fragment::new(
        format!("{} = ?", qualify(schema.table, schema.primary_key)),
        vec![Value::from(id)],
    ));
    if let (Some(column), Some(tenant_id)) = (schema.tenant_column, tenant_id) {
        state.tenant = Some((column, tenant_id));
    }

    let mut w = SqlWriter::default();
    w.push("UPDATE ");
    w.push(&quote_ident(schema.table));
    w.push(" SET ");
    for (i, (column, value)) in assignments.into_iter().enumerate() {
        if i > 0 {
            w.push(", ");
        }
        w.push(&quote_ident(column));
        w.push(" = ");
        w.push_bind(value);
    }
    w.push(" WHERE ");
    w.push_joined(&state.predicates(), " AND ");
    w.push(" RETURNING *");
    Ok(w.finish())
}

/// Upsert by primary key. An existing row owned by another tenant is left
/// untouched and nothing is returned.
pub fn upsert(schema: &EntitySchema, values: Vec<(&'static str, Value)>) -> Result<Statement, RepositoryError> {
    if values.is_empty() {
        return Err(RepositoryError::validation("no columns to insert"));
    }
    let updates: Vec<String> = values
        .iter()
        .filter(|(column, _)| schema.is_updatable(column))
        .map(|(column, _)| format!("{0} = EXCLUDED.{0}", quote_ident(column)))
        .collect();

    let mut w = SqlWriter::default();
    push_insert(&mut w, schema, values);
    w.push(" ON CONFLICT (");
    w.push(&quote_ident(schema.primary_key));
    if updates.is_empty() {
        w.push(") DO NOTHING");
    } else {
        w.push(") DO UPDATE SET ");
        w.push(&updates.join(", "));
        if let Some(column) = schema.tenant_column {
            w.push(&format!(
                " WHERE {} = EXCLUDED.{}",
                qualify(schema.table, column),
                quote_ident(column)
            ));
        }
    }
    w.push(" RETURNING *");
    Ok(w.finish())
}

/// Remove every link of `owner_id` from a join table.
pub fn unlink_all(join_table: &str, owner_key: &str, owner_id: Uuid) -> Statement {
    let mut w = SqlWriter::default();
    w.push(&format!(
        "DELETE FROM {} WHERE {} = ",
        quote_ident(join_table),
        quote_ident(owner_key)
    ));
    w.push_bind(Value::from(owner_id));
    w.finish()
}

/// Link `owner_id` to each of `related_ids`, ignoring existing links.
pub fn link(join_table: &str, owner_key: &str, related_key: &str, owner_id: Uuid, related_ids: &[Uuid]) -> Statement {
    let mut w = SqlWriter::default();
    w.push(&format!(
        "INSERT INTO {} ({}, {}) SELECT ",
        quote_ident(join_table),
        quote_ident(owner_key),
        quote_ident(related_key)
    ));
    w.push_bind(Value::from(owner_id));
    w.push(", UNNEST(");
    w.push_bind(Value::from(related_ids));
    w.push("::uuid[]) ON CONFLICT DO NOTHING");
    w.finish()
}

/// Remove the links from `owner_id` to each of `related_ids`.
pub fn unlink(join_table: &str, owner_key: &str, related_key: &str, owner_id: Uuid, related_ids: &[Uuid]) -> Statement {
    let mut w = SqlWriter::default();
    w.push(&format!(
        "DELETE FROM {} WHERE {} = ",
        quote_ident(join_table),
        quote_ident(owner_key)
    ));
    w.push_bind(Value::from(owner_id));
    w.push(&format!(" AND {} = ANY(", quote_ident(related_key)));
    w.push_bind(Value::from(related_ids));
    w.push(")");
    w.finish()
}
