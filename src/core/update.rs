//! Partial update builder.
//!
//! A PUT/PATCH body is a sparse JSON object. Each entity declares a fixed table of
//! [`FieldRule`]s naming the columns that may change and the rule deciding whether a
//! supplied value counts. [`UpdateBuilder`] turns the qualifying fields into a single
//! parameterised `UPDATE ... RETURNING` statement, and [`apply_partial_update`] runs
//! it inside a transaction that is committed only once a row comes back.
//!
//! Column names reach the SQL text only from `&'static str` rule tables; every value,
//! including the record identifier, is a bound parameter.

use crate::core::fields::{Payload, is_truthy};
use crate::errors::{Error, Result};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityName, EntityTrait, FromQueryResult,
    IdenStatic, Iterable, Statement, TransactionTrait, Value,
};
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument};

/// Primary key column shared by every storefront table.
pub const ID_COLUMN: &str = "id";

/// When a supplied value is allowed into the update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    /// Only non-empty / non-falsy values; `""` and `null` leave the column alone.
    Truthy,
    /// Any supplied key, including `null`, `0` and `false`.
    Present,
    /// Only numbers strictly greater than zero.
    Positive,
}

/// Storage type a supplied value is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Bound as a nullable string
    Text,
    /// Bound as a 32-bit integer
    Integer,
    /// Bound as a double
    Float,
    /// Bound as a non-null boolean
    Bool,
}

impl ValueKind {
    fn null(self) -> Value {
        match self {
            Self::Text => Value::from(None::<String>),
            Self::Integer => Value::from(None::<i32>),
            Self::Float => Value::from(None::<f64>),
            Self::Bool => Value::from(None::<bool>),
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::Text => "a string",
            Self::Integer => "an integer",
            Self::Float => "a number",
            Self::Bool => "a boolean",
        }
    }
}

/// One updatable column and its inclusion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Column name, also the payload key
    pub column: &'static str,
    /// When a supplied value is used
    pub inclusion: Inclusion,
    /// How the value is bound
    pub kind: ValueKind,
}

impl FieldRule {
    #[must_use]
    pub const fn truthy(column: &'static str, kind: ValueKind) -> Self {
        Self {
            column,
            inclusion: Inclusion::Truthy,
            kind,
        }
    }

    #[must_use]
    pub const fn present(column: &'static str, kind: ValueKind) -> Self {
        Self {
            column,
            inclusion: Inclusion::Present,
            kind,
        }
    }

    #[must_use]
    pub const fn positive(column: &'static str) -> Self {
        Self {
            column,
            inclusion: Inclusion::Positive,
            kind: ValueKind::Float,
        }
    }

    /// Whether the candidate (the payload entry for this column, if any) qualifies.
    #[must_use]
    pub fn includes(&self, candidate: Option<&JsonValue>) -> bool {
        match (self.inclusion, candidate) {
            (_, None) => false,
            (Inclusion::Truthy, Some(value)) => is_truthy(value),
            (Inclusion::Present, Some(_)) => true,
            (Inclusion::Positive, Some(value)) => value.as_f64().is_some_and(|n| n > 0.0),
        }
    }

    /// Converts a qualifying JSON value into a typed bind parameter.
    ///
    /// Flags are stored as non-null columns, so a `null` flag is rejected.
    pub fn bind(&self, value: &JsonValue) -> Result<Value> {
        let bound = match (self.kind, value) {
            (ValueKind::Bool, JsonValue::Null) => None,
            (kind, JsonValue::Null) => Some(kind.null()),
            (ValueKind::Text, JsonValue::String(s)) => Some(Value::from(s.clone())),
            (ValueKind::Integer, JsonValue::Number(n)) => {
                n.as_i64().and_then(|i| i32::try_from(i).ok()).map(Value::from)
            }
            (ValueKind::Float, JsonValue::Number(n)) => n.as_f64().map(Value::from),
            (ValueKind::Bool, JsonValue::Bool(b)) => Some(Value::from(*b)),
            _ => None,
        };
        bound.ok_or_else(|| {
            Error::validation(format!(
                "Field '{}' must be {}",
                self.column,
                self.kind.describe()
            ))
        })
    }
}

/// Evaluates a rule table against a payload, in rule order.
///
/// Keys outside the table are ignored. The result holds one `(column, value)` pair
/// per qualifying rule and may be empty.
pub fn collect_assignments(
    rules: &[FieldRule],
    payload: &Payload,
) -> Result<Vec<(&'static str, Value)>> {
    let mut assignments = Vec::new();
    for rule in rules {
        let candidate = payload.get(rule.column);
        if rule.includes(candidate) {
            if let Some(value) = candidate {
                assignments.push((rule.column, rule.bind(value)?));
            }
        }
    }
    Ok(assignments)
}

/// Ordered `(column, value)` assignments for one `UPDATE` statement.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    assignments: Vec<(&'static str, Value)>,
    stamps: Vec<(&'static str, Value)>,
}

impl UpdateBuilder {
    /// Starts an empty update against `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            stamps: Vec::new(),
        }
    }

    /// Adds a caller-driven assignment.
    pub fn set(&mut self, column: &'static str, value: Value) -> &mut Self {
        debug_assert!(is_identifier(column), "invalid column name {column:?}");
        self.assignments.push((column, value));
        self
    }

    /// Adds a bookkeeping assignment (e.g. a modification time).
    ///
    /// Stamps are written with every update but do not count as supplied fields.
    pub fn touch(&mut self, column: &'static str, value: Value) -> &mut Self {
        debug_assert!(is_identifier(column), "invalid column name {column:?}");
        self.stamps.push((column, value));
        self
    }

    /// Adds every field of `payload` that qualifies under `rules`.
    pub fn apply(&mut self, rules: &[FieldRule], payload: &Payload) -> Result<&mut Self> {
        for (column, value) in collect_assignments(rules, payload)? {
            self.set(column, value);
        }
        Ok(self)
    }

    /// Whether no caller-supplied field qualified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Columns that will be assigned, in statement order.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.assignments
            .iter()
            .chain(self.stamps.iter())
            .map(|(column, _)| *column)
    }

    /// Renders `UPDATE <table> SET ... WHERE id = <p> RETURNING ...` for `backend`.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] when no caller-supplied field qualified.
    pub fn build<S: AsRef<str>>(
        self,
        backend: DatabaseBackend,
        id: Value,
        returning: &[S],
    ) -> Result<Statement> {
        if self.is_empty() {
            return Err(Error::validation("No fields to update"));
        }

        let mut set_clauses = Vec::with_capacity(self.assignments.len() + self.stamps.len());
        let mut values = Vec::with_capacity(set_clauses.capacity() + 1);
        for (column, value) in self.assignments.into_iter().chain(self.stamps) {
            values.push(value);
            set_clauses.push(format!(
                "{} = {}",
                quote(backend, column),
                placeholder(backend, values.len())
            ));
        }
        values.push(id);

        let returning = returning
            .iter()
            .map(|column| quote(backend, column.as_ref()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
            quote(backend, &self.table),
            set_clauses.join(", "),
            quote(backend, ID_COLUMN),
            placeholder(backend, values.len()),
            returning
        );

        Ok(Statement::from_sql_and_values(backend, sql, values))
    }
}

/// Per-entity description of what a partial update may touch.
pub trait PartialUpdate: EntityTrait {
    /// Name used in "not found" messages.
    const RESOURCE: &'static str;

    /// Updatable columns, in the order they appear in the statement.
    const RULES: &'static [FieldRule];

    /// Bookkeeping assignments written with every update.
    fn stamps() -> Vec<(&'static str, Value)> {
        Vec::new()
    }
}

/// Applies the qualifying fields of `payload` to the row identified by `id`.
///
/// Returns the full post-update row. Fails with [`Error::Validation`] before any
/// statement is issued when no field qualifies, and with [`Error::NotFound`] when no
/// row has that identifier; in both cases nothing is written.
#[instrument(skip(db, rules, payload), fields(resource = E::RESOURCE))]
pub async fn apply_partial_update<E>(
    db: &DatabaseConnection,
    id: Value,
    rules: &[FieldRule],
    payload: &Payload,
) -> Result<E::Model>
where
    E: PartialUpdate,
{
    let mut builder = UpdateBuilder::new(E::default().table_name());
    builder.apply(rules, payload)?;
    for (column, value) in E::stamps() {
        builder.touch(column, value);
    }
    debug!(columns = ?builder.columns().collect::<Vec<_>>(), "Building partial update");

    let returning: Vec<String> = E::Column::iter()
        .map(|column| column.as_str().to_owned())
        .collect();
    let statement = builder.build(db.get_database_backend(), id, &returning)?;

    let txn = db.begin().await?;
    let Some(row) = txn.query_one(statement).await? else {
        txn.rollback().await?;
        return Err(Error::not_found(E::RESOURCE));
    };
    let model = E::Model::from_query_result(&row, "")?;
    txn.commit().await?;

    info!("{} updated", E::RESOURCE);
    Ok(model)
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn quote(backend: DatabaseBackend, identifier: &str) -> String {
    match backend {
        DatabaseBackend::MySql => format!("`{identifier}`"),
        DatabaseBackend::Postgres | DatabaseBackend::Sqlite => format!("\"{identifier}\""),
    }
}

fn placeholder(backend: DatabaseBackend, position: usize) -> String {
    match backend {
        DatabaseBackend::Postgres => format!("${position}"),
        DatabaseBackend::MySql | DatabaseBackend::Sqlite => "?".to_string(),
    }
}
