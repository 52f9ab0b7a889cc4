//! Statement builders.
//!
//! Pure functions that assemble the statement text the gateway executes.
//! Field names are validated as identifiers and field values are always
//! placeholders. `WHERE`, `ORDER BY`, `LIMIT`, join and projection text is
//! taken verbatim: that text is the caller's trust boundary.

use crate::core::{GatewayError, Result};
use crate::filter::{validate_identifier, Where};
use crate::joins::CatalogJoin;
use rusqlite::types::Value;

/// `INSERT INTO <table> (<fields>) VALUES (?,...)`, one placeholder per field.
pub fn insert_sql(table: &str, fields: &[&str]) -> Result<String> {
    if fields.is_empty() {
        return Err(GatewayError::EmptyValues);
    }
    for field in fields {
        validate_identifier(field)?;
    }
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        fields.join(","),
        vec!["?"; fields.len()].join(",")
    ))
}

/// `UPDATE <table> SET f1=?,f2=? WHERE <predicate>`
pub fn update_sql(table: &str, fields: &[&str], predicate: &str) -> Result<String> {
    if fields.is_empty() {
        return Err(GatewayError::EmptyValues);
    }
    if predicate.is_empty() {
        return Err(GatewayError::MissingPredicate);
    }
    for field in fields {
        validate_identifier(field)?;
    }
    let assignments: Vec<String> = fields.iter().map(|f| format!("{}=?", f)).collect();
    Ok(format!("UPDATE {} SET {} WHERE {}", table, assignments.join(","), predicate))
}

/// `DELETE FROM <table> WHERE <predicate>`
pub fn delete_sql(table: &str, predicate: &str) -> Result<String> {
    if predicate.is_empty() {
        return Err(GatewayError::MissingPredicate);
    }
    Ok(format!("DELETE FROM {} WHERE {}", table, predicate))
}

/// `SELECT <fields> FROM <table> [<join>] [WHERE ..] [ORDER BY ..] [LIMIT ..]`
///
/// Absent or empty fragments are left out entirely and the remaining
/// segments are separated by exactly one space.
pub fn select_sql(
    table: &str,
    fields: &str,
    join: Option<&str>,
    predicate: Option<&str>,
    order: Option<&str>,
    limit: Option<&str>,
) -> String {
    let fields = if fields.is_empty() { "*" } else { fields };
    let mut segments = vec![format!("SELECT {} FROM {}", fields, table)];

    let present = |fragment: Option<&str>| fragment.filter(|f| !f.is_empty()).map(str::to_string);
    segments.extend(present(join));
    segments.extend(present(predicate).map(|p| format!("WHERE {}", p)));
    segments.extend(present(order).map(|o| format!("ORDER BY {}", o)));
    segments.extend(present(limit).map(|l| format!("LIMIT {}", l)));

    segments.join(" ")
}

/// The optional fragments of a read.
///
/// ```
/// use tablegate::sql::Select;
///
/// let select = Select::new().filter("id=5").order("nome").limit("10");
/// let (sql, params) = select.build("registro_pf").unwrap();
/// assert_eq!(sql, "SELECT * FROM registro_pf WHERE id=5 ORDER BY nome LIMIT 10");
/// assert!(params.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub join: Option<String>,
    pub filter: Option<Where>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub fields: String,
}

impl Default for Select {
    fn default() -> Self {
        Select {
            join: None,
            filter: None,
            order: None,
            limit: None,
            fields: "*".to_string(),
        }
    }
}

impl Select {
    pub fn new() -> Self {
        Select::default()
    }

    /// Uses a join chain from the catalog.
    pub fn join(self, join: CatalogJoin) -> Self {
        self.join_sql(join.sql())
    }

    /// Uses caller-written join text, verbatim.
    pub fn join_sql(mut self, join: impl Into<String>) -> Self {
        self.join = Some(join.into());
        self
    }

    /// Raw predicate text or a structured `Filter`.
    pub fn filter(mut self, filter: impl Into<Where>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Raw limit text, so `"20, 10"` offset forms pass through.
    pub fn limit(mut self, limit: impl Into<String>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    pub fn limit_rows(self, rows: u64) -> Self {
        self.limit(rows.to_string())
    }

    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = fields.into();
        self
    }

    /// Statement text for `table` and the values its filter binds.
    pub fn build(&self, table: &str) -> Result<(String, Vec<Value>)> {
        let (predicate, params) = match &self.filter {
            Some(filter) => filter.render()?,
            None => (String::new(), Vec::new()),
        };
        let sql = select_sql(
            table,
            &self.fields,
            self.join.as_deref(),
            Some(predicate.as_str()),
            self.order.as_deref(),
            self.limit.as_deref(),
        );
        Ok((sql, params))
    }
}
