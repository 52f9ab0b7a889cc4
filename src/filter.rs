//! Predicates for reads, updates and deletes.
//!
//! A `Where` is either raw SQL text or a structured `Filter`. Raw text is
//! copied into the statement verbatim, so it must come from trusted code,
//! never from user input. A `Filter` only accepts plain identifiers for
//! field names and binds every value as a parameter.

use crate::core::{GatewayError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("identifier pattern is valid")
});

/// Checks that `name` is a bare or table-qualified identifier.
pub fn validate_identifier(name: &str) -> Result<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(GatewayError::InvalidIdentifier(name.to_string()))
    }
}

/// Comparison operators a `Filter` condition can use
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    In,
    IsNull,
    IsNotNull,
}

impl Operator {
    fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Operator,
    pub values: Vec<Value>,
}

impl Condition {
    fn render(&self) -> Result<String> {
        validate_identifier(&self.field)?;
        Ok(match self.op {
            Operator::IsNull | Operator::IsNotNull => format!("{} {}", self.field, self.op.as_sql()),
            // `IN ()` is a syntax error; an empty list matches nothing.
            Operator::In if self.values.is_empty() => "1=0".to_string(),
            Operator::In => format!("{} IN ({})", self.field, vec!["?"; self.values.len()].join(",")),
            op => format!("{} {} ?", self.field, op.as_sql()),
        })
    }
}

/// Conditions joined with `AND`, each value bound as a parameter.
///
/// ```
/// use tablegate::filter::Filter;
///
/// let (sql, params) = Filter::new().eq("id", 5).like("nome", "Ana%").render().unwrap();
/// assert_eq!(sql, "id = ? AND nome LIKE ?");
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    fn push(mut self, field: &str, op: Operator, values: Vec<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.to_string(),
            op,
            values,
        });
        self
    }

    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Operator::Eq, vec![value.into()])
    }

    pub fn not_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Operator::NotEq, vec![value.into()])
    }

    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Operator::Lt, vec![value.into()])
    }

    pub fn lt_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Operator::LtEq, vec![value.into()])
    }

    pub fn gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Operator::Gt, vec![value.into()])
    }

    pub fn gt_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Operator::GtEq, vec![value.into()])
    }

    pub fn like(self, field: &str, pattern: &str) -> Self {
        self.push(field, Operator::Like, vec![Value::Text(pattern.to_string())])
    }

    pub fn is_in<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(field, Operator::In, values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(self, field: &str) -> Self {
        self.push(field, Operator::IsNull, Vec::new())
    }

    pub fn is_not_null(self, field: &str) -> Self {
        self.push(field, Operator::IsNotNull, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Renders the predicate text and the values to bind, in placeholder order.
    pub fn render(&self) -> Result<(String, Vec<Value>)> {
        let mut parts = Vec::with_capacity(self.conditions.len());
        let mut params = Vec::new();
        for condition in &self.conditions {
            parts.push(condition.render()?);
            params.extend(condition.values.iter().cloned());
        }
        Ok((parts.join(" AND "), params))
    }
}

/// Row predicate for select, update and delete
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    /// Trusted SQL text, copied verbatim after `WHERE`
    Raw(String),
    /// Structured conditions with bound values
    Filter(Filter),
}

impl Where {
    pub fn is_empty(&self) -> bool {
        match self {
            Where::Raw(text) => text.is_empty(),
            Where::Filter(filter) => filter.is_empty(),
        }
    }

    pub fn render(&self) -> Result<(String, Vec<Value>)> {
        match self {
            Where::Raw(text) => Ok((text.clone(), Vec::new())),
            Where::Filter(filter) => filter.render(),
        }
    }
}

impl From<&str> for Where {
    fn from(text: &str) -> Self {
        Where::Raw(text.to_string())
    }
}

impl From<String> for Where {
    fn from(text: String) -> Self {
        Where::Raw(text)
    }
}

impl From<Filter> for Where {
    fn from(filter: Filter) -> Self {
        Where::Filter(filter)
    }
}
