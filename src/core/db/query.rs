/// Query Execution Module
///
/// This module is the single path through which SQL reaches the driver.
/// Statement text is prepared as-is and every parameter is bound
/// positionally; values are never spliced into the text.

use crate::core::{GatewayError, Result};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::{json, Map};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Number of virtual machine steps between deadline checks
const PROGRESS_STEPS: i32 = 1_000;

/// Rows produced by a read statement
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of data as driver values
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        QueryResult { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Value at `row` for the named column
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Rows rendered as strings for display
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(format_value).collect())
            .collect()
    }

    /// Each row as a JSON object keyed by column name, in projection order.
    ///
    /// Joined tables can repeat a column name; the last occurrence wins, as
    /// it would with an associative fetch.
    pub fn to_json(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| {
                let object: Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(value_to_json))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect()
    }
}

/// Outcome of running one statement
#[derive(Debug, Clone, PartialEq)]
pub enum StatementResult {
    /// The statement produced a result set
    Rows(QueryResult),
    /// The statement produced no columns; carries the number of rows it changed
    Done { affected_rows: usize },
}

impl StatementResult {
    pub fn affected_rows(&self) -> usize {
        match self {
            StatementResult::Rows(_) => 0,
            StatementResult::Done { affected_rows } => *affected_rows,
        }
    }

    /// The result set, or an empty one for statements that return no rows.
    pub fn into_rows(self) -> QueryResult {
        match self {
            StatementResult::Rows(result) => result,
            StatementResult::Done { .. } => QueryResult::new(Vec::new(), Vec::new()),
        }
    }
}

/// Aborts statements that run past a deadline.
///
/// Installed for the duration of one statement and removed on drop, so a
/// failed statement never leaves the handler behind on the connection.
struct StatementDeadline<'a> {
    connection: &'a Connection,
}

impl<'a> StatementDeadline<'a> {
    fn install(connection: &'a Connection, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        connection.progress_handler(PROGRESS_STEPS, Some(move || Instant::now() >= deadline));
        StatementDeadline { connection }
    }
}

impl Drop for StatementDeadline<'_> {
    fn drop(&mut self) {
        self.connection.progress_handler(0, None::<fn() -> bool>);
    }
}

/// Prepares `sql`, binds `params` positionally and runs it.
///
/// Statements with result columns are fully read into a `QueryResult`;
/// anything else reports the number of rows it changed.
///
/// # Errors
///
/// `GatewayError::Prepare` for malformed SQL, `GatewayError::Constraint`
/// for constraint violations, `GatewayError::Timeout` when `timeout`
/// elapses and `GatewayError::Execute` for any other driver failure.
pub fn execute_statement(
    conn: &Connection,
    sql: &str,
    params: &[Value],
    timeout: Option<Duration>,
) -> Result<StatementResult> {
    debug!("Executing `{}` with {} bound parameter(s)", sql, params.len());

    let _deadline = timeout.map(|t| StatementDeadline::install(conn, t));

    let result = run(conn, sql, params);
    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

fn run(conn: &Connection, sql: &str, params: &[Value]) -> Result<StatementResult> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| GatewayError::from_prepare(sql, e))?;

    let column_count = stmt.column_count();
    if column_count == 0 {
        let affected_rows = stmt
            .execute(params_from_iter(params.iter()))
            .map_err(|e| GatewayError::from_execution(sql, e))?;
        return Ok(StatementResult::Done { affected_rows });
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt
        .query(params_from_iter(params.iter()))
        .map_err(|e| GatewayError::from_execution(sql, e))?;

    let mut data = Vec::new();
    while let Some(row) = rows.next().map_err(|e| GatewayError::from_execution(sql, e))? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let value: Value = row.get(i).map_err(|e| GatewayError::from_execution(sql, e))?;
            values.push(value);
        }
        data.push(values);
    }

    Ok(StatementResult::Rows(QueryResult::new(columns, data)))
}

/// Formats a driver value for display
pub fn format_value(value: &Value) -> String {
    match ValueRef::from(value) {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => json!(i),
        Value::Real(f) => json!(f),
        Value::Text(t) => json!(t),
        Value::Blob(b) => json!(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_table(conn: &Connection) {
        conn.execute_batch(
            "
            CREATE TABLE test (
                id INTEGER PRIMARY KEY,
                name TEXT,
                value REAL
            );
            INSERT INTO test (name, value) VALUES ('Alice', 123.45);
            INSERT INTO test (name, value) VALUES ('Bob', 678.90);
            INSERT INTO test (name, value) VALUES (NULL, NULL);
        ",
        )
        .unwrap();
    }

    #[test]
    fn test_select_returns_rows() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        let result = execute_statement(&conn, "SELECT * FROM test ORDER BY id", &[], None)
            .unwrap()
            .into_rows();

        assert_eq!(result.columns, vec!["id", "name", "value"]);
        assert_eq!(result.row_count(), 3);
        assert_eq!(result.display_rows()[0], vec!["1", "Alice", "123.45"]);
        assert_eq!(result.display_rows()[2], vec!["3", "NULL", "NULL"]);
        assert_eq!(result.get(1, "name"), Some(&Value::Text("Bob".to_string())));
        assert_eq!(result.get(1, "missing"), None);
    }

    #[test]
    fn test_parameters_are_bound_not_interpolated() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        let hostile = Value::Text("x' OR '1'='1".to_string());
        let result = execute_statement(&conn, "SELECT id FROM test WHERE name = ?", &[hostile], None)
            .unwrap()
            .into_rows();
        assert!(result.is_empty());

        let result = execute_statement(
            &conn,
            "SELECT id FROM test WHERE name = ?",
            &[Value::Text("Alice".to_string())],
            None,
        )
        .unwrap()
        .into_rows();
        assert_eq!(result.rows, vec![vec![Value::Integer(1)]]);
    }

    #[test]
    fn test_write_reports_affected_rows() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        let outcome = execute_statement(&conn, "UPDATE test SET value = ? WHERE value IS NOT NULL", &[Value::Real(1.0)], None).unwrap();
        assert_eq!(outcome, StatementResult::Done { affected_rows: 2 });

        let outcome = execute_statement(&conn, "DELETE FROM test WHERE id = 99", &[], None).unwrap();
        assert_eq!(outcome.affected_rows(), 0);
    }

    #[test]
    fn test_query_error_handling() {
        let conn = Connection::open_in_memory().unwrap();

        match execute_statement(&conn, "SELECT * FROM nonexistent_table", &[], None) {
            Err(GatewayError::Prepare { source, .. }) => assert!(source.to_string().contains("no such table")),
            other => panic!("Expected Prepare error, got {:?}", other),
        }

        conn.execute_batch("CREATE TABLE uniq (code TEXT UNIQUE); INSERT INTO uniq VALUES ('a');").unwrap();
        let dup = execute_statement(&conn, "INSERT INTO uniq (code) VALUES (?)", &[Value::Text("a".to_string())], None);
        assert!(matches!(dup, Err(GatewayError::Constraint { .. })));

        // The connection stays usable after a failure.
        let ok = execute_statement(&conn, "SELECT COUNT(*) FROM uniq", &[], None).unwrap().into_rows();
        assert_eq!(ok.rows[0][0], Value::Integer(1));
    }

    #[test]
    fn test_statement_deadline() {
        let conn = Connection::open_in_memory().unwrap();
        let endless = "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c) SELECT count(*) FROM c";

        let result = execute_statement(&conn, endless, &[], Some(Duration::from_millis(50)));
        assert!(matches!(result, Err(GatewayError::Timeout { .. })));

        // The handler is removed once the statement finishes.
        let result = execute_statement(&conn, "SELECT 1", &[], None).unwrap().into_rows();
        assert_eq!(result.rows, vec![vec![Value::Integer(1)]]);
    }

    #[test]
    fn test_to_json() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        let result = execute_statement(&conn, "SELECT id, name FROM test WHERE id = 1", &[], None)
            .unwrap()
            .into_rows();
        assert_eq!(result.to_json(), vec![json!({"id": 1, "name": "Alice"})]);
    }

    #[test]
    fn test_to_json_keeps_projection_order() {
        let result = QueryResult::new(
            vec!["zeta".to_string(), "alpha".to_string()],
            vec![vec![Value::Integer(1), Value::Integer(2)]],
        );
        let line = serde_json::to_string(&result.to_json()[0]).unwrap();
        assert_eq!(line, r#"{"zeta":1,"alpha":2}"#);
    }
}
