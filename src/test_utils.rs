/// # Test Utilities Module
///
/// Fixtures shared by the unit tests: an in-memory gateway with a cut-down
/// registry schema, and small value helpers.

use crate::config::ConnectionConfig;
use crate::gateway::TableGateway;
use rusqlite::types::Value;

/// Registry tables referenced by the join catalog, one statement each.
pub const REGISTRY_SCHEMA: &[&str] = &[
    "CREATE TABLE registro_pj (
        id_registro_pj INTEGER PRIMARY KEY AUTOINCREMENT,
        razao_social TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE registro_pf_contato (
        id_pf_contato INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT
    )",
    "CREATE TABLE registro_pf_info_pessoal (
        id_pf_dados INTEGER PRIMARY KEY AUTOINCREMENT,
        nascimento TEXT
    )",
    "CREATE TABLE registro_pf_identificacao (
        id_pf_identificacao INTEGER PRIMARY KEY AUTOINCREMENT,
        rg TEXT
    )",
    "CREATE TABLE registro_consultorio (
        id_consultorio INTEGER PRIMARY KEY AUTOINCREMENT,
        nome_consultorio TEXT
    )",
    "CREATE TABLE registro_pf (
        id_registro INTEGER PRIMARY KEY AUTOINCREMENT,
        nome TEXT NOT NULL,
        info_pessoal INTEGER REFERENCES registro_pf_info_pessoal (id_pf_dados),
        contato INTEGER REFERENCES registro_pf_contato (id_pf_contato),
        identificacao INTEGER REFERENCES registro_pf_identificacao (id_pf_identificacao),
        consultorio INTEGER REFERENCES registro_consultorio (id_consultorio),
        id_pj INTEGER REFERENCES registro_pj (id_registro_pj)
    )",
];

/// In-memory gateway for `table` with the registry schema already created.
pub fn registry_gateway(table: &str) -> TableGateway {
    let gateway = TableGateway::connect(table, &ConnectionConfig::in_memory()).expect("in-memory connection");
    for statement in REGISTRY_SCHEMA {
        gateway.execute(statement, &[]).expect("schema statement");
    }
    gateway
}

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}
