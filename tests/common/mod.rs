//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::path::Path;
use tablegate::{ConnectionConfig, TableGateway, Value};

/// Detail tables reached by the join catalog and their key columns.
pub const DETAIL_TABLES: &[(&str, &str)] = &[
    ("manifestante", "id_manifestante"),
    ("endereco_manifestante", "id_endereco"),
    ("registro_pf_info_pessoal", "id_pf_dados"),
    ("registro_pf_contato", "id_pf_contato"),
    ("registro_pf_identificacao", "id_pf_identificacao"),
    ("registro_pf_cam", "id_pf_cam"),
    ("registro_pf_eleitor", "id_pf_eleitor"),
    ("registro_pf_formacao", "id_pf_formacao"),
    ("segunda_via_cedula", "id_cedula"),
    ("transferencia_registro", "id_transferencia"),
    ("baixa_registro_pf", "id_baixa_registro"),
    ("registro_pj", "id_registro_pj"),
    ("registro_consultorio", "id_consultorio"),
    ("end_consultorio", "id_end_consultorio"),
];

pub const SOLICITACAO: &str = "CREATE TABLE solicitacao (
    id_solicitacao INTEGER PRIMARY KEY AUTOINCREMENT,
    assunto TEXT NOT NULL,
    manifestante INTEGER REFERENCES manifestante (id_manifestante),
    endereco INTEGER REFERENCES endereco_manifestante (id_endereco)
)";

pub const REGISTRO_PF: &str = "CREATE TABLE registro_pf (
    id_registro INTEGER PRIMARY KEY AUTOINCREMENT,
    nome TEXT NOT NULL,
    info_pessoal INTEGER REFERENCES registro_pf_info_pessoal (id_pf_dados),
    contato INTEGER REFERENCES registro_pf_contato (id_pf_contato),
    identificacao INTEGER REFERENCES registro_pf_identificacao (id_pf_identificacao),
    cam INTEGER REFERENCES registro_pf_cam (id_pf_cam),
    titulo_eleitor INTEGER REFERENCES registro_pf_eleitor (id_pf_eleitor),
    formacao INTEGER REFERENCES registro_pf_formacao (id_pf_formacao),
    segunda_via INTEGER REFERENCES segunda_via_cedula (id_cedula),
    transferencia INTEGER REFERENCES transferencia_registro (id_transferencia),
    baixa INTEGER REFERENCES baixa_registro_pf (id_baixa_registro),
    id_pj INTEGER REFERENCES registro_pj (id_registro_pj),
    consultorio INTEGER REFERENCES registro_consultorio (id_consultorio),
    end_consultorio INTEGER REFERENCES end_consultorio (id_end_consultorio)
)";

pub fn file_config(path: &Path) -> ConnectionConfig {
    ConnectionConfig::new("", &path.to_string_lossy(), "", "", 3306)
}

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

/// Creates every catalog table and one fully linked row per base table.
pub fn create_registry(config: &ConnectionConfig) {
    let db = TableGateway::connect_raw(config).expect("connect");

    for (table, key) in DETAIL_TABLES {
        db.execute(&format!("CREATE TABLE {} ({} INTEGER PRIMARY KEY AUTOINCREMENT, detalhe TEXT)", table, key), &[])
            .expect("create detail table");
        db.execute(&format!("INSERT INTO {} (detalhe) VALUES (?)", table), &[text(&format!("{} #1", table))])
            .expect("seed detail table");
    }
    db.execute(SOLICITACAO, &[]).expect("create solicitacao");
    db.execute(REGISTRO_PF, &[]).expect("create registro_pf");
    db.close().expect("close");

    let solicitacao = TableGateway::connect("solicitacao", config).expect("connect");
    solicitacao
        .insert(vec![
            ("assunto", text("Denúncia")),
            ("manifestante", Value::Integer(1)),
            ("endereco", Value::Integer(1)),
        ])
        .expect("seed solicitacao");

    let registro_pf = TableGateway::connect("registro_pf", config).expect("connect");
    let links = [
        "info_pessoal", "contato", "identificacao", "cam", "titulo_eleitor", "formacao", "segunda_via",
        "transferencia", "baixa", "id_pj", "consultorio", "end_consultorio",
    ];
    let mut values: Vec<(&str, Value)> = vec![("nome", text("Ana Souza"))];
    values.extend(links.iter().map(|column| (*column, Value::Integer(1))));
    registro_pf.insert(values).expect("seed registro_pf");
}
