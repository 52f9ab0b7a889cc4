//! Command-line front end for running gateway operations from a shell.
//!
//! Rows are printed as one JSON object per line; statements without a
//! result set print `{"affected_rows": n}`.

use crate::config::{default_config_path, load_config, Config};
use crate::core::{GatewayError, Result};
use crate::gateway::TableGateway;
use crate::joins::CatalogJoin;
use crate::sql::Select;
use crate::StatementResult;
use rusqlite::types::Value;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;

pub const USAGE: &str = "\
usage: tablegate [--config PATH] <command>

commands:
  joins                                   list the named join clauses
  exec SQL [PARAM...]                     run one statement with bound parameters
  select TABLE [--join NAME | --join-sql TEXT] [--where W] [--order O] [--limit L] [--fields F]
  delete TABLE WHERE";

/// Environment variable consulted when `--config` is not given
pub const CONFIG_ENV: &str = "TABLEGATE_CONFIG";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Joins,
    Exec { sql: String, params: Vec<String> },
    Select { table: String, select: Select },
    Delete { table: String, predicate: String },
}

impl Command {
    pub fn needs_config(&self) -> bool {
        !matches!(self, Command::Joins)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

fn usage_error(message: &str) -> GatewayError {
    GatewayError::Command(message.to_string())
}

/// Parses the arguments that follow the program name.
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut config_path = None;
    let mut rest = args.iter();
    let name = loop {
        match rest.next().map(String::as_str) {
            Some("--config") => {
                let path = rest.next().ok_or_else(|| usage_error("--config needs a path"))?;
                config_path = Some(PathBuf::from(path));
            }
            Some(name) => break name,
            None => return Err(usage_error("missing command")),
        }
    };
    let rest: Vec<&String> = rest.collect();

    let command = match name {
        "joins" => Command::Joins,
        "exec" => {
            let (sql, params) = rest.split_first().ok_or_else(|| usage_error("exec needs a statement"))?;
            Command::Exec {
                sql: sql.to_string(),
                params: params.iter().map(|p| p.to_string()).collect(),
            }
        }
        "select" => parse_select(&rest)?,
        "delete" => match rest.as_slice() {
            [table, predicate] => Command::Delete {
                table: table.to_string(),
                predicate: predicate.to_string(),
            },
            _ => return Err(usage_error("delete needs TABLE and WHERE")),
        },
        other => return Err(usage_error(&format!("unknown command '{}'", other))),
    };

    Ok(Invocation { config_path, command })
}

fn parse_select(args: &[&String]) -> Result<Command> {
    let (table, flags) = args.split_first().ok_or_else(|| usage_error("select needs a table"))?;
    let mut select = Select::new();
    let mut flags = flags.iter();
    while let Some(flag) = flags.next() {
        let value = flags
            .next()
            .ok_or_else(|| usage_error(&format!("{} needs a value", flag)))?
            .to_string();
        select = match flag.as_str() {
            "--join" => select.join(value.parse::<CatalogJoin>()?),
            "--join-sql" => select.join_sql(value),
            "--where" => select.filter(value),
            "--order" => select.order(value),
            "--limit" => select.limit(value),
            "--fields" => select.fields(value),
            other => return Err(usage_error(&format!("unknown select option '{}'", other))),
        };
    }
    Ok(Command::Select {
        table: table.to_string(),
        select,
    })
}

/// Picks the configuration file: `--config`, then `$TABLEGATE_CONFIG`, then the platform default.
pub fn resolve_config_path(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.clone());
    }
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => default_config_path(),
    }
}

/// Loads the configuration an invocation needs, if any.
pub fn load_invocation_config(invocation: &Invocation) -> Result<Option<Config>> {
    if !invocation.command.needs_config() {
        return Ok(None);
    }
    let path = resolve_config_path(invocation.config_path.as_ref())?;
    load_config(path).map(Some)
}

/// Canonical integers bind as integers, everything else as text.
///
/// Digit strings that would not print back the same (`01234567890`, `+5`)
/// stay text so leading zeros in document numbers and postcodes survive.
fn cli_param(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(n) if n.to_string() == raw => Value::Integer(n),
        _ => Value::Text(raw.to_string()),
    }
}

fn write_outcome(outcome: StatementResult, out: &mut dyn Write) -> Result<()> {
    match outcome {
        StatementResult::Rows(rows) => {
            for row in rows.to_json() {
                writeln!(out, "{}", serde_json::to_string(&row)?)?;
            }
        }
        StatementResult::Done { affected_rows } => {
            writeln!(out, "{}", json!({ "affected_rows": affected_rows }))?;
        }
    }
    Ok(())
}

fn required(config: Option<&Config>) -> Result<&Config> {
    config.ok_or_else(|| GatewayError::Config("no configuration loaded".to_string()))
}

/// Runs a parsed command, writing its output to `out`.
pub fn execute_command(command: &Command, config: Option<&Config>, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Joins => {
            for join in CatalogJoin::ALL {
                writeln!(out, "{}\t{}\t{}", join.name(), join.base_table(), join.sql())?;
            }
            Ok(())
        }
        Command::Exec { sql, params } => {
            let gateway = TableGateway::connect_raw(&required(config)?.database)?;
            let params: Vec<Value> = params.iter().map(|p| cli_param(p)).collect();
            write_outcome(gateway.execute(sql, &params)?, out)?;
            gateway.close()
        }
        Command::Select { table, select } => {
            let gateway = TableGateway::connect(table, &required(config)?.database)?;
            write_outcome(StatementResult::Rows(gateway.select(select)?), out)?;
            gateway.close()
        }
        Command::Delete { table, predicate } => {
            let gateway = TableGateway::connect(table, &required(config)?.database)?;
            let affected_rows = gateway.delete(predicate.as_str())?;
            write_outcome(StatementResult::Done { affected_rows }, out)?;
            gateway.close()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_select() {
        let invocation = parse_args(&args(&[
            "--config", "/etc/tablegate.toml", "select", "registro_pf", "--join", "pf-pj", "--where", "id_pj = 3", "--limit", "5",
        ]))
        .unwrap();

        assert_eq!(invocation.config_path, Some(PathBuf::from("/etc/tablegate.toml")));
        let expected = Select::new().join(CatalogJoin::RegistroPfPj).filter("id_pj = 3").limit("5");
        assert_eq!(
            invocation.command,
            Command::Select {
                table: "registro_pf".to_string(),
                select: expected
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            vec![],
            vec!["--config"],
            vec!["frobnicate"],
            vec!["exec"],
            vec!["delete", "t"],
            vec!["select"],
            vec!["select", "t", "--where"],
            vec!["select", "t", "--bogus", "x"],
        ] {
            assert!(parse_args(&args(&bad)).is_err(), "{:?} should not parse", bad);
        }

        match parse_args(&args(&["select", "t", "--join", "nope"])) {
            Err(GatewayError::Config(msg)) => assert!(msg.contains("unknown join")),
            other => panic!("Expected unknown join error, got {:?}", other),
        }
    }

    #[test]
    fn test_joins_needs_no_config() {
        let invocation = parse_args(&args(&["joins"])).unwrap();
        assert!(load_invocation_config(&invocation).unwrap().is_none());

        let mut out = Vec::new();
        execute_command(&invocation.command, None, &mut out).unwrap();
        let listing = String::from_utf8(out).unwrap();
        assert_eq!(listing.lines().count(), CatalogJoin::ALL.len());
        assert!(listing.starts_with("solicitacao-manifestante\tsolicitacao\tINNER JOIN manifestante"));
    }

    #[test]
    fn test_exec_prints_json_lines() {
        let config = Config {
            database: ConnectionConfig::in_memory(),
            logging: None,
        };
        let command = Command::Exec {
            sql: "SELECT ? AS n, ? AS s".to_string(),
            params: vec!["7".to_string(), "seven".to_string()],
        };

        let mut out = Vec::new();
        execute_command(&command, Some(&config), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"n\":7,\"s\":\"seven\"}\n");
    }

    #[test]
    fn test_cli_params_keep_leading_zeros() {
        assert_eq!(cli_param("42"), Value::Integer(42));
        assert_eq!(cli_param("-7"), Value::Integer(-7));
        assert_eq!(cli_param("01234567890"), Value::Text("01234567890".to_string()));
        assert_eq!(cli_param("+5"), Value::Text("+5".to_string()));
        assert_eq!(cli_param("-0"), Value::Text("-0".to_string()));
        assert_eq!(cli_param("Ana"), Value::Text("Ana".to_string()));
    }

    #[test]
    fn test_commands_other_than_joins_need_config() {
        let command = Command::Delete {
            table: "t".to_string(),
            predicate: "id=1".to_string(),
        };
        let mut out = Vec::new();
        assert!(matches!(execute_command(&command, None, &mut out), Err(GatewayError::Config(_))));
    }
}
