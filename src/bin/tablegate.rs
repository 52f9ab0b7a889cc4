use std::io;
use std::process;
use tablegate::cli;
use tracing::{error, info, Level};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match cli::parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", cli::USAGE);
            process::exit(2);
        }
    };

    let config = match cli::load_invocation_config(&invocation) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(2);
        }
    };

    // Logs go to stderr so stdout carries only result rows
    let level = config
        .as_ref()
        .and_then(|c| c.log_level().parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    info!("Starting tablegate...");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = cli::execute_command(&invocation.command, config.as_ref(), &mut out) {
        error!("{}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
