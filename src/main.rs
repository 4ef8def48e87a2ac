//! mcp-harness CLI
//!
//! Entry point for the `mcp-harness` command-line tool.

use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use mcp_harness::config::{ConfigError, FileConfig, HarnessConfig, Overrides};
use mcp_harness::driver::Driver;
use mcp_harness::scenario::standard_scenarios;
use mcp_harness::transport::ProcessTransport;
use mcp_harness::HarnessClient;

/// Config file consulted when `--config` is not given
const DEFAULT_CONFIG_PATH: &str = "harness.toml";

#[derive(Parser)]
#[command(name = "mcp-harness")]
#[command(about = "Interactive stdio test harness for an MCP database server", version)]
struct Cli {
    /// Path to the MCP server binary
    #[arg(long)]
    server: Option<PathBuf>,

    /// Path to the database registry file
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Path to the default database file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Per-exchange timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Path to a harness.toml config file (default: ./harness.toml if present)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Write the closing session report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let file = match load_file_config(cli.config.as_deref()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    let overrides = Overrides {
        server: cli.server,
        registry: cli.registry,
        db: cli.db,
        timeout_seconds: cli.timeout,
    };

    let config = match HarnessConfig::resolve(file, overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    // Nothing useful to test without the server binary.
    if !config.target.server_path.exists() {
        eprintln!(
            "Server not found at {}. Build it before running the harness.",
            config.target.server_path.display()
        );
        process::exit(1);
    }

    let inventory_db = match std::env::current_dir() {
        Ok(dir) => dir.join("inventory.db"),
        Err(e) => {
            eprintln!("Error resolving working directory: {}", e);
            process::exit(1);
        }
    };

    println!("Interactive MCP Server Testing");
    println!("==============================");

    let transport = ProcessTransport::new(config.target.clone(), config.timeout);
    let client = HarnessClient::new(Arc::new(transport));
    let scenarios = standard_scenarios(&inventory_db);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut driver = Driver::new(client, stdin.lock(), stdout.lock());

    let report = match driver.run(&scenarios) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: operator input/output failed: {}", e);
            process::exit(1);
        }
    };

    if let Some(path) = cli.report {
        if let Err(e) = write_report(&report, &path) {
            eprintln!("Error writing report: {}", e);
            process::exit(1);
        }
        println!("Wrote report: {}", path.display());
    }
}

/// Load the config file: an explicit `--config` path must exist, the
/// default path is consulted only when present.
fn load_file_config(path: Option<&Path>) -> Result<Option<FileConfig>, ConfigError> {
    match path {
        Some(p) => FileConfig::load(p).map(Some),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                FileConfig::load(default).map(Some)
            } else {
                Ok(None)
            }
        }
    }
}

fn write_report(report: &mcp_harness::SessionReport, path: &Path) -> io::Result<()> {
    let json = report
        .to_json()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, json)
}
