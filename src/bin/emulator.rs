//! tabload emulator
//!
//! Serves an in-memory table store over TCP for local loads and tests.

use std::sync::Arc;

use clap::Parser;
use tabload::config::{table_path, DEFAULT_ENDPOINT};
use tabload::network::Server;
use tabload::store::DEFAULT_MAX_VERSIONS;
use tabload::{ServerConfig, TableStore};
use tracing_subscriber::{fmt, EnvFilter};

/// A table to create at startup
#[derive(Debug, Clone)]
struct TableSpec {
    name: String,
    families: Vec<String>,
}

/// Parse `name:fam1,fam2`
fn parse_table_spec(s: &str) -> Result<TableSpec, String> {
    let (name, families) = s
        .split_once(':')
        .ok_or_else(|| format!("expected <name>:<family>[,<family>...], got '{}'", s))?;

    if name.is_empty() {
        return Err("table name must not be empty".to_string());
    }

    let families: Vec<String> = families
        .split(',')
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();

    if families.is_empty() {
        return Err(format!("table '{}' needs at least one column family", name));
    }

    Ok(TableSpec {
        name: name.to_string(),
        families,
    })
}

/// tabload emulator
#[derive(Parser, Debug)]
#[command(name = "tabload-emulator")]
#[command(about = "In-memory row table store speaking the tabload protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    listen: String,

    /// Worker threads
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Accepted connections allowed to queue for a worker
    #[arg(short, long, default_value = "1024")]
    max_pending: usize,

    /// Project the created tables belong to
    #[arg(short, long, default_value = "local")]
    project: String,

    /// Instance the created tables belong to
    #[arg(short, long, default_value = "local")]
    instance: String,

    /// Table to create, as <name>:<family>[,<family>...] (repeatable)
    #[arg(short, long = "table", value_parser = parse_table_spec)]
    tables: Vec<TableSpec>,

    /// Versions kept per cell
    #[arg(long, default_value_t = DEFAULT_MAX_VERSIONS)]
    max_versions: usize,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tabload=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("tabload emulator v{}", tabload::VERSION);

    let store = Arc::new(TableStore::with_max_versions(args.max_versions));
    for spec in &args.tables {
        let path = table_path(&args.project, &args.instance, &spec.name);
        if let Err(e) = store.create_table(&path, spec.families.iter().cloned()) {
            tracing::error!("Failed to create table: {}", e);
            std::process::exit(1);
        }
        tracing::info!("Table {} with families {:?}", path, spec.families);
    }
    tracing::info!("Keeping up to {} versions per cell", store.max_versions());

    let config = ServerConfig::builder()
        .listen_addr(&args.listen)
        .workers(args.workers)
        .max_pending(args.max_pending)
        .build();

    let server = match Server::bind(config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
