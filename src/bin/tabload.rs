//! tabload
//!
//! Reads `<key>\t<value>` lines and writes each as a single-cell row.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tabload::config::DEFAULT_ENDPOINT;
use tabload::network::Client;
use tabload::{ingest, Config, FlushPolicy};
use tracing_subscriber::{fmt, EnvFilter};

/// Bulk-load tab-separated records into a table
#[derive(Parser, Debug)]
#[command(name = "tabload")]
#[command(about = "Load <key>\\t<value> lines from stdin into a row table store")]
#[command(version)]
struct Args {
    /// Project ID
    #[arg(long)]
    project: Option<String>,

    /// Instance ID
    #[arg(long)]
    instance: Option<String>,

    /// Table name
    #[arg(long)]
    table: Option<String>,

    /// Column family
    #[arg(long)]
    family: Option<String>,

    /// Column
    #[arg(long)]
    column: Option<String>,

    /// Table store endpoint (host:port)
    #[arg(long, env = "TABLOAD_EMULATOR_HOST", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Connect timeout in milliseconds (0 = OS default)
    #[arg(long, default_value_t = 10_000)]
    connect_timeout_ms: u64,

    /// Socket read timeout in milliseconds (0 = none)
    #[arg(long, default_value_t = 0)]
    read_timeout_ms: u64,

    /// Socket write timeout in milliseconds (0 = none)
    #[arg(long, default_value_t = 0)]
    write_timeout_ms: u64,

    /// Send one bulk request per record instead of batching
    #[arg(long)]
    flush_every_record: bool,

    /// Read records from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let policy = if args.flush_every_record {
        FlushPolicy::EveryRecord
    } else {
        FlushPolicy::AtCapacity
    };

    let config = Config::builder()
        .project(args.project.unwrap_or_default())
        .instance(args.instance.unwrap_or_default())
        .table(args.table.unwrap_or_default())
        .family(args.family.unwrap_or_default())
        .column(args.column.unwrap_or_default())
        .endpoint(args.endpoint)
        .connect_timeout_ms(args.connect_timeout_ms)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .flush_policy(policy)
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        process::exit(1);
    }

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                tracing::error!("cannot open {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    let mut client = match Client::connect(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{}", e);
            process::exit(1);
        }
    };

    let path = config.table_path();
    tracing::debug!("Writing to {} via {}", path, client.peer_addr());

    let mut table = client.open_table(path);
    let mut buffer = tabload::ingest::buffer_for(&config);

    match ingest(input, &mut buffer, &mut table, config.flush_policy) {
        Ok(summary) => println!("wrote {} rows", summary.rows_written),
        Err(e) => {
            tracing::error!("{}", e);
            process::exit(1);
        }
    }
}
