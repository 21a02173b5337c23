//! Entrypoint of the influxdb08 binary
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr,
    clippy::future_not_send
)]

use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

mod commands {
    pub(crate) mod common;
    pub(crate) mod database;
    pub(crate) mod query;
    pub(crate) mod write;
}

enum ReturnCode {
    Failure = 1,
}

#[derive(Debug, clap::Parser)]
#[clap(
    name = "influxdb08",
    version,
    about = "Command line client for the InfluxDB 0.8 HTTP API",
    long_about = r#"Command line client for the InfluxDB 0.8 HTTP API

Examples:
    # Create a database
    influxdb08 database create metrics

    # Write the points stored in points.json to the `cpu` series
    influxdb08 write -d metrics -s cpu -f points.json

    # Run a query
    influxdb08 query -d metrics "select * from cpu limit 10"

    # Run a query with request logging
    LOG_FILTER=debug influxdb08 query -d metrics "list series"
"#
)]
struct Config {
    /// Log more, repeat for even more: -v for info, -vv for debug.
    ///
    /// Ignored when `LOG_FILTER` is set.
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, clap::Parser)]
enum Command {
    /// Create, delete or list databases
    Database(commands::database::Config),

    /// Run a query against a running InfluxDB 0.8 server
    Query(commands::query::Config),

    /// Write points to a running InfluxDB 0.8 server
    Write(commands::write::Config),
}

fn main() -> Result<(), std::io::Error> {
    // load all environment variables from .env before doing anything
    load_dotenv();

    let config: Config = clap::Parser::parse();

    init_logs(config.verbose);

    let tokio_runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    tokio_runtime.block_on(async move {
        match config.command {
            None => println!("command required, -h/--help for help"),
            Some(Command::Database(config)) => {
                if let Err(e) = commands::database::command(config).await {
                    eprintln!("Database command failed: {e}");
                    std::process::exit(ReturnCode::Failure as _)
                }
            }
            Some(Command::Query(config)) => {
                if let Err(e) = commands::query::command(config).await {
                    eprintln!("Query command failed: {e}");
                    std::process::exit(ReturnCode::Failure as _)
                }
            }
            Some(Command::Write(config)) => {
                if let Err(e) = commands::write::command(config).await {
                    eprintln!("Write command failed: {e}");
                    std::process::exit(ReturnCode::Failure as _)
                }
            }
        }
    });

    Ok(())
}

/// Source the .env file before initialising the Config struct - this sets
/// any envs in the file, which the Config struct then uses.
///
/// Precedence is given to existing env variables.
fn load_dotenv() {
    match dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            // Ignore this - a missing env file is not an error, defaults will
            // be applied when initialising the Config struct.
        }
        Err(e) => {
            eprintln!("FATAL Error loading config from: {e}");
            eprintln!("Aborting");
            std::process::exit(1);
        }
    };
}

/// Log to stderr, filtered by `LOG_FILTER` if set and by `verbose` otherwise
fn init_logs(verbose: u8) {
    let filter = EnvFilter::try_from_env("LOG_FILTER").unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
