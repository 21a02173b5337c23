use std::io;

use crate::commands::common::InfluxDb08Config;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Client(#[from] influxdb08_client::Error),

    #[error("failed to set up the HTTP transport: {0}")]
    Transport(#[from] influxdb08_client::transport::TransportError),

    #[error("failed to read confirmation: {0}")]
    Io(#[from] io::Error),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, clap::Parser)]
pub(crate) struct Config {
    /// Common InfluxDB 0.8 connection config
    #[clap(flatten)]
    influxdb08_config: InfluxDb08Config,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Create a new database
    Create {
        /// The name of the database to create
        name: String,
    },

    /// Delete a database and all of its series
    Delete {
        /// The name of the database to delete
        name: String,

        /// Do not ask for confirmation
        #[clap(long = "yes", short = 'y')]
        yes: bool,
    },

    /// List the databases on the server
    List,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let client = config.influxdb08_config.client("")?;

    match config.command {
        Command::Create { name } => {
            client.create_database(name.as_str()).await?;
            println!("Database {name:?} created successfully");
        }
        Command::Delete { name, yes } => {
            if !yes {
                println!("Are you sure you want to delete {name:?}? Enter 'yes' to confirm");
                let mut confirmation = String::new();
                io::stdin().read_line(&mut confirmation)?;
                if confirmation.trim() != "yes" {
                    println!("Cannot delete database without confirmation");
                    return Ok(());
                }
            }
            client.delete_database(name.as_str()).await?;
            println!("Database {name:?} deleted successfully");
        }
        Command::List => {
            for db in client.list_databases().await? {
                println!("{}", db.name);
            }
        }
    }

    Ok(())
}
