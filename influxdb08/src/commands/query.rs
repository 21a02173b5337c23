use clap::Parser;
use influxdb08_client::{Point, Precision};
use serde::Serialize;

use super::common::{DatabaseArg, InfluxDb08Config};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Client(#[from] influxdb08_client::Error),

    #[error("failed to set up the HTTP transport: {0}")]
    Transport(#[from] influxdb08_client::transport::TransportError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("failed to format the query result: {0}")]
    Format(#[from] serde_json::Error),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Parser)]
#[clap(visible_alias = "q", trailing_var_arg = true)]
pub(crate) struct Config {
    /// Common InfluxDB 0.8 connection config
    #[clap(flatten)]
    influxdb08_config: InfluxDb08Config,

    #[clap(flatten)]
    database: DatabaseArg,

    /// Precision of the returned `time` column: `s`, `ms` or `u`
    #[clap(long = "precision")]
    precision: Option<Precision>,

    /// Print each series as soon as it is decoded, one JSON document per series
    #[clap(long = "stream")]
    stream: bool,

    /// The query string to execute
    query: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SeriesLine<'a> {
    name: &'a str,
    points: &'a [Point],
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let client = config
        .influxdb08_config
        .client(config.database.database_name)?;

    let query = parse_query(config.query)?;

    let mut request = client.query(query).chunked(false);
    if let Some(precision) = config.precision {
        request = request.precision(precision);
    }

    if config.stream {
        let mut format_error = None;
        request
            .for_each_series(|name, points| {
                let line = SeriesLine {
                    name: &name,
                    points: &points,
                };
                match serde_json::to_string(&line) {
                    Ok(line) => println!("{line}"),
                    Err(e) => {
                        format_error.get_or_insert(e);
                    }
                }
            })
            .await?;
        if let Some(e) = format_error {
            return Err(e.into());
        }
    } else {
        let result = request.send().await?;
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum QueryError {
    #[error("no query provided")]
    NoQuery,

    #[error(
        "ensure that a single query string is provided as the final \
        argument, enclosed in quotes"
    )]
    MoreThanOne,
}

/// Parse the user-inputted query string
fn parse_query(mut input: Vec<String>) -> Result<String> {
    if input.is_empty() {
        Err(QueryError::NoQuery)?
    }
    if input.len() > 1 {
        Err(QueryError::MoreThanOne)?
    } else {
        Ok(input.remove(0))
    }
}
