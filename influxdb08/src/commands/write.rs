use clap::Parser;
use influxdb08_client::{Point, PointBatch, Precision};
use serde::Deserialize;
use tokio::{
    fs::File,
    io::{self, AsyncReadExt},
};

use super::common::{DatabaseArg, InfluxDb08Config};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Client(#[from] influxdb08_client::Error),

    #[error("failed to set up the HTTP transport: {0}")]
    Transport(#[from] influxdb08_client::transport::TransportError),

    #[error("error reading file: {0}")]
    Io(#[from] io::Error),

    #[error("file does not contain a JSON point or array of points: {0}")]
    Points(#[from] serde_json::Error),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Parser)]
#[clap(visible_alias = "w")]
pub(crate) struct Config {
    /// Common InfluxDB 0.8 connection config
    #[clap(flatten)]
    influxdb08_config: InfluxDb08Config,

    #[clap(flatten)]
    database: DatabaseArg,

    /// The series to write the points to
    #[clap(short = 's', long = "series")]
    series: String,

    /// File path to load the points from
    ///
    /// The file holds either a single JSON object or an array of them, each
    /// object being one point, e.g. `[{"time": 1, "value": 0.5}]`.
    #[clap(short = 'f', long = "file")]
    file_path: String,

    /// Precision of the `time` column: `s`, `ms` or `u`
    #[clap(long = "precision")]
    precision: Option<Precision>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PointsFile {
    Many(Vec<Point>),
    One(Point),
}

impl From<PointsFile> for PointBatch {
    fn from(file: PointsFile) -> Self {
        match file {
            PointsFile::Many(points) => points.into(),
            PointsFile::One(point) => point.into(),
        }
    }
}

fn parse_points(contents: &[u8]) -> Result<PointBatch> {
    Ok(serde_json::from_slice::<PointsFile>(contents)?.into())
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let client = config
        .influxdb08_config
        .client(config.database.database_name)?;

    let mut f = File::open(config.file_path).await?;
    let mut contents = Vec::new();
    f.read_to_end(&mut contents).await?;
    let points = parse_points(&contents)?;
    let count = points.len();

    let mut write = client.write().series(config.series, points);
    if let Some(precision) = config.precision {
        write = write.precision(precision);
    }
    write.send().await?;

    println!("success, wrote {count} points");

    Ok(())
}
