use std::{sync::Arc, time::Duration};

use clap::Parser;
use influxdb08_client::{
    Client, ClientConfig,
    config::DEFAULT_PORT,
    transport::{ReqwestTransport, TransportError},
};
use secrecy::{ExposeSecret, Secret};
use tracing::debug;

#[derive(Debug, Parser)]
pub(crate) struct InfluxDb08Config {
    /// The host name of the running InfluxDB 0.8 server
    #[clap(
        short = 'H',
        long = "host",
        env = "INFLUXDB08_HOST",
        default_value = "127.0.0.1"
    )]
    pub(crate) host: String,

    /// The port of the InfluxDB 0.8 HTTP API
    #[clap(long = "port", env = "INFLUXDB08_PORT", default_value_t = DEFAULT_PORT)]
    pub(crate) port: u16,

    /// The username to authenticate as
    #[clap(
        short = 'u',
        long = "username",
        env = "INFLUXDB08_USERNAME",
        default_value = "root"
    )]
    pub(crate) username: String,

    /// The password to authenticate with
    #[clap(
        short = 'p',
        long = "password",
        env = "INFLUXDB08_PASSWORD",
        default_value = "root",
        hide_default_value = true
    )]
    pub(crate) password: Secret<String>,

    /// Give up on a request that has not completed after this long, e.g. `30s`
    #[clap(
        long = "timeout",
        env = "INFLUXDB08_TIMEOUT",
        value_parser = humantime::parse_duration
    )]
    pub(crate) timeout: Option<Duration>,
}

impl InfluxDb08Config {
    /// Build a client operating on `database`
    pub(crate) fn client(&self, database: impl Into<String>) -> Result<Client, TransportError> {
        let database = database.into();
        debug!(host = %self.host, port = self.port, %database, "configuring client");

        let config = ClientConfig::new(database)
            .with_host(self.host.as_str())
            .with_port(self.port)
            .with_credentials(self.username.as_str(), self.password.expose_secret().as_str());

        let transport = match self.timeout {
            Some(timeout) => ReqwestTransport::with_timeout(timeout)?,
            None => ReqwestTransport::new(),
        };
        Ok(Client::with_transport(config, Arc::new(transport)))
    }
}

#[derive(Debug, Parser)]
pub(crate) struct DatabaseArg {
    /// The name of the database to operate on
    #[clap(short = 'd', long = "database", env = "INFLUXDB08_DATABASE")]
    pub(crate) database_name: String,
}
