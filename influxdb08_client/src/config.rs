//! Connection settings for a [`Client`](crate::Client).
use secrecy::{ExposeSecret, Secret};

/// Port the InfluxDB 0.8 HTTP API listens on by default
pub const DEFAULT_PORT: u16 = 8086;

/// Host, credentials and target database used for every request a
/// [`Client`](crate::Client) makes.
///
/// The config is fixed once handed to a client. Use
/// [`Client::with_config`](crate::Client::with_config) to swap it out as a whole.
///
/// # Example
/// ```
/// # use influxdb08_client::ClientConfig;
/// let config = ClientConfig::new("metrics")
///     .with_host("influx.local")
///     .with_port(8087)
///     .with_credentials("writer", "s3cret");
///
/// assert_eq!(config.host(), "influx.local");
/// assert_eq!(config.database(), "metrics");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    scheme: String,
    host: String,
    port: u16,
    username: String,
    password: Secret<String>,
    database: String,
}

impl ClientConfig {
    /// Create a config for `database` on `http://127.0.0.1:8086` as `root`/`root`
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            scheme: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            username: "root".to_string(),
            password: Secret::new("root".to_string()),
            database: database.into(),
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username and password sent as the `u` and `p` parameters of each request
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = Secret::new(password.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Secret<String> {
        &self.password
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub(crate) fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}
