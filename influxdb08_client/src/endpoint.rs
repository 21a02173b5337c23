//! Composes request URLs for the InfluxDB 0.8 HTTP API.
use url::form_urlencoded;

use crate::config::ClientConfig;

/// Build the URL for `path` on the configured server.
///
/// The configured username and password are always attached as the `u` and
/// `p` query parameters. `query` is appended after them verbatim, so the
/// caller is responsible for encoding it.
///
/// # Example
/// ```
/// # use influxdb08_client::{ClientConfig, endpoint::build_url};
/// let config = ClientConfig::new("stats").with_credentials("user", "pass");
/// assert_eq!(
///     build_url(&config, "db", Some("q=list+series")),
///     "http://127.0.0.1:8086/db?u=user&p=pass&q=list+series",
/// );
/// ```
pub fn build_url(config: &ClientConfig, path: &str, query: Option<&str>) -> String {
    let credentials = form_urlencoded::Serializer::new(String::new())
        .append_pair("u", config.username())
        .append_pair("p", config.expose_password())
        .finish();

    let mut url = format!(
        "{}://{}:{}/{}?{}",
        config.scheme(),
        config.host(),
        config.port(),
        path.trim_start_matches('/'),
        credentials
    );
    if let Some(query) = query {
        url.push('&');
        url.push_str(query);
    }
    url
}
