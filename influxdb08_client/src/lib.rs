//! # influxdb08_client
//!
//! A client for the InfluxDB 0.8 HTTP API: database, cluster admin and
//! database user management, writing points, and running queries.
//!
//! Points are written and read as row oriented [`Point`]s; the client takes
//! care of the columnar series format the server speaks (see [`series`]).
pub mod config;
pub mod endpoint;
pub mod queue;
pub mod response;
pub mod series;
pub mod transport;

use std::{fmt::Display, str::FromStr, sync::Arc};

use reqwest::{Method, StatusCode, header::HeaderMap};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;
use url::form_urlencoded;

pub use crate::config::ClientConfig;
use crate::queue::{PendingWrite, WriteQueue};
use crate::response::{interpret, interpret_json};
pub use crate::series::{FieldValue, Point, PointBatch, QueryResult, SeriesPayload};
use crate::series::{denormalize, encode};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

/// Primary error type for the [`Client`]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("authentication failed: {body}")]
    Authentication { body: String },

    #[error("server responded with error [{status}]: {body}")]
    Request { status: StatusCode, body: String },

    #[error("failed to decode the API response: {0}")]
    Decoding(#[from] DecodingError),

    #[error("failed to send {method} /{path} request: {source}")]
    Transport {
        method: Method,
        path: String,
        #[source]
        source: TransportError,
    },
}

impl Error {
    fn transport(method: Method, path: impl Into<String>, source: TransportError) -> Self {
        Self::Transport {
            method,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Request { .. } => ErrorKind::Request,
            Self::Decoding(_) => ErrorKind::Decoding,
            Self::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// The response body the server rejected the request with, if it did
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Authentication { body } | Self::Request { body, .. } => Some(body),
            Self::Decoding(_) | Self::Transport { .. } => None,
        }
    }
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered `401 Unauthorized`
    Authentication,
    /// The server answered with a status other than `200` or `401`
    Request,
    /// The server answered `200 OK` but the body was malformed
    Decoding,
    /// No response was received
    Transport,
}

/// A success response, or a request body, that could not be (de)serialized
#[derive(Debug, thiserror::Error)]
pub enum DecodingError {
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(
        "row {row} of series '{series}' has {actual} values \
        but the series has {expected} columns"
    )]
    RowLength {
        series: String,
        row: usize,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Time series precision
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    #[serde(rename = "s")]
    Second,
    #[serde(rename = "ms")]
    Millisecond,
    #[serde(rename = "u")]
    Microsecond,
}

impl Precision {
    /// The value of the `time_precision` URL parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Second => "s",
            Self::Millisecond => "ms",
            Self::Microsecond => "u",
        }
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a valid precision, values are s, ms, and u")]
pub struct ParsePrecisionError(String);

impl FromStr for Precision {
    type Err = ParsePrecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" | "second" => Ok(Self::Second),
            "ms" | "millisecond" => Ok(Self::Millisecond),
            "u" | "microsecond" => Ok(Self::Microsecond),
            _ => Err(ParsePrecisionError(s.into())),
        }
    }
}

/// An entry of the `GET /db` listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
}

/// An entry of the `GET /cluster_admins` listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAdmin {
    pub name: String,
}

/// An entry of the `GET /db/{db}/users` listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseUser {
    pub name: String,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

/// Changes applied by [`Client::update_database_user`]; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
}

/// The InfluxDB 0.8 Client
///
/// For programmatic access to the HTTP API of InfluxDB 0.8. Cloning is cheap
/// and clones share the underlying [`Transport`], so one client can serve
/// many tasks at once.
#[derive(Debug, Clone)]
pub struct Client {
    /// Server address, credentials and target database
    config: Arc<ClientConfig>,
    /// Issues the HTTP requests, a [`ReqwestTransport`] unless one is supplied
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a new [`Client`] sending requests with a [`ReqwestTransport`]
    ///
    /// # Example
    /// ```
    /// # use influxdb08_client::{Client, ClientConfig};
    /// let client = Client::new(ClientConfig::new("stats").with_host("localhost"));
    /// assert_eq!(client.config().database(), "stats");
    /// ```
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Create a new [`Client`] sending requests through `transport`
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// A client with `config` in place of the current config, sharing this
    /// client's transport
    pub fn with_config(&self, config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::clone(&self.transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Make a request to the `POST /db` API
    pub async fn create_database(&self, name: impl Into<String> + Send) -> Result<()> {
        #[derive(Serialize)]
        struct Req {
            name: String,
        }
        self.post("db", None, &Req { name: name.into() }).await?;
        Ok(())
    }

    /// Make a request to the `DELETE /db/{name}` API
    pub async fn delete_database(&self, name: impl AsRef<str> + Send) -> Result<()> {
        self.delete(&format!("db/{}", name.as_ref())).await?;
        Ok(())
    }

    /// Make a request to the `GET /db` API
    pub async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        self.get_json("db", None).await
    }

    /// Make a request to the `POST /cluster_admins` API
    pub async fn create_cluster_admin(
        &self,
        username: impl Into<String> + Send,
        password: impl Into<String> + Send,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct Req {
            name: String,
            password: String,
        }
        let req = Req {
            name: username.into(),
            password: password.into(),
        };
        self.post("cluster_admins", None, &req).await?;
        Ok(())
    }

    /// Make a request to the `POST /cluster_admins/{username}` API
    pub async fn update_cluster_admin(
        &self,
        username: impl AsRef<str> + Send,
        password: impl Into<String> + Send,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct Req {
            password: String,
        }
        let path = format!("cluster_admins/{}", username.as_ref());
        self.post(
            &path,
            None,
            &Req {
                password: password.into(),
            },
        )
        .await?;
        Ok(())
    }

    /// Make a request to the `DELETE /cluster_admins/{username}` API
    pub async fn delete_cluster_admin(&self, username: impl AsRef<str> + Send) -> Result<()> {
        self.delete(&format!("cluster_admins/{}", username.as_ref()))
            .await?;
        Ok(())
    }

    /// Make a request to the `GET /cluster_admins` API
    pub async fn list_cluster_admins(&self) -> Result<Vec<ClusterAdmin>> {
        self.get_json("cluster_admins", None).await
    }

    /// Make a request to the `POST /db/{database}/users` API
    pub async fn create_database_user(
        &self,
        database: impl AsRef<str> + Send,
        username: impl Into<String> + Send,
        password: impl Into<String> + Send,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct Req {
            name: String,
            password: String,
        }
        let path = format!("db/{}/users", database.as_ref());
        let req = Req {
            name: username.into(),
            password: password.into(),
        };
        self.post(&path, None, &req).await?;
        Ok(())
    }

    /// Make a request to the `POST /db/{database}/users/{username}` API
    pub async fn update_database_user(
        &self,
        database: impl AsRef<str> + Send,
        username: impl AsRef<str> + Send,
        update: DatabaseUserUpdate,
    ) -> Result<()> {
        let path = format!("db/{}/users/{}", database.as_ref(), username.as_ref());
        self.post(&path, None, &update).await?;
        Ok(())
    }

    /// Grant or revoke admin rights of a database user
    pub async fn alter_database_privilege(
        &self,
        database: impl AsRef<str> + Send,
        username: impl AsRef<str> + Send,
        admin: bool,
    ) -> Result<()> {
        let update = DatabaseUserUpdate {
            admin: Some(admin),
            ..Default::default()
        };
        self.update_database_user(database, username, update).await
    }

    /// Make a request to the `DELETE /db/{database}/users/{username}` API
    pub async fn delete_database_user(
        &self,
        database: impl AsRef<str> + Send,
        username: impl AsRef<str> + Send,
    ) -> Result<()> {
        let path = format!("db/{}/users/{}", database.as_ref(), username.as_ref());
        self.delete(&path).await?;
        Ok(())
    }

    /// Make a request to the `GET /db/{database}/users` API
    pub async fn list_database_users(
        &self,
        database: impl AsRef<str> + Send,
    ) -> Result<Vec<DatabaseUser>> {
        self.get_json(&format!("db/{}/users", database.as_ref()), None)
            .await
    }

    /// Compose a write to the `POST /db/{database}/series` API
    ///
    /// # Example
    /// ```no_run
    /// # use influxdb08_client::{Client, ClientConfig, Point, Precision};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    /// let client = Client::new(ClientConfig::new("stats"));
    /// client
    ///     .write()
    ///     .series("cpu", vec![
    ///         Point::new().with("host", "s1").with("usage", 0.5),
    ///         Point::new().with("host", "s2").with("usage", 0.7).with("region", "us-west"),
    ///     ])
    ///     .series("mem", Point::new().with("free", 1024_i64))
    ///     .precision(Precision::Second)
    ///     .send()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn write(&self) -> WriteRequestBuilder<'_> {
        WriteRequestBuilder {
            client: self,
            payloads: Vec::new(),
            precision: None,
        }
    }

    /// Write `points` to the series `name`
    pub async fn write_points(
        &self,
        name: impl Into<String> + Send,
        points: impl Into<PointBatch> + Send,
    ) -> Result<()> {
        self.write().series(name, points).send().await
    }

    /// Send already encoded series to the `POST /db/{database}/series` API
    pub async fn write_payloads(
        &self,
        payloads: &[SeriesPayload],
        precision: Option<Precision>,
    ) -> Result<()> {
        let path = format!("db/{}/series", self.config.database());
        let query = precision.map(|p| {
            form_urlencoded::Serializer::new(String::new())
                .append_pair("time_precision", p.as_str())
                .finish()
        });
        self.post(&path, query.as_deref(), &payloads).await?;
        Ok(())
    }

    /// Compose a request to the `GET /db/{database}/series?q=...` API
    ///
    /// # Example
    /// ```no_run
    /// # use influxdb08_client::{Client, ClientConfig};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    /// let client = Client::new(ClientConfig::new("stats"));
    /// let result = client.query("select * from cpu limit 10").send().await?;
    /// for (series, points) in &result {
    ///     println!("{series}: {} points", points.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn query(&self, query: impl Into<String>) -> QueryRequestBuilder<'_> {
        QueryRequestBuilder {
            client: self,
            query: query.into(),
            precision: None,
            chunked: None,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: Option<&str>) -> Result<T> {
        let url = endpoint::build_url(&self.config, path, query);
        let resp = self.send(path, HttpRequest::get(url)).await?;
        interpret_json(resp)
    }

    async fn post<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        query: Option<&str>,
        body: &B,
    ) -> Result<String> {
        let body = serde_json::to_string(body).map_err(DecodingError::Serialize)?;
        let url = endpoint::build_url(&self.config, path, query);
        let resp = self
            .send(path, HttpRequest::post(url, body, HeaderMap::new()))
            .await?;
        interpret(resp)
    }

    async fn delete(&self, path: &str) -> Result<String> {
        let url = endpoint::build_url(&self.config, path, None);
        let resp = self.send(path, HttpRequest::delete(url)).await?;
        interpret(resp)
    }

    async fn send(&self, path: &str, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method.clone();
        debug!(%method, path, "sending request");
        self.transport
            .send(request)
            .await
            .map_err(|src| Error::transport(method, path, src))
    }
}

/// Builder type for composing a write to `/db/{database}/series`
///
/// Produced by [`Client::write`]. Each call to
/// [`series`](WriteRequestBuilder::series) encodes one series; all of them
/// go out in a single request.
#[derive(Debug)]
pub struct WriteRequestBuilder<'c> {
    client: &'c Client,
    payloads: Vec<SeriesPayload>,
    precision: Option<Precision>,
}

impl WriteRequestBuilder<'_> {
    /// Add `points` for the series `name`
    pub fn series(mut self, name: impl Into<String>, points: impl Into<PointBatch>) -> Self {
        self.payloads.push(encode(name, points));
        self
    }

    /// Set the precision of the `time` column
    pub fn precision(mut self, set_to: Precision) -> Self {
        self.precision = Some(set_to);
        self
    }

    /// The series encoded so far
    pub fn payloads(&self) -> &[SeriesPayload] {
        &self.payloads
    }

    /// Send the request to the server
    pub async fn send(self) -> Result<()> {
        self.client
            .write_payloads(&self.payloads, self.precision)
            .await
    }

    /// Hand the write to `queue` instead of sending it
    pub fn enqueue<Q: WriteQueue + ?Sized>(self, queue: &Q) {
        queue.enqueue(PendingWrite {
            payloads: self.payloads,
            precision: self.precision,
        });
    }
}

/// Builder type for composing a request to `/db/{database}/series?q=...`
///
/// Produced by [`Client::query`]
#[derive(Debug)]
pub struct QueryRequestBuilder<'c> {
    client: &'c Client,
    query: String,
    precision: Option<Precision>,
    chunked: Option<bool>,
}

impl QueryRequestBuilder<'_> {
    /// Set the precision of the returned `time` column
    pub fn precision(mut self, set_to: Precision) -> Self {
        self.precision = Some(set_to);
        self
    }

    /// Set the `chunked` parameter
    pub fn chunked(mut self, set_to: bool) -> Self {
        self.chunked = Some(set_to);
        self
    }

    /// Send the query and collect every returned series
    pub async fn send(self) -> Result<QueryResult> {
        let mut result = QueryResult::new();
        self.for_each_series(|name, points| {
            result.insert(name, points);
        })
        .await?;
        Ok(result)
    }

    /// Send the query and call `visitor` with each returned series, in the
    /// order the server returned them.
    ///
    /// Series are decoded one at a time, so a malformed series fails the call
    /// after `visitor` has already seen the series before it.
    pub async fn for_each_series<F>(self, mut visitor: F) -> Result<()>
    where
        F: FnMut(String, Vec<Point>) + Send,
    {
        let path = format!("db/{}/series", self.client.config.database());
        let query = self.query_string();
        let payloads: Vec<SeriesPayload> = self.client.get_json(&path, Some(&query)).await?;

        for payload in payloads {
            let name = payload.name.clone();
            let points = denormalize(payload)?;
            visitor(name, points);
        }
        Ok(())
    }

    fn query_string(&self) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());
        params.append_pair("q", &self.query);
        if let Some(chunked) = self.chunked {
            params.append_pair("chunked", if chunked { "true" } else { "false" });
        }
        if let Some(precision) = self.precision {
            params.append_pair("time_precision", precision.as_str());
        }
        params.finish()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mockito::{Matcher, Server, ServerGuard};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn client_for(server: &ServerGuard) -> Client {
        let addr: std::net::SocketAddr = server.host_with_port().parse().unwrap();
        Client::new(
            ClientConfig::new("stats")
                .with_host(addr.ip().to_string())
                .with_port(addr.port())
                .with_credentials("user", "secret"),
        )
    }

    fn credentials() -> Vec<Matcher> {
        vec![
            Matcher::UrlEncoded("u".into(), "user".into()),
            Matcher::UrlEncoded("p".into(), "secret".into()),
        ]
    }

    fn credentials_and(extra: impl IntoIterator<Item = (&'static str, &'static str)>) -> Matcher {
        let mut matchers = credentials();
        matchers.extend(
            extra
                .into_iter()
                .map(|(k, v)| Matcher::UrlEncoded(k.into(), v.into())),
        );
        Matcher::AllOf(matchers)
    }

    #[tokio::test]
    async fn write_points() {
        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/db/stats/series")
            .match_query(Matcher::AllOf(credentials()))
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!([
                {"name": "temps", "columns": ["a", "b"], "points": [[1, 2], [null, 3]]}
            ])))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&mock_server);
        client
            .write_points(
                "temps",
                vec![
                    Point::from([("a", 1_i64), ("b", 2_i64)]),
                    Point::from([("b", 3_i64)]),
                ],
            )
            .await
            .expect("send write request");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn write_many_series_with_precision() {
        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/db/stats/series")
            .match_query(credentials_and([("time_precision", "s")]))
            .match_body(Matcher::Json(json!([
                {"name": "cpu", "columns": ["host", "time", "usage"], "points": [["s1", 1, 0.5]]},
                {"name": "mem", "columns": ["free"], "points": [[1024]]}
            ])))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&mock_server);
        client
            .write()
            .series(
                "cpu",
                Point::new()
                    .with("usage", 0.5)
                    .with("host", "s1")
                    .with("time", 1_i64),
            )
            .series("mem", Point::new().with("free", 1024_i64))
            .precision(Precision::Second)
            .send()
            .await
            .expect("send write request");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn write_rejected_by_server() {
        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/db/stats/series")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body("Unknown column type")
            .create_async()
            .await;

        let client = client_for(&mock_server);
        let err = client
            .write_points("cpu", Point::new().with("value", 1_i64))
            .await
            .expect_err("server rejects the write");

        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(err.body(), Some("Unknown column type"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn query_collects_series_in_order() {
        let query = "select * from temps, cpu";
        let body = json!([
            {"name": "temps", "columns": ["a", "b"], "points": [[1, 2], [null, 3]]},
            {"name": "cpu", "columns": ["time", "value"], "points": [[10, 0.5]]}
        ]);

        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("GET", "/db/stats/series")
            .match_query(credentials_and([
                ("q", query),
                ("chunked", "false"),
                ("time_precision", "ms"),
            ]))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = client_for(&mock_server);
        let result = client
            .query(query)
            .chunked(false)
            .precision(Precision::Millisecond)
            .send()
            .await
            .expect("send query request");

        assert_eq!(
            result.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["temps", "cpu"]
        );
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "temps": [{"a": 1, "b": 2}, {"a": null, "b": 3}],
                "cpu": [{"time": 10, "value": 0.5}]
            })
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn query_visits_series_in_order() {
        let body = json!([
            {"name": "b", "columns": ["v"], "points": [[1]]},
            {"name": "a", "columns": ["v"], "points": [[2], [3]]}
        ]);

        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("GET", "/db/stats/series")
            .match_query(credentials_and([("q", "select v from /.*/")]))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = client_for(&mock_server);
        let mut seen = Vec::new();
        client
            .query("select v from /.*/")
            .for_each_series(|name, points| seen.push((name, points.len())))
            .await
            .expect("send query request");

        assert_eq!(seen, vec![("b".to_string(), 1), ("a".to_string(), 2)]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn query_with_malformed_rows() {
        let body = json!([{"name": "temps", "columns": ["a", "b"], "points": [[1]]}]);

        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("GET", "/db/stats/series")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = client_for(&mock_server);
        let err = client
            .query("select * from temps")
            .send()
            .await
            .expect_err("row is shorter than the columns");

        assert_eq!(err.kind(), ErrorKind::Decoding);
        assert!(matches!(
            err,
            Error::Decoding(DecodingError::RowLength { expected: 2, actual: 1, .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn query_unauthorized() {
        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("GET", "/db/stats/series")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("Invalid username/password")
            .create_async()
            .await;

        let client = client_for(&mock_server);
        let err = client.query("list series").send().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.body(), Some("Invalid username/password"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn database_lifecycle() {
        let mut mock_server = Server::new_async().await;
        let create = mock_server
            .mock("POST", "/db")
            .match_query(Matcher::AllOf(credentials()))
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"name": "metrics"})))
            .with_status(201)
            .create_async()
            .await;
        let list = mock_server
            .mock("GET", "/db")
            .match_query(Matcher::AllOf(credentials()))
            .with_status(200)
            .with_body(r#"[{"name":"db1"},{"name":"metrics"}]"#)
            .create_async()
            .await;
        let delete = mock_server
            .mock("DELETE", "/db/metrics")
            .match_query(Matcher::AllOf(credentials()))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&mock_server);

        // only a 200 counts as success
        let err = client.create_database("metrics").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Request);

        let databases = client.list_databases().await.expect("list databases");
        assert_eq!(
            databases,
            vec![
                DatabaseInfo {
                    name: "db1".to_string()
                },
                DatabaseInfo {
                    name: "metrics".to_string()
                },
            ]
        );

        client
            .delete_database("metrics")
            .await
            .expect("delete database");

        create.assert_async().await;
        list.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn cluster_admins() {
        let mut mock_server = Server::new_async().await;
        let create = mock_server
            .mock("POST", "/cluster_admins")
            .match_query(Matcher::AllOf(credentials()))
            .match_body(Matcher::Json(json!({"name": "ops", "password": "pw"})))
            .with_status(200)
            .create_async()
            .await;
        let update = mock_server
            .mock("POST", "/cluster_admins/ops")
            .match_query(Matcher::AllOf(credentials()))
            .match_body(Matcher::Json(json!({"password": "new-pw"})))
            .with_status(200)
            .create_async()
            .await;
        let list = mock_server
            .mock("GET", "/cluster_admins")
            .match_query(Matcher::AllOf(credentials()))
            .with_status(200)
            .with_body(r#"[{"name":"root"},{"name":"ops"}]"#)
            .create_async()
            .await;
        let delete = mock_server
            .mock("DELETE", "/cluster_admins/ops")
            .match_query(Matcher::AllOf(credentials()))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&mock_server);
        client.create_cluster_admin("ops", "pw").await.unwrap();
        client.update_cluster_admin("ops", "new-pw").await.unwrap();
        let admins = client.list_cluster_admins().await.unwrap();
        assert_eq!(
            admins.into_iter().map(|a| a.name).collect::<Vec<_>>(),
            vec!["root", "ops"]
        );
        client.delete_cluster_admin("ops").await.unwrap();

        create.assert_async().await;
        update.assert_async().await;
        list.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn database_users() {
        let mut mock_server = Server::new_async().await;
        let create = mock_server
            .mock("POST", "/db/metrics/users")
            .match_query(Matcher::AllOf(credentials()))
            .match_body(Matcher::Json(json!({"name": "reader", "password": "pw"})))
            .with_status(200)
            .create_async()
            .await;
        let grant = mock_server
            .mock("POST", "/db/metrics/users/reader")
            .match_query(Matcher::AllOf(credentials()))
            .match_body(Matcher::Json(json!({"admin": true})))
            .with_status(200)
            .create_async()
            .await;
        let password = mock_server
            .mock("POST", "/db/metrics/users/reader")
            .match_query(Matcher::AllOf(credentials()))
            .match_body(Matcher::Json(json!({"password": "pw2"})))
            .with_status(200)
            .create_async()
            .await;
        let list = mock_server
            .mock("GET", "/db/metrics/users")
            .match_query(Matcher::AllOf(credentials()))
            .with_status(200)
            .with_body(r#"[{"name":"reader","isAdmin":true},{"name":"legacy"}]"#)
            .create_async()
            .await;
        let delete = mock_server
            .mock("DELETE", "/db/metrics/users/reader")
            .match_query(Matcher::AllOf(credentials()))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&mock_server);
        client
            .create_database_user("metrics", "reader", "pw")
            .await
            .unwrap();
        client
            .alter_database_privilege("metrics", "reader", true)
            .await
            .unwrap();
        client
            .update_database_user(
                "metrics",
                "reader",
                DatabaseUserUpdate {
                    password: Some("pw2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let users = client.list_database_users("metrics").await.unwrap();
        assert_eq!(
            users,
            vec![
                DatabaseUser {
                    name: "reader".to_string(),
                    is_admin: true
                },
                DatabaseUser {
                    name: "legacy".to_string(),
                    is_admin: false
                },
            ]
        );
        client
            .delete_database_user("metrics", "reader")
            .await
            .unwrap();

        create.assert_async().await;
        grant.assert_async().await;
        password.assert_async().await;
        list.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = Client::new(ClientConfig::new("stats").with_port(port));

        let err = client.list_databases().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.body().is_none());
        assert!(
            matches!(err, Error::Transport { ref method, ref path, .. } if *method == Method::GET && path == "db")
        );
    }

    /// Answers every request with a canned response and remembers the URLs
    #[derive(Debug)]
    struct CannedTransport {
        response: HttpResponse,
        urls: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.urls.lock().unwrap().push(request.url);
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn with_config_replaces_the_whole_config() {
        let transport = Arc::new(CannedTransport {
            response: HttpResponse::new(StatusCode::OK, "[]"),
            urls: Default::default(),
        });
        let first = Client::with_transport(
            ClientConfig::new("a").with_credentials("u1", "p1"),
            Arc::clone(&transport) as Arc<dyn Transport>,
        );
        let second = first.with_config(
            ClientConfig::new("b")
                .with_host("other")
                .with_credentials("u2", "p2"),
        );

        first.query("list series").send().await.unwrap();
        second.query("list series").send().await.unwrap();

        assert_eq!(first.config().database(), "a");
        assert_eq!(
            *transport.urls.lock().unwrap(),
            vec![
                "http://127.0.0.1:8086/db/a/series?u=u1&p=p1&q=list+series",
                "http://other:8086/db/b/series?u=u2&p=p2&q=list+series",
            ]
        );
    }

    #[test]
    fn precision_parsing() {
        assert_eq!("s".parse::<Precision>(), Ok(Precision::Second));
        assert_eq!("millisecond".parse::<Precision>(), Ok(Precision::Millisecond));
        assert_eq!("u".parse::<Precision>(), Ok(Precision::Microsecond));
        assert_eq!(
            "ns".parse::<Precision>().unwrap_err().to_string(),
            "ns is not a valid precision, values are s, ms, and u"
        );
    }
}
