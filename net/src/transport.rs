//! Opening the long-lived streaming response.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{header::USER_AGENT, Client, Url};
use tracing::info;

use crate::TransportError;

/// Body of a streaming response as it arrives.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Static credentials sent with the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Basic { user: String, password: String },
    Bearer(String),
}

impl Credentials {
    /// Parse `user:password`. The password may itself contain colons.
    pub fn basic(auth: &str) -> Option<Self> {
        let (user, password) = auth.split_once(':')?;
        Some(Credentials::Basic {
            user: user.to_string(),
            password: password.to_string(),
        })
    }
}

/// Where to connect and how to authenticate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    credentials: Option<Credentials>,
}

impl Endpoint {
    /// HTTPS endpoint at `host:port` with `path` (which may carry a query).
    pub fn new(host: &str, port: u16, path: &str) -> Result<Self, TransportError> {
        Self::parse(&format!("https://{host}:{port}{path}"))
    }

    /// Endpoint from a full URL.
    pub fn parse(url: &str) -> Result<Self, TransportError> {
        let url = Url::parse(url).map_err(|e| TransportError::InvalidEndpoint(format!("{url}: {e}")))?;
        if url.host_str().is_none() {
            return Err(TransportError::InvalidEndpoint(format!("{url}: missing host")));
        }
        Ok(Self {
            url,
            credentials: None,
        })
    }

    /// Append a query parameter, e.g. `track`.
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

/// Supplies the byte stream for a [`Connection`](crate::Connection).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the stream. Resolves once the response status is confirmed.
    async fn connect(&self, endpoint: &Endpoint) -> Result<ChunkStream, TransportError>;
}

/// [`Transport`] over HTTP(S) using `reqwest`.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn connect(&self, endpoint: &Endpoint) -> Result<ChunkStream, TransportError> {
        let mut req = self
            .client
            .get(endpoint.url().clone())
            .header(USER_AGENT, concat!("net/", env!("CARGO_PKG_VERSION")));
        req = match endpoint.credentials() {
            Some(Credentials::Basic { user, password }) => req.basic_auth(user, Some(password)),
            Some(Credentials::Bearer(token)) => req.bearer_auth(token),
            None => req,
        };
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }
        info!(%status, "stream response");
        let stream = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::from));
        Ok(Box::pin(stream))
    }
}
