// crates/kawsay-contract/src/transport.rs
// ============================================================================
// Module: Predictor Transport
// Description: HTTP transport for typed and raw predictor payloads.
// Purpose: Execute requests with fixed headers and timeout, returning raw status and body.
// Dependencies: reqwest, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! [`PredictorClient::execute`] resolves a path against the configured base
//! URL, sends either a typed [`PredictionRequest`] or raw bytes, and returns
//! the status and body uninterpreted so callers can assert on malformed
//! responses too.
//! Invariants:
//! - Every request carries `Content-Type` and `Accept` set to `application/json`.
//! - Every request is bounded by [`REQUEST_TIMEOUT`].
//! - Connections are not pooled; each call obtains and releases its own.
//! - A response whose body cannot be read in full is a transport failure.
//! - Transport failures are returned once and never retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;
use std::time::Instant;

use reqwest::Client;
use reqwest::Method;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use url::Url;

use crate::config::ConfigError;
use crate::config::HarnessConfig;
use crate::events::EventSink;
use crate::events::ExchangeEvent;
use crate::events::ExchangeEventParams;
use crate::events::NoopEventSink;
use crate::events::duration_millis;
use crate::events::sink_for_target;
use crate::model::PredictionRequest;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Bulk prediction endpoint path.
pub const BULK_PREDICT_PATH: &str = "/bulk-predict";
/// Health endpoint path.
pub const HEALTH_PATH: &str = "/health";
/// Media type used for both request and accepted response bodies.
const JSON_MEDIA_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Transport-level failures. Fatal to the current scenario only.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Harness configuration could not be loaded.
    #[error("harness configuration error: {0}")]
    Config(#[from] ConfigError),
    /// HTTP client or event sink construction failed.
    #[error("http client construction failed: {0}")]
    Client(String),
    /// Request URL could not be built from the base URL and path.
    #[error("invalid request url for {path}: {reason}")]
    InvalidUrl {
        /// Requested path.
        path: String,
        /// Failure description.
        reason: String,
    },
    /// Typed payload could not be serialized.
    #[error("request encoding failed for {path}: {reason}")]
    Encode {
        /// Requested path.
        path: String,
        /// Failure description.
        reason: String,
    },
    /// Connection could not be established.
    #[error("connection to {url} failed: {reason}")]
    Connect {
        /// Resolved request URL.
        url: String,
        /// Failure description.
        reason: String,
    },
    /// Request exceeded [`REQUEST_TIMEOUT`].
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Resolved request URL.
        url: String,
        /// Applied timeout in seconds.
        timeout_secs: u64,
    },
    /// Response body could not be read completely.
    #[error("reading response body from {url} failed: {reason}")]
    Body {
        /// Resolved request URL.
        url: String,
        /// Failure description.
        reason: String,
    },
    /// Any other send failure.
    #[error("request to {url} failed: {reason}")]
    Request {
        /// Resolved request URL.
        url: String,
        /// Failure description.
        reason: String,
    },
}

impl TransportError {
    /// Returns a stable label for event logs and reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Client(_) => "client",
            Self::InvalidUrl {
                ..
            } => "invalid_url",
            Self::Encode {
                ..
            } => "encode",
            Self::Connect {
                ..
            } => "connect",
            Self::Timeout {
                ..
            } => "timeout",
            Self::Body {
                ..
            } => "body",
            Self::Request {
                ..
            } => "request",
        }
    }
}

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Request body for a scenario.
///
/// # Invariants
/// - [`Payload::Raw`] bytes are sent verbatim, even when they are not valid JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Typed request serialized to wire JSON.
    Typed(PredictionRequest),
    /// Pre-formed bytes for shapes the typed model cannot express.
    Raw(Vec<u8>),
}

impl Payload {
    /// Builds a raw payload from anything byte-like.
    #[must_use]
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Raw(bytes.into())
    }

    /// Returns the typed request when present.
    #[must_use]
    pub const fn typed_request(&self) -> Option<&PredictionRequest> {
        match self {
            Self::Typed(request) => Some(request),
            Self::Raw(_) => None,
        }
    }

    /// Returns the wire bytes for the payload.
    ///
    /// # Errors
    ///
    /// Returns a serde error when a typed request cannot be serialized.
    pub fn encode(&self) -> Result<Cow<'_, [u8]>, serde_json::Error> {
        match self {
            Self::Typed(request) => request.to_json_bytes().map(Cow::Owned),
            Self::Raw(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
        }
    }
}

impl From<PredictionRequest> for Payload {
    fn from(request: PredictionRequest) -> Self {
        Self::Typed(request)
    }
}

// ============================================================================
// SECTION: Exchange
// ============================================================================

/// Captured result of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// HTTP method used.
    pub method: Method,
    /// Requested path relative to the base URL.
    pub path: String,
    /// Raw status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
    /// Wall-clock duration of the exchange.
    pub elapsed: Duration,
}

impl Exchange {
    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client bound to one predictor base URL.
#[derive(Clone)]
pub struct PredictorClient {
    /// Base URL every path is resolved against.
    base_url: Url,
    /// Underlying HTTP client.
    client: Client,
    /// Destination for exchange events.
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for PredictorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictorClient").field("base_url", &self.base_url.as_str()).finish()
    }
}

impl PredictorClient {
    /// Creates a client from harness configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] when the HTTP client or the
    /// configured event sink cannot be constructed.
    pub fn new(config: &HarnessConfig) -> Result<Self, TransportError> {
        let client = Self::from_base_url(config.base_url.clone())?;
        match &config.event_log {
            Some(target) => {
                let sink = sink_for_target(target)
                    .map_err(|err| TransportError::Client(format!("event log: {err}")))?;
                Ok(client.with_event_sink(sink))
            }
            None => Ok(client),
        }
    }

    /// Creates a client for a base URL with events discarded.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] when the HTTP client cannot be built.
    pub fn from_base_url(base_url: Url) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|err| TransportError::Client(err.to_string()))?;
        Ok(Self {
            base_url,
            client,
            events: Arc::new(NoopEventSink),
        })
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the event sink shared with the scenario engine.
    #[must_use]
    pub fn events(&self) -> Arc<dyn EventSink> {
        Arc::clone(&self.events)
    }

    /// Resolves a path against the base URL, keeping any base path prefix.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] when the joined URL is invalid.
    pub fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let suffix = if path.starts_with('/') {
            Cow::Borrowed(path)
        } else {
            Cow::Owned(format!("/{path}"))
        };
        Url::parse(&format!("{base}{suffix}")).map_err(|err| TransportError::InvalidUrl {
            path: path.to_string(),
            reason: err.to_string(),
        })
    }

    /// Executes one request and captures the raw status and body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on URL, encoding, connection, or timeout
    /// failures. Non-2xx statuses are not errors.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Payload>,
    ) -> Result<Exchange, TransportError> {
        let started = Instant::now();
        let result = self.send(method.clone(), path, payload, started).await;
        let (status, request_bytes, response_bytes, error_kind) = match &result {
            Ok((exchange, sent)) => (Some(exchange.status), *sent, exchange.body.len(), None),
            Err(err) => (None, 0, 0, Some(err.kind())),
        };
        self.events.record_exchange(&ExchangeEvent::new(ExchangeEventParams {
            method: method.as_str().to_string(),
            path: path.to_string(),
            status,
            request_bytes,
            response_bytes,
            elapsed_ms: duration_millis(started.elapsed()),
            error_kind,
        }));
        result.map(|(exchange, _)| exchange)
    }

    /// Sends `POST /bulk-predict` with the given payload.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] as described for [`Self::execute`].
    pub async fn bulk_predict(&self, payload: &Payload) -> Result<Exchange, TransportError> {
        self.execute(Method::POST, BULK_PREDICT_PATH, Some(payload)).await
    }

    /// Sends `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] as described for [`Self::execute`].
    pub async fn health(&self) -> Result<Exchange, TransportError> {
        self.execute(Method::GET, HEALTH_PATH, None).await
    }

    /// Builds, sends, and drains one request; returns the exchange and request size.
    async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Payload>,
        started: Instant,
    ) -> Result<(Exchange, usize), TransportError> {
        let url = self.resolve(path)?;
        let body = payload
            .map(Payload::encode)
            .transpose()
            .map_err(|err| TransportError::Encode {
                path: path.to_string(),
                reason: err.to_string(),
            })?
            .map(Cow::into_owned);
        let request_bytes = body.as_ref().map_or(0, Vec::len);

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(ACCEPT, JSON_MEDIA_TYPE);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|err| classify_send_error(&url, &err))?;
        let status = response.status().as_u16();
        // Consuming the body releases the connection on success and failure alike.
        let body = response.bytes().await.map_err(|err| classify_body_error(&url, &err))?.to_vec();
        Ok((
            Exchange {
                method,
                path: path.to_string(),
                status,
                body,
                elapsed: started.elapsed(),
            },
            request_bytes,
        ))
    }
}

/// Maps a reqwest send failure onto the transport taxonomy.
fn classify_send_error(url: &Url, err: &reqwest::Error) -> TransportError {
    let url = url.to_string();
    if err.is_timeout() {
        TransportError::Timeout {
            url,
            timeout_secs: REQUEST_TIMEOUT.as_secs(),
        }
    } else if err.is_connect() {
        TransportError::Connect {
            url,
            reason: err.to_string(),
        }
    } else {
        TransportError::Request {
            url,
            reason: err.to_string(),
        }
    }
}

/// Maps a body read failure; a deadline hit mid-body is still a timeout.
fn classify_body_error(url: &Url, err: &reqwest::Error) -> TransportError {
    let url = url.to_string();
    if err.is_timeout() {
        TransportError::Timeout {
            url,
            timeout_secs: REQUEST_TIMEOUT.as_secs(),
        }
    } else {
        TransportError::Body {
            url,
            reason: err.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Shared Client
// ============================================================================

/// Process-wide client slot, initialized once from the environment.
static SHARED_CLIENT: OnceLock<PredictorClient> = OnceLock::new();

/// Returns the process-wide client, building it from [`HarnessConfig::load`]
/// on first use. The client is never torn down.
///
/// # Errors
///
/// Returns [`TransportError`] when configuration or client construction fails.
pub fn shared_client() -> Result<&'static PredictorClient, TransportError> {
    if let Some(client) = SHARED_CLIENT.get() {
        return Ok(client);
    }
    let config = HarnessConfig::load()?;
    let client = PredictorClient::new(&config)?;
    // A concurrent initializer may have won the race; either client is equivalent.
    let _ = SHARED_CLIENT.set(client);
    SHARED_CLIENT
        .get()
        .ok_or_else(|| TransportError::Client("shared client unavailable".to_string()))
}
