//! HTTP batch sender.
//!
//! POSTs the JSON batch to the configured send endpoint and reads back
//! `{ "sent": .., "failed": .., "total": .. }` from a 2xx response.

use super::{BatchMessage, MessageSender};
use crate::config::DispatchSettings;
use crate::logging::sanitize_message;
use crate::model::dispatch::DispatchProgress;
use log::debug;
use reqwest::blocking::Client;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use url::Url;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Failures talking to the send endpoint.
#[derive(Debug)]
pub enum SendError {
    /// No endpoint configured.
    NotConfigured,
    InvalidEndpoint(url::ParseError),
    /// HTTP client could not be built.
    Client(reqwest::Error),
    /// Request never produced a response.
    Transport(reqwest::Error),
    /// Endpoint answered with a non-success status.
    Status { status: u16, body: String },
    /// Success status but the body is not a tally.
    Decode(reqwest::Error),
}

impl Display for SendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "dispatch endpoint is not configured"),
            Self::InvalidEndpoint(err) => write!(f, "invalid dispatch endpoint: {err}"),
            Self::Client(err) => write!(f, "failed to create HTTP client: {err}"),
            Self::Transport(err) => write!(f, "failed to send batch: {err}"),
            Self::Status { status, body } => write!(f, "send endpoint returned {status}: {body}"),
            Self::Decode(err) => write!(f, "failed to parse send response: {err}"),
        }
    }
}

impl Error for SendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEndpoint(err) => Some(err),
            Self::Client(err) | Self::Transport(err) | Self::Decode(err) => Some(err),
            Self::NotConfigured | Self::Status { .. } => None,
        }
    }
}

/// [`MessageSender`] backed by a blocking HTTP client.
pub struct HttpBatchSender {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpBatchSender {
    /// Builds a sender from dispatch settings.
    ///
    /// # Errors
    /// - `NotConfigured` when `settings.endpoint` is unset.
    /// - `InvalidEndpoint` when it does not parse as a URL.
    pub fn new(settings: &DispatchSettings) -> Result<Self, SendError> {
        let endpoint = settings
            .endpoint
            .as_deref()
            .ok_or(SendError::NotConfigured)?;
        let endpoint = Url::parse(endpoint).map_err(SendError::InvalidEndpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(SendError::Client)?;

        Ok(Self {
            client,
            endpoint,
            token: settings.api_token.clone(),
        })
    }
}

impl MessageSender for HttpBatchSender {
    type Error = SendError;

    fn send_batch(&self, batch: &BatchMessage) -> Result<DispatchProgress, SendError> {
        let mut request = self.client.post(self.endpoint.clone()).json(batch);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(SendError::Transport)?;
        let status = response.status();
        debug!(
            "event=dispatch_http module=dispatch status_code={} endpoint_host={}",
            status.as_u16(),
            self.endpoint.host_str().unwrap_or("unknown")
        );

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SendError::Status {
                status: status.as_u16(),
                body: sanitize_message(&body, MAX_ERROR_BODY_CHARS),
            });
        }
        response.json::<DispatchProgress>().map_err(SendError::Decode)
    }
}
