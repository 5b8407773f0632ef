// src/api.rs

use std::time::Duration;

use reqwest::{
    Method, StatusCode,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use crate::{
    config::{CLIENT_ID_HEADER, Config},
    error::{AppError, GENERIC_ERROR_MESSAGE, NETWORK_ERROR_MESSAGE},
};

/// Outcome of one API call, mirroring the server's `{status, message, data}` envelope.
///
/// Expected failures (timeout, unreachable host, non-200, unreadable body) all arrive
/// as `Error`; nothing here is ever surfaced as a Rust error.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T = Value> {
    Success { message: String, data: Option<T> },
    /// Credentials accepted but the account still needs e-mail verification.
    Verify { message: String, data: Option<T> },
    Error { message: String },
}

impl<T> ApiResponse<T> {
    pub fn network_error() -> Self {
        ApiResponse::Error {
            message: NETWORK_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiResponse::Success { message, .. }
            | ApiResponse::Verify { message, .. }
            | ApiResponse::Error { message } => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    /// Collapses the response for callers that only accept `success` with a payload.
    pub fn into_data(self) -> Result<T, AppError> {
        match self {
            ApiResponse::Success {
                data: Some(data), ..
            } => Ok(data),
            ApiResponse::Success { data: None, .. } => {
                tracing::error!("Successful response carried no data");
                Err(AppError::Internal("missing response data".to_string()))
            }
            ApiResponse::Verify { message, .. } => Err(AppError::Api(message)),
            ApiResponse::Error { message } => Err(failure(message)),
        }
    }

    /// Like [`ApiResponse::into_data`] but the payload is optional; yields the message.
    pub fn into_message(self) -> Result<String, AppError> {
        match self {
            ApiResponse::Success { message, .. } => Ok(message),
            ApiResponse::Verify { message, .. } => Err(AppError::Api(message)),
            ApiResponse::Error { message } => Err(failure(message)),
        }
    }
}

impl ApiResponse<Value> {
    /// Decodes the raw `data` payload. A payload of the wrong shape is unexpected and
    /// becomes a generic error.
    pub fn decode<T: DeserializeOwned>(self) -> ApiResponse<T> {
        fn parse<T: DeserializeOwned>(data: Option<Value>) -> Result<Option<T>, serde_json::Error> {
            data.map(serde_json::from_value).transpose()
        }

        match self {
            ApiResponse::Success { message, data } => match parse(data) {
                Ok(data) => ApiResponse::Success { message, data },
                Err(e) => {
                    tracing::error!("Failed to decode response data: {}", e);
                    ApiResponse::Error {
                        message: GENERIC_ERROR_MESSAGE.to_string(),
                    }
                }
            },
            ApiResponse::Verify { message, data } => match parse(data) {
                Ok(data) => ApiResponse::Verify { message, data },
                Err(e) => {
                    tracing::error!("Failed to decode verification data: {}", e);
                    ApiResponse::Error {
                        message: GENERIC_ERROR_MESSAGE.to_string(),
                    }
                }
            },
            ApiResponse::Error { message } => ApiResponse::Error { message },
        }
    }
}

/// Error for a failed exchange: the client's own network message is a transport
/// failure, anything else came from the server.
pub(crate) fn failure(message: String) -> AppError {
    if message == NETWORK_ERROR_MESSAGE {
        AppError::Network(message)
    } else {
        AppError::Api(message)
    }
}

/// Wire form of the envelope. Every field is optional; servers are not trusted to
/// send a complete one.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    data: Option<Value>,
}

fn message_text(message: Option<Value>) -> String {
    match message {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => GENERIC_ERROR_MESSAGE.to_string(),
        Some(other) => other.to_string(),
    }
}

/// A single outgoing request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
    pub token: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            timeout: None,
            token: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, AppError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.token = token.filter(|t| !t.is_empty()).map(str::to_owned);
        self
    }
}

/// JSON-over-HTTP client for the learning API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    client_id: String,
    default_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            default_timeout: config.request_timeout,
        })
    }

    /// `request(url, method, body?, timeout, token?)` in one call.
    pub async fn request(
        &self,
        url: Url,
        method: Method,
        body: Option<Value>,
        timeout: Option<Duration>,
        token: Option<&str>,
    ) -> ApiResponse {
        let mut req = ApiRequest::new(method, url).bearer(token);
        req.body = body;
        req.timeout = timeout;
        self.send(req).await
    }

    /// Sends the request and normalizes every outcome into an [`ApiResponse`].
    ///
    /// The whole exchange (connect, send, read body) is bounded by the timeout; on
    /// expiry the in-flight future is dropped, which aborts the request.
    pub async fn send(&self, req: ApiRequest) -> ApiResponse {
        let timeout = req.timeout.unwrap_or(self.default_timeout);
        let method = req.method.clone();
        let url = req.url.clone();

        let mut builder = self
            .http
            .request(req.method.clone(), req.url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(CLIENT_ID_HEADER, &self.client_id);

        if let Some(token) = &req.token {
            builder = builder.bearer_auth(token);
        }

        // GET and HEAD never carry a body
        if let Some(body) = &req.body {
            if req.method != Method::GET && req.method != Method::HEAD {
                builder = builder.json(body);
            }
        }

        let exchange = async move {
            let response = builder.send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, bytes))
        };

        match tokio::time::timeout(timeout, exchange).await {
            Err(_) => {
                tracing::warn!(%method, %url, ?timeout, "Request timed out");
                ApiResponse::network_error()
            }
            Ok(Err(e)) => {
                tracing::warn!(%method, %url, "Request failed: {}", e);
                ApiResponse::network_error()
            }
            Ok(Ok((status, bytes))) => {
                tracing::debug!(%method, %url, %status, "Response received");
                interpret(status, &bytes)
            }
        }
    }

    /// [`ApiClient::send`] followed by [`ApiResponse::decode`].
    pub async fn send_as<T: DeserializeOwned>(&self, req: ApiRequest) -> ApiResponse<T> {
        self.send(req).await.decode()
    }
}

fn interpret(status: StatusCode, bytes: &[u8]) -> ApiResponse {
    let envelope: Envelope = match serde_json::from_slice(bytes) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(%status, "Response body is not a JSON envelope: {}", e);
            return ApiResponse::network_error();
        }
    };

    if status != StatusCode::OK {
        tracing::warn!(%status, message = ?envelope.message, "Server returned an error");
        return ApiResponse::Error {
            message: message_text(envelope.message),
        };
    }

    let message = message_text(envelope.message);
    match envelope.status.as_deref() {
        Some("success") => ApiResponse::Success {
            message,
            data: envelope.data,
        },
        Some("verify") => ApiResponse::Verify {
            message,
            data: envelope.data,
        },
        _ => ApiResponse::Error { message },
    }
}
