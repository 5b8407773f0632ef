// src/config.rs

use std::{env, path::PathBuf, time::Duration};

use dotenvy::dotenv;
use url::Url;

use crate::error::AppError;

/// Header carrying the client identifier on every API request.
pub const CLIENT_ID_HEADER: &str = "X-CLIENT-ID";

/// Secure-storage key holding the serialized session record.
pub const SESSION_KEY: &str = "userInfo";

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const LOGOUT_TIMEOUT: Duration = Duration::from_secs(5);
pub const MODULE_LIST_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_DISCUSSION_POLL_MS: u64 = 5_000;

/// Seconds the quiz submit confirmation stays disabled.
pub const QUIZ_SUBMIT_COOLDOWN_SECS: u64 = 5;

/// Seconds the material completion confirmation stays disabled.
pub const MATERIAL_COMPLETE_COOLDOWN_SECS: u64 = 10;

/// Seconds before a verification code may be requested again.
pub const VERIFICATION_RESEND_COOLDOWN_SECS: u64 = 60;

pub const VERIFICATION_SUBMIT_THROTTLE: Duration = Duration::from_secs(3);
pub const VERIFICATION_CODE_LENGTH: usize = 6;

pub const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub client_id: String,
    pub request_timeout: Duration,
    pub session_dir: PathBuf,
    /// Legacy host embedded in server-rendered HTML, rewritten to `asset_base_url`.
    pub asset_host: Option<String>,
    pub asset_base_url: Url,
    pub discussion_poll_interval: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let api_url = Url::parse(&required("LMS_API_URL")?)?;

        let client_id = required("LMS_CLIENT_ID")?;

        let request_timeout = Duration::from_millis(
            millis("LMS_REQUEST_TIMEOUT_MS")?.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        );

        let session_dir = env::var("LMS_SESSION_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".lms-session"));

        let asset_host = env::var("LMS_ASSET_HOST").ok().filter(|h| !h.is_empty());

        let asset_base_url = match env::var("LMS_ASSET_BASE_URL") {
            Ok(raw) => Url::parse(&raw)?,
            Err(_) => api_url.clone(),
        };

        let discussion_poll_interval = Duration::from_millis(
            millis("LMS_DISCUSSION_POLL_MS")?.unwrap_or(DEFAULT_DISCUSSION_POLL_MS),
        );

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_url,
            client_id,
            request_timeout,
            session_dir,
            asset_host,
            asset_base_url,
            discussion_poll_interval,
            rust_log,
        })
    }

    /// Configuration pointing at `api_url` with every other setting at its default.
    pub fn for_api(api_url: Url, client_id: impl Into<String>) -> Self {
        Self {
            asset_base_url: api_url.clone(),
            api_url,
            client_id: client_id.into(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            session_dir: PathBuf::from(".lms-session"),
            asset_host: None,
            discussion_poll_interval: Duration::from_millis(DEFAULT_DISCUSSION_POLL_MS),
            rust_log: "info".to_string(),
        }
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::Config(format!("{} must be set", key)))
}

fn millis(key: &str) -> Result<Option<u64>, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{} must be a number of milliseconds", key))),
        Err(_) => Ok(None),
    }
}
