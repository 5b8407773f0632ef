// src/models/session.rs

use serde::{Deserialize, Serialize};

use super::flexible;

/// The signed-in student, exactly as returned by the login endpoint and persisted in
/// secure storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,

    #[serde(default)]
    pub name: String,

    /// Bearer token for `/api/auth/*`.
    #[serde(default)]
    pub token: Option<String>,

    /// Profile picture URL.
    #[serde(default)]
    pub avatar: Option<String>,

    /// Academic year the student is enrolled in (e.g. "2024/2025").
    #[serde(default, deserialize_with = "flexible::string_opt")]
    pub tahun_ajaran: Option<String>,
}

impl Session {
    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
