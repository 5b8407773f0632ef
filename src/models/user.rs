// src/models/user.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::EMAIL_RE;

pub const INVALID_EMAIL_MESSAGE: &str = "Masukkan Email yang valid";
pub const SIGN_IN_PASSWORD_MESSAGE: &str = "Password minimal 5 karakter";
pub const REGISTER_PASSWORD_MESSAGE: &str = "Password minimal 8 karakter";
pub const FULL_NAME_MESSAGE: &str = "Nama Lengkap minimal 3 karakter";

/// DTO for user login.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(regex(path = *EMAIL_RE, message = "Masukkan Email yang valid"))]
    pub email: String,
    #[validate(length(min = 5, message = "Password minimal 5 karakter"))]
    pub password: String,
}

/// DTO for creating a new account (Registration).
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[serde(rename = "fullName")]
    #[validate(length(min = 3, message = "Nama Lengkap minimal 3 karakter"))]
    pub full_name: String,
    #[validate(regex(path = *EMAIL_RE, message = "Masukkan Email yang valid"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password minimal 8 karakter"))]
    pub password: String,
}

/// DTO for submitting the e-mailed verification code.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    #[serde(rename = "verificationCode")]
    pub verification_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoutRequest {
    pub email: String,
}

/// Payload of `verify` login responses and successful registrations.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingVerification {
    pub email: String,
}

/// Payload of the "send code" endpoints. The server may disclose the expected code,
/// which enables a local pre-check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationCodeData {
    #[serde(
        rename = "verificationCode",
        default,
        deserialize_with = "super::flexible::string_opt"
    )]
    pub verification_code: Option<String>,
}
