// src/screens/auth.rs

use validator::Validate;

use crate::{
    api::{ApiRequest, ApiResponse},
    config::{
        LOGOUT_TIMEOUT, VERIFICATION_CODE_LENGTH, VERIFICATION_RESEND_COOLDOWN_SECS,
        VERIFICATION_SUBMIT_THROTTLE,
    },
    error::{AppError, GENERIC_ERROR_MESSAGE},
    models::{
        session::Session,
        user::{
            LoginRequest, LogoutRequest, PendingVerification, RegisterRequest,
            VerificationCodeData, VerifyEmailRequest,
        },
    },
    state::ClientState,
    utils::{countdown::Countdown, throttle::Throttle, validation::FormState},
};

const INCOMPLETE_FORM_MESSAGE: &str = "Lengkapi data dengan benar";
const INVALID_CODE_MESSAGE: &str = "Masukkan Kode Verifikasi dengan benar";
const WRONG_CODE_MESSAGE: &str = "Kode yang Anda masukkan salah";
const RESENT_MESSAGE: &str = "Kode Verifikasi telah dikirim ulang";
const RETRY_MESSAGE: &str = "Terdapat kesalahan, silahkan coba lagi";

/// Sign-in form.
#[derive(Debug)]
pub struct SignInScreen {
    pub form: FormState,
}

impl Default for SignInScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl SignInScreen {
    pub fn new() -> Self {
        Self {
            form: FormState::sign_in(),
        }
    }

    /// Logs in and persists the session.
    ///
    /// An unverified account yields `AppError::VerificationRequired` carrying the
    /// e-mail to verify.
    pub async fn submit(&self, state: &ClientState) -> Result<Session, AppError> {
        if !self.form.is_submittable() {
            return Err(AppError::Validation(INCOMPLETE_FORM_MESSAGE.to_string()));
        }

        let request = LoginRequest {
            email: self.form.value("email").to_string(),
            password: self.form.value("password").to_string(),
        };
        request.validate()?;

        let url = state.routes.login()?;
        let res = state.api.send(ApiRequest::post(url).json(&request)?).await;

        match res {
            ApiResponse::Success { message, data } => {
                let session = data
                    .map(serde_json::from_value::<Session>)
                    .transpose()
                    .map_err(|e| state.report(e.into()))?
                    .ok_or_else(|| state.report(AppError::Internal("login returned no session".into())))?;
                state.sessions.save(&session).await.map_err(|e| state.report(e))?;
                tracing::info!(email = %session.email, "Signed in");
                state.notifier.success(&message);
                Ok(session)
            }
            ApiResponse::Verify { message, data } => {
                let email = data
                    .and_then(|d| serde_json::from_value::<PendingVerification>(d).ok())
                    .map(|p| p.email)
                    .unwrap_or(request.email);
                state.notifier.success(&message);
                Err(AppError::VerificationRequired { email, message })
            }
            ApiResponse::Error { message } => Err(state.report(AppError::Api(message))),
        }
    }
}

/// Registration form.
#[derive(Debug)]
pub struct RegisterScreen {
    pub form: FormState,
}

impl Default for RegisterScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterScreen {
    pub fn new() -> Self {
        Self {
            form: FormState::register(),
        }
    }

    /// Creates the account. Returns the e-mail that now needs verification.
    pub async fn submit(&self, state: &ClientState) -> Result<String, AppError> {
        if !self.form.is_submittable() {
            return Err(AppError::Validation(INCOMPLETE_FORM_MESSAGE.to_string()));
        }

        let request = RegisterRequest {
            full_name: self.form.value("fullName").to_string(),
            email: self.form.value("email").to_string(),
            password: self.form.value("password").to_string(),
        };
        request.validate()?;

        let url = state.routes.register()?;
        let res = state
            .api
            .send_as::<PendingVerification>(ApiRequest::post(url).json(&request)?)
            .await;

        match res {
            ApiResponse::Success { data, .. } => {
                state.notifier.success("Pendaftaran Berhasil");
                Ok(data.map(|p| p.email).unwrap_or(request.email))
            }
            other => {
                let message = match other.message() {
                    "" => GENERIC_ERROR_MESSAGE.to_string(),
                    m => m.to_string(),
                };
                Err(state.report(AppError::Api(message)))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    /// Dropped: another attempt happened moments ago.
    Throttled,
}

/// E-mail verification with a six-digit code.
#[derive(Debug)]
pub struct EmailVerification {
    email: String,
    expected_code: Option<String>,
    resend_cooldown: Countdown,
    throttle: Throttle,
    error: Option<String>,
}

impl EmailVerification {
    /// Asks the server to send the first code. On failure the UI returns to sign-in.
    pub async fn start(state: &ClientState, email: &str) -> Result<Self, AppError> {
        if email.is_empty() {
            return Err(AppError::Unauthenticated);
        }

        let url = state.routes.verify_email_for(email)?;
        let res = state
            .api
            .send_as::<VerificationCodeData>(ApiRequest::get(url))
            .await;

        match res {
            ApiResponse::Success { message, data } => {
                state.notifier.success(&message);
                Ok(Self {
                    email: email.to_string(),
                    expected_code: data.and_then(|d| d.verification_code),
                    resend_cooldown: Countdown::from_secs(VERIFICATION_RESEND_COOLDOWN_SECS),
                    throttle: Throttle::new(VERIFICATION_SUBMIT_THROTTLE),
                    error: None,
                })
            }
            other => Err(state.report(AppError::Api(other.message().to_string()))),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Inline error under the code boxes.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Editing the code clears the inline error.
    pub fn on_code_change(&mut self) {
        self.error = None;
    }

    pub fn resend_remaining_secs(&self) -> u64 {
        self.resend_cooldown.remaining_secs()
    }

    pub fn can_resend(&self) -> bool {
        self.resend_cooldown.is_finished()
    }

    pub async fn resend(&mut self, state: &ClientState) -> Result<(), AppError> {
        if !self.can_resend() {
            return Err(AppError::InvalidState(format!(
                "Tunggu {} detik untuk mengirim ulang kode",
                self.resend_remaining_secs()
            )));
        }

        let url = state.routes.resend_verification_code(&self.email)?;
        let res = state
            .api
            .send_as::<VerificationCodeData>(ApiRequest::get(url))
            .await;

        match res {
            ApiResponse::Success { data, .. } => {
                state.notifier.success(RESENT_MESSAGE);
                if let Some(code) = data.and_then(|d| d.verification_code) {
                    self.expected_code = Some(code);
                }
                self.resend_cooldown = Countdown::from_secs(VERIFICATION_RESEND_COOLDOWN_SECS);
                Ok(())
            }
            ApiResponse::Error { message } if message.is_empty() => {
                self.error = Some(RETRY_MESSAGE.to_string());
                Err(AppError::Api(RETRY_MESSAGE.to_string()))
            }
            other => {
                let message = other.message().to_string();
                self.error = Some(message.clone());
                Err(AppError::Api(message))
            }
        }
    }

    /// Checks the code locally, then submits it.
    pub async fn submit(&mut self, state: &ClientState, code: &str) -> Result<VerifyOutcome, AppError> {
        if !self.throttle.try_acquire() {
            return Ok(VerifyOutcome::Throttled);
        }

        let code = code.trim();
        if code.chars().count() != VERIFICATION_CODE_LENGTH
            || !code.chars().all(|c| c.is_ascii_digit())
        {
            return Err(self.inline(AppError::Validation(INVALID_CODE_MESSAGE.to_string())));
        }
        if self
            .expected_code
            .as_deref()
            .is_some_and(|expected| expected.trim() != code)
        {
            return Err(self.inline(AppError::Validation(WRONG_CODE_MESSAGE.to_string())));
        }

        let request = VerifyEmailRequest {
            email: self.email.clone(),
            verification_code: code.to_string(),
        };
        let url = state.routes.verify_email()?;
        let res = state.api.send(ApiRequest::post(url).json(&request)?).await;

        match res {
            ApiResponse::Success { message, .. } => {
                state
                    .notifier
                    .success(&format!("{}, Silahkan login", message));
                tracing::info!(email = %self.email, "E-mail verified");
                Ok(VerifyOutcome::Verified)
            }
            other => Err(self.inline(AppError::Api(other.message().to_string()))),
        }
    }

    fn inline(&mut self, err: AppError) -> AppError {
        self.error = Some(err.user_message());
        err
    }
}

/// Ends the session. The stored record is removed whatever the server answers.
pub async fn logout(state: &ClientState) -> Result<(), AppError> {
    let Some(session) = state.sessions.load().await? else {
        return Ok(());
    };

    let url = state.routes.logout()?;
    let req = ApiRequest::post(url)
        .timeout(LOGOUT_TIMEOUT)
        .bearer(session.bearer())
        .json(&LogoutRequest {
            email: session.email.clone(),
        })?;
    let res = state.api.send(req).await;

    state.sessions.clear().await.map_err(|e| state.report(e))?;
    tracing::info!(email = %session.email, "Signed out");

    match res {
        ApiResponse::Error { message } => state.notifier.error(&message),
        other => state.notifier.success(other.message()),
    }
    Ok(())
}
