// src/routes.rs

use url::Url;

use crate::error::AppError;

/// Endpoint catalogue of the learning API.
///
/// Every URL is derived from the configured base; authenticated endpoints live under
/// `/api/auth` and identify the student by e-mail in the query string.
#[derive(Debug, Clone)]
pub struct Routes {
    base: Url,
}

const MODULE_PREFIX: &str = "api/auth/modul-pembelajaran";

impl Routes {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn path(&self, path: &str) -> Result<Url, AppError> {
        // Keep any path prefix of the base (e.g. https://host/lms/) intact
        let mut base = self.base.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    fn with_query(&self, path: &str, pairs: &[(&str, &str)]) -> Result<Url, AppError> {
        let mut url = self.path(path)?;
        url.query_pairs_mut().extend_pairs(pairs.iter().copied());
        Ok(url)
    }

    // ----- Authentication -----

    pub fn login(&self) -> Result<Url, AppError> {
        self.path("api/login")
    }

    pub fn register(&self) -> Result<Url, AppError> {
        self.path("api/register")
    }

    /// GET sends the first code; POST submits the code.
    pub fn verify_email(&self) -> Result<Url, AppError> {
        self.path("api/verify-email")
    }

    pub fn verify_email_for(&self, email: &str) -> Result<Url, AppError> {
        self.with_query("api/verify-email", &[("email", email)])
    }

    pub fn resend_verification_code(&self, email: &str) -> Result<Url, AppError> {
        self.with_query("api/verification-code", &[("email", email)])
    }

    pub fn logout(&self) -> Result<Url, AppError> {
        self.path("api/auth/logout")
    }

    // ----- Courses and modules -----

    pub fn courses(&self, email: &str) -> Result<Url, AppError> {
        self.with_query("api/auth/matakuliah", &[("email", email)])
    }

    pub fn module(&self, course_id: &str, email: &str) -> Result<Url, AppError> {
        self.with_query(MODULE_PREFIX, &[("id", course_id), ("email", email)])
    }

    pub fn material(&self, materi_id: &str, email: &str) -> Result<Url, AppError> {
        self.with_query(
            &format!("{}/materi", MODULE_PREFIX),
            &[("id", materi_id), ("email", email)],
        )
    }

    pub fn complete_material(&self) -> Result<Url, AppError> {
        self.path(&format!("{}/materi-selesai", MODULE_PREFIX))
    }

    /// Where PDF materials are served from.
    pub fn storage_file(&self, file_path: &str) -> Result<Url, AppError> {
        self.path(&format!("storage/{}", file_path.trim_start_matches('/')))
    }

    // ----- Quiz -----

    pub fn quiz(&self, kuis_id: &str, email: &str) -> Result<Url, AppError> {
        self.with_query(
            &format!("{}/kuis", MODULE_PREFIX),
            &[("id", kuis_id), ("email", email)],
        )
    }

    pub fn submit_quiz(&self) -> Result<Url, AppError> {
        self.path(&format!("{}/kuis-selesai", MODULE_PREFIX))
    }

    // ----- Discussion -----

    pub fn discussion(&self, materi_id: &str, email: &str) -> Result<Url, AppError> {
        self.with_query(
            &format!("{}/forum-diskusi", MODULE_PREFIX),
            &[("id", materi_id), ("email", email)],
        )
    }

    pub fn send_discussion_message(&self) -> Result<Url, AppError> {
        self.path(&format!("{}/forum-diskusi/send", MODULE_PREFIX))
    }
}
