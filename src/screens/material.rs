// src/screens/material.rs

use chrono::{DateTime, Utc};
use url::Url;
use validator::Validate;

use crate::{
    api::ApiRequest,
    config::MATERIAL_COMPLETE_COOLDOWN_SECS,
    error::AppError,
    models::{
        material::{CompleteMaterialRequest, ComprehensionScale, Material, MaterialKind},
        session::Session,
    },
    routes::Routes,
    state::ClientState,
    utils::countdown::Countdown,
};

/// What the material body renders as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialContent {
    Video(Url),
    Pdf(Url),
    /// Sanitised HTML.
    Text(String),
    Unavailable,
}

/// Completion state of one material (Materi) screen.
///
/// Marking complete asks for a comprehension rating and an optional comment, behind a
/// confirmation whose button stays disabled for a cooldown. Completion is final.
#[derive(Debug)]
pub struct MaterialFlow {
    material: Material,
    scale: ComprehensionScale,
    comment: String,
    dialog: Option<Countdown>,
    submitting: bool,
}

impl MaterialFlow {
    pub fn new(material: Material) -> Self {
        Self {
            material,
            scale: ComprehensionScale::default(),
            comment: String::new(),
            dialog: None,
            submitting: false,
        }
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn is_completed(&self) -> bool {
        self.material.materi_selesai
    }

    pub fn scale(&self) -> ComprehensionScale {
        self.scale
    }

    pub fn set_scale(&mut self, value: u8) -> Result<(), AppError> {
        self.scale = ComprehensionScale::new(value).ok_or_else(|| {
            AppError::Validation("Skala pemahaman harus antara 1 dan 4".to_string())
        })?;
        Ok(())
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn open_complete_dialog(&mut self) -> Result<(), AppError> {
        if self.material.materi_selesai || self.submitting {
            return Err(AppError::InvalidState("Materi sudah ditandai selesai".to_string()));
        }
        self.dialog = Some(Countdown::from_secs(MATERIAL_COMPLETE_COOLDOWN_SECS));
        Ok(())
    }

    pub fn close_complete_dialog(&mut self) {
        if !self.submitting {
            self.dialog = None;
        }
    }

    pub fn cooldown_remaining(&self) -> u64 {
        self.dialog.map_or(0, |c| c.remaining_secs())
    }

    pub fn can_confirm(&self) -> bool {
        !self.submitting
            && !self.material.materi_selesai
            && self.dialog.is_some_and(|c| c.is_finished())
    }

    pub fn begin_complete(&mut self, email: &str) -> Result<CompleteMaterialRequest, AppError> {
        if !self.can_confirm() {
            return Err(AppError::InvalidState(format!(
                "Tunggu {} detik sebelum menyimpan",
                self.cooldown_remaining()
            )));
        }

        let komentar = Some(self.comment.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_owned);
        let request = CompleteMaterialRequest {
            materi_id: self.material.id,
            email: email.to_string(),
            skala_pemahaman: self.scale.value(),
            komentar,
        };
        request.validate()?;

        self.submitting = true;
        Ok(request)
    }

    pub fn finish_complete(
        &mut self,
        outcome: Result<String, AppError>,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        self.submitting = false;
        self.dialog = None;

        let message = outcome?;
        self.material.materi_selesai = true;
        self.material.tanggal_selesai = Some(now.to_rfc3339());
        tracing::info!(materi_id = self.material.id, "Material marked complete");
        Ok(message)
    }

    pub fn content(&self, routes: &Routes) -> MaterialContent {
        let m = &self.material;
        match m.tipe_materi {
            MaterialKind::Video => match m.video_path.as_deref().map(Url::parse) {
                Some(Ok(url)) => MaterialContent::Video(url),
                Some(Err(e)) => {
                    tracing::warn!(video_path = ?m.video_path, "Invalid video URL: {}", e);
                    MaterialContent::Unavailable
                }
                None => MaterialContent::Unavailable,
            },
            MaterialKind::Pdf => m
                .file_path
                .as_deref()
                .and_then(|p| routes.storage_file(p).ok())
                .map_or(MaterialContent::Unavailable, MaterialContent::Pdf),
            MaterialKind::Teks => m
                .text_content
                .clone()
                .map_or(MaterialContent::Unavailable, MaterialContent::Text),
            MaterialKind::Unknown => MaterialContent::Unavailable,
        }
    }
}

#[derive(Debug)]
pub struct MaterialScreen {
    state: ClientState,
    session: Session,
    flow: MaterialFlow,
}

impl MaterialScreen {
    pub async fn open(state: ClientState, materi_id: &str) -> Result<Self, AppError> {
        let session = state.sessions.require().await?;

        let url = state.routes.material(materi_id, &session.email)?;
        let mut material = state
            .api
            .send_as::<Material>(ApiRequest::get(url).bearer(session.bearer()))
            .await
            .into_data()
            .map_err(|e| state.report(e))?;

        if let Some(html) = material.text_content.as_deref() {
            material.text_content = Some(state.content.prepare(html));
        }

        Ok(Self {
            state,
            session,
            flow: MaterialFlow::new(material),
        })
    }

    pub fn flow(&self) -> &MaterialFlow {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut MaterialFlow {
        &mut self.flow
    }

    pub fn content(&self) -> MaterialContent {
        self.flow.content(&self.state.routes)
    }

    pub async fn complete(&mut self) -> Result<String, AppError> {
        let url = self.state.routes.complete_material()?;
        let request = self.flow.begin_complete(&self.session.email)?;

        let outcome = match ApiRequest::post(url)
            .bearer(self.session.bearer())
            .json(&request)
        {
            Ok(req) => self.state.api.send(req).await.into_message(),
            Err(e) => Err(e),
        };

        match self.flow.finish_complete(outcome, Utc::now()) {
            Ok(message) => {
                self.state.notifier.success(&message);
                Ok(message)
            }
            Err(e) => Err(self.state.report(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn material(kind: MaterialKind) -> Material {
        Material {
            id: 11,
            title: "Pointer".into(),
            tipe_materi: kind,
            video_path: Some("https://video.example/v/1".into()),
            file_path: Some("materi/pointer.pdf".into()),
            text_content: Some("<p>isi</p>".into()),
            materi_selesai: false,
            tanggal_selesai: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completion_waits_for_cooldown() {
        let mut flow = MaterialFlow::new(material(MaterialKind::Teks));
        assert!(flow.begin_complete("a@b.co").is_err());

        flow.open_complete_dialog().unwrap();
        assert_eq!(flow.cooldown_remaining(), 10);
        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(flow.begin_complete("a@b.co").is_err());

        tokio::time::advance(Duration::from_secs(1)).await;
        flow.set_scale(3).unwrap();
        flow.set_comment("  jelas  ");
        let req = flow.begin_complete("a@b.co").unwrap();
        assert_eq!(req.skala_pemahaman, 3);
        assert_eq!(req.komentar.as_deref(), Some("jelas"));

        flow.finish_complete(Ok("Materi selesai".into()), Utc::now()).unwrap();
        assert!(flow.is_completed());
        assert!(flow.material().tanggal_selesai.is_some());
        assert!(flow.open_complete_dialog().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_completion_can_be_retried() {
        let mut flow = MaterialFlow::new(material(MaterialKind::Teks));
        flow.open_complete_dialog().unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        flow.begin_complete("a@b.co").unwrap();
        assert!(flow.finish_complete(Err(AppError::Api("x".into())), Utc::now()).is_err());
        assert!(!flow.is_completed());
        flow.open_complete_dialog().unwrap();
    }

    #[test]
    fn scale_out_of_range_is_rejected() {
        let mut flow = MaterialFlow::new(material(MaterialKind::Teks));
        assert!(flow.set_scale(5).is_err());
        assert_eq!(flow.scale().value(), 1);
    }

    #[test]
    fn content_by_kind() {
        let routes = Routes::new(Url::parse("http://10.0.0.2:8000").unwrap());

        let pdf = MaterialFlow::new(material(MaterialKind::Pdf)).content(&routes);
        assert_eq!(
            pdf,
            MaterialContent::Pdf(Url::parse("http://10.0.0.2:8000/storage/materi/pointer.pdf").unwrap())
        );

        let mut bad_video = material(MaterialKind::Video);
        bad_video.video_path = Some("not a url".into());
        assert_eq!(MaterialFlow::new(bad_video).content(&routes), MaterialContent::Unavailable);

        let text = MaterialFlow::new(material(MaterialKind::Teks)).content(&routes);
        assert_eq!(text, MaterialContent::Text("<p>isi</p>".into()));
    }
}
