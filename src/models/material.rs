// src/models/material.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::flexible;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Video,
    Pdf,
    Teks,
    #[serde(other)]
    Unknown,
}

/// A learning-module content item (Materi).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: i64,
    pub title: String,
    pub tipe_materi: MaterialKind,

    /// Absolute URL of the video, for `video` materials.
    #[serde(default)]
    pub video_path: Option<String>,

    /// Path relative to `/storage`, for `pdf` materials.
    #[serde(default)]
    pub file_path: Option<String>,

    /// HTML body, for `teks` materials.
    #[serde(default)]
    pub text_content: Option<String>,

    #[serde(default, deserialize_with = "flexible::bool")]
    pub materi_selesai: bool,

    #[serde(default)]
    pub tanggal_selesai: Option<String>,
}

/// Self-reported comprehension (Skala Pemahaman), 1 to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ComprehensionScale(u8);

impl ComprehensionScale {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for ComprehensionScale {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

/// DTO for marking a material complete.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CompleteMaterialRequest {
    pub materi_id: i64,
    pub email: String,
    /// Sent as a string ("1".."4").
    #[serde(serialize_with = "flexible::as_string")]
    #[validate(range(min = 1, max = 4, message = "Skala pemahaman harus antara 1 dan 4"))]
    pub skala_pemahaman: u8,
    #[validate(length(max = 1000, message = "Komentar maksimal 1000 karakter"))]
    pub komentar: Option<String>,
}
