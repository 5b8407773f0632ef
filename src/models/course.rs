// src/models/course.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::flexible;

/// An enrolled course (Mata Kuliah).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    #[serde(deserialize_with = "flexible::string")]
    pub id: String,
    pub nama_matakuliah: String,
    #[serde(default)]
    pub deskripsi: Option<String>,
}

/// The learning module of a course: its meeting plan (RPS).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub rps_details: Vec<Meeting>,
}

/// One scheduled course meeting (Sesi Pertemuan).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: i64,

    /// Meeting number within the course ("Pertemuan ke-N").
    pub sesi_pertemuan: u32,

    /// Planned date.
    #[serde(default)]
    pub tanggal_pertemuan: Option<String>,

    /// Date the meeting actually took place, if it has.
    #[serde(default)]
    pub tanggal_realisasi: Option<String>,

    #[serde(default)]
    pub materi: Vec<MaterialSummary>,

    #[serde(default)]
    pub kuis: Vec<QuizSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingStatus {
    Done,
    Upcoming,
    Missed,
}

impl Meeting {
    pub fn status(&self, now: DateTime<Utc>) -> MeetingStatus {
        let realised = self
            .tanggal_realisasi
            .as_deref()
            .and_then(flexible::parse_timestamp);
        if realised.is_some() {
            return MeetingStatus::Done;
        }

        match self
            .tanggal_pertemuan
            .as_deref()
            .and_then(flexible::parse_timestamp)
        {
            Some(planned) if planned > now => MeetingStatus::Upcoming,
            _ => MeetingStatus::Missed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.materi.is_empty() && self.kuis.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub tipe_materi: String,
    #[serde(default, deserialize_with = "flexible::bool")]
    pub materi_selesai: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "flexible::bool")]
    pub kuis_selesai: bool,
    /// In-app route of the quiz screen.
    #[serde(default)]
    pub link: Option<String>,
}
