// src/models/quiz.rs

use serde::{Deserialize, Serialize};

use super::flexible;

/// A quiz (Kuis) attached to a course meeting, as fetched for one student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    pub questions: Vec<Question>,

    /// Whether this student already completed the quiz.
    #[serde(default, deserialize_with = "flexible::bool")]
    pub kuis_selesai: bool,

    /// Score in percent, once completed.
    #[serde(default, deserialize_with = "flexible::u32_opt")]
    pub nilai: Option<u32>,

    #[serde(default)]
    pub tanggal_selesai: Option<String>,

    /// Whether graded answers may be reviewed after completion.
    #[serde(default, deserialize_with = "flexible::bool")]
    pub can_view_history: bool,

    /// The student's previous answers, present for completed quizzes.
    #[serde(default)]
    pub answers: Vec<AnswerRecord>,
}

impl Quiz {
    pub fn question(&self, question_id: i64) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// HTML content.
    #[serde(alias = "text")]
    pub question_text: String,

    pub options: Vec<QuizOption>,
}

impl Question {
    pub fn option(&self, option_id: i64) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: i64,

    /// HTML content.
    #[serde(alias = "text")]
    pub option_text: String,

    /// Only meaningful once the quiz is completed.
    #[serde(default, deserialize_with = "flexible::bool")]
    pub is_correct: bool,
}

/// One selected option, in the shape the server stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: i64,
    pub option_id: i64,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitQuizRequest {
    pub kuis_id: i64,
    pub email: String,
    /// Locally computed score, percent.
    pub nilai: u32,
    pub answers: Vec<AnswerRecord>,
}

/// Optional fields the server may echo back when accepting a submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizAcknowledgement {
    #[serde(default, deserialize_with = "flexible::u32_opt")]
    pub nilai: Option<u32>,
    #[serde(default)]
    pub tanggal_selesai: Option<String>,
    #[serde(default, deserialize_with = "flexible::bool_opt")]
    pub can_view_history: Option<bool>,
}
