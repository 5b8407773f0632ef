// src/screens/quiz.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{
    api::{ApiRequest, ApiResponse, failure},
    config::QUIZ_SUBMIT_COOLDOWN_SECS,
    error::AppError,
    models::{
        quiz::{AnswerRecord, Question, Quiz, QuizAcknowledgement, SubmitQuizRequest},
        session::Session,
    },
    state::ClientState,
    utils::countdown::Countdown,
};

/// Selected option per question id. An entry exists only once the student picked an
/// option for that question.
pub type AnswerMap = BTreeMap<i64, i64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    NotStarted,
    InProgress,
    /// Graded and read-only.
    Submitted,
    /// Read-only walk through the graded answers.
    ReviewHistory,
}

/// How an option should be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Plain,
    /// Picked, quiz still in progress.
    Selected,
    /// The correct option of a graded question.
    Correct,
    /// Picked but wrong, in a graded quiz.
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub index: usize,
    pub question_id: i64,
    pub answered: bool,
}

/// A submission that has left the controller and awaits the server.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub request: SubmitQuizRequest,
}

/// Score shown right after submission: round(correct / total * 100).
pub fn local_score(quiz: &Quiz, answers: &AnswerMap) -> u32 {
    let total = quiz.questions.len();
    if total == 0 {
        return 0;
    }

    let correct = quiz
        .questions
        .iter()
        .filter(|q| {
            answers
                .get(&q.id)
                .and_then(|option_id| q.option(*option_id))
                .is_some_and(|o| o.is_correct)
        })
        .count();

    ((correct as f64 / total as f64) * 100.0).round() as u32
}

/// In-memory state of one quiz screen.
///
/// `NotStarted -> InProgress -> Submitted (<-> ReviewHistory)`. Starting and
/// submitting each go through an explicit confirmation; the submit confirmation stays
/// disabled for a fixed cooldown. Nothing leads back to `InProgress` once submitted.
#[derive(Debug)]
pub struct QuizFlow {
    quiz: Quiz,
    answers: AnswerMap,
    current_index: usize,
    phase: QuizPhase,
    start_dialog_open: bool,
    submit_dialog: Option<Countdown>,
    submitting: bool,
}

impl QuizFlow {
    /// A completed quiz opens graded, with its stored answers restored.
    pub fn new(quiz: Quiz) -> Self {
        let (phase, answers) = if quiz.kuis_selesai {
            let answers = quiz
                .answers
                .iter()
                .map(|a| (a.question_id, a.option_id))
                .collect();
            (QuizPhase::Submitted, answers)
        } else {
            (QuizPhase::NotStarted, AnswerMap::new())
        };

        Self {
            quiz,
            answers,
            current_index: 0,
            phase,
            start_dialog_open: false,
            submit_dialog: None,
            submitting: false,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions.get(self.current_index)
    }

    pub fn question_count(&self) -> usize {
        self.quiz.questions.len()
    }

    pub fn is_start_dialog_open(&self) -> bool {
        self.start_dialog_open
    }

    pub fn is_submit_dialog_open(&self) -> bool {
        self.submit_dialog.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    // ----- Starting -----

    pub fn request_start(&mut self) -> Result<(), AppError> {
        if self.phase != QuizPhase::NotStarted {
            return Err(AppError::InvalidState("Kuis sudah dimulai atau selesai".to_string()));
        }
        self.start_dialog_open = true;
        Ok(())
    }

    pub fn cancel_start(&mut self) {
        self.start_dialog_open = false;
    }

    pub fn confirm_start(&mut self) -> Result<(), AppError> {
        if self.phase != QuizPhase::NotStarted || !self.start_dialog_open {
            return Err(AppError::InvalidState("Konfirmasi mulai kuis terlebih dahulu".to_string()));
        }
        self.start_dialog_open = false;
        self.phase = QuizPhase::InProgress;
        self.current_index = 0;
        tracing::debug!(kuis_id = self.quiz.id, "Quiz started");
        Ok(())
    }

    // ----- Answering -----

    /// Upserts the answer for `question_id`.
    pub fn select_option(&mut self, question_id: i64, option_id: i64) -> Result<(), AppError> {
        if self.phase != QuizPhase::InProgress || self.submitting {
            return Err(AppError::InvalidState("Jawaban tidak dapat diubah".to_string()));
        }

        let question = self
            .quiz
            .question(question_id)
            .ok_or_else(|| AppError::InvalidState(format!("unknown question {}", question_id)))?;
        if question.option(option_id).is_none() {
            return Err(AppError::InvalidState(format!(
                "option {} does not belong to question {}",
                option_id, question_id
            )));
        }

        self.answers.insert(question_id, option_id);
        Ok(())
    }

    pub fn selected_option(&self, question_id: i64) -> Option<i64> {
        self.answers.get(&question_id).copied()
    }

    pub fn option_mark(&self, question_id: i64, option_id: i64) -> OptionMark {
        let selected = self.selected_option(question_id) == Some(option_id);
        match self.phase {
            QuizPhase::NotStarted => OptionMark::Plain,
            QuizPhase::InProgress if selected => OptionMark::Selected,
            QuizPhase::InProgress => OptionMark::Plain,
            QuizPhase::Submitted | QuizPhase::ReviewHistory => {
                let correct = self
                    .quiz
                    .question(question_id)
                    .and_then(|q| q.option(option_id))
                    .is_some_and(|o| o.is_correct);
                match (correct, selected) {
                    (true, _) => OptionMark::Correct,
                    (false, true) => OptionMark::Incorrect,
                    (false, false) => OptionMark::Plain,
                }
            }
        }
    }

    /// One entry per question, for the jump-to-question sheet.
    pub fn palette(&self) -> Vec<PaletteEntry> {
        self.quiz
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| PaletteEntry {
                index,
                question_id: q.id,
                answered: self.answers.contains_key(&q.id),
            })
            .collect()
    }

    // ----- Navigation -----

    fn navigable(&self) -> Result<(), AppError> {
        match self.phase {
            QuizPhase::InProgress | QuizPhase::ReviewHistory => Ok(()),
            _ => Err(AppError::InvalidState("Tidak ada soal yang ditampilkan".to_string())),
        }
    }

    pub fn go_to(&mut self, index: usize) -> Result<(), AppError> {
        self.navigable()?;
        if index >= self.quiz.questions.len() {
            return Err(AppError::InvalidState(format!("no question at index {}", index)));
        }
        self.current_index = index;
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), AppError> {
        self.navigable()?;
        let last = self.quiz.questions.len().saturating_sub(1);
        self.current_index = (self.current_index + 1).min(last);
        Ok(())
    }

    pub fn previous(&mut self) -> Result<(), AppError> {
        self.navigable()?;
        self.current_index = self.current_index.saturating_sub(1);
        Ok(())
    }

    // ----- Submitting -----

    /// Every question has an answer.
    pub fn can_submit(&self) -> bool {
        self.phase == QuizPhase::InProgress
            && !self.submitting
            && self.answers.len() == self.quiz.questions.len()
    }

    /// Opens the irreversible-submission confirmation and starts its cooldown.
    pub fn open_submit_dialog(&mut self) -> Result<(), AppError> {
        if !self.can_submit() {
            return Err(AppError::InvalidState(
                "Jawab semua soal sebelum mengirim kuis".to_string(),
            ));
        }
        self.submit_dialog = Some(Countdown::from_secs(QUIZ_SUBMIT_COOLDOWN_SECS));
        Ok(())
    }

    pub fn close_submit_dialog(&mut self) {
        if !self.submitting {
            self.submit_dialog = None;
        }
    }

    /// Seconds until the confirm button enables; zero when no dialog is open.
    pub fn cooldown_remaining(&self) -> u64 {
        self.submit_dialog.map_or(0, |c| c.remaining_secs())
    }

    pub fn submit_countdown(&self) -> Option<Countdown> {
        self.submit_dialog
    }

    pub fn can_confirm_submit(&self) -> bool {
        self.submit_dialog.is_some_and(|c| c.is_finished()) && self.can_submit()
    }

    pub fn submit_label(&self) -> String {
        if self.submitting {
            "Memproses...".to_string()
        } else {
            match self.cooldown_remaining() {
                0 => "Simpan".to_string(),
                n => format!("({}) Simpan", n),
            }
        }
    }

    /// Locks the answers and builds the payload; the confirm control stays disabled
    /// until [`QuizFlow::finish_submit`].
    pub fn begin_submit(&mut self, email: &str) -> Result<PendingSubmission, AppError> {
        if self.submitting {
            return Err(AppError::InvalidState("Kuis sedang dikirim".to_string()));
        }
        if self.submit_dialog.is_none() {
            return Err(AppError::InvalidState("Konfirmasi pengiriman kuis terlebih dahulu".to_string()));
        }
        if !self.can_confirm_submit() {
            return Err(AppError::InvalidState(format!(
                "Tunggu {} detik sebelum mengirim",
                self.cooldown_remaining()
            )));
        }

        let nilai = local_score(&self.quiz, &self.answers);
        let answers = self.answer_records();
        self.submitting = true;

        Ok(PendingSubmission {
            request: SubmitQuizRequest {
                kuis_id: self.quiz.id,
                email: email.to_string(),
                nilai,
                answers,
            },
        })
    }

    /// Applies the server's verdict. On success the quiz becomes graded, preferring
    /// any values the server echoed back over the local ones; on failure the answers
    /// stay editable so the student can retry.
    pub fn finish_submit(
        &mut self,
        pending: PendingSubmission,
        outcome: Result<QuizAcknowledgement, AppError>,
        now: DateTime<Utc>,
    ) -> Result<u32, AppError> {
        self.submitting = false;
        self.submit_dialog = None;

        let ack = outcome?;
        let nilai = ack.nilai.unwrap_or(pending.request.nilai);

        self.quiz.kuis_selesai = true;
        self.quiz.nilai = Some(nilai);
        self.quiz.tanggal_selesai = Some(ack.tanggal_selesai.unwrap_or_else(|| now.to_rfc3339()));
        if let Some(can_view) = ack.can_view_history {
            self.quiz.can_view_history = can_view;
        }
        self.quiz.answers = pending.request.answers;
        self.phase = QuizPhase::Submitted;

        tracing::info!(kuis_id = self.quiz.id, nilai, "Quiz submitted");
        Ok(nilai)
    }

    fn answer_records(&self) -> Vec<AnswerRecord> {
        self.answers
            .iter()
            .map(|(&question_id, &option_id)| AnswerRecord {
                question_id,
                option_id,
            })
            .collect()
    }

    // ----- History -----

    pub fn can_view_history(&self) -> bool {
        self.phase == QuizPhase::Submitted && self.quiz.can_view_history
    }

    pub fn open_history(&mut self) -> Result<(), AppError> {
        if !self.can_view_history() {
            return Err(AppError::InvalidState("Riwayat jawaban tidak tersedia".to_string()));
        }
        self.phase = QuizPhase::ReviewHistory;
        self.current_index = 0;
        Ok(())
    }

    pub fn close_history(&mut self) {
        if self.phase == QuizPhase::ReviewHistory {
            self.phase = QuizPhase::Submitted;
        }
    }
}

/// Optional echo of a successful submission. A malformed one is logged and ignored;
/// the submission itself was accepted.
fn acknowledgement(data: Option<serde_json::Value>) -> QuizAcknowledgement {
    match data.map(serde_json::from_value::<QuizAcknowledgement>) {
        Some(Ok(ack)) => ack,
        Some(Err(e)) => {
            tracing::warn!("Ignoring malformed quiz acknowledgement: {}", e);
            QuizAcknowledgement::default()
        }
        None => QuizAcknowledgement::default(),
    }
}

/// The quiz screen: a [`QuizFlow`] bound to the signed-in student and the API.
#[derive(Debug)]
pub struct QuizScreen {
    state: ClientState,
    session: Session,
    flow: QuizFlow,
}

impl QuizScreen {
    /// Loads the session and the quiz. Question and option HTML is sanitised.
    pub async fn open(state: ClientState, kuis_id: &str) -> Result<Self, AppError> {
        let session = state.sessions.require().await?;

        let url = state.routes.quiz(kuis_id, &session.email)?;
        let mut quiz = state
            .api
            .send_as::<Quiz>(ApiRequest::get(url).bearer(session.bearer()))
            .await
            .into_data()
            .map_err(|e| state.report(e))?;

        for question in &mut quiz.questions {
            question.question_text = state.content.prepare(&question.question_text);
            for option in &mut question.options {
                option.option_text = state.content.prepare(&option.option_text);
            }
        }

        tracing::debug!(kuis_id = quiz.id, completed = quiz.kuis_selesai, "Quiz loaded");
        Ok(Self {
            state,
            session,
            flow: QuizFlow::new(quiz),
        })
    }

    pub fn flow(&self) -> &QuizFlow {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut QuizFlow {
        &mut self.flow
    }

    /// Sends the confirmed answers for grading. Returns the adopted score.
    pub async fn submit(&mut self) -> Result<u32, AppError> {
        let url = self.state.routes.submit_quiz()?;
        let pending = self.flow.begin_submit(&self.session.email)?;

        let outcome = match ApiRequest::post(url)
            .bearer(self.session.bearer())
            .json(&pending.request)
        {
            Ok(req) => match self.state.api.send(req).await {
                ApiResponse::Success { data, .. } => Ok(acknowledgement(data)),
                other => Err(failure(other.message().to_string())),
            },
            Err(e) => Err(e),
        };

        match self.flow.finish_submit(pending, outcome, Utc::now()) {
            Ok(nilai) => {
                self.state
                    .notifier
                    .success(&format!("Kuis selesai! Nilai: {}%", nilai));
                Ok(nilai)
            }
            Err(e) => Err(self.state.report(e)),
        }
    }
}
