// tests/quiz_tests.rs

mod common;

use std::{sync::atomic::Ordering, time::Duration};

use common::{EMAIL, drain, sign_in, spawn_mock, test_state};
use lms_client::{
    error::AppError,
    notify::ToastStatus,
    screens::quiz::{OptionMark, QuizPhase, QuizScreen},
};

/// Skips the submit cooldown without sleeping through it.
async fn skip_cooldown() {
    tokio::time::pause();
    tokio::time::advance(Duration::from_secs(5)).await;
    tokio::time::resume();
}

#[tokio::test]
async fn quiz_requires_a_session() {
    let (address, _) = spawn_mock().await;
    let (state, mut toasts) = test_state(&address);

    let err = QuizScreen::open(state, "7").await.unwrap_err();

    assert_eq!(err, AppError::Unauthenticated);
    assert!(drain(&mut toasts).is_empty());
}

#[tokio::test]
async fn open_sanitises_and_rewrites_question_html() {
    let (address, _) = spawn_mock().await;
    let (state, _) = test_state(&address);
    sign_in(&state).await;

    let screen = QuizScreen::open(state, "7").await.unwrap();

    let text = &screen.flow().quiz().questions[0].question_text;
    assert!(!text.contains("<script"));
    assert!(!text.contains("project-skripsi.test"));
    assert!(text.contains(&format!("{}/storage/q1.png", address)));
    assert_eq!(screen.flow().phase(), QuizPhase::NotStarted);
}

#[tokio::test]
async fn full_attempt_is_graded_and_locked() {
    // Arrange
    let (address, mock) = spawn_mock().await;
    let (state, mut toasts) = test_state(&address);
    sign_in(&state).await;
    let mut screen = QuizScreen::open(state, "7").await.unwrap();

    // Act: three right, one wrong
    let flow = screen.flow_mut();
    flow.request_start().unwrap();
    flow.confirm_start().unwrap();
    for q in 1..=3 {
        flow.select_option(q, q * 10).unwrap();
    }
    flow.select_option(4, 41).unwrap();
    flow.open_submit_dialog().unwrap();
    assert!(screen.submit().await.is_err());

    skip_cooldown().await;
    let nilai = screen.submit().await.unwrap();

    // Assert
    assert_eq!(nilai, 75);
    assert_eq!(screen.flow().phase(), QuizPhase::Submitted);
    assert_eq!(screen.flow().option_mark(4, 41), OptionMark::Incorrect);
    assert!(screen.flow().quiz().tanggal_selesai.is_some());

    let submitted = mock.quiz_submissions.lock().unwrap().clone();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0]["kuis_id"], 7);
    assert_eq!(submitted[0]["email"], EMAIL);
    assert_eq!(submitted[0]["nilai"], 75);
    assert_eq!(submitted[0]["answers"].as_array().unwrap().len(), 4);

    let shown = drain(&mut toasts);
    assert!(
        shown
            .iter()
            .any(|t| t.status == ToastStatus::Success && t.message == "Kuis selesai! Nilai: 75%")
    );

    // A second submission is impossible
    assert!(screen.flow_mut().open_submit_dialog().is_err());
}

#[tokio::test]
async fn server_failure_keeps_the_attempt_open() {
    let (address, mock) = spawn_mock().await;
    mock.fail_quiz_submit.store(true, Ordering::SeqCst);
    let (state, mut toasts) = test_state(&address);
    sign_in(&state).await;
    let mut screen = QuizScreen::open(state, "7").await.unwrap();

    let flow = screen.flow_mut();
    flow.request_start().unwrap();
    flow.confirm_start().unwrap();
    for q in 1..=4 {
        flow.select_option(q, q * 10).unwrap();
    }
    flow.open_submit_dialog().unwrap();
    skip_cooldown().await;

    let err = screen.submit().await.unwrap_err();

    assert_eq!(err, AppError::Api("Gagal menyimpan kuis".into()));
    assert_eq!(screen.flow().phase(), QuizPhase::InProgress);
    assert!(screen.flow().can_submit());
    let shown = drain(&mut toasts);
    assert_eq!(shown.last().unwrap().status, ToastStatus::Error);
}

#[tokio::test]
async fn completed_quiz_opens_with_history() {
    let (address, _) = spawn_mock().await;
    let (state, _) = test_state(&address);
    sign_in(&state).await;

    let mut screen = QuizScreen::open(state, "8").await.unwrap();

    let flow = screen.flow_mut();
    assert_eq!(flow.phase(), QuizPhase::Submitted);
    assert_eq!(flow.quiz().nilai, Some(50));
    assert!(flow.request_start().is_err());

    flow.open_history().unwrap();
    assert_eq!(flow.current_index(), 0);
    assert_eq!(flow.option_mark(3, 31), OptionMark::Incorrect);
    assert_eq!(flow.option_mark(3, 30), OptionMark::Correct);
}

#[tokio::test]
async fn missing_quiz_reports_server_message() {
    let (address, _) = spawn_mock().await;
    let (state, mut toasts) = test_state(&address);
    sign_in(&state).await;

    let err = QuizScreen::open(state, "99").await.unwrap_err();

    assert_eq!(err, AppError::Api("Kuis tidak ditemukan".into()));
    assert_eq!(drain(&mut toasts)[0].message, "Kuis tidak ditemukan");
}
