// tests/common/mod.rs

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use lms_client::{
    ClientState,
    config::Config,
    models::session::Session,
    notify::{ChannelNotifier, Toast},
    session::MemoryStore,
};
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedReceiver;
use url::Url;

pub const EMAIL: &str = "rina@kampus.ac.id";
pub const TOKEN: &str = "token-rina";
pub const CLIENT_ID: &str = "test-client";
pub const VERIFY_CODE: &str = "123456";

type Reply = (StatusCode, Json<Value>);

fn ok(message: &str, data: Value) -> Reply {
    (
        StatusCode::OK,
        Json(json!({"status": "success", "message": message, "data": data})),
    )
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({"status": "error", "message": message})))
}

/// In-memory stand-in for the learning API.
#[derive(Default)]
pub struct MockLms {
    pub discussion_gets: AtomicUsize,
    pub discussion_closed: AtomicBool,
    pub messages: Mutex<Vec<Value>>,
    pub quiz_submissions: Mutex<Vec<Value>>,
    pub material_completions: Mutex<Vec<Value>>,
    pub logouts: Mutex<Vec<(Option<String>, Value)>>,
    pub fail_quiz_submit: AtomicBool,
    /// Delay of the first discussion GET. Its payload is taken before the delay.
    pub first_discussion_delay_ms: AtomicU64,
}

impl MockLms {
    pub fn push_message(&self, sender_id: &str, content: &str) {
        let mut messages = self.messages.lock().unwrap();
        let id = 100 + messages.len() as i64;
        messages.push(json!({
            "id": id,
            "sender_id": sender_id,
            "name": if sender_id == "u-rina" { "Rina" } else { "Pak Dosen" },
            "photo": null,
            "role": if sender_id == "u-rina" { "mahasiswa" } else { "dosen" },
            "content": content,
            "created_at": "2025-03-10 08:00:00"
        }));
    }
}

pub fn quiz_payload(completed: bool) -> Value {
    let mut quiz = json!({
        "id": 7,
        "title": "Kuis Pertemuan 3",
        "description": "Struktur data dasar",
        "kuis_selesai": if completed { 1 } else { 0 },
        "can_view_history": 1,
        "questions": (1..=4).map(|q| json!({
            "id": q,
            "question_text": format!("<p>Soal {}</p><img src=\"http://project-skripsi.test/storage/q{}.png\"><script>x()</script>", q, q),
            "options": [
                {"id": q * 10, "option_text": "Benar", "is_correct": 1},
                {"id": q * 10 + 1, "option_text": "Salah", "is_correct": 0}
            ]
        })).collect::<Vec<_>>()
    });
    if completed {
        quiz["nilai"] = json!(50);
        quiz["tanggal_selesai"] = json!("2025-03-10 09:00:00");
        quiz["answers"] = json!([
            {"question_id": 1, "option_id": 10},
            {"question_id": 2, "option_id": 20},
            {"question_id": 3, "option_id": 31},
            {"question_id": 4, "option_id": 41}
        ]);
    }
    quiz
}

async fn login(Json(body): Json<Value>) -> Reply {
    let email = body["email"].as_str().unwrap_or_default();
    if body["password"] == "salah-sekali" {
        return fail(StatusCode::UNAUTHORIZED, "Email atau password salah");
    }
    if email == "rusak@kampus.ac.id" {
        return ok("Login berhasil", json!({"name": "Tanpa Email"}));
    }
    if email == "baru@kampus.ac.id" {
        return (
            StatusCode::OK,
            Json(json!({"status": "verify", "message": "Silakan verifikasi email", "data": {"email": email}})),
        );
    }
    ok(
        "Login berhasil",
        json!({"email": email, "name": "Rina", "token": TOKEN, "avatar": null, "tahun_ajaran": 2024}),
    )
}

async fn register(Json(body): Json<Value>) -> Reply {
    if body["email"] == "terpakai@kampus.ac.id" {
        return fail(StatusCode::UNPROCESSABLE_ENTITY, "Email sudah terdaftar");
    }
    ok("Registrasi berhasil", json!({"email": body["email"]}))
}

async fn send_code(Query(q): Query<HashMap<String, String>>) -> Reply {
    match q.get("email") {
        Some(_) => ok("Kode verifikasi dikirim", json!({"verificationCode": VERIFY_CODE})),
        None => fail(StatusCode::BAD_REQUEST, "Email wajib diisi"),
    }
}

async fn resend_code() -> Reply {
    ok("Kode dikirim ulang", json!({"verificationCode": "654321"}))
}

async fn verify_email(Json(body): Json<Value>) -> Reply {
    if body["verificationCode"] == VERIFY_CODE || body["verificationCode"] == "654321" {
        ok("Email berhasil diverifikasi", Value::Null)
    } else {
        fail(StatusCode::BAD_REQUEST, "Kode tidak valid")
    }
}

async fn logout(State(mock): State<Arc<MockLms>>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    mock.logouts.lock().unwrap().push((auth, body));
    ok("Logout berhasil", Value::Null)
}

async fn courses() -> Reply {
    ok(
        "OK",
        json!([
            {"id": 1, "nama_matakuliah": "Struktur Data", "deskripsi": "Semester 3"},
            {"id": "2", "nama_matakuliah": "Basis Data"}
        ]),
    )
}

async fn module(Query(q): Query<HashMap<String, String>>) -> Reply {
    if q.get("id").map(String::as_str) == Some("404") {
        return ok("Modul belum tersedia", json!({}));
    }
    ok(
        "OK",
        json!({"rps_details": [{
            "id": 1,
            "sesi_pertemuan": 1,
            "tanggal_pertemuan": "2025-02-10",
            "tanggal_realisasi": "2025-02-10 08:00:00",
            "materi": [{"id": 11, "title": "Array", "tipe_materi": "teks", "materi_selesai": 1}],
            "kuis": [{"id": 7, "title": "Kuis 1", "description": "Array", "kuis_selesai": 0, "link": "/kuis?id=7"}]
        }]}),
    )
}

async fn material(Query(q): Query<HashMap<String, String>>) -> Reply {
    match q.get("id").map(String::as_str) {
        Some("11") => ok(
            "OK",
            json!({
                "id": 11, "title": "Array", "tipe_materi": "teks",
                "text_content": "<p>Isi</p><script>alert(1)</script>",
                "materi_selesai": 0
            }),
        ),
        _ => fail(StatusCode::NOT_FOUND, "Materi tidak ditemukan"),
    }
}

async fn complete_material(State(mock): State<Arc<MockLms>>, Json(body): Json<Value>) -> Reply {
    mock.material_completions.lock().unwrap().push(body);
    ok("Materi ditandai selesai", Value::Null)
}

async fn quiz(Query(q): Query<HashMap<String, String>>) -> Reply {
    match q.get("id").map(String::as_str) {
        Some("7") => ok("OK", quiz_payload(false)),
        Some("8") => ok("OK", quiz_payload(true)),
        _ => fail(StatusCode::NOT_FOUND, "Kuis tidak ditemukan"),
    }
}

async fn submit_quiz(State(mock): State<Arc<MockLms>>, Json(body): Json<Value>) -> Reply {
    if mock.fail_quiz_submit.load(Ordering::SeqCst) {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "Gagal menyimpan kuis");
    }
    mock.quiz_submissions.lock().unwrap().push(body);
    ok("Kuis tersimpan", json!({"tanggal_selesai": "2025-03-11 10:00:00"}))
}

async fn discussion(State(mock): State<Arc<MockLms>>) -> Reply {
    let nth = mock.discussion_gets.fetch_add(1, Ordering::SeqCst);
    let mut data = json!({
        "materi_title": "Array",
        "is_closed": mock.discussion_closed.load(Ordering::SeqCst),
        "author_id": "u-rina",
    });
    let messages = mock.messages.lock().unwrap().clone();
    for (i, m) in messages.into_iter().enumerate() {
        data[i.to_string()] = m;
    }

    let delay = mock.first_discussion_delay_ms.load(Ordering::SeqCst);
    if nth == 0 && delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    ok("OK", data)
}

async fn send_message(State(mock): State<Arc<MockLms>>, Json(body): Json<Value>) -> Reply {
    if mock.discussion_closed.load(Ordering::SeqCst) {
        return fail(StatusCode::FORBIDDEN, "Diskusi sudah ditutup");
    }
    let content = body["message"].as_str().unwrap_or_default().to_string();
    mock.push_message("u-rina", &content);
    ok("Pesan terkirim", Value::Null)
}

async fn slow() -> Reply {
    tokio::time::sleep(Duration::from_secs(5)).await;
    ok("too late", Value::Null)
}

/// Echoes what the client sent.
async fn echo(headers: HeaderMap, body: Bytes) -> Reply {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    ok(
        "echo",
        json!({
            "authorization": header("authorization"),
            "client_id": header("x-client-id"),
            "accept": header("accept"),
            "body": String::from_utf8_lossy(&body),
        }),
    )
}

async fn not_json() -> (StatusCode, &'static str) {
    (StatusCode::OK, "<html>maintenance</html>")
}

/// Spawns the mock API on a random port. Returns its base URL and shared state.
pub async fn spawn_mock() -> (String, Arc<MockLms>) {
    let mock = Arc::new(MockLms::default());

    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/register", post(register))
        .route("/api/verify-email", get(send_code).post(verify_email))
        .route("/api/verification-code", get(resend_code))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/matakuliah", get(courses))
        .route("/api/auth/modul-pembelajaran", get(module))
        .route("/api/auth/modul-pembelajaran/materi", get(material))
        .route("/api/auth/modul-pembelajaran/materi-selesai", post(complete_material))
        .route("/api/auth/modul-pembelajaran/kuis", get(quiz))
        .route("/api/auth/modul-pembelajaran/kuis-selesai", post(submit_quiz))
        .route("/api/auth/modul-pembelajaran/forum-diskusi", get(discussion))
        .route("/api/auth/modul-pembelajaran/forum-diskusi/send", post(send_message))
        .route("/slow", get(slow))
        .route("/echo", get(echo).post(echo))
        .route("/not-json", get(not_json))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, mock)
}

pub fn test_config(address: &str) -> Config {
    let mut config = Config::for_api(Url::parse(address).unwrap(), CLIENT_ID);
    config.request_timeout = Duration::from_secs(5);
    config.discussion_poll_interval = Duration::from_millis(100);
    config.asset_host = Some("project-skripsi.test".to_string());
    config.rust_log = "error".to_string();
    config
}

/// Client state with in-memory storage and a toast receiver.
pub fn test_state(address: &str) -> (ClientState, UnboundedReceiver<Toast>) {
    let (notifier, toasts) = ChannelNotifier::new();
    let state = ClientState::new(
        test_config(address),
        Arc::new(MemoryStore::new()),
        Arc::new(notifier),
    )
    .expect("Failed to build client state");
    (state, toasts)
}

pub async fn sign_in(state: &ClientState) -> Session {
    let session = Session {
        email: EMAIL.to_string(),
        name: "Rina".to_string(),
        token: Some(TOKEN.to_string()),
        avatar: None,
        tahun_ajaran: Some("2024".to_string()),
    };
    state.sessions.save(&session).await.unwrap();
    session
}

pub fn drain(toasts: &mut UnboundedReceiver<Toast>) -> Vec<Toast> {
    let mut out = Vec::new();
    while let Ok(t) = toasts.try_recv() {
        out.push(t);
    }
    out
}
