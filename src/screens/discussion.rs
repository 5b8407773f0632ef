// src/screens/discussion.rs

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use validator::Validate;

use crate::{
    api::{ApiRequest, ApiResponse},
    error::AppError,
    models::{
        discussion::{Discussion, Message, SendMessageRequest},
        session::Session,
    },
    state::ClientState,
};

const LOAD_FAILED_MESSAGE: &str = "Gagal memuat diskusi";
const CLOSED_MESSAGE: &str = "Diskusi Ditutup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAction {
    Stay,
    ToEnd { animated: bool },
}

/// Pushed to the view whenever the thread changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscussionEvent {
    Refreshed,
    ScrollToEnd { animated: bool },
}

/// Local copy of a thread, replaced wholesale on every fetch.
///
/// Remembers the newest message id it has shown, so the view scrolls only when a new
/// last message shows up (or on the first non-empty load), never on idle polls.
///
/// Fetches may overlap (a poll tick and the re-fetch after sending). Each carries the
/// generation it was issued with, and a response older than the one already applied
/// is discarded.
#[derive(Debug, Clone, Default)]
pub struct DiscussionThread {
    discussion: Discussion,
    loaded: bool,
    first_load: bool,
    last_seen_id: Option<i64>,
    applied_generation: u64,
}

impl DiscussionThread {
    pub fn new() -> Self {
        Self {
            first_load: true,
            ..Self::default()
        }
    }

    /// Applies a fetch issued as `generation`. Returns `None` when a newer fetch has
    /// already been applied.
    pub fn apply_fetch(&mut self, generation: u64, fetched: Discussion) -> Option<ScrollAction> {
        if generation <= self.applied_generation {
            return None;
        }
        self.applied_generation = generation;
        Some(self.apply(fetched))
    }

    pub fn apply(&mut self, fetched: Discussion) -> ScrollAction {
        self.loaded = true;
        let newest = fetched.last_message_id();
        self.discussion = fetched;

        match newest {
            Some(id) if self.first_load || self.last_seen_id != Some(id) => {
                let animated = !self.first_load;
                self.last_seen_id = Some(id);
                self.first_load = false;
                ScrollAction::ToEnd { animated }
            }
            _ => ScrollAction::Stay,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_closed(&self) -> bool {
        self.discussion.is_closed
    }

    /// The composer only exists for a loaded, open thread.
    pub fn composer_visible(&self) -> bool {
        self.loaded && !self.discussion.is_closed
    }

    pub fn title(&self) -> Option<&str> {
        self.discussion.materi_title.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.discussion.messages
    }

    pub fn is_own(&self, message: &Message) -> bool {
        self.discussion.is_own(message)
    }

    /// Loaded and nothing posted yet ("Belum ada pesan").
    pub fn is_empty(&self) -> bool {
        self.loaded && self.discussion.messages.is_empty()
    }
}

struct Shared {
    state: ClientState,
    session: Session,
    materi_id: String,
    thread: Mutex<DiscussionThread>,
    /// Generation of the most recently issued fetch.
    issued: AtomicU64,
    events: mpsc::UnboundedSender<DiscussionEvent>,
}

impl Shared {
    async fn refresh(&self) -> Result<ScrollAction, AppError> {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let url = self.state.routes.discussion(&self.materi_id, &self.session.email)?;
        let res = self
            .state
            .api
            .send_as::<Discussion>(ApiRequest::get(url).bearer(self.session.bearer()))
            .await;

        let fetched = match res {
            ApiResponse::Success {
                data: Some(discussion),
                ..
            } => discussion,
            ApiResponse::Success { data: None, .. } => {
                return Err(self.state.report(AppError::Api(LOAD_FAILED_MESSAGE.to_string())));
            }
            other => {
                let message = match other.message() {
                    "" => LOAD_FAILED_MESSAGE.to_string(),
                    m => m.to_string(),
                };
                return Err(self.state.report(AppError::Api(message)));
            }
        };

        let Some(action) = self.thread.lock().await.apply_fetch(generation, fetched) else {
            tracing::debug!(generation, "Dropping stale discussion fetch");
            return Ok(ScrollAction::Stay);
        };

        let _ = self.events.send(DiscussionEvent::Refreshed);
        if let ScrollAction::ToEnd { animated } = action {
            let _ = self.events.send(DiscussionEvent::ScrollToEnd { animated });
        }
        Ok(action)
    }
}

/// Discussion screen: a thread kept fresh by a polling task bound to the screen's
/// lifetime. `start` begins polling (fetching at once), `stop` or dropping the screen
/// ends it.
pub struct DiscussionScreen {
    shared: Arc<Shared>,
    poller: Option<JoinHandle<()>>,
    draft: String,
}

impl DiscussionScreen {
    /// Requires a session. Returns the screen and the stream of view events.
    pub async fn open(
        state: ClientState,
        materi_id: impl Into<String>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<DiscussionEvent>), AppError> {
        let session = state.sessions.require().await?;
        let (tx, rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            state,
            session,
            materi_id: materi_id.into(),
            thread: Mutex::new(DiscussionThread::new()),
            issued: AtomicU64::new(0),
            events: tx,
        });

        Ok((
            Self {
                shared,
                poller: None,
                draft: String::new(),
            },
            rx,
        ))
    }

    pub fn start(&mut self) {
        if self.is_polling() {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let period = shared.state.config.discussion_poll_interval;
        tracing::debug!(materi_id = %shared.materi_id, ?period, "Discussion polling started");

        self.poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately: initial load on start
                ticker.tick().await;
                if let Err(e) = shared.refresh().await {
                    tracing::warn!("Discussion poll failed: {}", e);
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
            tracing::debug!(materi_id = %self.shared.materi_id, "Discussion polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Fetches now, outside the polling schedule.
    pub async fn refresh(&self) -> Result<ScrollAction, AppError> {
        self.shared.refresh().await
    }

    pub async fn thread(&self) -> DiscussionThread {
        self.shared.thread.lock().await.clone()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Posts the draft, then re-fetches immediately so the sender sees their message.
    ///
    /// A blank draft is ignored (`Ok(false)`). The draft is cleared after any attempt
    /// that reached the server.
    pub async fn send(&mut self) -> Result<bool, AppError> {
        let text = self.draft.trim().to_string();
        if text.is_empty() {
            return Ok(false);
        }

        if !self.shared.thread.lock().await.composer_visible() {
            return Err(AppError::InvalidState(CLOSED_MESSAGE.to_string()));
        }

        let state = &self.shared.state;
        let request = SendMessageRequest {
            materi_id: self.shared.materi_id.clone(),
            email: self.shared.session.email.clone(),
            message: text,
        };
        request.validate().map_err(|e| state.report(e.into()))?;

        let url = state.routes.send_discussion_message()?;
        let req = ApiRequest::post(url)
            .bearer(self.shared.session.bearer())
            .json(&request)?;
        let res = state.api.send(req).await;
        self.draft.clear();

        let sent = match res.into_message() {
            Ok(message) => {
                state.notifier.success(&message);
                Ok(true)
            }
            Err(e) => Err(state.report(e)),
        };

        if let Err(e) = self.shared.refresh().await {
            tracing::warn!("Refresh after send failed: {}", e);
        }
        sent
    }
}

impl Drop for DiscussionScreen {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for DiscussionScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscussionScreen")
            .field("materi_id", &self.shared.materi_id)
            .field("polling", &self.is_polling())
            .finish_non_exhaustive()
    }
}
