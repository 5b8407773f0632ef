// src/notify.rs

use std::time::Duration;

use tokio::sync::mpsc;

use crate::{config::TOAST_DURATION, error::AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStatus {
    Success,
    Error,
}

/// A transient, top-of-screen notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub status: ToastStatus,
    pub duration: Duration,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: ToastStatus::Success,
            duration: TOAST_DURATION,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: ToastStatus::Error,
            duration: TOAST_DURATION,
        }
    }
}

impl From<&AppError> for Toast {
    fn from(err: &AppError) -> Self {
        Toast::error(err.user_message())
    }
}

/// Where screens send user-visible notifications.
pub trait Notifier: Send + Sync {
    fn show(&self, toast: Toast);

    fn success(&self, message: &str) {
        self.show(Toast::success(message));
    }

    fn error(&self, message: &str) {
        self.show(Toast::error(message));
    }
}

/// Writes toasts to the log only. For headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, toast: Toast) {
        match toast.status {
            ToastStatus::Success => tracing::info!(message = %toast.message, "toast"),
            ToastStatus::Error => tracing::warn!(message = %toast.message, "toast"),
        }
    }
}

/// Forwards toasts to the UI layer over a channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Toast>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn show(&self, toast: Toast) {
        if self.tx.send(toast).is_err() {
            tracing::debug!("Toast dropped: UI receiver closed");
        }
    }
}
