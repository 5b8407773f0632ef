use std::sync::Arc;

use crate::{
    api::ApiClient,
    config::Config,
    error::AppError,
    notify::{LogNotifier, Notifier, Toast},
    routes::Routes,
    session::{FileStore, SecureStore, SessionAccessor},
    utils::html::ContentRewriter,
};

/// Handles shared by every screen. Cheap to clone.
#[derive(Clone)]
pub struct ClientState {
    pub config: Config,
    pub api: ApiClient,
    pub routes: Routes,
    pub sessions: SessionAccessor,
    pub notifier: Arc<dyn Notifier>,
    pub content: ContentRewriter,
}

impl ClientState {
    pub fn new(
        config: Config,
        store: Arc<dyn SecureStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppError> {
        let api = ApiClient::new(&config)?;
        let routes = Routes::new(config.api_url.clone());
        let content = ContentRewriter::new(config.asset_host.as_deref(), &config.asset_base_url);

        Ok(Self {
            api,
            routes,
            sessions: SessionAccessor::new(store),
            notifier,
            content,
            config,
        })
    }

    /// File-backed session storage and log-only notifications.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let store = Arc::new(FileStore::new(config.session_dir.clone()));
        Self::new(config, store, Arc::new(LogNotifier))
    }

    /// Shows `err` to the user and hands it back for propagation.
    ///
    /// A missing session is not toasted; the UI answers it by routing to sign-in.
    pub fn report(&self, err: AppError) -> AppError {
        if err != AppError::Unauthenticated {
            self.notifier.show(Toast::from(&err));
        }
        err
    }
}

impl std::fmt::Debug for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientState")
            .field("api_url", &self.config.api_url.as_str())
            .finish_non_exhaustive()
    }
}
