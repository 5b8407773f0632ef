// src/utils/html.rs

use regex::{NoExpand, Regex};
use url::Url;

/// Clean HTML content using the ammonia library.
///
/// Question, option and material bodies are authored HTML rendered by the client;
/// safe markup (<p>, <b>, <img>) survives while scripts and event handlers are dropped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Prepares server-authored HTML for display.
///
/// Content authored on a development host embeds absolute links to it; those are
/// rewritten to the configured asset base before sanitising.
#[derive(Debug, Clone)]
pub struct ContentRewriter {
    legacy_host: Option<Regex>,
    replacement: String,
}

impl ContentRewriter {
    pub fn new(asset_host: Option<&str>, asset_base: &Url) -> Self {
        let legacy_host = asset_host.and_then(|host| {
            Regex::new(&format!(r"https?://{}", regex::escape(host)))
                .map_err(|e| tracing::warn!("Ignoring asset host {:?}: {}", host, e))
                .ok()
        });

        Self {
            legacy_host,
            replacement: asset_base.as_str().trim_end_matches('/').to_string(),
        }
    }

    /// Identity rewriter: sanitises only.
    pub fn passthrough() -> Self {
        Self {
            legacy_host: None,
            replacement: String::new(),
        }
    }

    pub fn fix_urls(&self, html: &str) -> String {
        match &self.legacy_host {
            Some(re) => re.replace_all(html, NoExpand(&self.replacement)).into_owned(),
            None => html.to_string(),
        }
    }

    pub fn prepare(&self, html: &str) -> String {
        clean_html(&self.fix_urls(html))
    }
}
