//! Durable per-install client state.
//!
//! The state file records the last selected provider, model and theme. It is
//! loaded once at startup and rewritten whenever the selection changes.

mod io;

#[cfg(test)]
mod tests;

pub use io::{StateError, StateStore};

use serde::{Deserialize, Serialize};

use crate::api::ConfigInfo;

pub const DEFAULT_THEME: &str = "system";
pub const STATE_FILE_NAME: &str = "tui";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            provider: String::new(),
            model: String::new(),
        }
    }
}

impl ClientState {
    /// Apply overrides from the server configuration.
    ///
    /// A configured theme replaces the persisted one. A configured model of the
    /// form `provider/model` splits at the first slash; the remainder may itself
    /// contain slashes (`openrouter/anthropic/claude-3`).
    pub fn apply_config_overrides(&mut self, config: &ConfigInfo) {
        if let Some(theme) = config.theme.as_deref().filter(|t| !t.is_empty()) {
            self.theme = theme.to_string();
        }
        if let Some(model) = config.model.as_deref().filter(|m| !m.is_empty()) {
            let (provider, model) = model.split_once('/').unwrap_or((model, ""));
            self.provider = provider.to_string();
            self.model = model.to_string();
        }
    }

    pub fn has_selection(&self) -> bool {
        !self.provider.is_empty() && !self.model.is_empty()
    }

    /// Record a new selection, returning whether anything changed.
    pub fn select(&mut self, provider_id: &str, model_id: &str) -> bool {
        if self.provider == provider_id && self.model == model_id {
            return false;
        }
        self.provider = provider_id.to_string();
        self.model = model_id.to_string();
        true
    }
}
