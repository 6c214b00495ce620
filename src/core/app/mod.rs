//! The state root of the interactive client.
//!
//! [`App`] is owned by the event loop and mutated only through
//! [`apply_action`]. Anything slow is returned as an [`AppCommand`] for the
//! loop to run elsewhere; the result comes back as another [`AppAction`].

use std::sync::Arc;

use tracing::warn;

use crate::api::client::RemoteService;
use crate::api::{AppInfo, ConfigInfo, ModelInfo, ProviderInfo};
use crate::core::providers::ResolveError;
use crate::core::sessions::SessionManager;
use crate::core::state::{ClientState, StateStore};

pub mod actions;
pub mod session;
pub mod ui_state;


pub use actions::{apply_action, AppAction, AppActionDispatcher, AppCommand};
pub use session::{ChatState, PendingSend, Reconciled};
pub use ui_state::{Toast, ToastLevel, UiState};

pub const DEFAULT_LEADER_KEY: &str = "ctrl+x";

/// The active provider/model pair plus everything needed to change it.
#[derive(Debug, Default)]
pub struct ModelSelection {
    /// Every provider from the last successful fetch, in server order.
    pub providers: Vec<ProviderInfo>,
    pub provider: Option<ProviderInfo>,
    pub model: Option<ModelInfo>,
    /// Why the last resolution attempt failed, if it did.
    pub resolution_error: Option<ResolveError>,
}

impl ModelSelection {
    pub fn ids(&self) -> Option<(String, String)> {
        match (&self.provider, &self.model) {
            (Some(provider), Some(model)) => Some((provider.id.clone(), model.id.clone())),
            _ => None,
        }
    }

    pub fn set(&mut self, provider: ProviderInfo, model: ModelInfo) {
        self.provider = Some(provider);
        self.model = Some(model);
        self.resolution_error = None;
    }
}

pub struct App {
    pub info: AppInfo,
    pub config: ConfigInfo,
    pub version: String,
    pub service: Arc<dyn RemoteService>,
    pub state: ClientState,
    pub state_store: StateStore,
    pub models: ModelSelection,
    pub chat: ChatState,
    pub ui: UiState,
}

impl App {
    /// Build the app from bootstrap results.
    ///
    /// Persisted state is loaded (or initialised) from `state_store`, then the
    /// server configuration's theme and model override it.
    pub fn new(
        service: Arc<dyn RemoteService>,
        info: AppInfo,
        mut config: ConfigInfo,
        state_store: StateStore,
        version: String,
    ) -> Self {
        let mut state = state_store.load_or_init();
        let before = state.clone();
        state.apply_config_overrides(&config);

        let keybinds = config.keybinds.get_or_insert_with(Default::default);
        if keybinds.leader.as_deref().is_none_or(str::is_empty) {
            keybinds.leader = Some(DEFAULT_LEADER_KEY.to_string());
        }

        let app = Self {
            info,
            config,
            version,
            service,
            state,
            state_store,
            models: ModelSelection::default(),
            chat: ChatState::default(),
            ui: UiState::default(),
        };
        if app.state != before {
            app.save_state();
        }
        app
    }

    pub fn sessions(&self) -> SessionManager {
        SessionManager::new(self.service.clone())
    }

    pub fn is_busy(&self) -> bool {
        self.chat.is_busy()
    }

    /// Provider and model ids of the active selection.
    pub fn selected_ids(&self) -> Option<(String, String)> {
        self.models.ids()
    }

    /// Persist the client state. Failures are logged, never surfaced.
    pub fn save_state(&self) {
        if let Err(err) = self.state_store.save(&self.state) {
            warn!(
                path = %self.state_store.path().display(),
                error = %err,
                "failed to save client state"
            );
        }
    }

    pub fn leader_key(&self) -> &str {
        self.config
            .keybinds
            .as_ref()
            .and_then(|keybinds| keybinds.leader.as_deref())
            .unwrap_or(DEFAULT_LEADER_KEY)
    }
}
