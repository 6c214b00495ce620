mod chat;
mod providers;
mod session;
mod status;

use std::future::Future;
use std::path::PathBuf;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::mpsc;

use super::App;
use crate::api::client::ServiceError;
use crate::api::{ProviderInfo, SessionInfo};
use crate::core::message::{Attachment, Message};
use crate::core::providers::{ResolveError, Selection};

#[derive(Debug, Clone)]
pub enum AppAction {
    // UI-facing events.
    SessionSelected {
        session: SessionInfo,
    },
    ModelSelected {
        provider_id: String,
        model_id: String,
    },
    SessionCleared,
    CompactRequested,
    SendRequested {
        text: String,
        attachments: Vec<Attachment>,
    },
    OptimisticMessageAdded {
        message: Message,
    },
    CompletionDialogTriggered {
        initial_value: String,
    },
    ErrorToast {
        message: String,
    },

    // Requests from the front end.
    ProvidersRequested,
    SessionsRequested,
    SessionDeleteRequested {
        session_id: String,
    },
    AbortRequested,
    InitializeProjectRequested,
    AttachRequested {
        path: PathBuf,
    },
    AttachmentAdded {
        attachment: Attachment,
    },

    // Results of background commands.
    ProvidersResolved {
        providers: Vec<ProviderInfo>,
        selection: Selection,
    },
    ProviderResolutionFailed {
        error: ResolveError,
    },
    SessionsLoaded {
        sessions: Vec<SessionInfo>,
    },
    MessagesLoaded {
        session_id: String,
        messages: Vec<Message>,
    },
    SendSessionCreated {
        session: SessionInfo,
    },
    SendSessionFailed {
        error: ServiceError,
    },
    ProjectSessionCreated {
        session: SessionInfo,
    },

    /// A message pushed by the server's event stream.
    MessageUpdated {
        message: Message,
    },
}

impl AppAction {
    pub fn name(&self) -> &'static str {
        match self {
            AppAction::SessionSelected { .. } => "session-selected",
            AppAction::ModelSelected { .. } => "model-selected",
            AppAction::SessionCleared => "session-cleared",
            AppAction::CompactRequested => "compact-requested",
            AppAction::SendRequested { .. } => "send-requested",
            AppAction::OptimisticMessageAdded { .. } => "optimistic-message-added",
            AppAction::CompletionDialogTriggered { .. } => "completion-dialog-triggered",
            AppAction::ErrorToast { .. } => "error-toast",
            AppAction::ProvidersRequested => "providers-requested",
            AppAction::SessionsRequested => "sessions-requested",
            AppAction::SessionDeleteRequested { .. } => "session-delete-requested",
            AppAction::AbortRequested => "abort-requested",
            AppAction::InitializeProjectRequested => "initialize-project-requested",
            AppAction::AttachRequested { .. } => "attach-requested",
            AppAction::AttachmentAdded { .. } => "attachment-added",
            AppAction::ProvidersResolved { .. } => "providers-resolved",
            AppAction::ProviderResolutionFailed { .. } => "provider-resolution-failed",
            AppAction::SessionsLoaded { .. } => "sessions-loaded",
            AppAction::MessagesLoaded { .. } => "messages-loaded",
            AppAction::SendSessionCreated { .. } => "send-session-created",
            AppAction::SendSessionFailed { .. } => "send-session-failed",
            AppAction::ProjectSessionCreated { .. } => "project-session-created",
            AppAction::MessageUpdated { .. } => "message-updated",
        }
    }
}

/// Sending half of the event loop's inbox.
#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppAction>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppAction>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction) {
        // The loop is gone once the receiver drops; late results are moot.
        let _ = self.tx.send(action);
    }

    pub fn dispatch_many<I>(&self, actions: I)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            self.dispatch(action);
        }
    }
}

/// Work requested by a state transition.
pub enum AppCommand {
    /// Deliver an action back to the inbox.
    Emit(AppAction),
    /// Deferred work yielding at most one action.
    Task(BoxFuture<'static, Option<AppAction>>),
    /// Several commands, issued in order. Completion order is not guaranteed.
    Batch(Vec<AppCommand>),
}

impl AppCommand {
    pub fn task<F>(future: F) -> Self
    where
        F: Future<Output = Option<AppAction>> + Send + 'static,
    {
        AppCommand::Task(future.boxed())
    }

    /// Collapse `commands` into one, or `None` when there is nothing to do.
    pub fn batch(commands: impl IntoIterator<Item = AppCommand>) -> Option<Self> {
        let mut commands: Vec<AppCommand> = commands.into_iter().collect();
        match commands.len() {
            0 => None,
            1 => commands.pop(),
            _ => Some(AppCommand::Batch(commands)),
        }
    }
}

impl std::fmt::Debug for AppCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppCommand::Emit(action) => f.debug_tuple("Emit").field(action).finish(),
            AppCommand::Task(_) => f.write_str("Task(..)"),
            AppCommand::Batch(commands) => f.debug_tuple("Batch").field(commands).finish(),
        }
    }
}

pub fn apply_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::SendRequested { .. }
        | AppAction::AttachRequested { .. }
        | AppAction::AttachmentAdded { .. }
        | AppAction::OptimisticMessageAdded { .. }
        | AppAction::SendSessionCreated { .. }
        | AppAction::SendSessionFailed { .. }
        | AppAction::MessageUpdated { .. } => chat::handle_chat_action(app, action),

        AppAction::SessionSelected { .. }
        | AppAction::SessionCleared
        | AppAction::SessionsRequested
        | AppAction::SessionsLoaded { .. }
        | AppAction::MessagesLoaded { .. }
        | AppAction::SessionDeleteRequested { .. }
        | AppAction::AbortRequested
        | AppAction::CompactRequested
        | AppAction::InitializeProjectRequested
        | AppAction::ProjectSessionCreated { .. } => session::handle_session_action(app, action),

        AppAction::ProvidersRequested
        | AppAction::ProvidersResolved { .. }
        | AppAction::ProviderResolutionFailed { .. }
        | AppAction::ModelSelected { .. } => providers::handle_provider_action(app, action),

        AppAction::ErrorToast { .. } | AppAction::CompletionDialogTriggered { .. } => {
            status::handle_status_action(app, action)
        }
    }
}
