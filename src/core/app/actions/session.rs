use tracing::{debug, warn};

use super::chat::NO_MODEL_MESSAGE;
use super::status::show_error;
use super::{App, AppAction, AppCommand};
use crate::api::SessionInfo;
use crate::core::message::now_millis;

pub(super) fn handle_session_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::SessionSelected { session } => select_session(app, session),
        AppAction::SessionCleared => {
            app.chat.clear_session();
            None
        }
        AppAction::SessionsRequested => {
            let sessions = app.sessions();
            Some(AppCommand::task(async move {
                match sessions.list().await {
                    Ok(sessions) => Some(AppAction::SessionsLoaded { sessions }),
                    Err(err) => Some(AppAction::ErrorToast {
                        message: err.to_string(),
                    }),
                }
            }))
        }
        AppAction::SessionsLoaded { sessions } => {
            app.chat.sessions = sessions;
            None
        }
        AppAction::MessagesLoaded {
            session_id,
            messages,
        } => {
            if !app.chat.is_active(&session_id) {
                debug!(session_id = %session_id, "discarding history for inactive session");
                return None;
            }
            app.chat.load_history(messages);
            debug!(
                session_id = %session_id,
                loaded = app.chat.messages.len(),
                unconfirmed = app.chat.optimistic_count(),
                "history loaded"
            );
            None
        }
        AppAction::SessionDeleteRequested { session_id } => delete_session(app, session_id),
        AppAction::AbortRequested => {
            let session_id = app.chat.session_id()?.to_string();
            let sessions = app.sessions();
            Some(AppCommand::task(async move {
                match sessions.abort(&session_id).await {
                    Ok(()) => None,
                    Err(err) => Some(AppAction::ErrorToast {
                        message: err.to_string(),
                    }),
                }
            }))
        }
        AppAction::CompactRequested => compact_session(app),
        AppAction::InitializeProjectRequested => {
            if app.selected_ids().is_none() {
                show_error(app, NO_MODEL_MESSAGE);
                return None;
            }
            let sessions = app.sessions();
            Some(AppCommand::task(async move {
                match sessions.create().await {
                    Ok(session) => Some(AppAction::ProjectSessionCreated { session }),
                    Err(err) => Some(AppAction::ErrorToast {
                        message: err.to_string(),
                    }),
                }
            }))
        }
        AppAction::ProjectSessionCreated { session } => initialize_project(app, session),
        _ => unreachable!("non-session action routed to session handler"),
    }
}

fn select_session(app: &mut App, session: SessionInfo) -> Option<AppCommand> {
    app.chat.set_session(session);
    let session_id = app.chat.session_id()?.to_string();
    let sessions = app.sessions();
    Some(AppCommand::task(async move {
        match sessions.list_messages(&session_id).await {
            Ok(messages) => Some(AppAction::MessagesLoaded {
                session_id,
                messages,
            }),
            Err(err) => Some(AppAction::ErrorToast {
                message: err.to_string(),
            }),
        }
    }))
}

fn delete_session(app: &mut App, session_id: String) -> Option<AppCommand> {
    let was_active = app.chat.forget_session(&session_id);
    let sessions = app.sessions();
    let delete = AppCommand::task(async move {
        match sessions.delete(&session_id).await {
            Ok(()) => None,
            Err(err) => Some(AppAction::ErrorToast {
                message: err.to_string(),
            }),
        }
    });

    let cleared = was_active.then_some(AppCommand::Emit(AppAction::SessionCleared));
    AppCommand::batch(cleared.into_iter().chain([delete]))
}

fn compact_session(app: &mut App) -> Option<AppCommand> {
    let session_id = app.chat.session_id()?.to_string();
    let (provider_id, model_id) = app.selected_ids()?;
    let sessions = app.sessions();
    Some(AppCommand::task(async move {
        if let Err(err) = sessions.summarize(&session_id, &provider_id, &model_id).await {
            warn!(session_id = %session_id, error = %err, "compact failed");
        }
        None
    }))
}

fn initialize_project(app: &mut App, session: SessionInfo) -> Option<AppCommand> {
    app.chat.set_session(session);
    let session_id = app.chat.session_id()?.to_string();
    let (provider_id, model_id) = app.selected_ids()?;
    app.info.time.initialized = Some(now_millis());

    let sessions = app.sessions();
    Some(AppCommand::task(async move {
        if let Err(err) = sessions
            .initialize(&session_id, &provider_id, &model_id)
            .await
        {
            warn!(session_id = %session_id, error = %err, "project initialization failed");
        }
        if let Err(err) = sessions.mark_initialized().await {
            warn!(error = %err, "failed to mark project initialized");
        }
        None
    }))
}
