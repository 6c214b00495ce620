//! The send path: lazy session creation, optimistic append, network send.

use tracing::{debug, info, warn};

use super::status::show_error;
use super::{App, AppAction, AppCommand};
use crate::api::{ChatRequest, SessionInfo};
use crate::core::app::{PendingSend, Reconciled, ToastLevel};
use crate::core::message::{build_parts, Attachment, Message};

pub(super) const NO_MODEL_MESSAGE: &str = "No provider or model configured";

pub(super) fn handle_chat_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::SendRequested { text, attachments } => request_send(app, text, attachments),
        AppAction::AttachRequested { path } => Some(AppCommand::task(async move {
            match Attachment::load(&path).await {
                Ok(attachment) => Some(AppAction::AttachmentAdded { attachment }),
                Err(err) => Some(AppAction::ErrorToast {
                    message: format!("Failed to attach {}: {err}", path.display()),
                }),
            }
        })),
        AppAction::AttachmentAdded { attachment } => {
            debug!(file = %attachment.file_path.display(), "attachment queued");
            app.chat.draft_attachments.push(attachment);
            None
        }
        AppAction::OptimisticMessageAdded { message } => {
            debug!(id = %message.id, "optimistic message added");
            None
        }
        AppAction::SendSessionCreated { session } => {
            app.chat.creating_session = false;
            if session.id.is_empty() {
                drop_pending_sends(app, "failed to create session: missing session id");
                return None;
            }
            let pending = std::mem::take(&mut app.chat.pending_sends);
            if app.chat.session_id().is_some_and(|active| active != session.id) {
                return flush_in_background(app, session, pending);
            }
            app.chat.set_session(session);
            let session_id = app.chat.session_id()?.to_string();
            debug!(session_id = %session_id, count = pending.len(), "flushing parked sends");
            AppCommand::batch(
                pending
                    .into_iter()
                    .map(|send| begin_send(app, &session_id, send)),
            )
        }
        AppAction::SendSessionFailed { error } => {
            app.chat.creating_session = false;
            warn!(
                operation = error.operation(),
                status = ?error.status(),
                error = %error,
                "session creation for send failed"
            );
            drop_pending_sends(app, error.to_string());
            None
        }
        AppAction::MessageUpdated { message } => {
            let id = message.id.clone();
            let outcome = app.chat.reconcile(message);
            if outcome == Reconciled::Ignored {
                debug!(id = %id, "ignoring update for inactive session");
            }
            None
        }
        _ => unreachable!("non-chat action routed to chat handler"),
    }
}

fn request_send(
    app: &mut App,
    text: String,
    attachments: Vec<Attachment>,
) -> Option<AppCommand> {
    let Some((provider_id, model_id)) = app.selected_ids() else {
        show_error(app, NO_MODEL_MESSAGE);
        return None;
    };

    let has_attachments = !attachments.is_empty() || !app.chat.draft_attachments.is_empty();
    if has_attachments {
        if let Some(model) = app.models.model.as_ref().filter(|model| !model.attachment) {
            let message = format!("{} does not accept attachments", model.display_name());
            show_error(app, message);
            return None;
        }
    }

    let mut all_attachments = std::mem::take(&mut app.chat.draft_attachments);
    all_attachments.extend(attachments);
    let send = PendingSend {
        text,
        attachments: all_attachments,
        provider_id,
        model_id,
    };

    if let Some(session_id) = app.chat.session_id().map(str::to_string) {
        return Some(begin_send(app, &session_id, send));
    }

    app.chat.pending_sends.push(send);
    if app.chat.creating_session {
        debug!(
            parked = app.chat.pending_sends.len(),
            "send parked behind session creation"
        );
        return None;
    }

    app.chat.creating_session = true;
    let sessions = app.sessions();
    Some(AppCommand::task(async move {
        match sessions.create().await {
            Ok(session) => Some(AppAction::SendSessionCreated { session }),
            Err(error) => Some(AppAction::SendSessionFailed { error }),
        }
    }))
}

/// Append the optimistic message, then hand the payload to the network.
fn begin_send(app: &mut App, session_id: &str, send: PendingSend) -> AppCommand {
    let request = chat_request(session_id, send);
    let message = Message::optimistic_user(session_id, request.parts.clone());
    app.chat.messages.push(message.clone());

    AppCommand::Batch(vec![
        AppCommand::Emit(AppAction::OptimisticMessageAdded { message }),
        send_task(app, request),
    ])
}

/// The user switched sessions while this one was being created. The parked
/// sends still go to the session they were written for, without touching the
/// active transcript.
fn flush_in_background(
    app: &mut App,
    session: SessionInfo,
    pending: Vec<PendingSend>,
) -> Option<AppCommand> {
    info!(
        session_id = %session.id,
        count = pending.len(),
        "sending parked messages to a session that is no longer active"
    );
    app.ui.push_toast(
        ToastLevel::Info,
        format!("Queued messages sent to session {}", session.id),
    );
    let commands: Vec<AppCommand> = pending
        .into_iter()
        .map(|send| send_task(app, chat_request(&session.id, send)))
        .collect();
    app.chat.remember_session(session);
    AppCommand::batch(commands)
}

fn chat_request(session_id: &str, send: PendingSend) -> ChatRequest {
    let PendingSend {
        text,
        attachments,
        provider_id,
        model_id,
    } = send;
    ChatRequest {
        session_id: session_id.to_string(),
        provider_id,
        model_id,
        parts: build_parts(&text, &attachments),
    }
}

fn send_task(app: &App, request: ChatRequest) -> AppCommand {
    let service = app.service.clone();
    AppCommand::task(async move {
        match service.send_chat(&request).await {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    session_id = %request.session_id,
                    status = ?err.status(),
                    error = %err,
                    "send failed"
                );
                Some(AppAction::ErrorToast {
                    message: err.to_string(),
                })
            }
        }
    })
}

fn drop_pending_sends(app: &mut App, message: impl Into<String>) {
    let dropped = app.chat.pending_sends.len();
    app.chat.pending_sends.clear();
    debug!(dropped, "dropped parked sends");
    show_error(app, message);
}
