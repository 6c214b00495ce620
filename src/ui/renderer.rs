//! Plain-text rendering of applied actions.

use chrono::{DateTime, Local, Utc};

use crate::api::SessionInfo;
use crate::commands::matching_commands;
use crate::core::app::{App, AppAction};
use crate::core::message::{Message, Role};

/// Text to print after `action` has been applied to `app`, if any.
pub fn render(app: &App, action: &AppAction) -> Option<String> {
    match action {
        AppAction::SessionSelected { session } => app
            .chat
            .is_active(&session.id)
            .then(|| format!("Switched to {}", session_label(session))),
        AppAction::ModelSelected {
            provider_id,
            model_id,
        } => {
            let selected = app.selected_ids()?;
            (selected.0 == *provider_id && selected.1 == *model_id)
                .then(|| format!("Using {provider_id}/{model_id}"))
        }
        AppAction::SessionCleared => Some("New conversation; a session is created on send".into()),
        AppAction::CompactRequested => Some("Compacting session...".into()),
        AppAction::OptimisticMessageAdded { message } => Some(render_message(message)),
        AppAction::CompletionDialogTriggered { initial_value } => {
            Some(render_completions(initial_value))
        }
        AppAction::ErrorToast { message } => Some(format!("error: {message}")),
        AppAction::ProviderResolutionFailed { error } => Some(format!("error: {error}")),
        AppAction::SendSessionFailed { error } => Some(format!("error: {error}")),
        AppAction::AttachmentAdded { attachment } => Some(format!(
            "Attached {} ({}, {} bytes)",
            attachment.file_name,
            attachment.mime_type,
            attachment.content.len()
        )),
        AppAction::ProvidersResolved { selection, .. } => Some(format!(
            "Using {} / {}",
            provider_label(&selection.provider.name, &selection.provider.id),
            selection.model.display_name()
        )),
        AppAction::SessionsLoaded { .. } => Some(render_sessions(app)),
        AppAction::MessagesLoaded { session_id, .. } => {
            if !app.chat.is_active(session_id) || app.chat.messages.is_empty() {
                return None;
            }
            let lines: Vec<String> = app.chat.messages.iter().map(render_message).collect();
            Some(lines.join("\n"))
        }
        AppAction::SendSessionCreated { session } => {
            if app.chat.is_active(&session.id) {
                Some(format!("Created {}", session_label(session)))
            } else {
                Some(format!("Queued messages sent to {}", session_label(session)))
            }
        }
        AppAction::ProjectSessionCreated { session } => Some(format!(
            "Initializing project in {}",
            session_label(session)
        )),
        AppAction::MessageUpdated { message } => {
            let finished = message.role == Role::Assistant && message.is_complete();
            (finished && app.chat.is_active(&message.session_id)).then(|| render_message(message))
        }
        AppAction::SendRequested { .. }
        | AppAction::ProvidersRequested
        | AppAction::SessionsRequested
        | AppAction::SessionDeleteRequested { .. }
        | AppAction::AbortRequested
        | AppAction::InitializeProjectRequested
        | AppAction::AttachRequested { .. } => None,
    }
}

pub fn render_message(message: &Message) -> String {
    let pending = if message.id.is_optimistic() {
        " (sending)"
    } else {
        ""
    };
    format!("{}{pending}: {}", message.role.as_str(), message.text())
}

fn render_sessions(app: &App) -> String {
    if app.chat.sessions.is_empty() {
        return "No sessions".to_string();
    }
    let mut out = String::from("Sessions:");
    for session in &app.chat.sessions {
        let marker = if app.chat.is_active(&session.id) {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!(
            "\n {marker} {}  {}  {}",
            session.id,
            format_timestamp(session.time.created),
            session.title
        ));
    }
    out
}

fn render_completions(prefix: &str) -> String {
    let mut out = String::from("Commands:");
    let mut any = false;
    for command in matching_commands(prefix) {
        any = true;
        out.push_str(&format!("\n  {}", command.usage));
    }
    if !any {
        out = format!("No commands match {prefix}");
    }
    out
}

fn session_label(session: &SessionInfo) -> String {
    if session.title.is_empty() {
        format!("session {}", session.id)
    } else {
        format!("session {} ({})", session.id, session.title)
    }
}

fn provider_label<'a>(name: &'a str, id: &'a str) -> &'a str {
    if name.is_empty() {
        id
    } else {
        name
    }
}

/// Local wall-clock time for a unix-millisecond timestamp.
pub fn format_timestamp(millis: f64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
