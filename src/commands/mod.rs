mod registry;


pub use registry::{all_commands, find_command, matching_commands, Command, CommandInvocation};

use std::path::PathBuf;

use crate::core::app::{App, AppAction};

#[derive(Debug)]
pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    /// Actions for the event loop to apply, in order.
    Dispatch(Vec<AppAction>),
    /// Text shown to the user without touching app state.
    Notice(String),
    Exit,
}

pub fn process_input(app: &App, input: &str) -> CommandResult {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return CommandResult::Continue;
    }

    if trimmed == "/" {
        return dispatch(AppAction::CompletionDialogTriggered {
            initial_value: "/".to_string(),
        });
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let mut parts = rest.splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        let invocation = CommandInvocation { args };
        (command.handler)(app, invocation)
    } else {
        CommandResult::ProcessAsMessage(input.to_string())
    }
}

fn dispatch(action: AppAction) -> CommandResult {
    CommandResult::Dispatch(vec![action])
}

fn error(message: impl Into<String>) -> CommandResult {
    dispatch(AppAction::ErrorToast {
        message: message.into(),
    })
}

pub(super) fn handle_help(_app: &App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let width = all_commands()
        .iter()
        .map(|command| command.usage.len())
        .max()
        .unwrap_or_default();
    let mut help = String::from("Commands:");
    for command in all_commands() {
        help.push_str(&format!("\n  {:<width$}  {}", command.usage, command.help));
    }
    CommandResult::Notice(help)
}

pub(super) fn handle_new(_app: &App, _invocation: CommandInvocation<'_>) -> CommandResult {
    dispatch(AppAction::SessionCleared)
}

pub(super) fn handle_sessions(_app: &App, _invocation: CommandInvocation<'_>) -> CommandResult {
    dispatch(AppAction::SessionsRequested)
}

pub(super) fn handle_session(app: &App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        return error("Usage: /session <id>");
    }
    match app
        .chat
        .sessions
        .iter()
        .find(|session| session.id == invocation.args)
    {
        Some(session) => dispatch(AppAction::SessionSelected {
            session: session.clone(),
        }),
        None => error(format!(
            "Unknown session: {} (run /sessions to refresh)",
            invocation.args
        )),
    }
}

pub(super) fn handle_delete(app: &App, invocation: CommandInvocation<'_>) -> CommandResult {
    let session_id = if invocation.args.is_empty() {
        match app.chat.session_id() {
            Some(id) => id.to_string(),
            None => return error("No active session to delete"),
        }
    } else {
        invocation.args.to_string()
    };
    dispatch(AppAction::SessionDeleteRequested { session_id })
}

pub(super) fn handle_abort(_app: &App, _invocation: CommandInvocation<'_>) -> CommandResult {
    dispatch(AppAction::AbortRequested)
}

pub(super) fn handle_compact(app: &App, _invocation: CommandInvocation<'_>) -> CommandResult {
    if app.chat.session.is_none() {
        return error("No active session to compact");
    }
    dispatch(AppAction::CompactRequested)
}

pub(super) fn handle_init(_app: &App, _invocation: CommandInvocation<'_>) -> CommandResult {
    dispatch(AppAction::InitializeProjectRequested)
}

pub(super) fn handle_model(app: &App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        return CommandResult::Notice(list_models(app));
    }
    match invocation.args.split_once('/') {
        Some((provider_id, model_id)) if !provider_id.is_empty() && !model_id.is_empty() => {
            dispatch(AppAction::ModelSelected {
                provider_id: provider_id.to_string(),
                model_id: model_id.to_string(),
            })
        }
        _ => error("Usage: /model <provider>/<model>"),
    }
}

fn list_models(app: &App) -> String {
    if app.models.providers.is_empty() {
        return "No providers loaded".to_string();
    }
    let current = app.selected_ids();
    let mut out = String::from("Models:");
    for provider in &app.models.providers {
        for model in provider.models.values() {
            let marker = match &current {
                Some((p, m)) if *p == provider.id && *m == model.id => '*',
                _ => ' ',
            };
            out.push_str(&format!(
                "\n {marker} {}/{}  {}",
                provider.id,
                model.id,
                model.display_name()
            ));
        }
    }
    out
}

pub(super) fn handle_attach(_app: &App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        return error("Usage: /attach <path>");
    }
    dispatch(AppAction::AttachRequested {
        path: PathBuf::from(invocation.args),
    })
}

pub(super) fn handle_quit(_app: &App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Exit
}
