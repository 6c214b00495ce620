//! The owner loop: read stdin, drain the inbox, apply, spawn, render.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::client::RemoteService;
use crate::commands::{process_input, CommandResult};
use crate::core::app::{apply_action, App, AppAction, AppActionDispatcher};
use crate::ui::renderer::render;

use super::executors::spawn_command;
use super::setup::bootstrap_app;

/// Read stdin on a plain thread so a blocked read never holds up shutdown.
fn spawn_input_reader(line_tx: mpsc::UnboundedSender<String>, cancel: CancellationToken) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if cancel.is_cancelled() || line_tx.send(line).is_err() {
                break;
            }
        }
    });
}

/// Apply a drained batch of actions in arrival order.
pub(super) fn apply_and_render<W: Write>(
    app: &mut App,
    actions: Vec<AppAction>,
    dispatcher: &AppActionDispatcher,
    out: &mut W,
) -> io::Result<()> {
    for action in actions {
        let applied = action.clone();
        if let Some(command) = apply_action(app, action) {
            spawn_command(command, dispatcher);
        }
        if let Some(line) = render(app, &applied) {
            writeln!(out, "{line}")?;
        }
    }
    out.flush()
}

/// Route one line of user input. Returns `true` when the user asked to quit.
pub(super) fn handle_input<W: Write>(
    app: &App,
    line: &str,
    dispatcher: &AppActionDispatcher,
    out: &mut W,
) -> io::Result<bool> {
    match process_input(app, line) {
        CommandResult::Continue => {}
        CommandResult::ProcessAsMessage(text) => dispatcher.dispatch(AppAction::SendRequested {
            text,
            attachments: Vec::new(),
        }),
        CommandResult::Dispatch(actions) => dispatcher.dispatch_many(actions),
        CommandResult::Notice(text) => {
            writeln!(out, "{text}")?;
            out.flush()?;
        }
        CommandResult::Exit => return Ok(true),
    }
    Ok(false)
}

pub async fn run_chat(
    service: Arc<dyn RemoteService>,
    state_file: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let mut app = bootstrap_app(service, state_file).await?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppAction>();
    let dispatcher = AppActionDispatcher::new(action_tx);
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    let cancel = CancellationToken::new();
    spawn_input_reader(line_tx, cancel.clone());

    let mut stdout = io::stdout();
    writeln!(
        stdout,
        "parley {} - type /help for commands, {} is the leader key",
        app.version,
        app.leader_key()
    )?;
    dispatcher.dispatch(AppAction::ProvidersRequested);
    dispatcher.dispatch(AppAction::SessionsRequested);

    loop {
        tokio::select! {
            biased;
            line = line_rx.recv() => {
                let Some(line) = line else {
                    debug!("input closed");
                    break;
                };
                if handle_input(&app, &line, &dispatcher, &mut stdout)? {
                    break;
                }
            }
            Some(action) = action_rx.recv() => {
                let mut pending = vec![action];
                while let Ok(action) = action_rx.try_recv() {
                    pending.push(action);
                }
                apply_and_render(&mut app, pending, &dispatcher, &mut stdout)?;
            }
        }
    }

    cancel.cancel();
    info!(busy = app.is_busy(), "chat loop finished");
    Ok(())
}
