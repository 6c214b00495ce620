use crate::core::app::{AppActionDispatcher, AppCommand};

/// Start `command` without waiting for it.
///
/// Emitted actions go to the inbox immediately and tasks are spawned in
/// issuance order; a task's action is dispatched whenever it finishes.
pub fn spawn_command(command: AppCommand, dispatcher: &AppActionDispatcher) {
    match command {
        AppCommand::Emit(action) => dispatcher.dispatch(action),
        AppCommand::Task(task) => {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                if let Some(action) = task.await {
                    dispatcher.dispatch(action);
                }
            });
        }
        AppCommand::Batch(commands) => {
            for command in commands {
                spawn_command(command, dispatcher);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::AppAction;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn batches_emit_before_spawned_tasks_complete() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = AppActionDispatcher::new(tx);

        let command = AppCommand::Batch(vec![
            AppCommand::Emit(AppAction::SessionCleared),
            AppCommand::task(async {
                Some(AppAction::ErrorToast {
                    message: "late".into(),
                })
            }),
            AppCommand::task(async { None }),
        ]);
        spawn_command(command, &dispatcher);

        let first = rx.recv().await.expect("emitted action");
        assert_eq!(first.name(), "session-cleared");
        let second = rx.recv().await.expect("task result");
        assert_eq!(second.name(), "error-toast");

        drop(dispatcher);
        assert!(rx.recv().await.is_none(), "silent tasks dispatch nothing");
    }
}
