use tracing::debug;

use super::{App, AppAction, AppCommand};

pub(super) fn handle_status_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::ErrorToast { message } => {
            show_error(app, message);
            None
        }
        AppAction::CompletionDialogTriggered { initial_value } => {
            debug!(initial_value = %initial_value, "completion dialog opened");
            app.ui.completion_dialog = Some(initial_value);
            None
        }
        _ => unreachable!("non-status action routed to status handler"),
    }
}

pub(super) fn show_error(app: &mut App, message: impl Into<String>) {
    app.ui.push_error(message);
}
