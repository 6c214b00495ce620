use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

/// Commands whose name starts with `prefix`, in registry order.
pub fn matching_commands(prefix: &str) -> impl Iterator<Item = &'static Command> + '_ {
    let prefix = prefix.trim_start_matches('/');
    all_commands().iter().filter(move |command| {
        command
            .name
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "new",
        usage: "/new",
        help: "Start a new session with the next message.",
        handler: super::handle_new,
    },
    Command {
        name: "sessions",
        usage: "/sessions",
        help: "List sessions, newest first.",
        handler: super::handle_sessions,
    },
    Command {
        name: "session",
        usage: "/session <id>",
        help: "Switch to a session and load its history.",
        handler: super::handle_session,
    },
    Command {
        name: "delete",
        usage: "/delete [id]",
        help: "Delete a session (the active one by default).",
        handler: super::handle_delete,
    },
    Command {
        name: "abort",
        usage: "/abort",
        help: "Cancel the response in progress.",
        handler: super::handle_abort,
    },
    Command {
        name: "compact",
        usage: "/compact",
        help: "Summarize the active session to save context.",
        handler: super::handle_compact,
    },
    Command {
        name: "init",
        usage: "/init",
        help: "Create a session and initialize the project in it.",
        handler: super::handle_init,
    },
    Command {
        name: "model",
        usage: "/model [provider/model]",
        help: "List models or switch to one.",
        handler: super::handle_model,
    },
    Command {
        name: "attach",
        usage: "/attach <path>",
        help: "Attach a file to the next message.",
        handler: super::handle_attach,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Exit parley.",
        handler: super::handle_quit,
    },
];
