//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments, sets up logging and the server
//! client, and dispatches to the interactive chat or a one-shot listing.

pub mod provider_list;
pub mod session_list;


use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::api::client::{HttpServiceClient, RemoteService};
use crate::cli::provider_list::list_providers;
use crate::cli::session_list::{list_sessions, show_messages};
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_tracing;
use crate::utils::url::normalize_server_url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4096";

#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(version)]
#[command(about = "A terminal chat client for a local LLM session server")]
#[command(
    long_about = "Parley talks to a running session server over HTTP. Type a message and \
press Enter to send it; the conversation is created on the first send.\n\n\
Commands inside the chat start with '/'. Type '/' alone to list them, or /help \
for a short description of each."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the session server
    #[arg(
        short = 'u',
        long,
        global = true,
        env = "PARLEY_SERVER_URL",
        default_value = DEFAULT_SERVER_URL
    )]
    pub url: String,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, global = true, env = "PARLEY_LOG_FILE", value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Log filter directives, e.g. "parley=debug"
    #[arg(long, global = true, env = "PARLEY_LOG", value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Use this state file instead of the one in the server's state directory
    #[arg(long, global = true, value_name = "FILE")]
    pub state_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// List sessions on the server, newest first
    Sessions,
    /// List providers and the model a new chat would use
    Providers,
    /// Print the message history of a session
    Messages {
        /// Session id
        session_id: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.log.as_deref(), args.log_filter.as_deref())?;

    let base_url = normalize_server_url(&args.url);
    info!(url = %base_url, "connecting to session server");
    let service: Arc<dyn RemoteService> =
        Arc::new(HttpServiceClient::new(reqwest::Client::new(), base_url));

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(service, args.state_file).await,
        Commands::Sessions => list_sessions(service).await,
        Commands::Providers => list_providers(service, args.state_file).await,
        Commands::Messages { session_id } => show_messages(service, &session_id).await,
    }
}
