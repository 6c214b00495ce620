//! Parley is a terminal chat client for a local LLM session server.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the server's wire types and the [`api::client::RemoteService`]
//!   seam with its HTTP implementation.
//! - [`core`] owns client state: provider/model resolution, session
//!   management, the persisted selection, and the single-owner action
//!   substrate in [`core::app`].
//! - [`commands`] turns slash commands typed in the chat into actions.
//! - [`ui`] runs the line-oriented event loop and renders applied actions.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which initializes logging and dispatches into
//! [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
