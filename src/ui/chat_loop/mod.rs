//! Interactive chat session.
//!
//! One task owns the [`App`](crate::core::app::App). Stdin lines and the
//! results of background commands both arrive as actions on a single inbox;
//! the loop applies them in arrival order and spawns whatever commands the
//! transitions return.

mod event_loop;
mod executors;
mod setup;

pub use event_loop::run_chat;
pub use executors::spawn_command;
pub use setup::{bootstrap_app, state_store_for};
