//! Line-oriented front end for interactive sessions.
//!
//! - [`chat_loop`]: bootstrap plus the event loop that owns the [`App`](crate::core::app::App)
//!   and feeds it actions from stdin and from background commands.
//! - [`renderer`]: turns applied actions into plain text lines.
//!
//! This layer only presents and captures interaction; [`crate::core`] owns
//! the state transitions.

pub mod chat_loop;
pub mod renderer;
