//! One-shot listings of server sessions and their history.

use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use crate::api::client::RemoteService;
use crate::api::SessionInfo;
use crate::core::message::Message;
use crate::core::sessions::SessionManager;
use crate::ui::renderer::{format_timestamp, render_message};

pub async fn list_sessions(service: Arc<dyn RemoteService>) -> Result<(), Box<dyn Error>> {
    let sessions = SessionManager::new(service).list().await?;
    let mut stdout = io::stdout().lock();
    write_sessions(&mut stdout, &sessions)?;
    Ok(())
}

pub async fn show_messages(
    service: Arc<dyn RemoteService>,
    session_id: &str,
) -> Result<(), Box<dyn Error>> {
    let messages = SessionManager::new(service)
        .list_messages(session_id)
        .await?;
    let mut stdout = io::stdout().lock();
    write_messages(&mut stdout, session_id, &messages)?;
    Ok(())
}

pub fn write_sessions<W: Write>(out: &mut W, sessions: &[SessionInfo]) -> io::Result<()> {
    if sessions.is_empty() {
        return writeln!(out, "No sessions.");
    }
    for session in sessions {
        let title = if session.title.is_empty() {
            "(untitled)"
        } else {
            session.title.as_str()
        };
        writeln!(
            out,
            "{}  {}  {title}",
            session.id,
            format_timestamp(session.time.created)
        )?;
    }
    Ok(())
}

pub fn write_messages<W: Write>(
    out: &mut W,
    session_id: &str,
    messages: &[Message],
) -> io::Result<()> {
    if messages.is_empty() {
        return writeln!(out, "No messages in {session_id}.");
    }
    for message in messages {
        writeln!(out, "{}", render_message(message))?;
    }
    Ok(())
}
