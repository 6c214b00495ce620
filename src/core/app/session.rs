//! Conversation state owned by the event loop.

use crate::api::SessionInfo;
use crate::core::message::{Attachment, Message, Role};
use crate::core::sessions::sort_sessions;

/// A send waiting for its session to exist.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSend {
    pub text: String,
    pub attachments: Vec<Attachment>,
    pub provider_id: String,
    pub model_id: String,
}

/// What [`ChatState::reconcile`] did with an incoming server message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// A message with the same id was updated in place.
    Replaced,
    /// The oldest optimistic message was swapped for the server copy.
    Superseded,
    Appended,
    /// The message belongs to a session that is not active.
    Ignored,
}

#[derive(Debug, Default)]
pub struct ChatState {
    /// The active session; `None` until one is selected or lazily created.
    pub session: Option<SessionInfo>,
    /// Known sessions, newest first.
    pub sessions: Vec<SessionInfo>,
    /// Transcript of the active session in chronological order.
    pub messages: Vec<Message>,
    /// Files queued with `/attach` for the next send.
    pub draft_attachments: Vec<Attachment>,
    pub pending_sends: Vec<PendingSend>,
    /// Set while a session is being created on behalf of pending sends.
    pub creating_session: bool,
}

impl ChatState {
    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.id.as_str())
    }

    pub fn is_active(&self, session_id: &str) -> bool {
        self.session_id() == Some(session_id)
    }

    /// Busy while the last message in the transcript has not completed.
    pub fn is_busy(&self) -> bool {
        self.messages
            .last()
            .is_some_and(|message| !message.is_complete())
    }

    /// Make `session` active. The transcript is kept only when the id is
    /// unchanged; an empty id clears the session instead.
    pub fn set_session(&mut self, session: SessionInfo) {
        if session.id.is_empty() {
            self.clear_session();
            return;
        }
        if !self.is_active(&session.id) {
            self.messages.clear();
        }
        self.remember_session(session.clone());
        self.session = Some(session);
    }

    pub fn clear_session(&mut self) {
        self.session = None;
        self.messages.clear();
    }

    /// Insert or refresh `session` in the known list, keeping it sorted.
    pub fn remember_session(&mut self, session: SessionInfo) {
        match self.sessions.iter_mut().find(|known| known.id == session.id) {
            Some(known) => *known = session,
            None => self.sessions.push(session),
        }
        sort_sessions(&mut self.sessions);
    }

    /// Drop `session_id` from the known list, returning whether it was active.
    pub fn forget_session(&mut self, session_id: &str) -> bool {
        self.sessions.retain(|session| session.id != session_id);
        if self.is_active(session_id) {
            self.clear_session();
            true
        } else {
            false
        }
    }

    /// Replace the transcript with server history for the active session.
    ///
    /// Local sends the history does not echo yet stay at the end. A history
    /// entry echoes a send when it is a user message with the same text,
    /// recorded no earlier than the send itself.
    pub fn load_history(&mut self, history: Vec<Message>) {
        let local: Vec<Message> = std::mem::take(&mut self.messages)
            .into_iter()
            .filter(|message| message.id.is_optimistic())
            .collect();

        let mut echoed = vec![false; history.len()];
        let mut unconfirmed = Vec::new();
        for message in local {
            let echo = history.iter().enumerate().position(|(index, confirmed)| {
                !echoed[index]
                    && confirmed.role == Role::User
                    && confirmed.created >= message.created
                    && confirmed.text() == message.text()
            });
            match echo {
                Some(index) => echoed[index] = true,
                None => unconfirmed.push(message),
            }
        }

        self.messages = history;
        self.messages.extend(unconfirmed);
    }

    /// Fold a server message into the transcript.
    pub fn reconcile(&mut self, message: Message) -> Reconciled {
        if !self.is_active(&message.session_id) {
            return Reconciled::Ignored;
        }

        if let Some(existing) = self.messages.iter_mut().find(|m| m.id == message.id) {
            *existing = message;
            return Reconciled::Replaced;
        }

        if message.role == Role::User {
            if let Some(optimistic) = self.messages.iter_mut().find(|m| m.id.is_optimistic()) {
                *optimistic = message;
                return Reconciled::Superseded;
            }
        }

        self.messages.push(message);
        Reconciled::Appended
    }

    pub fn optimistic_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| message.id.is_optimistic())
            .count()
    }
}
