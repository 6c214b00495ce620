//! Session lifecycle operations against the remote service.
//!
//! Every call is a single round trip. Failures come back as [`ServiceError`]
//! and are never retried here; deciding whether to retry is up to the caller.

use std::sync::Arc;

use tracing::debug;

use crate::api::client::{RemoteService, ServiceError};
use crate::api::{SessionInfo, SessionModelRequest};
use crate::core::message::Message;

#[derive(Clone)]
pub struct SessionManager {
    service: Arc<dyn RemoteService>,
}

impl SessionManager {
    pub fn new(service: Arc<dyn RemoteService>) -> Self {
        Self { service }
    }

    /// Create a fresh session. A session without an id is rejected.
    pub async fn create(&self) -> Result<SessionInfo, ServiceError> {
        let session = self.service.create_session().await?;
        if session.id.is_empty() {
            return Err(ServiceError::Decode {
                operation: "create session",
                message: "server returned a session without an id".to_string(),
            });
        }
        debug!(session_id = %session.id, "created session");
        Ok(session)
    }

    /// All sessions, most recently created first.
    pub async fn list(&self) -> Result<Vec<SessionInfo>, ServiceError> {
        let mut sessions = self.service.list_sessions().await?;
        sort_sessions(&mut sessions);
        Ok(sessions)
    }

    pub async fn delete(&self, session_id: &str) -> Result<(), ServiceError> {
        self.service.delete_session(session_id).await
    }

    /// Cancel the assistant turn currently running in `session_id`.
    pub async fn abort(&self, session_id: &str) -> Result<(), ServiceError> {
        self.service.abort_session(session_id).await
    }

    pub async fn summarize(
        &self,
        session_id: &str,
        provider_id: &str,
        model_id: &str,
    ) -> Result<(), ServiceError> {
        self.service
            .summarize_session(&model_request(session_id, provider_id, model_id))
            .await
    }

    /// Bootstrap the project context for a newly created session.
    pub async fn initialize(
        &self,
        session_id: &str,
        provider_id: &str,
        model_id: &str,
    ) -> Result<(), ServiceError> {
        self.service
            .initialize_session(&model_request(session_id, provider_id, model_id))
            .await
    }

    /// Set the app-wide "project initialized" flag.
    pub async fn mark_initialized(&self) -> Result<(), ServiceError> {
        self.service.mark_app_initialized().await
    }

    /// Message history in the order the server returns it.
    pub async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>, ServiceError> {
        let messages = self.service.list_messages(session_id).await?;
        Ok(messages.into_iter().map(Message::from).collect())
    }
}

fn model_request(session_id: &str, provider_id: &str, model_id: &str) -> SessionModelRequest {
    SessionModelRequest {
        session_id: session_id.to_string(),
        provider_id: provider_id.to_string(),
        model_id: model_id.to_string(),
    }
}

/// Newest first. The sort is stable, so sessions created at the same instant
/// keep the server's relative order.
pub fn sort_sessions(sessions: &mut [SessionInfo]) {
    sessions.sort_by(|a, b| b.time.created.total_cmp(&a.time.created));
}
