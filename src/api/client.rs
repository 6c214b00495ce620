//! Request/response client for the session server.
//!
//! Every remote operation is a `POST <base>/<endpoint>` carrying an optional
//! JSON body. Results come back as `Result<T, ServiceError>`, so callers never
//! inspect raw status codes.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::{
    AppInfo, ChatRequest, ConfigInfo, MessageInfo, ProvidersResponse, SessionInfo,
    SessionModelRequest, SessionRequest,
};
use crate::utils::url::endpoint_url;

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The request never produced a response (connection refused, timeout, ...).
    Transport {
        operation: &'static str,
        message: String,
    },
    /// The server answered with a status outside the success range.
    Protocol {
        operation: &'static str,
        status: u16,
        detail: String,
    },
    /// The server answered successfully but the body did not match the schema.
    Decode {
        operation: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn operation(&self) -> &'static str {
        match self {
            ServiceError::Transport { operation, .. }
            | ServiceError::Protocol { operation, .. }
            | ServiceError::Decode { operation, .. } => operation,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Transport { operation, message } => {
                write!(f, "failed to {operation}: {message}")
            }
            ServiceError::Protocol {
                operation,
                status,
                detail,
            } => {
                let detail = detail.trim();
                if detail.is_empty() {
                    write!(f, "failed to {operation}: {status}")
                } else {
                    write!(f, "failed to {operation}: {status} ({detail})")
                }
            }
            ServiceError::Decode { operation, message } => {
                write!(f, "failed to {operation}: unexpected response ({message})")
            }
        }
    }
}

impl StdError for ServiceError {}

/// The remote operations this client consumes.
///
/// Implementations must be cheap to share: the event loop hands an
/// `Arc<dyn RemoteService>` to every background task it spawns.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn app_info(&self) -> Result<AppInfo, ServiceError>;
    async fn get_config(&self) -> Result<ConfigInfo, ServiceError>;
    async fn list_providers(&self) -> Result<ProvidersResponse, ServiceError>;
    async fn create_session(&self) -> Result<SessionInfo, ServiceError>;
    async fn list_sessions(&self) -> Result<Vec<SessionInfo>, ServiceError>;
    async fn delete_session(&self, session_id: &str) -> Result<(), ServiceError>;
    async fn abort_session(&self, session_id: &str) -> Result<(), ServiceError>;
    async fn summarize_session(&self, request: &SessionModelRequest) -> Result<(), ServiceError>;
    async fn initialize_session(&self, request: &SessionModelRequest)
        -> Result<(), ServiceError>;
    async fn mark_app_initialized(&self) -> Result<(), ServiceError>;
    async fn list_messages(&self, session_id: &str) -> Result<Vec<MessageInfo>, ServiceError>;
    async fn send_chat(&self, request: &ChatRequest) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct HttpServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpServiceClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_empty(
        &self,
        operation: &'static str,
        endpoint: &str,
    ) -> Result<reqwest::Response, ServiceError> {
        let request = self
            .client
            .post(endpoint_url(&self.base_url, endpoint))
            .header("Content-Type", "application/json");
        self.send(operation, request).await
    }

    async fn post_json<B: Serialize + ?Sized + Sync>(
        &self,
        operation: &'static str,
        endpoint: &str,
        body: &B,
    ) -> Result<reqwest::Response, ServiceError> {
        let request = self
            .client
            .post(endpoint_url(&self.base_url, endpoint))
            .json(body);
        self.send(operation, request).await
    }

    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|err| ServiceError::Transport {
                operation,
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            debug!(operation, status = status.as_u16(), "remote call failed");
            return Err(ServiceError::Protocol {
                operation,
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<T, ServiceError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ServiceError::Decode {
            operation,
            message: err.to_string(),
        })
}

/// Lists may come back as `null` when there is nothing to report.
async fn decode_list<T: DeserializeOwned>(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<Vec<T>, ServiceError> {
    decode::<Option<Vec<T>>>(operation, response)
        .await
        .map(Option::unwrap_or_default)
}

#[async_trait]
impl RemoteService for HttpServiceClient {
    async fn app_info(&self) -> Result<AppInfo, ServiceError> {
        let operation = "get app info";
        let response = self.post_empty(operation, "app_info").await?;
        decode(operation, response).await
    }

    async fn get_config(&self) -> Result<ConfigInfo, ServiceError> {
        let operation = "get config";
        let response = self.post_empty(operation, "config_get").await?;
        decode(operation, response).await
    }

    async fn list_providers(&self) -> Result<ProvidersResponse, ServiceError> {
        let operation = "list providers";
        let response = self.post_empty(operation, "provider_list").await?;
        decode(operation, response).await
    }

    async fn create_session(&self) -> Result<SessionInfo, ServiceError> {
        let operation = "create session";
        let response = self.post_empty(operation, "session_create").await?;
        decode(operation, response).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionInfo>, ServiceError> {
        let operation = "list sessions";
        let response = self.post_empty(operation, "session_list").await?;
        decode_list(operation, response).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ServiceError> {
        self.post_json("delete session", "session_delete", &SessionRequest { session_id })
            .await
            .map(drop)
    }

    async fn abort_session(&self, session_id: &str) -> Result<(), ServiceError> {
        self.post_json("cancel session", "session_abort", &SessionRequest { session_id })
            .await
            .map(drop)
    }

    async fn summarize_session(&self, request: &SessionModelRequest) -> Result<(), ServiceError> {
        self.post_json("compact session", "session_summarize", request)
            .await
            .map(drop)
    }

    async fn initialize_session(
        &self,
        request: &SessionModelRequest,
    ) -> Result<(), ServiceError> {
        self.post_json("initialize project", "session_initialize", request)
            .await
            .map(drop)
    }

    async fn mark_app_initialized(&self) -> Result<(), ServiceError> {
        self.post_empty("mark project initialized", "app_initialize")
            .await
            .map(drop)
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<MessageInfo>, ServiceError> {
        let operation = "list messages";
        let response = self
            .post_json(operation, "session_messages", &SessionRequest { session_id })
            .await?;
        decode_list(operation, response).await
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<(), ServiceError> {
        self.post_json("send message", "session_chat", request)
            .await
            .map(drop)
    }
}
