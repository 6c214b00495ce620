use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::api::client::{RemoteService, ServiceError};
use crate::api::{
    AppInfo, ChatRequest, ConfigInfo, MessageInfo, MessageMetadata, MessagePart, MessageTime,
    ModelInfo, ProviderInfo, ProvidersResponse, Role, SessionInfo, SessionModelRequest,
    SessionTime,
};
use crate::core::app::{apply_action, App, AppAction, AppCommand};
use crate::core::state::StateStore;

#[derive(Default)]
struct FakeState {
    app_info: AppInfo,
    config: ConfigInfo,
    providers: ProvidersResponse,
    sessions: Vec<SessionInfo>,
    messages: HashMap<String, Vec<MessageInfo>>,
    failures: HashMap<&'static str, ServiceError>,
    next_session_id: Option<String>,
    created_sessions: usize,
    calls: Vec<String>,
    chat_requests: Vec<ChatRequest>,
}

/// In-memory [`RemoteService`] that records every call.
#[derive(Default)]
pub struct FakeService {
    state: Mutex<FakeState>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().expect("fake service lock poisoned");
        f(&mut state)
    }

    fn record(&self, operation: &'static str, call: String) -> Result<(), ServiceError> {
        self.with_state(|state| {
            state.calls.push(call);
            match state.failures.get(operation) {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        })
    }

    pub fn fail_with_status(&self, operation: &'static str, status: u16) {
        self.with_state(|state| {
            state.failures.insert(
                operation,
                ServiceError::Protocol {
                    operation,
                    status,
                    detail: String::new(),
                },
            );
        });
    }

    pub fn fail_transport(&self, operation: &'static str) {
        self.with_state(|state| {
            state.failures.insert(
                operation,
                ServiceError::Transport {
                    operation,
                    message: "connection refused".to_string(),
                },
            );
        });
    }

    pub fn set_app_info(&self, info: AppInfo) {
        self.with_state(|state| state.app_info = info);
    }

    pub fn set_config(&self, config: ConfigInfo) {
        self.with_state(|state| state.config = config);
    }

    pub fn set_providers(&self, providers: ProvidersResponse) {
        self.with_state(|state| state.providers = providers);
    }

    pub fn set_sessions(&self, sessions: Vec<SessionInfo>) {
        self.with_state(|state| state.sessions = sessions);
    }

    pub fn set_messages(&self, session_id: &str, messages: Vec<MessageInfo>) {
        self.with_state(|state| {
            state.messages.insert(session_id.to_string(), messages);
        });
    }

    pub fn set_next_session_id(&self, id: &str) {
        self.with_state(|state| state.next_session_id = Some(id.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.with_state(|state| state.calls.clone())
    }

    /// Number of recorded calls for `operation`, regardless of arguments.
    pub fn count(&self, operation: &str) -> usize {
        self.with_state(|state| {
            state
                .calls
                .iter()
                .filter(|call| call.starts_with(operation))
                .count()
        })
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.with_state(|state| state.chat_requests.clone())
    }
}

#[async_trait]
impl RemoteService for FakeService {
    async fn app_info(&self) -> Result<AppInfo, ServiceError> {
        self.record("get app info", "get app info".into())?;
        Ok(self.with_state(|state| state.app_info.clone()))
    }

    async fn get_config(&self) -> Result<ConfigInfo, ServiceError> {
        self.record("get config", "get config".into())?;
        Ok(self.with_state(|state| state.config.clone()))
    }

    async fn list_providers(&self) -> Result<ProvidersResponse, ServiceError> {
        self.record("list providers", "list providers".into())?;
        Ok(self.with_state(|state| state.providers.clone()))
    }

    async fn create_session(&self) -> Result<SessionInfo, ServiceError> {
        self.record("create session", "create session".into())?;
        Ok(self.with_state(|state| {
            state.created_sessions += 1;
            let id = state
                .next_session_id
                .take()
                .unwrap_or_else(|| format!("ses_{}", state.created_sessions));
            let created = session(&id, 100.0 + state.created_sessions as f64);
            state.sessions.push(created.clone());
            created
        }))
    }

    async fn list_sessions(&self) -> Result<Vec<SessionInfo>, ServiceError> {
        self.record("list sessions", "list sessions".into())?;
        Ok(self.with_state(|state| state.sessions.clone()))
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ServiceError> {
        self.record("delete session", format!("delete session {session_id}"))?;
        self.with_state(|state| state.sessions.retain(|s| s.id != session_id));
        Ok(())
    }

    async fn abort_session(&self, session_id: &str) -> Result<(), ServiceError> {
        self.record("cancel session", format!("cancel session {session_id}"))
    }

    async fn summarize_session(&self, request: &SessionModelRequest) -> Result<(), ServiceError> {
        self.record(
            "compact session",
            format!(
                "compact session {} {}/{}",
                request.session_id, request.provider_id, request.model_id
            ),
        )
    }

    async fn initialize_session(
        &self,
        request: &SessionModelRequest,
    ) -> Result<(), ServiceError> {
        self.record(
            "initialize project",
            format!(
                "initialize project {} {}/{}",
                request.session_id, request.provider_id, request.model_id
            ),
        )
    }

    async fn mark_app_initialized(&self) -> Result<(), ServiceError> {
        self.record("mark project initialized", "mark project initialized".into())
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<MessageInfo>, ServiceError> {
        self.record("list messages", format!("list messages {session_id}"))?;
        Ok(self.with_state(|state| {
            state
                .messages
                .get(session_id)
                .cloned()
                .unwrap_or_default()
        }))
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<(), ServiceError> {
        self.with_state(|state| state.chat_requests.push(request.clone()));
        self.record(
            "send message",
            format!(
                "send message {} {}/{}",
                request.session_id, request.provider_id, request.model_id
            ),
        )
    }
}

pub fn provider(id: &str, model_ids: &[&str]) -> ProviderInfo {
    let models = model_ids
        .iter()
        .map(|model_id| {
            (
                model_id.to_string(),
                ModelInfo {
                    id: model_id.to_string(),
                    name: model_id.to_uppercase(),
                    attachment: true,
                },
            )
        })
        .collect::<BTreeMap<_, _>>();
    ProviderInfo {
        id: id.to_string(),
        name: id.to_string(),
        models,
    }
}

pub fn providers_response(
    providers: Vec<ProviderInfo>,
    defaults: &[(&str, &str)],
) -> ProvidersResponse {
    ProvidersResponse {
        providers,
        default: defaults
            .iter()
            .map(|(provider, model)| (provider.to_string(), model.to_string()))
            .collect(),
    }
}

pub fn session(id: &str, created: f64) -> SessionInfo {
    SessionInfo {
        id: id.to_string(),
        title: format!("Session {id}"),
        parent_id: None,
        time: SessionTime {
            created,
            updated: created,
        },
    }
}

pub fn message_info(
    id: &str,
    role: Role,
    session_id: &str,
    text: &str,
    completed: Option<f64>,
) -> MessageInfo {
    MessageInfo {
        id: id.to_string(),
        role,
        parts: vec![MessagePart::text(text)],
        metadata: MessageMetadata {
            session_id: session_id.to_string(),
            time: MessageTime {
                created: 1.0,
                completed,
            },
        },
    }
}

/// Run a command to completion on the current task, in issuance order.
pub async fn run_command(command: AppCommand) -> Vec<AppAction> {
    let mut pending = VecDeque::from([command]);
    let mut produced = Vec::new();
    while let Some(command) = pending.pop_front() {
        match command {
            AppCommand::Emit(action) => produced.push(action),
            AppCommand::Task(task) => produced.extend(task.await),
            AppCommand::Batch(commands) => {
                for command in commands.into_iter().rev() {
                    pending.push_front(command);
                }
            }
        }
    }
    produced
}

/// An [`App`] wired to a [`FakeService`], with a throwaway state directory.
pub struct TestHarness {
    pub app: App,
    pub service: Arc<FakeService>,
    /// Every action applied so far, in order.
    pub applied: Vec<AppAction>,
    _state_dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_service(FakeService::new())
    }

    pub fn with_service(service: FakeService) -> Self {
        let state_dir = TempDir::new().expect("Failed to create temp directory");
        let service = Arc::new(service);
        let app = App::new(
            service.clone(),
            AppInfo::default(),
            ConfigInfo::default(),
            StateStore::in_dir(state_dir.path()),
            "test".to_string(),
        );
        Self {
            app,
            service,
            applied: Vec::new(),
            _state_dir: state_dir,
        }
    }

    /// A harness whose app already has `anthropic/claude-3` selected.
    pub fn with_model() -> Self {
        let mut harness = Self::new();
        harness.select_model("anthropic", "claude-3");
        harness
    }

    pub fn select_model(&mut self, provider_id: &str, model_id: &str) {
        let provider = provider(provider_id, &[model_id]);
        let model = provider.models[model_id].clone();
        self.app.models.provider = Some(provider);
        self.app.models.model = Some(model);
    }

    /// Apply `action` and everything it causes until the app is quiescent.
    pub async fn dispatch(&mut self, action: AppAction) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            self.applied.push(action.clone());
            if let Some(command) = apply_action(&mut self.app, action) {
                queue.extend(run_command(command).await);
            }
        }
    }

    /// Names of applied actions, for asserting on ordering.
    pub fn applied_names(&self) -> Vec<&'static str> {
        self.applied.iter().map(AppAction::name).collect()
    }
}
