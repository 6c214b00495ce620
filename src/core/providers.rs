//! Provider and model resolution.
//!
//! At startup the client asks the server for every provider it can reach and
//! settles on one provider/model pair: the persisted selection when it is
//! still offered, otherwise a computed default.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use tracing::{debug, info};

use crate::api::client::{RemoteService, ServiceError};
use crate::api::{ModelInfo, ProviderInfo, ProvidersResponse};
use crate::core::state::ClientState;

/// Provider preferred as the default whenever the server offers it.
pub const PREFERRED_PROVIDER_ID: &str = "anthropic";

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// Fetching the provider list failed.
    ProviderList(ServiceError),
    /// The server reported no providers at all.
    NoProviders,
    /// Providers exist but none of them offers a model.
    NoModels,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::ProviderList(err) => write!(f, "{err}"),
            ResolveError::NoProviders => write!(f, "No providers configured"),
            ResolveError::NoModels => write!(f, "No models available from any provider"),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ResolveError::ProviderList(err) => Some(err),
            _ => None,
        }
    }
}

/// Where the resolved selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// The persisted provider/model pair is still offered by the server.
    Persisted,
    /// The persisted pair was missing or stale; the computed default won.
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub provider: ProviderInfo,
    pub model: ModelInfo,
    pub source: SelectionSource,
}

/// The model to use for `provider` when the user has not chosen one.
///
/// The server's default mapping wins when it names a model the provider
/// actually lists. Otherwise the lexicographically first model id is used so
/// the choice is stable across runs.
pub fn default_model_for<'a>(
    provider: &'a ProviderInfo,
    defaults: &HashMap<String, String>,
) -> Option<&'a ModelInfo> {
    defaults
        .get(&provider.id)
        .and_then(|model_id| provider.models.get(model_id))
        .or_else(|| provider.models.values().next())
}

/// Compute the default provider/model pair, ignoring persisted state.
pub fn default_selection<'a>(
    response: &'a ProvidersResponse,
) -> Result<(&'a ProviderInfo, &'a ModelInfo), ResolveError> {
    if response.providers.is_empty() {
        return Err(ResolveError::NoProviders);
    }

    let preferred = response
        .providers
        .iter()
        .find(|provider| provider.id == PREFERRED_PROVIDER_ID)
        .and_then(|provider| {
            default_model_for(provider, &response.default).map(|model| (provider, model))
        });
    if let Some(selection) = preferred {
        return Ok(selection);
    }

    response
        .providers
        .iter()
        .find_map(|provider| {
            default_model_for(provider, &response.default).map(|model| (provider, model))
        })
        .ok_or(ResolveError::NoModels)
}

/// Look up the persisted pair; both ids must match for it to count.
pub fn persisted_selection<'a>(
    response: &'a ProvidersResponse,
    state: &ClientState,
) -> Option<(&'a ProviderInfo, &'a ModelInfo)> {
    let provider = response
        .providers
        .iter()
        .find(|provider| provider.id == state.provider)?;
    let model = provider
        .models
        .values()
        .find(|model| model.id == state.model)?;
    Some((provider, model))
}

/// Resolve the active selection from a fetched provider list.
pub fn resolve_selection(
    response: &ProvidersResponse,
    state: &ClientState,
) -> Result<Selection, ResolveError> {
    let (default_provider, default_model) = default_selection(response)?;

    if let Some((provider, model)) = persisted_selection(response, state) {
        return Ok(Selection {
            provider: provider.clone(),
            model: model.clone(),
            source: SelectionSource::Persisted,
        });
    }

    if state.has_selection() {
        info!(
            provider = %state.provider,
            model = %state.model,
            "persisted model is no longer offered; using default"
        );
    }

    Ok(Selection {
        provider: default_provider.clone(),
        model: default_model.clone(),
        source: SelectionSource::Default,
    })
}

/// Fetch providers and resolve the selection in one step.
///
/// Returns the full provider list alongside the selection so the caller can
/// offer other models later without a second round trip.
pub async fn resolve_default(
    service: &dyn RemoteService,
    state: &ClientState,
) -> Result<(Vec<ProviderInfo>, Selection), ResolveError> {
    let response = service
        .list_providers()
        .await
        .map_err(ResolveError::ProviderList)?;
    debug!(count = response.providers.len(), "fetched providers");

    let selection = resolve_selection(&response, state)?;
    Ok((response.providers, selection))
}

/// Find a provider/model pair by id in a previously fetched list.
pub fn find_model<'a>(
    providers: &'a [ProviderInfo],
    provider_id: &str,
    model_id: &str,
) -> Option<(&'a ProviderInfo, &'a ModelInfo)> {
    let provider = providers.iter().find(|provider| provider.id == provider_id)?;
    let model = provider.models.get(model_id)?;
    Some((provider, model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{provider, providers_response, FakeService};

    fn state(provider: &str, model: &str) -> ClientState {
        ClientState {
            provider: provider.into(),
            model: model.into(),
            ..ClientState::default()
        }
    }

    #[test]
    fn anthropic_wins_regardless_of_position() {
        let orders = [
            vec![
                provider("openai", &["gpt-4o"]),
                provider("anthropic", &["claude-3"]),
            ],
            vec![
                provider("anthropic", &["claude-3"]),
                provider("openai", &["gpt-4o"]),
            ],
            vec![
                provider("groq", &["llama"]),
                provider("openai", &["gpt-4o"]),
                provider("anthropic", &["claude-3"]),
            ],
        ];

        for providers in orders {
            let response = providers_response(providers, &[]);
            let (provider, _) = default_selection(&response).expect("default resolves");
            assert_eq!(provider.id, "anthropic");
        }
    }

    #[test]
    fn first_provider_wins_without_anthropic() {
        let response = providers_response(
            vec![
                provider("openai", &["gpt-4o"]),
                provider("groq", &["llama"]),
            ],
            &[],
        );
        let (provider, model) = default_selection(&response).expect("default resolves");
        assert_eq!(provider.id, "openai");
        assert_eq!(model.id, "gpt-4o");
    }

    #[test]
    fn server_default_mapping_picks_model() {
        let response = providers_response(
            vec![
                provider("openai", &["gpt-4o"]),
                provider("anthropic", &["claude-2", "claude-3"]),
            ],
            &[("anthropic", "claude-3")],
        );
        let selection =
            resolve_selection(&response, &ClientState::default()).expect("resolves");
        assert_eq!(selection.provider.id, "anthropic");
        assert_eq!(selection.model.id, "claude-3");
        assert_eq!(selection.source, SelectionSource::Default);
    }

    #[test]
    fn missing_default_mapping_uses_lexicographic_first_model() {
        let response = providers_response(
            vec![provider("openai", &["o3", "gpt-4o", "gpt-4.1"])],
            &[("openai", "retired-model")],
        );
        let (_, model) = default_selection(&response).expect("default resolves");
        assert_eq!(model.id, "gpt-4.1");
    }

    #[test]
    fn providers_without_models_are_skipped() {
        let response = providers_response(
            vec![
                provider("anthropic", &[]),
                provider("empty", &[]),
                provider("openai", &["gpt-4o"]),
            ],
            &[],
        );
        let (provider, model) = default_selection(&response).expect("default resolves");
        assert_eq!(provider.id, "openai");
        assert_eq!(model.id, "gpt-4o");
    }

    #[test]
    fn empty_provider_list_is_an_error() {
        let response = providers_response(vec![], &[]);
        assert_eq!(
            resolve_selection(&response, &ClientState::default()),
            Err(ResolveError::NoProviders)
        );
    }

    #[test]
    fn providers_without_any_model_is_an_error() {
        let response = providers_response(vec![provider("anthropic", &[])], &[]);
        assert_eq!(default_selection(&response), Err(ResolveError::NoModels));
    }

    #[test]
    fn persisted_pair_is_used_when_both_ids_match() {
        let response = providers_response(
            vec![
                provider("openai", &["gpt-4o", "o3"]),
                provider("anthropic", &["claude-3"]),
            ],
            &[("anthropic", "claude-3")],
        );
        let selection = resolve_selection(&response, &state("openai", "o3")).expect("resolves");
        assert_eq!(selection.provider.id, "openai");
        assert_eq!(selection.model.id, "o3");
        assert_eq!(selection.source, SelectionSource::Persisted);
    }

    #[test]
    fn stale_persisted_model_never_yields_a_mixed_pair() {
        let response = providers_response(
            vec![
                provider("openai", &["gpt-4o"]),
                provider("anthropic", &["claude-3"]),
            ],
            &[("anthropic", "claude-3")],
        );

        for persisted in [
            state("openai", "gpt-3"),
            state("mistral", "claude-3"),
            state("", ""),
        ] {
            let selection = resolve_selection(&response, &persisted).expect("resolves");
            assert_eq!(selection.provider.id, "anthropic");
            assert_eq!(selection.model.id, "claude-3");
            assert_eq!(selection.source, SelectionSource::Default);
        }
    }

    #[tokio::test]
    async fn resolve_default_reports_list_failures() {
        let service = FakeService::new();
        service.fail_with_status("list providers", 503);

        let err = resolve_default(&service, &ClientState::default())
            .await
            .expect_err("failing fetch must not resolve");
        match err {
            ResolveError::ProviderList(inner) => assert_eq!(inner.status(), Some(503)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolve_default_returns_providers_and_selection() {
        let service = FakeService::new();
        service.set_providers(providers_response(
            vec![
                provider("openai", &["gpt-4o"]),
                provider("anthropic", &["claude-3"]),
            ],
            &[("anthropic", "claude-3")],
        ));

        let (providers, selection) = resolve_default(&service, &ClientState::default())
            .await
            .expect("resolves");
        assert_eq!(providers.len(), 2);
        assert_eq!(selection.provider.id, "anthropic");
        assert_eq!(selection.model.id, "claude-3");
    }

    #[test]
    fn find_model_requires_both_ids() {
        let providers = vec![provider("openai", &["gpt-4o"])];
        assert!(find_model(&providers, "openai", "gpt-4o").is_some());
        assert!(find_model(&providers, "openai", "o3").is_none());
        assert!(find_model(&providers, "anthropic", "gpt-4o").is_none());
    }
}
