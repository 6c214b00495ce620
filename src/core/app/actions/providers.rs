use tracing::{debug, info, warn};

use super::status::show_error;
use super::{App, AppAction, AppCommand};
use crate::core::providers::{find_model, resolve_default, SelectionSource};

pub(super) fn handle_provider_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::ProvidersRequested => Some(resolve_providers(app)),
        AppAction::ProvidersResolved {
            providers,
            selection,
        } => {
            debug!(
                provider = %selection.provider.id,
                model = %selection.model.id,
                persisted = selection.source == SelectionSource::Persisted,
                "resolved model selection"
            );
            let changed = app
                .state
                .select(&selection.provider.id, &selection.model.id);
            app.models.providers = providers;
            app.models.set(selection.provider, selection.model);
            if changed {
                app.save_state();
            }
            None
        }
        AppAction::ProviderResolutionFailed { error } => {
            warn!(error = %error, "provider resolution failed");
            show_error(app, error.to_string());
            app.models.resolution_error = Some(error);
            None
        }
        AppAction::ModelSelected {
            provider_id,
            model_id,
        } => {
            let Some((provider, model)) = find_model(&app.models.providers, &provider_id, &model_id)
                .map(|(provider, model)| (provider.clone(), model.clone()))
            else {
                show_error(app, format!("Unknown model: {provider_id}/{model_id}"));
                return None;
            };
            info!(provider = %provider.id, model = %model.id, "model selected");
            let changed = app.state.select(&provider.id, &model.id);
            app.models.set(provider, model);
            if changed {
                app.save_state();
            }
            None
        }
        _ => unreachable!("non-provider action routed to provider handler"),
    }
}

fn resolve_providers(app: &App) -> AppCommand {
    let service = app.service.clone();
    let state = app.state.clone();
    AppCommand::task(async move {
        let action = match resolve_default(service.as_ref(), &state).await {
            Ok((providers, selection)) => AppAction::ProvidersResolved {
                providers,
                selection,
            },
            Err(error) => AppAction::ProviderResolutionFailed { error },
        };
        Some(action)
    })
}
