use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::api::client::RemoteService;
use crate::api::AppInfo;
use crate::core::app::App;
use crate::core::state::{StateError, StateStore};

/// Fetch what the app needs before the loop starts and build it.
///
/// App info and server config are both critical: without them there is no
/// state directory and no overrides, so either failing aborts startup.
pub async fn bootstrap_app(
    service: Arc<dyn RemoteService>,
    state_file: Option<PathBuf>,
) -> Result<App, Box<dyn Error>> {
    let (info, config) = tokio::try_join!(service.app_info(), service.get_config())?;

    let store = match state_file {
        Some(path) => StateStore::new(path),
        None => state_store_for(&info)?,
    };
    debug!(path = %store.path().display(), "using state file");

    Ok(App::new(
        service,
        info,
        config,
        store,
        env!("CARGO_PKG_VERSION").to_string(),
    ))
}

/// The state file inside the server's state directory, or the platform
/// default when the server did not report one.
pub fn state_store_for(info: &AppInfo) -> Result<StateStore, StateError> {
    if info.path.state.is_empty() {
        StateStore::platform_default()
    } else {
        Ok(StateStore::in_dir(Path::new(&info.path.state)))
    }
}
