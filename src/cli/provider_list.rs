use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::client::RemoteService;
use crate::api::ProviderInfo;
use crate::core::providers::{resolve_default, Selection, SelectionSource};
use crate::ui::chat_loop::bootstrap_app;

pub async fn list_providers(
    service: Arc<dyn RemoteService>,
    state_file: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let app = bootstrap_app(service.clone(), state_file).await?;
    let (providers, selection) = resolve_default(service.as_ref(), &app.state).await?;

    let mut stdout = io::stdout().lock();
    write_providers(&mut stdout, &providers, &selection)?;
    Ok(())
}

pub fn write_providers<W: Write>(
    out: &mut W,
    providers: &[ProviderInfo],
    selection: &Selection,
) -> io::Result<()> {
    writeln!(out, "Available providers:")?;
    for provider in providers {
        let name = if provider.name.is_empty() {
            provider.id.as_str()
        } else {
            provider.name.as_str()
        };
        writeln!(out)?;
        writeln!(out, "{} ({name})", provider.id)?;
        if provider.models.is_empty() {
            writeln!(out, "  (no models)")?;
        }
        for model in provider.models.values() {
            let selected =
                provider.id == selection.provider.id && model.id == selection.model.id;
            let marker = if selected { '*' } else { ' ' };
            writeln!(out, " {marker} {}  {}", model.id, model.display_name())?;
        }
    }

    let source = match selection.source {
        SelectionSource::Persisted => "saved selection",
        SelectionSource::Default => "default",
    };
    writeln!(out)?;
    writeln!(
        out,
        "* = {}/{} ({source})",
        selection.provider.id, selection.model.id
    )
}
