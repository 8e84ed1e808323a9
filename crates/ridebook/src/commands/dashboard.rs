//! Dashboard statistics.

use crate::cli::GlobalOpts;
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let store = resolved.session.dashboard().await;
    let state = store.snapshot();
    if let Some(ref message) = state.error {
        return Err(util::failure(&resolved.session, message.clone()));
    }
    let stats = state.data.clone().unwrap_or_default();
    output::print_output(&output::render_stats(global.output, &stats), global.quiet);
    Ok(())
}
