//! Generic handler shared by every resource command.

use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use serde_json::Value;

use ridebook_core::api::query::keys;
use ridebook_core::api::{FilterSet, LifecycleAction, Page, Resource};
use ridebook_core::{
    CoreError, DirectorySink, Download, DownloadSink, ExportReceipt, MutationOutcome,
};

use crate::cli::{ExportArgs, GlobalOpts, ListArgs, ResourceArgs, ResourceCommand};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;
use super::views::{ResourceView, render_detail};

// ── Stdout sink ──────────────────────────────────────────────────────

/// Streams the export to stdout instead of a file.
struct StdoutSink;

impl DownloadSink for StdoutSink {
    fn deliver(&self, download: Download) -> Result<Option<PathBuf>, CoreError> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(&download.bytes)
            .and_then(|()| stdout.flush())
            .map_err(|e| CoreError::Download {
                message: format!("cannot write to stdout: {e}"),
            })?;
        Ok(None)
    }
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle<R: ResourceView>(
    args: ResourceArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);

    match args.command {
        ResourceCommand::List(list) => list_items::<R>(&list, resolved, global, color).await,

        ResourceCommand::Get { id } => {
            let item = resolved
                .session
                .api::<R>()
                .get(&id)
                .await
                .map_err(|e| util::api_failure(&resolved.session, e))?;
            print_item::<R>(&item, global);
            Ok(())
        }

        ResourceCommand::Create { from_file } => {
            let payload: R::Create = util::read_json_file(&from_file)?;
            let store = resolved.session.attach::<R>(FilterSet::new());
            let outcome = store.create(&payload).await;
            let item = settle(resolved, outcome)?;
            output::notice(&format!("Created {}", R::SPEC.name), color, global.quiet);
            if let Some(item) = item {
                print_item::<R>(&item, global);
            }
            Ok(())
        }

        ResourceCommand::Update { id, from_file } => {
            let payload: R::Update = util::read_json_file(&from_file)?;
            let store = resolved.session.attach::<R>(FilterSet::new());
            let outcome = store.update(&id, &payload).await;
            let item = settle(resolved, outcome)?;
            output::notice(&format!("Updated {} {id}", R::SPEC.name), color, global.quiet);
            if let Some(item) = item {
                print_item::<R>(&item, global);
            }
            Ok(())
        }

        ResourceCommand::Delete { id } => {
            if !util::confirm(&format!("Delete {} {id}?", R::SPEC.name), global.yes)? {
                return Ok(());
            }
            let store = resolved.session.attach::<R>(FilterSet::new());
            settle(resolved, store.delete(&id).await)?;
            output::notice(&format!("Deleted {} {id}", R::SPEC.name), color, global.quiet);
            Ok(())
        }

        ResourceCommand::Act { action, ids, data } => {
            let action = parse_action::<R>(&action)?;
            let body: Option<Value> = data.as_deref().map(util::read_json_file).transpose()?;
            if is_destructive(action)
                && !util::confirm(
                    &format!("{action} {} {}?", ids.len(), R::SPEC.name),
                    global.yes,
                )?
            {
                return Ok(());
            }
            perform::<R>(action, &ids, body, resolved, global, color).await
        }

        ResourceCommand::Export(export) => export_items::<R>(&export, resolved, global, color).await,

        ResourceCommand::Stats => {
            if !R::SPEC.stats {
                return Err(unsupported::<R>("stats"));
            }
            let store = resolved.session.mount_stats::<R>().await;
            let state = store.snapshot();
            if let Some(ref message) = state.error {
                return Err(util::failure(&resolved.session, message.clone()));
            }
            let stats = state.data.clone().unwrap_or_default();
            output::print_output(&output::render_stats(global.output, &stats), global.quiet);
            Ok(())
        }
    }
}

// ── Subcommands ──────────────────────────────────────────────────────

async fn list_items<R: ResourceView>(
    list: &ListArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let mut filters = util::filter_set(&list.filters)?;
    if let Some(page) = list.page {
        filters.set(keys::PAGE, page);
    }
    if let Some(limit) = list.limit {
        filters.set(R::SPEC.page_size_param, limit);
    }

    let store = resolved.session.mount::<R>(filters).await;
    let state = store.snapshot();
    if let Some(ref message) = state.error {
        return Err(util::failure(&resolved.session, message.clone()));
    }

    let empty = Page::empty();
    let page = state.data.as_ref().unwrap_or(&empty);
    let out = output::render_page(
        global.output,
        page,
        |item| R::row(item, color),
        |item| R::id(item).to_owned(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn perform<R: ResourceView>(
    action: LifecycleAction,
    ids: &[String],
    body: Option<Value>,
    resolved: &Resolved,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let store = resolved.session.attach::<R>(FilterSet::new());

    if ids.len() > 1 && R::SPEC.supports_bulk(action) {
        settle(resolved, store.perform_bulk(ids, action).await)?;
        output::notice(
            &format!("{action}: {} {} done", ids.len(), R::SPEC.name),
            color,
            global.quiet,
        );
        return Ok(());
    }

    // No bulk endpoint: one request per item, stopping at the first failure.
    let mut last = None;
    for id in ids {
        let item = settle(resolved, store.perform(id, action, body.clone()).await)?;
        output::notice(&format!("{action}: {} {id} done", R::SPEC.name), color, global.quiet);
        last = item;
    }
    if let (1, Some(item)) = (ids.len(), last) {
        print_item::<R>(&item, global);
    }
    Ok(())
}

async fn export_items<R: ResourceView>(
    export: &ExportArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    if R::SPEC.export.is_none() {
        return Err(unsupported::<R>("export"));
    }
    let filters = util::filter_set(&export.filters)?;
    let store = resolved.session.attach::<R>(filters);

    let outcome = if export.stdout {
        store.export_report(None, &StdoutSink).await
    } else {
        let sink = DirectorySink::new(&export.dir).overwrite(export.overwrite);
        let pb = util::spinner(format!("Exporting {}...", R::SPEC.name), global.quiet);
        let outcome = store.export_report(None, &sink).await;
        pb.finish_and_clear();
        outcome
    };

    let receipt = settle(resolved, outcome)?;
    if let Some(receipt) = receipt {
        report_receipt(&receipt, export.stdout, global, color);
    }
    Ok(())
}

fn report_receipt(receipt: &ExportReceipt, to_stdout: bool, global: &GlobalOpts, color: bool) {
    let records = receipt
        .total_records
        .map(|n| format!(", {n} records"))
        .unwrap_or_default();
    let target = receipt
        .location
        .as_ref()
        .map_or_else(|| receipt.filename.clone(), |p| p.display().to_string());
    output::notice(
        &format!("Exported {} bytes{records} to {target}", receipt.size),
        color,
        global.quiet || to_stdout,
    );
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Unwrap a mutation outcome into its data or an error.
fn settle<T>(resolved: &Resolved, outcome: MutationOutcome<T>) -> Result<Option<T>, CliError> {
    outcome
        .into_result()
        .map_err(|message| util::failure(&resolved.session, message))
}

fn print_item<R: ResourceView>(item: &R::Item, global: &GlobalOpts) {
    let out = output::render_single(
        global.output,
        item,
        |i| render_detail(&R::detail(i)),
        |i| R::id(i).to_owned(),
    );
    output::print_output(&out, global.quiet);
}

fn parse_action<R: Resource>(raw: &str) -> Result<LifecycleAction, CliError> {
    let declared = R::SPEC.actions;
    let action = LifecycleAction::from_str(raw).ok().filter(|a| declared.contains(a));
    action.ok_or_else(|| {
        let known: Vec<String> = declared.iter().map(ToString::to_string).collect();
        CliError::Validation {
            field: "action".into(),
            reason: if known.is_empty() {
                format!("{} has no lifecycle actions", R::SPEC.name)
            } else {
                format!("'{raw}' is not one of: {}", known.join(", "))
            },
        }
    })
}

fn is_destructive(action: LifecycleAction) -> bool {
    matches!(
        action,
        LifecycleAction::Reject | LifecycleAction::Suspend | LifecycleAction::Cancel
    )
}

fn unsupported<R: Resource>(operation: &str) -> CliError {
    CliError::Unsupported {
        resource: R::SPEC.name.into(),
        operation: operation.into(),
    }
}
