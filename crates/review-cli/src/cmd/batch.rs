use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use review_core::batch::BatchController;
use review_core::report::{
    load_batch_report, serialize_report, ExportFormat, ReportDownload, ReportLoadResult,
};
use review_core::types::Status;
use review_core::{io, paths, ReviewContext};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Subcommand)]
pub enum BatchSubcommand {
    /// Preview what moving the given assets would do
    Preview {
        /// Asset ids
        #[arg(required = true)]
        asset_ids: Vec<String>,
    },

    /// Move assets after the undo window (Ctrl-C cancels while queued)
    Execute {
        /// Asset ids
        #[arg(required = true)]
        asset_ids: Vec<String>,
        /// Skip the undo window
        #[arg(long)]
        now: bool,
        /// Save the report to .review/exports/ as json or csv
        #[arg(long, value_name = "FORMAT")]
        export: Option<ExportFormat>,
    },

    /// Fetch the report of an executed batch
    Report {
        /// Batch id
        batch_id: String,
        /// json or csv
        #[arg(long, default_value = "json")]
        format: ExportFormat,
        /// Save to .review/exports/ instead of printing
        #[arg(long)]
        save: bool,
    },
}

pub fn run(
    root: &Path,
    api_url: Option<&str>,
    subcmd: BatchSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let config = super::load_config(root, api_url)?;
    let ctx = super::context(root, &config)?;
    let rt = super::runtime()?;

    match subcmd {
        BatchSubcommand::Preview { asset_ids } => {
            let batch = BatchController::with_undo_window(ctx, config.batch.undo_window_ms);
            batch.set_batch_ids(asset_ids);
            rt.block_on(batch.preview_batch_move());
            let snap = batch.snapshot();
            if let Some(preview) = &snap.preview {
                if json {
                    print_json(preview)?;
                } else {
                    println!("{}", serde_json::to_string_pretty(preview)?);
                }
            }
            check(snap.preview_status.as_ref())
        }
        BatchSubcommand::Execute {
            asset_ids,
            now,
            export,
        } => {
            let batch = BatchController::with_undo_window(ctx, config.batch.undo_window_ms);
            batch.set_batch_ids(asset_ids);
            rt.block_on(execute(&batch, now, json))?;
            let snap = batch.snapshot();

            if let Some(format) = export {
                let mut download: Option<ReportDownload> = None;
                if batch.export_batch_report(format, Some(&mut download)) {
                    if let Some(download) = &download {
                        let path = save_download(root, download)?;
                        println!("Saved {}", path.display());
                    }
                }
            }

            if json {
                print_json(&batch.snapshot())?;
            } else if let Some(report) = &snap.report {
                println!("{}", serde_json::to_string_pretty(report)?);
            }
            check(snap.execute_status.as_ref())?;
            check(snap.report_status.as_ref())
        }
        BatchSubcommand::Report {
            batch_id,
            format,
            save,
        } => report(root, &ctx, &rt, &batch_id, format, save, json),
    }
}

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

async fn execute(batch: &BatchController, now: bool, json: bool) -> anyhow::Result<()> {
    batch.execute_batch_move().await;
    if now {
        // A second execute while queued runs the pending selection at once.
        batch.execute_batch_move().await;
    } else if let (false, Some(status)) = (json, batch.snapshot().execute_status) {
        println!("{}", status.message);
    }

    tokio::select! {
        _ = batch.wait_until_settled() => {}
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for Ctrl-C")?;
            // Past the undo window the move is already in flight.
            if !batch.cancel_pending_batch_execution() {
                batch.wait_until_settled().await;
            }
        }
    }

    if !json {
        let snap = batch.snapshot();
        for status in [&snap.execute_status, &snap.report_status].into_iter().flatten() {
            if !status.is_error() {
                println!("{}", status.message);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// report
// ---------------------------------------------------------------------------

fn report(
    root: &Path,
    ctx: &ReviewContext,
    rt: &tokio::runtime::Runtime,
    batch_id: &str,
    format: ExportFormat,
    save: bool,
    json: bool,
) -> anyhow::Result<()> {
    let api = Arc::clone(&ctx.api);
    let result = rt.block_on(load_batch_report(
        move |id| async move { api.get_move_batch_report(&id).await },
        batch_id,
        ctx.t(),
        ctx.mapper(),
    ));

    let report = match result {
        ReportLoadResult::Success { report, .. } => report,
        ReportLoadResult::Error { status_message } => anyhow::bail!("{status_message}"),
    };

    if json && !save {
        return print_json(&report);
    }

    let download = ReportDownload::new(batch_id, serialize_report(format, &report));
    if save {
        let path = save_download(root, &download)?;
        println!("Saved {}", path.display());
    } else {
        print!("{}", download.content);
    }
    Ok(())
}

fn save_download(root: &Path, download: &ReportDownload) -> anyhow::Result<PathBuf> {
    if Path::new(&download.filename).file_name() != Some(OsStr::new(&download.filename)) {
        anyhow::bail!("refusing to save report as '{}'", download.filename);
    }
    let path = paths::exports_dir(root).join(&download.filename);
    io::atomic_write(&path, download.content.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Turn an error status into the command's failure.
fn check(status: Option<&Status>) -> anyhow::Result<()> {
    match status {
        Some(status) if status.is_error() => anyhow::bail!("{}", status.message),
        _ => Ok(()),
    }
}
