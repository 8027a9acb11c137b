use crate::output::print_json;
use clap::Subcommand;
use review_core::purge::PurgeController;
use std::path::Path;

#[derive(Subcommand)]
pub enum PurgeSubcommand {
    /// Show what purging an asset would remove
    Preview {
        /// Asset id
        asset_id: String,
    },

    /// Permanently delete an asset
    Execute {
        /// Asset id
        asset_id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(
    root: &Path,
    api_url: Option<&str>,
    subcmd: PurgeSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    if let PurgeSubcommand::Execute { yes: false, asset_id } = &subcmd {
        anyhow::bail!("refusing to purge '{asset_id}' without --yes");
    }

    let config = super::load_config(root, api_url)?;
    let purge = PurgeController::new(super::context(root, &config)?);
    let rt = super::runtime()?;

    match subcmd {
        PurgeSubcommand::Preview { asset_id } => {
            let preview = rt.block_on(purge.preview_purge(&asset_id));
            match preview {
                Some(preview) if json => print_json(&preview)?,
                Some(preview) => {
                    report_status(&purge);
                    println!("{}", serde_json::to_string_pretty(&preview)?);
                }
                None => {}
            }
        }
        PurgeSubcommand::Execute { asset_id, .. } => {
            rt.block_on(purge.execute_purge(&asset_id));
            if json {
                print_json(&purge.snapshot())?;
            } else {
                report_status(&purge);
            }
        }
    }

    match purge.snapshot().status {
        Some(status) if status.is_error() => anyhow::bail!("{}", status.message),
        _ => Ok(()),
    }
}

fn report_status(purge: &PurgeController) {
    match purge.snapshot().status {
        Some(status) if !status.is_error() => println!("{}", status.message),
        _ => {}
    }
}
