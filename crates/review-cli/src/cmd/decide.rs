use crate::output::print_json;
use review_core::board::ReviewBoard;
use review_core::decision::{decide_assets, BulkDecisionFinalizationResult};
use review_core::types::DecisionAction;
use std::path::Path;

pub fn run(
    root: &Path,
    api_url: Option<&str>,
    action: &str,
    asset_ids: Vec<String>,
    json: bool,
) -> anyhow::Result<()> {
    let action: DecisionAction = action.parse()?;
    let config = super::load_config(root, api_url)?;
    let ctx = super::context(root, &config)?;

    let rt = super::runtime()?;
    let result = rt.block_on(decide_assets(
        &*ctx.api,
        config.is_api_asset_source(),
        &asset_ids,
        action,
        ctx.mapper(),
    ));

    if !config.is_api_asset_source() {
        let mut board = ReviewBoard::load_local(root)?;
        if board.apply_decision(&result) > 0 {
            board.save_local(root)?;
        }
    }

    if json {
        print_json(&result)?;
    } else {
        match &result {
            BulkDecisionFinalizationResult::None => println!("Nothing to decide."),
            BulkDecisionFinalizationResult::Success {
                success_count,
                next_state,
                ..
            } => println!("{success_count} asset(s) → {next_state}"),
            BulkDecisionFinalizationResult::Partial {
                success_count,
                failed_count,
                error_message,
                next_state,
                ..
            } => {
                println!("{success_count} asset(s) → {next_state}");
                eprintln!("warning: {failed_count} failed: {error_message}");
            }
            BulkDecisionFinalizationResult::Error { .. } => {}
        }
    }

    if let BulkDecisionFinalizationResult::Error { error_message } = result {
        anyhow::bail!("{error_message}");
    }
    Ok(())
}
