use crate::output::{print_json, print_table};
use anyhow::Context;
use review_core::board::ReviewBoard;
use review_core::ReviewApi;
use std::path::Path;

pub fn run(root: &Path, api_url: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root, api_url)?;
    let assets = if config.is_api_asset_source() {
        let client = super::client(root, &config)?;
        let rt = super::runtime()?;
        rt.block_on(client.list_assets()).context("failed to list assets")?
    } else {
        ReviewBoard::load_local(root)?.assets().to_vec()
    };

    if json {
        return print_json(&assets);
    }
    if assets.is_empty() {
        println!("No assets.");
        return Ok(());
    }

    let rows = assets
        .iter()
        .map(|a| vec![a.id.clone(), a.state.to_string(), a.name.clone()])
        .collect();
    print_table(&["ID", "STATE", "NAME"], rows);
    Ok(())
}
