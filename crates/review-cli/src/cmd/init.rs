use anyhow::Context;
use review_core::config::{AssetSource, Config};
use review_core::{io, paths};
use std::path::Path;

pub fn run(
    root: &Path,
    api_url: Option<&str>,
    local: bool,
    locale: Option<&str>,
) -> anyhow::Result<()> {
    let config_path = paths::config_path(root);
    if config_path.exists() {
        println!("Already initialized: {}", config_path.display());
        return Ok(());
    }

    println!("Initializing review console in: {}", root.display());

    for dir in [paths::review_dir(root), paths::exports_dir(root)] {
        io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let mut config = match api_url {
        Some(url) => Config::new(url),
        None => Config::default(),
    };
    if local {
        config.asset_source = AssetSource::Local;
    }
    if let Some(locale) = locale {
        config.locale = locale.to_string();
    }
    config.save(root).context("failed to write config")?;
    println!("  created: {}", paths::CONFIG_FILE);

    for w in config.validate() {
        println!("  [warning] {}", w.message);
    }

    Ok(())
}
