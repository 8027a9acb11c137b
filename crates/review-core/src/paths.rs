use std::path::{Path, PathBuf};

pub const REVIEW_DIR: &str = ".review";
pub const CONFIG_FILE: &str = ".review/config.yaml";
pub const SESSION_FILE: &str = ".review/session.yaml";
pub const EXPORTS_DIR: &str = ".review/exports";
pub const LOCAL_ASSETS_FILE: &str = ".review/assets.yaml";

pub fn review_dir(root: &Path) -> PathBuf {
    root.join(REVIEW_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn session_path(root: &Path) -> PathBuf {
    root.join(SESSION_FILE)
}

pub fn exports_dir(root: &Path) -> PathBuf {
    root.join(EXPORTS_DIR)
}

pub fn local_assets_path(root: &Path) -> PathBuf {
    root.join(LOCAL_ASSETS_FILE)
}
