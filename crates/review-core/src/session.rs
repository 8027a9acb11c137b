use crate::error::Result;
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bearer token from the last successful login, kept in `.review/session.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, email: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            email,
            created_at: Utc::now(),
        }
    }

    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = paths::session_path(root);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(Some(serde_yaml::from_str(&data)?))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::session_path(root), data.as_bytes())
    }

    pub fn clear(root: &Path) -> Result<bool> {
        crate::io::remove_if_exists(&paths::session_path(root))
    }
}
