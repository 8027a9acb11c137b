use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::decision::BulkDecisionFinalizationResult;
use crate::error::Result;
use crate::paths;
use crate::types::{Asset, AssetState};

/// Board served in local mode before `.review/assets.yaml` exists.
const DEMO_ASSETS: &[(&str, &str)] = &[
    ("demo-1", "harbor-sunrise.jpg"),
    ("demo-2", "city-night.jpg"),
    ("demo-3", "forest-trail.png"),
    ("demo-4", "product-shot.tif"),
];

/// The operator's working list of assets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewBoard {
    assets: Vec<Asset>,
}

impl ReviewBoard {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }

    pub fn demo() -> Self {
        Self::new(
            DEMO_ASSETS
                .iter()
                .map(|(id, name)| Asset::new(*id, *name))
                .collect(),
        )
    }

    /// Local-mode board from `.review/assets.yaml`, or the demo set when
    /// the file is absent.
    pub fn load_local(root: &Path) -> Result<Self> {
        let path = paths::local_assets_path(root);
        if !path.exists() {
            return Ok(Self::demo());
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save_local(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::local_assets_path(root), data.as_bytes())
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn replace_all(&mut self, assets: Vec<Asset>) {
        self.assets = assets;
    }

    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Ids still awaiting a keep/reject decision, in list order.
    pub fn pending_ids(&self) -> Vec<String> {
        self.assets
            .iter()
            .filter(|a| a.state == AssetState::DecisionPending)
            .map(|a| a.id.clone())
            .collect()
    }

    /// Move every successfully decided asset to the result's next state.
    /// Returns how many assets changed.
    pub fn apply_decision(&mut self, result: &BulkDecisionFinalizationResult) -> usize {
        let Some((ids, next_state)) = result.applied() else {
            return 0;
        };
        let mut changed = 0;
        for asset in self.assets.iter_mut().filter(|a| ids.contains(&a.id)) {
            asset.state = next_state;
            changed += 1;
        }
        changed
    }

    /// Drop a purged asset. Returns `false` if it was not on the board.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.assets.len();
        self.assets.retain(|a| a.id != id);
        self.assets.len() != before
    }
}
