use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IvError, Result};
use crate::state::options::PlotOptions;
use crate::state::theme::Theme;

/// Gallery settings, persisted as JSON. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub title: String,
    /// File name of the index page inside the output directory.
    pub index_file: String,
    pub theme: Theme,
    /// Height of each embedded plot, in CSS pixels.
    pub iframe_height: u32,
    /// Options applied to every dataset's figure.
    pub plot: PlotOptions,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            title: "Transistor IV Plot Gallery".to_string(),
            index_file: "index.html".to_string(),
            theme: Theme::default(),
            iframe_height: 900,
            plot: PlotOptions::default(),
        }
    }
}

impl GalleryConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| IvError::io(path, e))?;
        let config = serde_json::from_str(&json)?;
        tracing::info!("Config loaded from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| IvError::io(path, e))
    }
}
