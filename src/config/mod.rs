//! Runtime configuration for the demo binary, loaded from JSON.

use crate::finder::FinderParams;
use crate::types::BoundingBox;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    /// Optional path for the pretty-printed JSON report.
    pub json_out: Option<PathBuf>,
    /// Optional PNG path for the winning candidate's crop.
    pub crop_out: Option<PathBuf>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Reference object image.
    pub model_path: PathBuf,
    /// Scene frame to search in.
    pub scene_path: PathBuf,
    /// Externally supplied candidate boxes; an empty list falls back to a
    /// single full-frame candidate.
    #[serde(default)]
    pub regions: Vec<BoundingBox>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default = "FinderParams::default")]
    pub finder_params: FinderParams,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: RuntimeConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let json = r#"{ "modelPath": "model.png", "scenePath": "scene.png" }"#;
        let config: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert!(config.regions.is_empty());
        assert!(config.output.json_out.is_none());
        assert!(config.output.crop_out.is_none());
        assert_eq!(config.finder_params.knn, 2);
        assert!((config.finder_params.uniqueness_threshold - 0.80).abs() < 1e-6);
    }
}
