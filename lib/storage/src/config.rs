//! Configuration file loading
//!
//! Configuration problems are never fatal: a missing, unreadable or invalid
//! file is reported as a warning and the built-in default takes its place.

use oncotwin_core::{ColumnSubsets, FieldWeights, RankingConfig, TwinConfig};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default file name for column subsets
pub const SUBSETS_FILE: &str = "column_subsets.json";
/// Default file name for field weights
pub const WEIGHTS_FILE: &str = "weights.json";

/// Where to look for configuration files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub subsets: PathBuf,
    pub weights: PathBuf,
}

impl ConfigPaths {
    /// Standard file names inside a config directory
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            subsets: dir.join(SUBSETS_FILE),
            weights: dir.join(WEIGHTS_FILE),
        }
    }

    /// Replace individual paths with explicit overrides
    pub fn with_overrides(mut self, subsets: Option<PathBuf>, weights: Option<PathBuf>) -> Self {
        if let Some(path) = subsets {
            self.subsets = path;
        }
        if let Some(path) = weights {
            self.weights = path;
        }
        self
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

/// Load column subsets, falling back to defaults
pub fn load_subsets(path: &Path) -> ColumnSubsets {
    let loaded = read_json::<ColumnSubsets>(path).and_then(|mut subsets| {
        subsets.validate().map_err(|e| e.to_string())?;
        Ok(subsets)
    });
    match loaded {
        Ok(subsets) => {
            info!("Loaded column subsets from {:?}", path);
            subsets
        }
        Err(e) => {
            warn!("Subsets file {:?} not usable ({}). Using default column subsets.", path, e);
            ColumnSubsets::default()
        }
    }
}

/// Load field weights, falling back to defaults
pub fn load_weights(path: &Path) -> FieldWeights {
    let loaded = read_json::<FieldWeights>(path).and_then(|weights| {
        weights.validate().map_err(|e| e.to_string())?;
        Ok(weights)
    });
    match loaded {
        Ok(weights) => {
            info!("Loaded {} field weights from {:?}", weights.len(), path);
            weights
        }
        Err(e) => {
            warn!("Weights file {:?} not usable ({}). Using default weights.", path, e);
            FieldWeights::default()
        }
    }
}

/// Assemble a validated run configuration
pub fn load_config(paths: &ConfigPaths, ranking: RankingConfig) -> TwinConfig {
    let ranking = match ranking.validate() {
        Ok(()) => ranking,
        Err(e) => {
            warn!("{}. Using default ranking limits.", e);
            RankingConfig::default()
        }
    };
    TwinConfig::new(load_subsets(&paths.subsets), load_weights(&paths.weights), ranking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files_fall_back() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&ConfigPaths::in_dir(dir.path()), RankingConfig::default());
        assert_eq!(config, TwinConfig::default());
    }

    #[test]
    fn test_loads_weights_and_subsets() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(WEIGHTS_FILE), r#"{"snv_geneName": 5.5}"#).unwrap();
        fs::write(
            dir.path().join(SUBSETS_FILE),
            r#"{"clinical_subset": ["cancerSite"]}"#,
        )
        .unwrap();

        let config = load_config(&ConfigPaths::in_dir(dir.path()), RankingConfig::default());
        assert_eq!(config.weights.weight("snv_geneName"), 5.5);
        assert_eq!(config.weights.weight("fusion_gene3"), 1.0);
        assert_eq!(config.subsets.clinical_subset, vec!["patientID", "cancerSite"]);
        assert_eq!(config.subsets.snv_subset, ColumnSubsets::default().snv_subset);
    }

    #[test]
    fn test_malformed_or_invalid_weights_fall_back() {
        let dir = TempDir::new().unwrap();
        let malformed = dir.path().join("bad.json");
        fs::write(&malformed, "{ not json").unwrap();
        assert_eq!(load_weights(&malformed), FieldWeights::default());

        let negative = dir.path().join("negative.json");
        fs::write(&negative, r#"{"snv_Impact": -3}"#).unwrap();
        assert_eq!(load_weights(&negative), FieldWeights::default());
    }

    #[test]
    fn test_overrides() {
        let paths = ConfigPaths::in_dir("config").with_overrides(None, Some(PathBuf::from("/tmp/w.json")));
        assert_eq!(paths.subsets, PathBuf::from("config").join(SUBSETS_FILE));
        assert_eq!(paths.weights, PathBuf::from("/tmp/w.json"));
    }

    #[test]
    fn test_invalid_ranking_falls_back() {
        let dir = TempDir::new().unwrap();
        let ranking = RankingConfig {
            top_n: 0,
            ..Default::default()
        };
        let config = load_config(&ConfigPaths::in_dir(dir.path()), ranking);
        assert_eq!(config.ranking, RankingConfig::default());
    }
}
