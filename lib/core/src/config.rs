//! Run configuration
//!
//! Column subsets decide which columns of each domain table become profile
//! fields; field weights decide how much each field contributes to a score.
//! Both deserialize from the JSON files the matching pipeline has always used
//! (`column_subsets.json`, `weights.json`) and fall back to built-in defaults.

use crate::domain::{Domain, PATIENT_ID};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Weight of any field not listed in [`FieldWeights`]
pub const DEFAULT_FIELD_WEIGHT: f64 = 1.0;

/// Candidates kept per query
pub const DEFAULT_TOP_N: usize = 20;

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn default_snv_subset() -> Vec<String> {
    columns(&[PATIENT_ID, "geneName", "variantPDot", "Impact"])
}

fn default_cnv_subset() -> Vec<String> {
    columns(&[PATIENT_ID, "geneName"])
}

fn default_fusion_subset() -> Vec<String> {
    columns(&[PATIENT_ID, "gene5", "gene3"])
}

fn default_clinical_subset() -> Vec<String> {
    columns(&[
        PATIENT_ID,
        "cancerSiteIdcCode",
        "cancerSite",
        "gender",
        "morphologyIdcCode",
        "age",
    ])
}

/// Columns retained per domain. Each list always contains `patientID`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSubsets {
    #[serde(default = "default_snv_subset")]
    pub snv_subset: Vec<String>,
    #[serde(default = "default_cnv_subset")]
    pub cnv_subset: Vec<String>,
    #[serde(default = "default_fusion_subset")]
    pub fusion_subset: Vec<String>,
    #[serde(default = "default_clinical_subset")]
    pub clinical_subset: Vec<String>,
}

impl Default for ColumnSubsets {
    fn default() -> Self {
        Self {
            snv_subset: default_snv_subset(),
            cnv_subset: default_cnv_subset(),
            fusion_subset: default_fusion_subset(),
            clinical_subset: default_clinical_subset(),
        }
    }
}

impl ColumnSubsets {
    pub fn columns(&self, domain: Domain) -> &[String] {
        match domain {
            Domain::Snv => &self.snv_subset,
            Domain::Cnv => &self.cnv_subset,
            Domain::Fusion => &self.fusion_subset,
            Domain::Clinical => &self.clinical_subset,
        }
    }

    fn columns_mut(&mut self, domain: Domain) -> &mut Vec<String> {
        match domain {
            Domain::Snv => &mut self.snv_subset,
            Domain::Cnv => &mut self.cnv_subset,
            Domain::Fusion => &mut self.fusion_subset,
            Domain::Clinical => &mut self.clinical_subset,
        }
    }

    /// Ensure every list carries `patientID` and has no blank names
    pub fn validate(&mut self) -> Result<()> {
        for domain in Domain::ALL {
            let cols = self.columns_mut(domain);
            if cols.iter().any(|c| c.trim().is_empty()) {
                return Err(Error::Configuration(format!(
                    "{} subset contains a blank column name",
                    domain
                )));
            }
            if !cols.iter().any(|c| c == PATIENT_ID) {
                warn!("{} subset lacks {}, adding it", domain, PATIENT_ID);
                cols.insert(0, PATIENT_ID.to_string());
            }
        }
        Ok(())
    }
}

/// Per-field weights keyed by domain-prefixed field key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldWeights {
    weights: HashMap<String, f64>,
}

impl Default for FieldWeights {
    fn default() -> Self {
        let weights = [
            ("clinical_cancerSite", 0.1),
            ("snv_variantPDot", 2.0),
            ("snv_Impact", 3.0),
            ("cnv_geneName", 7.6),
            ("fusion_gene3", 9.25),
            ("snv_geneMarker", 0.0),
            ("snv_geneName", 4.0),
            ("fusion_gene5", 9.25),
            ("clinical_gender", 0.2),
            ("clinical_morphologyIdcCode", 0.1),
            ("clinical_age", 0.2),
        ]
        .into_iter()
        .map(|(k, w)| (k.to_string(), w))
        .collect();
        Self { weights }
    }
}

impl FieldWeights {
    /// An empty table: every field weighs [`DEFAULT_FIELD_WEIGHT`]
    pub fn uniform() -> Self {
        Self {
            weights: HashMap::new(),
        }
    }

    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self {
            weights: pairs.into_iter().map(|(k, w)| (k.into(), w)).collect(),
        }
    }

    /// Weight of a field, [`DEFAULT_FIELD_WEIGHT`] when unspecified
    pub fn weight(&self, field: &str) -> f64 {
        self.weights.get(field).copied().unwrap_or(DEFAULT_FIELD_WEIGHT)
    }

    pub fn set(&mut self, field: impl Into<String>, weight: f64) {
        self.weights.insert(field.into(), weight);
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Reject negative or non-finite weights
    pub fn validate(&self) -> Result<()> {
        for (field, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(Error::Configuration(format!(
                    "field '{}' has invalid weight {}",
                    field, weight
                )));
            }
        }
        Ok(())
    }
}

fn default_signal_fields() -> Vec<String> {
    columns(&[
        "snv_geneName",
        "snv_variantPDot",
        "fusion_gene3",
        "cnv_geneName",
        "fusion_gene5",
        "snv_Impact",
    ])
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Ranking limits and the batch-mode signal filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Candidates kept per query in batch mode
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Candidates kept in single-query mode
    #[serde(default = "default_top_n")]
    pub single_top_n: usize,
    /// Query-side fields of which at least one must be populated for a batch
    /// record to survive
    #[serde(default = "default_signal_fields")]
    pub signal_fields: Vec<String>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            single_top_n: DEFAULT_TOP_N,
            signal_fields: default_signal_fields(),
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 || self.single_top_n == 0 {
            return Err(Error::Configuration("top_n must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Everything a matching run is configured with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TwinConfig {
    pub subsets: ColumnSubsets,
    pub weights: FieldWeights,
    pub ranking: RankingConfig,
}

impl TwinConfig {
    pub fn new(subsets: ColumnSubsets, weights: FieldWeights, ranking: RankingConfig) -> Self {
        Self {
            subsets,
            weights,
            ranking,
        }
    }

    /// Validate all parts, normalizing subsets in place
    pub fn validate(&mut self) -> Result<()> {
        self.subsets.validate()?;
        self.weights.validate()?;
        self.ranking.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = FieldWeights::default();
        assert_eq!(weights.weight("fusion_gene3"), 9.25);
        assert_eq!(weights.weight("snv_geneMarker"), 0.0);
        assert_eq!(weights.weight("clinical_unknown"), DEFAULT_FIELD_WEIGHT);
    }

    #[test]
    fn test_weights_deserialize_from_flat_map() {
        let weights: FieldWeights =
            serde_json::from_str(r#"{"snv_geneName": 4, "cnv_geneName": 7.6}"#).unwrap();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights.weight("snv_geneName"), 4.0);
        assert_eq!(weights.weight("fusion_gene5"), 1.0);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = FieldWeights::from_pairs([("snv_Impact", -1.0)]);
        assert!(matches!(weights.validate(), Err(Error::Configuration(_))));
        let weights = FieldWeights::from_pairs([("snv_Impact", f64::NAN)]);
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_subsets_fall_back_per_key() {
        let subsets: ColumnSubsets =
            serde_json::from_str(r#"{"cnv_subset": ["patientID", "geneName", "functionCnv"]}"#).unwrap();
        assert_eq!(subsets.cnv_subset.len(), 3);
        assert_eq!(subsets.snv_subset, default_snv_subset());
        assert_eq!(subsets.columns(Domain::Fusion), default_fusion_subset().as_slice());
    }

    #[test]
    fn test_subsets_validate_inserts_patient_id() {
        let mut subsets = ColumnSubsets {
            cnv_subset: vec!["geneName".to_string()],
            ..Default::default()
        };
        subsets.validate().unwrap();
        assert_eq!(subsets.cnv_subset[0], PATIENT_ID);

        subsets.snv_subset.push("  ".to_string());
        assert!(subsets.validate().is_err());
    }

    #[test]
    fn test_ranking_defaults() {
        let ranking: RankingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(ranking, RankingConfig::default());
        assert_eq!(ranking.signal_fields.len(), 6);

        let zero = RankingConfig {
            top_n: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }
}
