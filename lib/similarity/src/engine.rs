//! Weighted profile similarity
//!
//! A pair score sums `weight(f) * similarity(f)` over the fields the query
//! patient has populated. Normalizing by the query's self-similarity makes
//! the score directional: `normalized(A, B)` generally differs from
//! `normalized(B, A)`.

use crate::distance::{field_similarity, similarity_mode, SimilarityMode};
use oncotwin_core::domain::fusion_partner;
use oncotwin_core::{FieldWeights, PatientProfile, ProfileSet};
use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Raw score of a query/candidate pair
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairScore {
    /// Weighted sum of per-field similarities
    pub total: f64,
    /// Number of query fields that took part
    pub valid_fields: usize,
}

/// Contribution of one field to a pair score
#[derive(Debug, Clone, PartialEq)]
pub struct FieldContribution {
    pub field: String,
    pub weight: f64,
    pub similarity: f64,
    pub mode: SimilarityMode,
}

impl FieldContribution {
    pub fn weighted(&self) -> f64 {
        self.weight * self.similarity
    }
}

/// Scores profiles against each other under a weight table
#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    weights: FieldWeights,
}

impl SimilarityEngine {
    pub fn new(weights: FieldWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &FieldWeights {
        &self.weights
    }

    /// The set a query field is compared against on the candidate side.
    ///
    /// For the fusion partner fields the candidate's two breakpoint sets are
    /// merged, so a 3' gene in the query may match either side of a fusion
    /// in the candidate. Only the candidate's complementary field matters.
    fn candidate_values<'a>(field: &str, candidate: &'a PatientProfile) -> Cow<'a, BTreeSet<String>> {
        let own = candidate.values(field);
        match fusion_partner(field) {
            Some(partner) if candidate.is_populated(partner) => {
                let mut merged = own.clone();
                merged.extend(candidate.values(partner).iter().cloned());
                Cow::Owned(merged)
            }
            _ => Cow::Borrowed(own),
        }
    }

    /// Similarity of one field, applying the fusion pairing rule
    pub fn field_similarity(&self, field: &str, query: &PatientProfile, candidate: &PatientProfile) -> f64 {
        let other = Self::candidate_values(field, candidate);
        field_similarity(query.values(field), &other)
    }

    /// Weighted sum over the query's populated fields
    pub fn score(&self, query: &PatientProfile, candidate: &PatientProfile) -> PairScore {
        query
            .populated_fields()
            .fold(PairScore::default(), |acc, (field, values)| {
                let other = Self::candidate_values(field, candidate);
                PairScore {
                    total: acc.total + self.weights.weight(field) * field_similarity(values, &other),
                    valid_fields: acc.valid_fields + 1,
                }
            })
    }

    /// Per-field breakdown of [`score`](Self::score)
    pub fn explain(&self, query: &PatientProfile, candidate: &PatientProfile) -> Vec<FieldContribution> {
        query
            .populated_fields()
            .map(|(field, values)| {
                let other = Self::candidate_values(field, candidate);
                FieldContribution {
                    field: field.to_string(),
                    weight: self.weights.weight(field),
                    similarity: field_similarity(values, &other),
                    mode: similarity_mode(values, &other),
                }
            })
            .collect()
    }

    /// Weighted self-similarity of a profile, the normalization denominator.
    ///
    /// Fields are compared with themselves directly, without the fusion
    /// pairing rule.
    pub fn max_score(&self, profile: &PatientProfile) -> f64 {
        profile
            .populated_fields()
            .map(|(field, values)| self.weights.weight(field) * field_similarity(values, values))
            .sum()
    }

    /// [`max_score`](Self::max_score) for every profile, in set order
    pub fn max_scores(&self, profiles: &ProfileSet) -> Vec<f64> {
        profiles
            .as_slice()
            .par_iter()
            .map(|profile| self.max_score(profile))
            .collect()
    }

    /// Score divided by the query's max score.
    ///
    /// `None` when the query has no populated field or a zero max score.
    pub fn normalized_score(
        &self,
        query: &PatientProfile,
        candidate: &PatientProfile,
        query_max_score: f64,
    ) -> Option<f64> {
        let pair = self.score(query, candidate);
        if pair.valid_fields > 0 && query_max_score > 0.0 {
            Some(pair.total / query_max_score)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oncotwin_core::{ColumnSubsets, DomainTables, ProfileBuilder, Table};

    /// Profiles over fusion + one snv field, built through the real builder
    fn profiles(rows: &[(&str, Option<&str>, Option<&str>, Option<&str>)]) -> ProfileSet {
        let subsets = ColumnSubsets {
            snv_subset: vec!["patientID".into(), "geneName".into()],
            cnv_subset: vec!["patientID".into()],
            fusion_subset: vec!["patientID".into(), "gene5".into(), "gene3".into()],
            clinical_subset: vec!["patientID".into()],
        };
        let mut snv = Table::new("snv", vec!["patientID".into(), "geneName".into()]);
        let mut fusion = Table::new(
            "fusion",
            vec!["patientID".into(), "gene5".into(), "gene3".into()],
        );
        for (id, gene, gene5, gene3) in rows {
            snv.push_row(vec![Some(id.to_string()), gene.map(str::to_string)]).unwrap();
            fusion
                .push_row(vec![
                    Some(id.to_string()),
                    gene5.map(str::to_string),
                    gene3.map(str::to_string),
                ])
                .unwrap();
        }
        let tables = DomainTables {
            snv: Some(snv),
            fusion: Some(fusion),
            ..Default::default()
        };
        ProfileBuilder::new(subsets).build(&tables).unwrap()
    }

    #[test]
    fn test_fusion_partner_union() {
        let set = profiles(&[
            ("A", Some("X"), None, Some("ALK")),
            ("B", Some("X"), Some("ALK"), None),
        ]);
        let engine = SimilarityEngine::new(FieldWeights::uniform());
        let a = set.get("A").unwrap();
        let b = set.get("B").unwrap();

        assert_eq!(engine.field_similarity("fusion_gene3", a, b), 1.0);
        assert_eq!(engine.field_similarity("fusion_gene5", b, a), 1.0);
    }

    #[test]
    fn test_fusion_pairing_only_looks_at_candidate() {
        let set = profiles(&[
            ("A", Some("X"), Some("EML4"), Some("ALK")),
            ("B", Some("X"), None, Some("ALK")),
        ]);
        let engine = SimilarityEngine::new(FieldWeights::uniform());
        let a = set.get("A").unwrap();
        let b = set.get("B").unwrap();

        // B has no gene5, so A's gene3 is compared with B's gene3 alone
        assert_eq!(engine.field_similarity("fusion_gene3", a, b), 1.0);
        // A has gene5, so B's gene3 {ALK} is compared with {ALK, EML4}
        assert_eq!(engine.field_similarity("fusion_gene3", b, a), 0.5);
    }

    #[test]
    fn test_max_score_is_sum_of_populated_weights() {
        let set = profiles(&[("A", Some("BRCA1"), Some("EML4"), Some("ALK")), ("B", None, None, Some("RET"))]);
        let weights = FieldWeights::from_pairs([("snv_geneName", 4.0), ("fusion_gene3", 9.25), ("fusion_gene5", 2.0)]);
        let engine = SimilarityEngine::new(weights);

        assert!((engine.max_score(set.get("A").unwrap()) - 15.25).abs() < 1e-9);
        assert!((engine.max_score(set.get("B").unwrap()) - 9.25).abs() < 1e-9);
        assert_eq!(engine.max_scores(&set).len(), 2);
    }

    #[test]
    fn test_normalized_score_is_directional() {
        let set = profiles(&[("A", Some("BRCA1"), None, Some("ALK")), ("B", Some("BRCA1"), None, None)]);
        let engine = SimilarityEngine::new(FieldWeights::uniform());
        let a = set.get("A").unwrap();
        let b = set.get("B").unwrap();

        // A is judged on two fields, B only on one
        let ab = engine.normalized_score(a, b, engine.max_score(a)).unwrap();
        let ba = engine.normalized_score(b, a, engine.max_score(b)).unwrap();
        assert_eq!(ab, 0.5);
        assert_eq!(ba, 1.0);
    }

    #[test]
    fn test_single_jaccard_field_is_symmetric() {
        let mut snv = Table::new("snv", vec!["patientID".into(), "geneName".into()]);
        for (id, gene) in [("A", "BRCA1"), ("A", "TP53"), ("B", "BRCA1")] {
            snv.push_row(vec![Some(id.into()), Some(gene.into())]).unwrap();
        }
        let tables = DomainTables {
            snv: Some(snv),
            ..Default::default()
        };
        let subsets = ColumnSubsets {
            snv_subset: vec!["patientID".into(), "geneName".into()],
            ..Default::default()
        };
        let set = ProfileBuilder::new(subsets).build(&tables).unwrap();
        let engine = SimilarityEngine::new(FieldWeights::from_pairs([("snv_geneName", 1.0)]));
        let a = set.get("A").unwrap();
        let b = set.get("B").unwrap();

        let ab = engine.normalized_score(a, b, engine.max_score(a)).unwrap();
        let ba = engine.normalized_score(b, a, engine.max_score(b)).unwrap();
        assert_eq!(ab, 0.5);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_normalized_score_none_for_zero_max_score() {
        let set = profiles(&[("A", Some("BRCA1"), None, None), ("B", Some("BRCA1"), None, None)]);
        let engine = SimilarityEngine::new(FieldWeights::from_pairs([("snv_geneName", 0.0)]));
        let a = set.get("A").unwrap();
        let b = set.get("B").unwrap();

        assert_eq!(engine.max_score(a), 0.0);
        assert_eq!(engine.score(a, b).valid_fields, 1);
        assert!(engine.normalized_score(a, b, engine.max_score(a)).is_none());
    }

    #[test]
    fn test_explain_matches_score() {
        let set = profiles(&[
            ("A", Some("BRCA1"), Some("EML4"), Some("ALK")),
            ("B", Some("BRCA1"), Some("ALK"), None),
        ]);
        let engine = SimilarityEngine::new(FieldWeights::default());
        let a = set.get("A").unwrap();
        let b = set.get("B").unwrap();

        let parts = engine.explain(a, b);
        let total: f64 = parts.iter().map(FieldContribution::weighted).sum();
        let pair = engine.score(a, b);
        assert_eq!(parts.len(), pair.valid_fields);
        assert!((total - pair.total).abs() < 1e-9);
        assert!(parts.iter().all(|p| p.mode == SimilarityMode::Jaccard));
    }
}
