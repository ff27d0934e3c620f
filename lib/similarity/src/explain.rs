//! Match records and their projections
//!
//! A [`MatchRecord`] is the engine's output for one query/candidate pair.
//! Downstream writers consume it either as JSON ([`SingleMatchResponse`],
//! [`BatchMatchResponse`]) or as a flat table with every profile field
//! spelled out ([`FlatTable`]).

use oncotwin_core::{PatientProfile, ProfileSet, CLINICAL_CANCER_SITE};
use serde::{Deserialize, Serialize};

/// Status label for a shared cancer site
pub const CANCER_MATCH_SAME: &str = "same";
/// Status label for differing or unknown cancer sites
pub const CANCER_MATCH_OTHER: &str = "other";

/// Score column header in single-query tables
pub const SCORE_COLUMN: &str = "Score";
/// Score column header in consolidated batch tables
pub const BATCH_SCORE_COLUMN: &str = "Matching Perc";

/// Whether two patients share a cancer site.
///
/// The flattened `clinical_cancerSite` values must be equal and non-empty.
pub fn cancer_match(query: &PatientProfile, candidate: &PatientProfile) -> bool {
    let site = query.flatten(CLINICAL_CANCER_SITE);
    !site.is_empty() && site == candidate.flatten(CLINICAL_CANCER_SITE)
}

/// One ranked query/candidate pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub query_id: String,
    pub candidate_id: String,
    pub score: f64,
    pub cancer_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<i64>,
}

impl MatchRecord {
    pub fn new(query: &PatientProfile, candidate: &PatientProfile, score: f64, doctor_id: Option<i64>) -> Self {
        Self {
            query_id: query.patient_id().to_string(),
            candidate_id: candidate.patient_id().to_string(),
            score,
            cancer_match: cancer_match(query, candidate),
            doctor_id,
        }
    }

    pub fn cancer_status(&self) -> &'static str {
        if self.cancer_match {
            CANCER_MATCH_SAME
        } else {
            CANCER_MATCH_OTHER
        }
    }
}

/// JSON entry for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_patient_id: Option<String>,
    pub similar_patient_id: String,
    pub matching_percentage: f64,
    pub c_match_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<i64>,
}

impl MatchEntry {
    pub fn from_record(record: &MatchRecord, include_query: bool) -> Self {
        Self {
            query_patient_id: include_query.then(|| record.query_id.clone()),
            similar_patient_id: record.candidate_id.clone(),
            matching_percentage: record.score,
            c_match_status: record.cancer_status().to_string(),
            doctor_id: record.doctor_id,
        }
    }
}

/// JSON document for a single-query run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleMatchResponse {
    pub query_patient_id: String,
    pub matches: Vec<MatchEntry>,
}

impl SingleMatchResponse {
    pub fn from_records(query_id: &str, records: &[MatchRecord]) -> Self {
        Self {
            query_patient_id: query_id.to_string(),
            matches: records.iter().map(|r| MatchEntry::from_record(r, false)).collect(),
        }
    }
}

/// JSON document for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BatchMatchResponse {
    pub matches: Vec<MatchEntry>,
}

impl BatchMatchResponse {
    pub fn from_records(records: &[MatchRecord]) -> Self {
        Self {
            matches: records.iter().map(|r| MatchEntry::from_record(r, true)).collect(),
        }
    }
}

/// Records flattened into string columns, one row per match
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FlatTable {
    /// Project records against the profiles they were ranked from.
    ///
    /// Columns: `Query`, `Similar`, the score, `Query_{field}` and
    /// `Similar_{field}` for every field key, `c_match`, `cancer_match`, and
    /// `doctor_id` when any record carries one.
    pub fn from_records(records: &[MatchRecord], profiles: &ProfileSet, score_column: &str) -> Self {
        let fields = profiles.field_keys();
        let with_doctor = records.iter().any(|r| r.doctor_id.is_some());

        let mut header = vec!["Query".to_string(), "Similar".to_string(), score_column.to_string()];
        header.extend(fields.iter().map(|f| format!("Query_{}", f)));
        header.extend(fields.iter().map(|f| format!("Similar_{}", f)));
        header.push("c_match".to_string());
        header.push("cancer_match".to_string());
        if with_doctor {
            header.push("doctor_id".to_string());
        }

        let flatten = |id: &str, field: &str| {
            profiles
                .get(id)
                .map(|p| p.flatten(field))
                .unwrap_or_default()
        };

        let rows = records
            .iter()
            .map(|record| {
                let mut row = Vec::with_capacity(header.len());
                row.push(record.query_id.clone());
                row.push(record.candidate_id.clone());
                row.push(record.score.to_string());
                row.extend(fields.iter().map(|f| flatten(&record.query_id, f)));
                row.extend(fields.iter().map(|f| flatten(&record.candidate_id, f)));
                row.push(record.cancer_match.to_string());
                row.push(record.cancer_status().to_string());
                if with_doctor {
                    row.push(record.doctor_id.map(|d| d.to_string()).unwrap_or_default());
                }
                row
            })
            .collect();

        Self { header, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

/// Distribution of scores across a record list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation, 0 for fewer than two records
    pub std: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl ScoreSummary {
    pub fn compute(records: &[MatchRecord]) -> Self {
        if records.is_empty() {
            return Self {
                count: 0,
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                median: 0.0,
                max: 0.0,
            };
        }

        let mut scores: Vec<f64> = records.iter().map(|r| r.score).collect();
        scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = scores.len();
        let mean = scores.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        let median = if count % 2 == 0 {
            (scores[count / 2 - 1] + scores[count / 2]) / 2.0
        } else {
            scores[count / 2]
        };

        Self {
            count,
            mean,
            std,
            min: scores[0],
            median,
            max: scores[count - 1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oncotwin_core::{ColumnSubsets, DomainTables, ProfileBuilder, Table};

    fn clinical_profiles() -> ProfileSet {
        let clinical = Table::from_rows(
            "clinical",
            &["patientID", "cancerSite", "gender"],
            &[
                vec![Some("P1"), Some("Breast"), Some("F")],
                vec![Some("P2"), Some("Breast"), Some("F")],
                vec![Some("P3"), Some("Lung"), Some("M")],
                vec![Some("P4"), None, Some("M")],
                vec![Some("P5"), None, Some("F")],
            ],
        )
        .unwrap();
        let subsets = ColumnSubsets {
            snv_subset: vec!["patientID".into()],
            cnv_subset: vec!["patientID".into()],
            fusion_subset: vec!["patientID".into()],
            clinical_subset: vec!["patientID".into(), "cancerSite".into(), "gender".into()],
        };
        let tables = DomainTables {
            clinical: Some(clinical),
            ..Default::default()
        };
        ProfileBuilder::new(subsets).build(&tables).unwrap()
    }

    fn record(profiles: &ProfileSet, q: &str, c: &str, score: f64, doctor_id: Option<i64>) -> MatchRecord {
        MatchRecord::new(profiles.get(q).unwrap(), profiles.get(c).unwrap(), score, doctor_id)
    }

    #[test]
    fn test_cancer_match() {
        let profiles = clinical_profiles();
        assert!(record(&profiles, "P1", "P2", 0.9, None).cancer_match);
        assert!(!record(&profiles, "P1", "P3", 0.1, None).cancer_match);
        // both sites unknown
        let unknown = record(&profiles, "P4", "P5", 0.5, None);
        assert!(!unknown.cancer_match);
        assert_eq!(unknown.cancer_status(), CANCER_MATCH_OTHER);
    }

    #[test]
    fn test_single_response_shape() {
        let profiles = clinical_profiles();
        let records = vec![
            record(&profiles, "P1", "P2", 1.0, Some(4021)),
            record(&profiles, "P1", "P3", 0.25, Some(4021)),
        ];
        let json = serde_json::to_value(SingleMatchResponse::from_records("P1", &records)).unwrap();

        assert_eq!(json["query_patient_id"], "P1");
        assert_eq!(json["matches"][0]["similar_patient_id"], "P2");
        assert_eq!(json["matches"][0]["c_match_status"], "same");
        assert_eq!(json["matches"][1]["c_match_status"], "other");
        assert_eq!(json["matches"][1]["doctor_id"], 4021);
        assert!(json["matches"][0].get("query_patient_id").is_none());
    }

    #[test]
    fn test_batch_response_omits_missing_doctor() {
        let profiles = clinical_profiles();
        let records = vec![record(&profiles, "P3", "P4", 0.5, None)];
        let json = serde_json::to_value(BatchMatchResponse::from_records(&records)).unwrap();

        assert_eq!(json["matches"][0]["query_patient_id"], "P3");
        assert_eq!(json["matches"][0]["matching_percentage"], 0.5);
        assert!(json["matches"][0].get("doctor_id").is_none());
    }

    #[test]
    fn test_flat_table_columns() {
        let profiles = clinical_profiles();
        let records = vec![record(&profiles, "P1", "P2", 1.0, None)];
        let table = FlatTable::from_records(&records, &profiles, BATCH_SCORE_COLUMN);

        assert_eq!(table.header[2], BATCH_SCORE_COLUMN);
        assert!(table.column("doctor_id").is_none());
        let site = table.column("Similar_clinical_cancerSite").unwrap();
        assert_eq!(table.rows[0][site], "Breast");
        let status = table.column("cancer_match").unwrap();
        assert_eq!(table.rows[0][status], "same");
        assert_eq!(table.rows[0].len(), table.header.len());
    }

    #[test]
    fn test_score_summary() {
        let profiles = clinical_profiles();
        let records: Vec<_> = [0.2, 0.4, 0.6, 0.8]
            .iter()
            .map(|&s| record(&profiles, "P1", "P2", s, None))
            .collect();
        let summary = ScoreSummary::compute(&records);

        assert_eq!(summary.count, 4);
        assert!((summary.mean - 0.5).abs() < 1e-9);
        assert!((summary.median - 0.5).abs() < 1e-9);
        assert_eq!(summary.min, 0.2);
        assert_eq!(summary.max, 0.8);
        assert!(summary.std > 0.0);

        assert_eq!(ScoreSummary::compute(&[]).count, 0);
    }
}
