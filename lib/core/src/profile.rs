//! Patient profiles
//!
//! A [`PatientProfile`] maps every domain-prefixed field key of a run to the
//! set of values observed for that patient. Profiles are produced by
//! [`ProfileBuilder`](crate::ProfileBuilder) and never mutated afterwards.

use ahash::AHashMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

static EMPTY: BTreeSet<String> = BTreeSet::new();

/// Separator used when a value set is flattened into one string
pub const FLATTEN_SEPARATOR: &str = ", ";

/// Observed values of one patient, keyed by field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientProfile {
    patient_id: String,
    fields: BTreeMap<String, BTreeSet<String>>,
}

impl PatientProfile {
    pub(crate) fn new(patient_id: String, fields: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self { patient_id, fields }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// Values for a field; the empty set when the patient has none
    pub fn values(&self, field: &str) -> &BTreeSet<String> {
        self.fields.get(field).unwrap_or(&EMPTY)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_populated(&self, field: &str) -> bool {
        !self.values(field).is_empty()
    }

    /// Iterate `(field, values)` in field-key order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_map(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.fields
    }

    /// Fields holding at least one value
    pub fn populated_fields(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.fields().filter(|(_, values)| !values.is_empty())
    }

    pub fn populated_count(&self) -> usize {
        self.populated_fields().count()
    }

    /// Comma-joined values of a field, empty string when unpopulated
    pub fn flatten(&self, field: &str) -> String {
        self.values(field)
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(FLATTEN_SEPARATOR)
    }
}

/// Immutable, uniformly keyed collection of profiles for one run
///
/// Iteration follows the order in which patients were first seen while
/// building, which is also the candidate enumeration order for ranking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileSet {
    profiles: Vec<PatientProfile>,
    index: AHashMap<String, usize>,
    field_keys: Vec<String>,
}

impl ProfileSet {
    pub(crate) fn new(profiles: Vec<PatientProfile>, field_keys: Vec<String>) -> Self {
        let index = profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (p.patient_id.clone(), i))
            .collect();
        Self {
            profiles,
            index,
            field_keys,
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, patient_id: &str) -> Option<&PatientProfile> {
        self.index.get(patient_id).map(|&i| &self.profiles[i])
    }

    pub fn contains(&self, patient_id: &str) -> bool {
        self.index.contains_key(patient_id)
    }

    /// Enumeration position of a patient
    pub fn position(&self, patient_id: &str) -> Option<usize> {
        self.index.get(patient_id).copied()
    }

    pub fn as_slice(&self) -> &[PatientProfile] {
        &self.profiles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatientProfile> {
        self.profiles.iter()
    }

    pub fn patient_ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.patient_id())
    }

    /// The field-key universe shared by every profile, sorted
    pub fn field_keys(&self) -> &[String] {
        &self.field_keys
    }
}

impl<'a> IntoIterator for &'a ProfileSet {
    type Item = &'a PatientProfile;
    type IntoIter = std::slice::Iter<'a, PatientProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, fields: &[(&str, &[&str])]) -> PatientProfile {
        let fields = fields
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect();
        PatientProfile::new(id.to_string(), fields)
    }

    #[test]
    fn test_values_of_missing_field_is_empty() {
        let p = profile("P1", &[("snv_geneName", &["BRCA1"])]);
        assert!(p.values("cnv_geneName").is_empty());
        assert!(!p.has_field("cnv_geneName"));
        assert!(p.is_populated("snv_geneName"));
    }

    #[test]
    fn test_flatten_is_sorted_and_joined() {
        let p = profile("P1", &[("snv_geneName", &["TP53", "BRCA1"]), ("cnv_geneName", &[])]);
        assert_eq!(p.flatten("snv_geneName"), "BRCA1, TP53");
        assert_eq!(p.flatten("cnv_geneName"), "");
        assert_eq!(p.populated_count(), 1);
    }

    #[test]
    fn test_profile_set_lookup_and_order() {
        let set = ProfileSet::new(
            vec![profile("B", &[]), profile("A", &[])],
            vec!["snv_geneName".to_string()],
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.position("B"), Some(0));
        assert_eq!(set.get("A").map(|p| p.patient_id()), Some("A"));
        assert!(set.get("C").is_none());
        assert_eq!(set.patient_ids().collect::<Vec<_>>(), vec!["B", "A"]);
    }

    #[test]
    fn test_profile_serializes_as_lists() {
        let p = profile("P1", &[("fusion_gene3", &["ALK"])]);
        let json = serde_json::to_value(p.field_map()).unwrap();
        assert_eq!(json["fusion_gene3"], serde_json::json!(["ALK"]));
    }
}
