//! Data domains and domain-prefixed field keys
//!
//! Every profile field is keyed as `{domain}_{column}`, e.g. `snv_geneName`
//! or `clinical_cancerSite`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column that identifies the patient in every input table
pub const PATIENT_ID: &str = "patientID";

/// 3' breakpoint partner of a gene fusion
pub const FUSION_GENE3: &str = "fusion_gene3";

/// 5' breakpoint partner of a gene fusion
pub const FUSION_GENE5: &str = "fusion_gene5";

/// Field compared to decide whether two patients share a cancer site
pub const CLINICAL_CANCER_SITE: &str = "clinical_cancerSite";

/// Source domain of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Single nucleotide variants
    Snv,
    /// Copy number variants
    Cnv,
    /// Gene fusions
    Fusion,
    /// Clinical attributes
    Clinical,
}

impl Domain {
    /// All domains in processing order
    pub const ALL: [Domain; 4] = [Domain::Snv, Domain::Cnv, Domain::Fusion, Domain::Clinical];

    pub fn prefix(&self) -> &'static str {
        match self {
            Domain::Snv => "snv",
            Domain::Cnv => "cnv",
            Domain::Fusion => "fusion",
            Domain::Clinical => "clinical",
        }
    }

    /// Build the profile field key for a column of this domain
    pub fn field_key(&self, column: &str) -> String {
        format!("{}_{}", self.prefix(), column)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// For one of the paired fusion fields, the other side of the pair
pub fn fusion_partner(field_key: &str) -> Option<&'static str> {
    match field_key {
        FUSION_GENE3 => Some(FUSION_GENE5),
        FUSION_GENE5 => Some(FUSION_GENE3),
        _ => None,
    }
}
