//! # oncotwin Core
//!
//! Core library for the oncotwin patient matching engine.
//!
//! This crate provides the data side of a matching run:
//!
//! - [`Table`] - A normalized snapshot of one domain's rows
//! - [`ProfileBuilder`] - Turns the four domain tables into profiles
//! - [`PatientProfile`] / [`ProfileSet`] - Uniformly keyed, immutable profiles
//! - [`TwinConfig`] - Column subsets, field weights and ranking limits
//!
//! ## Example
//!
//! ```rust
//! use oncotwin_core::{ColumnSubsets, DomainTables, ProfileBuilder, Table};
//!
//! let snv = Table::from_rows(
//!     "snv",
//!     &["patientID", "geneName", "variantPDot", "Impact"],
//!     &[vec![Some("P1"), Some("BRCA1"), Some("p.C61G"), Some("HIGH")]],
//! ).unwrap();
//!
//! let tables = DomainTables { snv: Some(snv), ..Default::default() };
//! let profiles = ProfileBuilder::new(ColumnSubsets::default()).build(&tables).unwrap();
//!
//! let p1 = profiles.get("P1").unwrap();
//! assert!(p1.values("snv_geneName").contains("BRCA1"));
//! assert!(p1.values("fusion_gene3").is_empty());
//! ```

pub mod builder;
pub mod config;
pub mod domain;
pub mod error;
pub mod profile;
pub mod table;

pub use builder::{DomainTables, ProfileBuilder};
pub use config::{ColumnSubsets, FieldWeights, RankingConfig, TwinConfig, DEFAULT_FIELD_WEIGHT, DEFAULT_TOP_N};
pub use domain::{Domain, CLINICAL_CANCER_SITE, FUSION_GENE3, FUSION_GENE5, PATIENT_ID};
pub use error::{Error, Result};
pub use profile::{PatientProfile, ProfileSet};
pub use table::{normalize_value, Table};
