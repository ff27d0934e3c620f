//! # oncotwin Similarity
//!
//! Weighted multi-field similarity between patient profiles, and top-N
//! twin ranking on top of it.
//!
//! ## Features
//!
//! - **Per-field similarity**: numeric magnitude when every value is an
//!   integer, Jaccard overlap otherwise
//! - **Fusion pairing**: 3' and 5' fusion partners match across sides
//! - **Self-normalization**: scores are divided by the query's own maximum
//! - **Parallel ranking**: batch sweeps run on the rayon pool
//!
//! ## Example
//!
//! ```rust
//! use oncotwin_core::{ColumnSubsets, DomainTables, FieldWeights, ProfileBuilder, RankingConfig, Table};
//! use oncotwin_similarity::{Ranker, SimilarityEngine};
//!
//! let snv = Table::from_rows(
//!     "snv",
//!     &["patientID", "geneName", "variantPDot", "Impact"],
//!     &[
//!         vec![Some("A"), Some("BRCA1"), None, None],
//!         vec![Some("B"), Some("BRCA1"), None, None],
//!         vec![Some("C"), Some("TP53"), None, None],
//!     ],
//! ).unwrap();
//! let tables = DomainTables { snv: Some(snv), ..Default::default() };
//! let profiles = ProfileBuilder::new(ColumnSubsets::default()).build(&tables).unwrap();
//!
//! let ranker = Ranker::new(SimilarityEngine::new(FieldWeights::default()), RankingConfig::default());
//! let matches = ranker.rank_one(&profiles, "A").unwrap();
//! assert_eq!(matches[0].candidate_id, "B");
//! assert_eq!(matches[0].score, 1.0);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Profiles   │────>│   Engine    │────>│   Ranker    │
//! │ (field→set) │     │ (pair score)│     │  (top-N)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                         ┌─────────────┐
//!                                         │   Explain   │
//!                                         │  (records)  │
//!                                         └─────────────┘
//! ```

pub mod distance;
pub mod engine;
pub mod explain;
pub mod rank;

// Re-export main types for convenience
pub use distance::{field_similarity, jaccard_similarity, numeric_similarity, SimilarityMode};
pub use engine::{FieldContribution, PairScore, SimilarityEngine};
pub use explain::{
    BatchMatchResponse, FlatTable, MatchEntry, MatchRecord, ScoreSummary, SingleMatchResponse,
    BATCH_SCORE_COLUMN, SCORE_COLUMN,
};
pub use rank::{RankMode, RankedCandidate, Ranker};
