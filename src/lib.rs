//! # oncotwin
//!
//! Patient twin matching over genomic and clinical profiles.
//!
//! For every patient, oncotwin ranks the most similar other patients under a
//! configurable weighted multi-field similarity. Profiles are built from four
//! tables (SNV, CNV, fusion, clinical), compared field by field, and each
//! query's score is normalized by its own self-similarity.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! oncotwin --input-dir ./data --output-dir ./out
//! oncotwin --input-dir ./data --output-dir ./out --single P0042 --json-output
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use oncotwin::prelude::*;
//!
//! let config = TwinConfig::default();
//! let tables = InputDir::new("./data").load_all().unwrap();
//! let profiles = ProfileBuilder::new(config.subsets.clone()).build(&tables).unwrap();
//!
//! let ranker = Ranker::new(SimilarityEngine::new(config.weights.clone()), config.ranking.clone());
//! let matches = ranker.rank_all(&profiles);
//! println!("{:?}", ScoreSummary::compute(&matches));
//! ```
//!
//! ## Crate Structure
//!
//! - `oncotwin-core` - Tables, profiles, profile builder, configuration, errors
//! - `oncotwin-similarity` - Field similarity, scoring engine, ranking, match records
//! - `oncotwin-storage` - Input tables, config files, output writers
//!
//! ## Features
//!
//! - **Uniform profiles**: every patient carries the same field keys
//! - **Numeric or Jaccard**: chosen per field over both value sets
//! - **Fusion pairing**: 3' and 5' partners match across sides
//! - **Parallel batch ranking**: one rayon task per query patient

// Re-export core types
pub use oncotwin_core::{
    ColumnSubsets, Domain, DomainTables, Error, FieldWeights, PatientProfile, ProfileBuilder, ProfileSet,
    RankingConfig, Result, Table, TwinConfig,
};

// Re-export similarity
pub use oncotwin_similarity::{
    field_similarity, BatchMatchResponse, FlatTable, MatchRecord, PairScore, RankMode, Ranker, ScoreSummary,
    SimilarityEngine, SimilarityMode, SingleMatchResponse,
};

// Re-export storage
pub use oncotwin_storage::{dump_profiles, load_config, ConfigPaths, InputDir, OutputWriter};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ColumnSubsets, DomainTables, Error, FieldWeights, ProfileBuilder, ProfileSet, RankingConfig, Result,
        Table, TwinConfig,
        MatchRecord, Ranker, ScoreSummary, SimilarityEngine,
        ConfigPaths, InputDir, OutputWriter,
    };
}
