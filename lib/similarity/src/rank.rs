//! Top-N twin ranking
//!
//! Drives [`SimilarityEngine`] over query patients and keeps the best
//! candidates for each.
//!
//! Batch mode sweeps every patient in parallel on the rayon pool; each query
//! produces its own record list and the lists are concatenated in query
//! order. Profiles and weights are shared read-only, so no locking is
//! involved.

use crate::engine::SimilarityEngine;
use crate::explain::MatchRecord;
use oncotwin_core::{Error, PatientProfile, ProfileSet, RankingConfig, Result};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use std::cmp::Reverse;
use tracing::{debug, info};

/// How pairs without a usable score are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMode {
    /// Unscorable pairs are omitted
    Batch,
    /// Unscorable pairs are kept with score 0
    Single,
}

/// A candidate and its normalized score, by position in the profile set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCandidate {
    pub candidate: usize,
    pub score: f64,
}

/// Ranks candidates for query patients
#[derive(Debug, Clone)]
pub struct Ranker {
    engine: SimilarityEngine,
    config: RankingConfig,
    doctor_id: Option<i64>,
}

impl Ranker {
    pub fn new(engine: SimilarityEngine, config: RankingConfig) -> Self {
        Self {
            engine,
            config,
            doctor_id: None,
        }
    }

    /// Tag every emitted record with a doctor ID
    pub fn with_doctor_id(mut self, doctor_id: Option<i64>) -> Self {
        self.doctor_id = doctor_id;
        self
    }

    pub fn engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Score one query against every other patient, sort by descending score
    /// and keep the top `limit`. Ties keep enumeration order.
    pub(crate) fn sweep(
        &self,
        profiles: &ProfileSet,
        query_idx: usize,
        query_max_score: f64,
        mode: RankMode,
        limit: usize,
    ) -> Vec<RankedCandidate> {
        let all = profiles.as_slice();
        let query = &all[query_idx];

        let mut scored: Vec<RankedCandidate> = all
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != query_idx)
            .filter_map(|(j, candidate)| {
                let score = match (self.engine.normalized_score(query, candidate, query_max_score), mode) {
                    (Some(score), _) => score,
                    (None, RankMode::Single) => 0.0,
                    (None, RankMode::Batch) => return None,
                };
                Some(RankedCandidate { candidate: j, score })
            })
            .collect();

        scored.sort_by_key(|c| Reverse(OrderedFloat(c.score)));
        scored.truncate(limit);
        scored
    }

    /// Whether any configured signal field is populated on the query side
    fn has_signal(&self, query: &PatientProfile) -> bool {
        self.config.signal_fields.iter().any(|f| query.is_populated(f))
    }

    fn rank_query(&self, profiles: &ProfileSet, query_idx: usize, query_max_score: f64) -> Vec<MatchRecord> {
        let query = &profiles.as_slice()[query_idx];
        if !self.has_signal(query) {
            return Vec::new();
        }

        self.sweep(profiles, query_idx, query_max_score, RankMode::Batch, self.config.top_n)
            .into_iter()
            .filter(|c| c.score != 0.0)
            .map(|c| {
                let candidate = &profiles.as_slice()[c.candidate];
                MatchRecord::new(query, candidate, c.score, self.doctor_id)
            })
            .collect()
    }

    /// Rank every patient against all others.
    ///
    /// Per query the top `top_n` scorable candidates are kept, then records
    /// scoring exactly 0 are dropped, as are all records of a query whose
    /// signal fields are all empty.
    pub fn rank_all(&self, profiles: &ProfileSet) -> Vec<MatchRecord> {
        info!(
            "Matching {} patients on {} threads",
            profiles.len(),
            rayon::current_num_threads()
        );
        let max_scores = self.engine.max_scores(profiles);

        let per_query: Vec<Vec<MatchRecord>> = (0..profiles.len())
            .into_par_iter()
            .map(|i| self.rank_query(profiles, i, max_scores[i]))
            .collect();

        let records: Vec<MatchRecord> = per_query.into_iter().flatten().collect();
        info!("Batch ranking produced {} match records", records.len());
        records
    }

    /// Rank candidates for one patient.
    ///
    /// Unscorable pairs stay in the output with score 0 and no signal filter
    /// is applied.
    pub fn rank_one(&self, profiles: &ProfileSet, query_id: &str) -> Result<Vec<MatchRecord>> {
        let query_idx = profiles
            .position(query_id)
            .ok_or_else(|| Error::UnknownPatient(query_id.to_string()))?;
        let query = &profiles.as_slice()[query_idx];
        let max_score = self.engine.max_score(query);
        debug!("Query {} has max score {}", query_id, max_score);

        let records: Vec<MatchRecord> = self
            .sweep(profiles, query_idx, max_score, RankMode::Single, self.config.single_top_n)
            .into_iter()
            .map(|c| {
                let candidate = &profiles.as_slice()[c.candidate];
                MatchRecord::new(query, candidate, c.score, self.doctor_id)
            })
            .collect();

        info!("Found {} matches for patient {}", records.len(), query_id);
        Ok(records)
    }
}
