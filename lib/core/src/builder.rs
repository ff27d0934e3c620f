//! Profile construction
//!
//! Building happens in two phases. Rows from the four domain tables are first
//! accumulated into growable per-patient maps; `finish` then backfills every
//! patient with empty sets for the full field-key universe and freezes the
//! result into a [`ProfileSet`].

use crate::config::ColumnSubsets;
use crate::domain::{Domain, PATIENT_ID};
use crate::profile::{PatientProfile, ProfileSet};
use crate::table::Table;
use crate::Result;
use ahash::AHashMap;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// The four domain tables of one run. Any of them may be absent.
#[derive(Debug, Clone, Default)]
pub struct DomainTables {
    pub snv: Option<Table>,
    pub cnv: Option<Table>,
    pub fusion: Option<Table>,
    pub clinical: Option<Table>,
}

impl DomainTables {
    pub fn get(&self, domain: Domain) -> Option<&Table> {
        match domain {
            Domain::Snv => self.snv.as_ref(),
            Domain::Cnv => self.cnv.as_ref(),
            Domain::Fusion => self.fusion.as_ref(),
            Domain::Clinical => self.clinical.as_ref(),
        }
    }

    pub fn set(&mut self, domain: Domain, table: Table) {
        let slot = match domain {
            Domain::Snv => &mut self.snv,
            Domain::Cnv => &mut self.cnv,
            Domain::Fusion => &mut self.fusion,
            Domain::Clinical => &mut self.clinical,
        };
        *slot = Some(table);
    }
}

/// Builds uniformly keyed patient profiles from domain tables
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    subsets: ColumnSubsets,
}

impl ProfileBuilder {
    pub fn new(subsets: ColumnSubsets) -> Self {
        Self { subsets }
    }

    pub fn subsets(&self) -> &ColumnSubsets {
        &self.subsets
    }

    /// Field keys every profile will carry, sorted
    pub fn field_universe(&self) -> Vec<String> {
        let keys: BTreeSet<String> = Domain::ALL
            .iter()
            .flat_map(|&domain| {
                self.value_columns(domain)
                    .map(move |column| domain.field_key(column))
            })
            .collect();
        keys.into_iter().collect()
    }

    fn value_columns(&self, domain: Domain) -> impl Iterator<Item = &str> {
        self.subsets
            .columns(domain)
            .iter()
            .map(String::as_str)
            .filter(|c| *c != PATIENT_ID)
    }

    /// Build profiles from the given tables
    ///
    /// Tables are expected to be normalized already (see
    /// [`Table::normalize`]); values are compared as exact strings.
    pub fn build(&self, tables: &DomainTables) -> Result<ProfileSet> {
        let mut acc = Accumulator::default();

        for domain in Domain::ALL {
            match tables.get(domain) {
                Some(table) => self.accumulate(domain, table, &mut acc)?,
                None => warn!("No {} table supplied, its fields will be empty", domain),
            }
        }

        let profiles = acc.finish(&self.field_universe());
        info!(
            "Built {} patient profiles over {} fields",
            profiles.len(),
            profiles.field_keys().len()
        );
        Ok(profiles)
    }

    fn accumulate(&self, domain: Domain, table: &Table, acc: &mut Accumulator) -> Result<()> {
        let id_idx = table.require_column(PATIENT_ID)?;
        let columns = self
            .value_columns(domain)
            .map(|column| -> Result<(String, usize)> {
                Ok((domain.field_key(column), table.require_column(column)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut skipped = 0usize;
        for row in table.rows() {
            let Some(patient_id) = row[id_idx].as_deref() else {
                skipped += 1;
                continue;
            };
            for (key, idx) in &columns {
                if let Some(value) = row[*idx].as_deref() {
                    acc.add(patient_id, key, value);
                }
            }
        }

        debug!(
            "Accumulated {} rows from {} table ({} without patient ID)",
            table.len(),
            domain,
            skipped
        );
        Ok(())
    }
}

/// Growable accumulation state; never leaves this module
#[derive(Default)]
struct Accumulator {
    order: Vec<String>,
    fields: AHashMap<String, AHashMap<String, BTreeSet<String>>>,
}

impl Accumulator {
    fn add(&mut self, patient_id: &str, key: &str, value: &str) {
        if !self.fields.contains_key(patient_id) {
            self.order.push(patient_id.to_string());
        }
        self.fields
            .entry(patient_id.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default()
            .insert(value.to_string());
    }

    fn finish(mut self, universe: &[String]) -> ProfileSet {
        let profiles = self
            .order
            .into_iter()
            .map(|patient_id| {
                let mut observed = self.fields.remove(&patient_id).unwrap_or_default();
                let fields: BTreeMap<String, BTreeSet<String>> = universe
                    .iter()
                    .map(|key| (key.clone(), observed.remove(key).unwrap_or_default()))
                    .collect();
                PatientProfile::new(patient_id, fields)
            })
            .collect();
        ProfileSet::new(profiles, universe.to_vec())
    }
}
