// Match output and profile dumps, written atomically
use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use oncotwin_core::ProfileSet;
use oncotwin_similarity::{
    BatchMatchResponse, FlatTable, MatchRecord, SingleMatchResponse, BATCH_SCORE_COLUMN, SCORE_COLUMN,
};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name for a single-query JSON document
pub fn single_json_name(query_id: &str) -> String {
    format!("matches_{}.json", query_id)
}

/// File name for a single-query flat table
pub fn single_csv_name(query_id: &str) -> String {
    format!("matches_scoring_{}.csv", query_id)
}

pub const BATCH_JSON_NAME: &str = "matches_consolidated.json";
pub const BATCH_CSV_NAME: &str = "matches_scoring_consolidated.csv";

fn write_atomic<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> io::Result<()>,
{
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            let mut out = BufWriter::new(f);
            body(&mut out)?;
            out.flush()
        })
        .with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}

/// Serialize a value as pretty JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, |out| {
        serde_json::to_writer_pretty(&mut *out, value)?;
        out.write_all(b"\n")
    })
}

/// Write a flat table as CSV with a header row
pub fn write_csv(path: &Path, table: &FlatTable) -> Result<()> {
    write_atomic(path, |out| {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(&table.header)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()
    })
}

/// Writes run results into an output directory
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_context(|| format!("failed to create output directory {:?}", dir))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_single_json(&self, query_id: &str, records: &[MatchRecord]) -> Result<PathBuf> {
        let path = self.dir.join(single_json_name(query_id));
        write_json(&path, &SingleMatchResponse::from_records(query_id, records))?;
        info!("Wrote {} matches to {:?}", records.len(), path);
        Ok(path)
    }

    pub fn write_single_csv(&self, query_id: &str, records: &[MatchRecord], profiles: &ProfileSet) -> Result<PathBuf> {
        let path = self.dir.join(single_csv_name(query_id));
        write_csv(&path, &FlatTable::from_records(records, profiles, SCORE_COLUMN))?;
        info!("Wrote {} matches to {:?}", records.len(), path);
        Ok(path)
    }

    pub fn write_batch_json(&self, records: &[MatchRecord]) -> Result<PathBuf> {
        let path = self.dir.join(BATCH_JSON_NAME);
        write_json(&path, &BatchMatchResponse::from_records(records))?;
        info!("Wrote {} matches to {:?}", records.len(), path);
        Ok(path)
    }

    pub fn write_batch_csv(&self, records: &[MatchRecord], profiles: &ProfileSet) -> Result<PathBuf> {
        let path = self.dir.join(BATCH_CSV_NAME);
        write_csv(&path, &FlatTable::from_records(records, profiles, BATCH_SCORE_COLUMN))?;
        info!("Wrote {} matches to {:?}", records.len(), path);
        Ok(path)
    }
}

/// Dump every profile as `{patientID}.json`, field key to value list
pub fn dump_profiles<P: AsRef<Path>>(dir: P, profiles: &ProfileSet) -> Result<usize> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("failed to create dump directory {:?}", dir))?;
    for profile in profiles {
        let path = dir.join(format!("{}.json", profile.patient_id()));
        write_json(&path, profile.field_map())?;
    }
    debug!("Dumped {} profiles to {:?}", profiles.len(), dir);
    Ok(profiles.len())
}
