//! Domain table loading
//!
//! Each domain has a fixed file stem in the input directory and may be stored
//! as CSV (header row + data rows) or as a JSON array of row objects. CSV is
//! tried first.

use oncotwin_core::{Domain, DomainTables, Error, Result, Table, PATIENT_ID};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CNV column whose values are compared case-insensitively
pub const CNV_FUNCTION_COLUMN: &str = "functionCnv";

/// File stem of a domain's table in the input directory
pub fn table_stem(domain: Domain) -> &'static str {
    match domain {
        Domain::Snv => "snv_cdss_input",
        Domain::Cnv => "cnv_cdss_input",
        Domain::Fusion => "fusion_cdss_input",
        Domain::Clinical => "clinical_Details",
    }
}

/// Supported table file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "csv" => Some(TableFormat::Csv),
            "json" => Some(TableFormat::Json),
            _ => None,
        }
    }
}

/// Read a table file as-is, without normalization
pub fn read_table(path: &Path, name: &str) -> Result<Table> {
    let format = TableFormat::from_path(path)
        .ok_or_else(|| Error::input_data(path.display().to_string(), "unsupported table format"))?;
    match format {
        TableFormat::Csv => read_csv(path, name),
        TableFormat::Json => read_json(path, name),
    }
}

fn read_csv(path: &Path, name: &str) -> Result<Table> {
    let source = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| Error::input_data(&source, e))?;

    let columns = reader
        .headers()
        .map_err(|e| Error::input_data(&source, e))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut table = Table::new(name, columns);

    for record in reader.records() {
        let record = record.map_err(|e| Error::input_data(&source, e))?;
        let row = record
            .iter()
            .map(|cell| if cell.is_empty() { None } else { Some(cell.to_string()) })
            .collect();
        table.push_row(row)?;
    }
    Ok(table)
}

fn read_json(path: &Path, name: &str) -> Result<Table> {
    let source = path.display().to_string();
    let file = File::open(path).map_err(|e| Error::input_data(&source, e))?;
    let records: Vec<serde_json::Value> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::input_data(&source, e))?;
    Table::from_json_records(name, &records)
}

/// Apply the preprocessing every domain table receives before profiling
pub fn prepare_table(domain: Domain, table: &mut Table) -> Result<()> {
    table.normalize();
    match domain {
        Domain::Cnv => table.lowercase_column(CNV_FUNCTION_COLUMN),
        Domain::Clinical => {
            let removed = table.dedup_by_column(PATIENT_ID)?;
            if removed > 0 {
                debug!("Dropped {} duplicate clinical rows", removed);
            }
        }
        Domain::Snv | Domain::Fusion => {}
    }
    Ok(())
}

/// The four domain tables of a run directory
#[derive(Debug, Clone)]
pub struct InputDir {
    dir: PathBuf,
}

impl InputDir {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// First existing file for a domain, CSV before JSON
    pub fn locate(&self, domain: Domain) -> Option<PathBuf> {
        [TableFormat::Csv, TableFormat::Json]
            .iter()
            .map(|format| self.dir.join(format!("{}.{}", table_stem(domain), format.extension())))
            .find(|path| path.is_file())
    }

    /// Load and prepare one domain table. A missing file is an input error.
    pub fn load(&self, domain: Domain) -> Result<Table> {
        let path = self.locate(domain).ok_or_else(|| {
            Error::input_data(
                self.dir.join(table_stem(domain)).display().to_string(),
                "table file not found (expected .csv or .json)",
            )
        })?;
        let mut table = read_table(&path, domain.prefix())?;
        prepare_table(domain, &mut table)?;
        info!("Loaded {} rows from {:?}", table.len(), path);
        Ok(table)
    }

    /// Load all four tables; every one of them is required
    pub fn load_all(&self) -> Result<DomainTables> {
        let mut tables = DomainTables::default();
        for domain in Domain::ALL {
            tables.set(domain, self.load(domain)?);
        }
        Ok(tables)
    }
}
