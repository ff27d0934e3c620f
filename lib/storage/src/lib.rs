pub mod config;
pub mod tables;
pub mod writer;

pub use config::{load_config, load_subsets, load_weights, ConfigPaths, SUBSETS_FILE, WEIGHTS_FILE};
pub use tables::{prepare_table, read_table, table_stem, InputDir, TableFormat};
pub use writer::{dump_profiles, OutputWriter, BATCH_CSV_NAME, BATCH_JSON_NAME};
