use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Input data error in {source_name}: {reason}")]
    InputData { source_name: String, reason: String },

    #[error("Table {table} is missing configured column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Patient ID {0} not found in profiles")]
    UnknownPatient(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub fn input_data(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Error::InputData {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
