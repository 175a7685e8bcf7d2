use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AsymError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory Scan Error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML Parsing Error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Invalid partial-wave index b={0}, must be 0-11")]
    InvalidWaveIndex(i64),

    #[error("Only twist 2 or 3 supported, got twist={0}")]
    InvalidTwist(i32),

    #[error("Could not parse bin edges from path: {0:?}")]
    UnparseablePath(PathBuf),

    #[error("No configuration bins match '{pattern}'")]
    NoConfigBins { pattern: String },

    #[error("No reference record for pionPair={pion_pair} cfg={cfg} twist={twist} L={l} M={m}")]
    MissingRecord {
        pion_pair: String,
        cfg: String,
        twist: i32,
        l: i32,
        m: i32,
    },

    #[error("No records for {pion_pair}, twist={twist}, L={l}, M={m}")]
    NoRecords {
        pion_pair: String,
        twist: i32,
        l: i32,
        m: i32,
    },

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("Record missing field '{field}' ({context})")]
    MissingField { field: String, context: String },
}

pub type AsymResult<T> = Result<T, AsymError>;
