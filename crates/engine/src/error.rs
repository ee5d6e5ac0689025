use std::fmt;

#[derive(Debug)]
pub enum MergeError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, empty synonym entry, etc.).
    ConfigValidation(String),
    /// Missing required column in an input table. Fatal before any matching.
    MissingColumn { table: String, column: String },
    /// Duplicate identifier in the checklist.
    DuplicateTaxon { taxon_id: String },
    /// IO error (file read, output write, etc.).
    Io(String),
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { table, column } => {
                write!(f, "table '{table}': missing column '{column}'")
            }
            Self::DuplicateTaxon { taxon_id } => {
                write!(f, "checklist: duplicate taxon identifier '{taxon_id}'")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for MergeError {}
