use thiserror::Error;

pub type InsightsResult<T> = Result<T, InsightsError>;

/// Failures that stop a run. Per-record problems never surface here; they are
/// skipped and counted by the scoring and aggregation passes instead.
#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The CSV itself is malformed (bad quoting, ragged row, ...).
    #[error("CSV parse error at line {line}: {message}")]
    Csv { line: u64, message: String },

    /// A column the views depend on is absent from the header row.
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl InsightsError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }
}
