use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Failed to {operation} table '{table}': {source}")]
    Unavailable {
        table: String,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Table '{table}' is corrupt: {message}")]
    Corrupt { table: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl StoreError {
    pub(crate) fn unavailable(table: &str, operation: &'static str, source: std::io::Error) -> Self {
        StoreError::Unavailable {
            table: table.to_string(),
            operation,
            source,
        }
    }

    /// True when the failure means the table itself is missing rather than unreadable
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::TableNotFound(_))
    }
}
