use thiserror::Error;

/// Failures that end a patch run.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to connect to the database")]
    Connectivity(#[source] sqlx::Error),

    #[error("Failed to release the database connection")]
    Release(#[source] sqlx::Error),

    #[error("Lost connection while adding column {column} to table {table}")]
    ConnectionLost {
        table: String,
        column: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to add column {column} to table {table}")]
    DdlExecution {
        table: String,
        column: String,
        #[source]
        source: sqlx::Error,
    },
}

impl PatchError {
    /// Classifies a driver error raised while a step was running.
    pub fn from_step(table: &str, column: &str, source: sqlx::Error) -> Self {
        let table = table.to_string();
        let column = column.to_string();

        match source {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::WorkerCrashed => PatchError::ConnectionLost {
                table,
                column,
                source,
            },
            source => PatchError::DdlExecution {
                table,
                column,
                source,
            },
        }
    }
}
