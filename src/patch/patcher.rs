use log::info;
use tokio::time::Instant;

use crate::config::Dialect;
use crate::connection::SchemaConnection;
use crate::error::PatchError;
use crate::patch::column_addition::ColumnAddition;
use crate::patch::patch_summary::PatchSummary;
use crate::patch::query::build_add_column_query;

/// Applies an ordered list of column additions over a single connection.
pub struct SchemaPatcher {
    additions: Vec<ColumnAddition>,
}

impl SchemaPatcher {
    pub fn new(additions: Vec<ColumnAddition>) -> Self {
        SchemaPatcher { additions }
    }

    /// Statements a run would issue against `dialect`, in order.
    pub fn plan(&self, dialect: Dialect) -> Vec<String> {
        let guarded = dialect.supports_if_not_exists();

        self.additions
            .iter()
            .map(|addition| build_add_column_query(dialect, addition, guarded))
            .collect()
    }

    /// Runs every addition and releases `connection` exactly once, whatever the outcome.
    pub async fn run<C: SchemaConnection>(
        self,
        mut connection: C,
    ) -> Result<PatchSummary, PatchError> {
        let start_time = Instant::now();

        let result = self.apply_all(&mut connection).await;

        debug!("Closing database connection");
        let closed = connection.close().await;

        match (result, closed) {
            (Ok(applied), Ok(())) => {
                let end_time = Instant::now();
                let summary = PatchSummary {
                    applied,
                    elapsed: end_time.saturating_duration_since(start_time),
                };

                debug!(
                    "Patched {} columns, took: {}s",
                    summary.applied,
                    summary.elapsed.as_secs_f32()
                );

                Ok(summary)
            }
            (Ok(_), Err(err)) => Err(PatchError::Release(err)),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                warn!("Failed to close database connection: {}", close_err);
                Err(err)
            }
        }
    }

    async fn apply_all<C: SchemaConnection>(
        &self,
        connection: &mut C,
    ) -> Result<usize, PatchError> {
        for addition in &self.additions {
            apply_addition(connection, addition).await?;
        }

        Ok(self.additions.len())
    }
}

async fn apply_addition<C: SchemaConnection>(
    connection: &mut C,
    addition: &ColumnAddition,
) -> Result<(), PatchError> {
    let table_name = addition.table_name.as_str();
    let column_name = addition.column_name.as_str();
    let dialect = connection.dialect();

    info!("Adding column {} to table {}...", column_name, table_name);

    let step_error = |err| PatchError::from_step(table_name, column_name, err);

    if dialect.supports_if_not_exists() {
        let query = build_add_column_query(dialect, addition, true);
        connection.execute(&query).await.map_err(step_error)?;
    } else {
        let exists = connection
            .column_exists(table_name, column_name)
            .await
            .map_err(step_error)?;

        if exists {
            debug!("Column {}.{} already present", table_name, column_name);
        } else {
            let query = build_add_column_query(dialect, addition, false);
            connection.execute(&query).await.map_err(step_error)?;
        }
    }

    info!("Done: {}.{}", table_name, column_name);

    Ok(())
}
