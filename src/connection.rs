use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection, Executor};

use crate::config::{Config, Dialect};

/// The operations a patch run needs from a live database connection.
#[async_trait]
pub trait SchemaConnection: Send + Sized {
    fn dialect(&self) -> Dialect;

    /// Looks the column up in the current schema. Only consulted for dialects
    /// without `ADD COLUMN IF NOT EXISTS`; guarded dialects never call it.
    async fn column_exists(
        &mut self,
        table_name: &str,
        column_name: &str,
    ) -> Result<bool, sqlx::Error>;

    async fn execute(&mut self, statement: &str) -> Result<(), sqlx::Error>;

    /// Releases the connection; consumes it so it cannot be used or closed again.
    async fn close(self) -> Result<(), sqlx::Error>;
}

#[async_trait]
pub trait DatabaseConnection: SchemaConnection {
    async fn connect(config: &Config) -> Result<Self, sqlx::Error>;
}

pub struct PgSchemaConnection {
    connection: PgConnection,
}

pub struct MySqlSchemaConnection {
    connection: MySqlConnection,
}

#[async_trait]
impl DatabaseConnection for PgSchemaConnection {
    async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let mut options: PgConnectOptions = config.database_url().parse()?;
        options.disable_statement_logging();

        let connection = options.connect().await?;

        Ok(PgSchemaConnection { connection })
    }
}

#[async_trait]
impl SchemaConnection for PgSchemaConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn column_exists(
        &mut self,
        table_name: &str,
        column_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let query = "SELECT COUNT(*) FROM information_schema.columns WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2";

        let count: i64 = sqlx::query_scalar(query)
            .bind(table_name)
            .bind(column_name)
            .fetch_one(&mut self.connection)
            .await?;

        Ok(count > 0)
    }

    async fn execute(&mut self, statement: &str) -> Result<(), sqlx::Error> {
        self.connection.execute(statement).await?;
        Ok(())
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.connection.close().await
    }
}

#[async_trait]
impl DatabaseConnection for MySqlSchemaConnection {
    async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let mut options: MySqlConnectOptions = config.database_url().parse()?;
        options.disable_statement_logging();

        let connection = options.connect().await?;

        Ok(MySqlSchemaConnection { connection })
    }
}

#[async_trait]
impl SchemaConnection for MySqlSchemaConnection {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn column_exists(
        &mut self,
        table_name: &str,
        column_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let query = "SELECT COUNT(*) FROM information_schema.columns WHERE table_schema = DATABASE() AND table_name = ? AND column_name = ?";

        let count: i64 = sqlx::query_scalar(query)
            .bind(table_name)
            .bind(column_name)
            .fetch_one(&mut self.connection)
            .await?;

        Ok(count > 0)
    }

    async fn execute(&mut self, statement: &str) -> Result<(), sqlx::Error> {
        self.connection.execute(statement).await?;
        Ok(())
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.connection.close().await
    }
}

pub struct DatabaseConnectionFactory<C: DatabaseConnection> {
    config: Config,
    connection_type: std::marker::PhantomData<C>,
}

impl<C: DatabaseConnection> DatabaseConnectionFactory<C> {
    pub fn new(config: Config) -> Self {
        DatabaseConnectionFactory {
            config,
            connection_type: std::marker::PhantomData,
        }
    }

    pub async fn create_connection(&self) -> Result<C, sqlx::Error> {
        C::connect(&self.config).await
    }
}
