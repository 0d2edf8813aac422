#[macro_use]
extern crate log;

use std::io::Write;
use std::process::ExitCode;
use std::{env, thread};

use anyhow::{Context, Result};
use chrono::Local;
use env_logger::Env;
use structopt::StructOpt;

use crate::args::Args;
use crate::common::helpers::print_error_chain;
use crate::config::{Config, Dialect};
use crate::connection::{
    DatabaseConnection, DatabaseConnectionFactory, MySqlSchemaConnection, PgSchemaConnection,
};
use crate::error::PatchError;
use crate::patch::column_addition::{builtin_patches, ColumnAddition};
use crate::patch::patch_file::load_patch_file;
use crate::patch::patcher::SchemaPatcher;

mod args;
mod common;
mod config;
mod connection;
mod error;
mod patch;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let options = Args::from_args();

    initialize_logger(options.verbose, options.quiet);

    // Values already present in the environment win over .env
    dotenvy::dotenv().ok();

    let result = execute::<PgSchemaConnection, MySqlSchemaConnection, _>(&options, |key| {
        env::var(key).ok()
    })
    .await;

    ExitCode::from(report(result))
}

/// Prints the error chain of a failed run and returns the process exit status.
fn report(result: Result<()>) -> u8 {
    if let Err(errors) = result.with_context(|| "Schema patch failed") {
        print_error_chain(&errors);
        return 1;
    }

    0
}

/// Runs the patch with PostgreSQL targets handled by `P` and MySQL targets by `M`.
async fn execute<P, M, F>(options: &Args, lookup: F) -> Result<()>
where
    P: DatabaseConnection,
    M: DatabaseConnection,
    F: Fn(&str) -> Option<String>,
{
    let config = Config::load(options.database_url.clone(), lookup)?;
    let additions = load_additions(options)?;

    debug!("Column additions loaded: {}", additions.len());

    let patcher = SchemaPatcher::new(additions);

    if options.dry_run {
        for statement in patcher.plan(config.dialect()) {
            info!("{};", statement);
        }
        return Ok(());
    }

    match config.dialect() {
        Dialect::Postgres => run_patcher::<P>(config, patcher).await?,
        Dialect::MySql => run_patcher::<M>(config, patcher).await?,
    }

    Ok(())
}

fn load_additions(options: &Args) -> Result<Vec<ColumnAddition>, PatchError> {
    match &options.patches {
        Some(path) => load_patch_file(path),
        None => Ok(builtin_patches()),
    }
}

async fn run_patcher<C: DatabaseConnection>(
    config: Config,
    patcher: SchemaPatcher,
) -> Result<(), PatchError> {
    debug!("Connecting to {} database...", config.dialect());

    let factory = DatabaseConnectionFactory::<C>::new(config);
    let connection = factory
        .create_connection()
        .await
        .map_err(PatchError::Connectivity)?;

    patcher.run(connection).await?;

    Ok(())
}

fn initialize_logger(verbose: bool, quiet: bool) {
    // Set the `RUST_LOG` environment variable to control the logging level

    if quiet {
        env::set_var("RUST_LOG", "warn");
    } else {
        env::set_var("RUST_LOG", if verbose { "debug" } else { "info" });
    }

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("sqlx", log::LevelFilter::Error)
        .format(|buf, record| {
            let timestamp = Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "{} {:<5} [{}] - {}",
                timestamp,
                record.level(),
                thread::current().name().unwrap_or("<unnamed>"),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use async_trait::async_trait;
    use log::Level;

    use super::*;
    use crate::common::testing::{capture_logs, captured_logs};
    use crate::connection::SchemaConnection;

    thread_local! {
        static CONNECTS: Cell<usize> = Cell::new(0);
        static CLOSES: Cell<usize> = Cell::new(0);
    }

    /// Accepts every statement and counts connects and closes on the current thread.
    struct CountingConnection {
        dialect: Dialect,
    }

    #[async_trait]
    impl SchemaConnection for CountingConnection {
        fn dialect(&self) -> Dialect {
            self.dialect
        }

        async fn column_exists(
            &mut self,
            _table_name: &str,
            _column_name: &str,
        ) -> Result<bool, sqlx::Error> {
            Ok(false)
        }

        async fn execute(&mut self, _statement: &str) -> Result<(), sqlx::Error> {
            Ok(())
        }

        async fn close(self) -> Result<(), sqlx::Error> {
            CLOSES.with(|closes| closes.set(closes.get() + 1));
            Ok(())
        }
    }

    #[async_trait]
    impl DatabaseConnection for CountingConnection {
        async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
            CONNECTS.with(|connects| connects.set(connects.get() + 1));
            Ok(CountingConnection {
                dialect: config.dialect(),
            })
        }
    }

    fn counts() -> (usize, usize) {
        (CONNECTS.with(Cell::get), CLOSES.with(Cell::get))
    }

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["schema-patcher"];
        argv.extend_from_slice(extra);
        Args::from_iter(argv)
    }

    fn database_url(key: &str) -> Option<String> {
        (key == "DATABASE_URL").then(|| "postgres://app@localhost/fleet".to_string())
    }

    async fn execute_counting<F>(options: &Args, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        execute::<CountingConnection, CountingConnection, _>(options, lookup).await
    }

    #[tokio::test]
    async fn missing_database_url_exits_with_failure_before_connecting() {
        capture_logs();

        let result = execute_counting(&args(&[]), |_| None).await;

        match result.as_ref().map_err(|err| err.downcast_ref::<PatchError>()) {
            Err(Some(PatchError::Configuration(message))) => {
                assert_eq!(message, "DATABASE_URL is not set")
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
        assert_eq!(counts(), (0, 0));

        assert_eq!(report(result), 1);
        let logs = captured_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].0, Level::Error);
        assert!(logs[0].1.contains("DATABASE_URL is not set"));
    }

    #[tokio::test]
    async fn invalid_patch_file_fails_before_connecting() {
        let result = execute_counting(
            &args(&["--patches", "does-not-exist/patches.toml"]),
            database_url,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counts(), (0, 0));
        assert_eq!(report(result), 1);
    }

    #[tokio::test]
    async fn dry_run_never_connects() {
        capture_logs();

        let result = execute_counting(&args(&["--dry-run"]), database_url).await;

        assert!(result.is_ok());
        assert_eq!(counts(), (0, 0));

        let statements: Vec<String> = captured_logs()
            .into_iter()
            .map(|(_, message)| message)
            .collect();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("ALTER TABLE \"vehicle_images\""));
        assert!(statements[1].starts_with("ALTER TABLE \"vehicles\""));
    }

    #[tokio::test]
    async fn successful_run_connects_and_releases_once() {
        let result = execute_counting(&args(&[]), database_url).await;

        assert!(result.is_ok());
        assert_eq!(counts(), (1, 1));
        assert_eq!(report(result), 0);
    }

    #[tokio::test]
    async fn command_line_url_is_used_without_the_environment() {
        let result = execute_counting(
            &args(&["--database-url", "mysql://root@localhost/fleet"]),
            |_| None,
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(counts(), (1, 1));
    }
}
