use std::path::PathBuf;

use structopt::clap::AppSettings;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
name = "SchemaPatcher",
version = env ! ("CARGO_PKG_VERSION"),
about = "Adds the vehicle_images.vehicle_document_image and vehicles.is_verified columns to an existing database. Safe to run repeatedly.\n\nThe target database is read from DATABASE_URL (postgres:// or mysql://).",
setting = AppSettings::ColoredHelp,
)]
pub struct Args {
    /// Activate verbose mode
    #[structopt(short = "v", long = "verbose")]
    pub verbose: bool,

    /// Activate quiet mode
    #[structopt(short = "q", long = "quiet")]
    pub quiet: bool,

    /// Override DATABASE_URL
    #[structopt(long = "database-url")]
    pub database_url: Option<String>,

    /// Load column additions from a TOML file instead of the built-in set.
    /// Names are quoted as written, so they are case-sensitive on PostgreSQL
    #[structopt(short = "p", long = "patches", parse(from_os_str))]
    pub patches: Option<PathBuf>,

    /// Print the statements without connecting to the database
    #[structopt(short = "n", long = "dry-run")]
    pub dry_run: bool,
}
