use std::fmt;

use crate::error::PatchError;

pub const DATABASE_URL: &str = "DATABASE_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
}

impl Dialect {
    /// Whether the engine accepts `ADD COLUMN IF NOT EXISTS`.
    pub fn supports_if_not_exists(&self) -> bool {
        match self {
            Dialect::Postgres => true,
            Dialect::MySql => false,
        }
    }

    fn from_url(url: &str) -> Option<Self> {
        let (scheme, _) = url.split_once("://")?;

        match scheme.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" | "mariadb" => Some(Dialect::MySql),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "PostgreSQL"),
            Dialect::MySql => write!(f, "MySQL"),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    database_url: String,
    dialect: Dialect,
}

impl Config {
    /// Resolves the connection target, preferring an explicit override over `lookup`.
    pub fn load<F>(database_url: Option<String>, lookup: F) -> Result<Self, PatchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match database_url {
            Some(url) => Self::from_url(url),
            None => Self::from_lookup(lookup),
        }
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, PatchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(DATABASE_URL).ok_or_else(|| {
            PatchError::Configuration(format!("{} is not set", DATABASE_URL))
        })?;

        Self::from_url(url)
    }

    pub fn from_url(url: String) -> Result<Self, PatchError> {
        let url = url.trim().to_string();

        if url.is_empty() {
            return Err(PatchError::Configuration(format!(
                "{} is empty",
                DATABASE_URL
            )));
        }

        let dialect = Dialect::from_url(&url).ok_or_else(|| {
            PatchError::Configuration(
                "Unsupported database URL scheme, expected postgres:// or mysql://".to_string(),
            )
        })?;

        Ok(Config {
            database_url: url,
            dialect,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

// Keeps credentials embedded in the URL out of debug output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"<redacted>")
            .field("dialect", &self.dialect)
            .finish()
    }
}
