//! Centralized configuration for the walkthroughs.
//!
//! Fixed names used by the demonstration live here as associated constants,
//! the runtime knobs the CLI can override live in option structs with
//! `Default` implementations.

use crate::{Result, TourError};
use std::fmt;
use std::str::FromStr;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "fts-tour";
}

/// SQLite walkthrough constants.
pub struct SqliteConfig;

impl SqliteConfig {
    pub const IN_MEMORY: &'static str = ":memory:";
    pub const PERSONS_TABLE: &'static str = "Persons";
    pub const INDEX_TABLE: &'static str = "Persons_index";
    pub const BUSY_TIMEOUT_MS: u32 = 5000;
}

/// MongoDB walkthrough constants.
pub struct MongoConfig;

impl MongoConfig {
    pub const DEFAULT_URI: &'static str = "mongodb://localhost:27017";
    pub const DATABASE: &'static str = "some_db";
    pub const COLLECTION: &'static str = "some_collection";
    pub const TEXT_FIELD: &'static str = "textfield";
    pub const SAMPLE_TEXT: &'static str = "cool stuff in a doc";
    pub const DEFAULT_SEARCH: &'static str = "stuff";
    pub const URI_ENV: &'static str = "FTS_TOUR_MONGO_URI";
}

/// SQLite full-text extension used for the virtual table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FtsModule {
    Fts3,
    #[default]
    Fts4,
}

impl FtsModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            FtsModule::Fts3 => "fts3",
            FtsModule::Fts4 => "fts4",
        }
    }
}

impl fmt::Display for FtsModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FtsModule {
    type Err = TourError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fts3" => Ok(FtsModule::Fts3),
            "fts4" => Ok(FtsModule::Fts4),
            other => Err(TourError::Config {
                message: format!("unsupported full-text module '{}'", other),
            }),
        }
    }
}

/// Connection settings for the MongoDB walkthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoOptions {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub search: String,
    /// Drop the collection before inserting, so every run counts from zero.
    pub reset_collection: bool,
}

impl Default for MongoOptions {
    fn default() -> Self {
        Self {
            uri: MongoConfig::DEFAULT_URI.to_string(),
            database: MongoConfig::DATABASE.to_string(),
            collection: MongoConfig::COLLECTION.to_string(),
            search: MongoConfig::DEFAULT_SEARCH.to_string(),
            reset_collection: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fts_module_parse() {
        assert_eq!("fts4".parse::<FtsModule>().unwrap(), FtsModule::Fts4);
        assert_eq!(" FTS3 ".parse::<FtsModule>().unwrap(), FtsModule::Fts3);
        assert!("fts5".parse::<FtsModule>().is_err());
    }

    #[test]
    fn test_fts_module_default_is_fts4() {
        assert_eq!(FtsModule::default(), FtsModule::Fts4);
        assert_eq!(FtsModule::default().to_string(), "fts4");
    }

    #[test]
    fn test_mongo_defaults() {
        let options = MongoOptions::default();
        assert_eq!(options.database, "some_db");
        assert_eq!(options.collection, "some_collection");
        assert_eq!(options.search, "stuff");
        assert!(options.reset_collection);
    }
}
