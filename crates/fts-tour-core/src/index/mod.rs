//! SQLite full-text index over the person table.
//!
//! This module provides:
//! - FTS3/FTS4 virtual table setup, population and sync triggers
//! - MATCH expression building

mod fts;
mod query;

pub use fts::{FtsConfig, FtsManager, FtsStats};
pub use query::{escape_term, parse_user_query, MatchQuery};
