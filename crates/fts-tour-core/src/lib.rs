//! fts-tour core - walkthroughs of database full-text search.
//!
//! The SQLite walkthrough loads an embedded dataset of people into an
//! in-memory database, compares `LIKE` with an FTS4 virtual table, and runs
//! prefix, term, phrase and boolean `MATCH` queries. The MongoDB walkthrough
//! (feature `mongo`) shows the equivalent `$text` search.
//!
//! # Example
//!
//! ```rust,no_run
//! use fts_tour_core::{SqliteWalkthrough, TourOptions};
//!
//! fn main() -> fts_tour_core::Result<()> {
//!     let report = SqliteWalkthrough::new(TourOptions::default()).run(std::io::stdout())?;
//!     println!("{} people matched 'Ad*'", report.prefix.total_count);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod narrate;
pub mod sample;
pub mod store;
pub mod walkthrough;

#[cfg(feature = "mongo")]
pub mod mongo;

// Re-export commonly used types
pub use config::{FtsModule, MongoOptions};
pub use error::{Result, TourError};
pub use index::{parse_user_query, FtsConfig, FtsManager, FtsStats, MatchQuery};
pub use narrate::Narrator;
pub use sample::{embedded_persons, read_persons, Person};
pub use store::{PersonHit, PersonStore, SearchResult};
pub use walkthrough::{DemoQueries, SqliteWalkthrough, TourOptions, WalkthroughReport};

#[cfg(feature = "mongo")]
pub use mongo::MongoWalkthrough;
