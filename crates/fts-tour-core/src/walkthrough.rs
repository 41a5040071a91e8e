//! The SQLite full-text search walkthrough.
//!
//! Runs every step against one [`PersonStore`], narrating to any writer and
//! returning the search results so callers (and tests) can inspect them.

use crate::config::SqliteConfig;
use crate::index::{FtsConfig, FtsStats, MatchQuery};
use crate::narrate::Narrator;
use crate::sample::{embedded_persons, Person};
use crate::store::{PersonStore, SearchResult, SEARCH_LIKE, SQL_SCHEMA};
use crate::Result;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Options for a walkthrough run.
#[derive(Debug, Clone)]
pub struct TourOptions {
    /// Database location, `:memory:` for an ephemeral one.
    pub database: PathBuf,
    pub fts: FtsConfig,
}

impl Default for TourOptions {
    fn default() -> Self {
        Self {
            database: PathBuf::from(SqliteConfig::IN_MEMORY),
            fts: FtsConfig::default(),
        }
    }
}

/// Everything a walkthrough found, step by step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkthroughReport {
    pub imported: usize,
    pub like: SearchResult,
    pub prefix: SearchResult,
    pub term: SearchResult,
    pub phrase: SearchResult,
    pub all_of: SearchResult,
    pub any_of: SearchResult,
    pub excluding: SearchResult,
    pub after_insert: SearchResult,
    pub stats: FtsStats,
}

/// The fixed queries shown by the walkthrough.
pub struct DemoQueries;

impl DemoQueries {
    pub const LIKE_PATTERN: &'static str = "Ad%";

    pub fn prefix() -> MatchQuery {
        MatchQuery::prefix("Ad")
    }

    pub fn term() -> MatchQuery {
        MatchQuery::term("arden")
    }

    pub fn phrase() -> MatchQuery {
        MatchQuery::phrase(["Dillan", "King"])
    }

    pub fn all_of() -> MatchQuery {
        MatchQuery::And(vec![MatchQuery::term("King"), MatchQuery::term("Neva")])
    }

    pub fn any_of() -> MatchQuery {
        MatchQuery::Or(vec![MatchQuery::term("Neva"), MatchQuery::term("King")])
    }

    pub fn excluding() -> MatchQuery {
        MatchQuery::not(MatchQuery::term("King"), MatchQuery::term("Neva"))
    }
}

/// Walkthrough of SQLite's FTS3/FTS4 extension.
pub struct SqliteWalkthrough {
    options: TourOptions,
}

impl SqliteWalkthrough {
    pub fn new(options: TourOptions) -> Self {
        Self { options }
    }

    /// Open the store and load the sample data without narration.
    pub fn prepare(&self) -> Result<PersonStore> {
        let mut store = PersonStore::open(&self.options.database, self.options.fts.clone())?;
        store.reset()?;
        store.create_schema()?;
        store.insert_persons(&embedded_persons()?)?;
        store.fts().ensure_setup(store.connection())?;
        Ok(store)
    }

    /// Run every step, narrating to `out`.
    pub fn run<W: Write>(&self, out: W) -> Result<WalkthroughReport> {
        let mut n = Narrator::new(out);
        let module = self.options.fts.module;

        n.title("Your app needs search")?;
        n.text("Users expect to type a few words and get useful results back, quickly.")?;

        n.subtitle("First, a database")?;
        let mut store = PersonStore::open(&self.options.database, self.options.fts.clone())?;
        store.reset()?;
        match store.db_path() {
            Some(path) => n.explain(&format!("Using the database file {}", path.display()))?,
            None => n.explain("The database lives in memory and disappears on exit")?,
        }

        n.sql(SQL_SCHEMA)?;
        store.create_schema()?;

        let persons = embedded_persons()?;
        n.explain(&format!("Importing {} records..", persons.len()))?;
        let imported = store.insert_persons(&persons)?;
        n.done()?;

        n.explain("LIKE only goes so far")?;
        n.text(
            "
A LIKE query can find names or cities starting with some text, as an
auto-complete box would. Every searchable column needs its own condition,
a leading wildcard forces a full table scan, and there is no notion of
words, phrases or boolean logic.

Names and cities starting with 'Ad':
",
        )?;
        n.sql(SEARCH_LIKE)?;
        let like = store.search_like(DemoQueries::LIKE_PATTERN, DemoQueries::LIKE_PATTERN)?;
        n.rows(&like)?;

        n.title("Installing full-text search")?;
        n.explain("SQLite ships two full-text extensions: FTS3 and FTS4")?;
        n.text(&format!("This run uses {}.", module.as_str().to_uppercase()))?;
        n.explain("The index is a VIRTUAL TABLE created with the extension name")?;
        n.sql(&self.options.fts.create_table_sql())?;
        n.explain("One column holds the searchable text, the rest are for joining back")?;
        store.fts().create_table(store.connection())?;

        n.explain("The virtual table is filled with INSERTs from the indexed tables")?;
        n.explain("Fields are concatenated with a space so words stay apart")?;
        n.sql(&self.options.fts.populate_sql())?;
        store.fts().populate_from_persons(store.connection())?;
        n.done()?;

        n.explain("Triggers keep the index current after the initial copy")?;
        store.fts().create_triggers(store.connection())?;

        n.title("Searching with full-text search")?;
        n.explain("Searching is easy: use MATCH instead of LIKE")?;
        n.sql(&self.options.fts.search_sql())?;

        n.subtitle("Words starting with 'Ad', in any indexed field")?;
        let prefix = self.search(&mut n, &store, &DemoQueries::prefix())?;

        n.explain("A plain term matches whole words, whatever their case")?;
        n.subtitle("Search results for 'arden'")?;
        let term = self.search(&mut n, &store, &DemoQueries::term())?;
        n.text("'Gardena' and 'Gardens' are not hits: the index knows words, not substrings.")?;

        n.explain("Double quotes ask for a phrase: adjacent words, in order")?;
        n.subtitle("Search results for \"Dillan King\"")?;
        let phrase = self.search(&mut n, &store, &DemoQueries::phrase())?;

        n.subtitle("Set operations")?;
        n.explain("AND, OR and NOT work as in a web search engine")?;

        n.subtitle("Search results AND (words separated by a space)")?;
        let all_of = self.search(&mut n, &store, &DemoQueries::all_of())?;

        n.subtitle("Search results OR")?;
        let any_of = self.search(&mut n, &store, &DemoQueries::any_of())?;

        n.subtitle("Search results NOT")?;
        let excluding = self.search(&mut n, &store, &DemoQueries::excluding())?;

        n.title("Keeping the index up to date")?;
        let newcomer = Person {
            id: store.next_id()?,
            full_name: "Addie Arden".to_string(),
            city: "Fremont".to_string(),
            country: "United States".to_string(),
            phone: "510-555-0143".to_string(),
            street: "12 Elm Street".to_string(),
            email: "addie@arden.dev".to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        n.explain(&format!(
            "Inserting {} into {} only; the trigger updates the index",
            newcomer.full_name, SqliteConfig::PERSONS_TABLE
        ))?;
        store.insert_person(&newcomer)?;
        n.subtitle("Search results for 'arden' again")?;
        let after_insert = self.search(&mut n, &store, &DemoQueries::term())?;

        store.fts().optimize(store.connection())?;
        let stats = store.fts().get_stats(store.connection())?;
        n.text(&format!(
            "The {} index {} now holds {} rows.",
            stats.module, stats.table_name, stats.row_count
        ))?;

        n.title("Conclusion")?;
        n.text(
            "
SQLite plus full-text search is an easy way to give any app, web, mobile or
desktop, rich search.

The index lives inside the database, so there is no separate server, library
or API to run, keeping it current is a matter of triggers, and full-text
queries mix freely with regular SQL.

End users feel at home because the query language works like a web search
engine, and MATCH stays fast where LIKE needs a full scan.

Keep in mind the index is stored in the database and makes it larger.
",
        )?;
        n.flush()?;

        info!(
            "Walkthrough finished: {} records, {} index rows",
            imported, stats.row_count
        );

        Ok(WalkthroughReport {
            imported,
            like,
            prefix,
            term,
            phrase,
            all_of,
            any_of,
            excluding,
            after_insert,
            stats,
        })
    }

    fn search<W: Write>(
        &self,
        n: &mut Narrator<W>,
        store: &PersonStore,
        query: &MatchQuery,
    ) -> Result<SearchResult> {
        let result = store.search(query)?;
        n.rows(&result)?;
        Ok(result)
    }
}
