//! SQLite person store with LIKE and full-text search.

use crate::config::SqliteConfig;
use crate::index::{FtsConfig, FtsManager, MatchQuery};
use crate::sample::Person;
use crate::{Result, TourError};
use rusqlite::{named_params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// DDL for the base table.
pub const SQL_SCHEMA: &str = "CREATE TABLE Persons(
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    FullName VARCHAR,
    City VARCHAR,
    Country VARCHAR,
    Phone VARCHAR,
    Street VARCHAR,
    Email VARCHAR,
    CreatedAt datetime
);";

/// Insert template with named parameters.
pub const SQL_INSERT: &str = "INSERT INTO Persons
    (City,Country,Phone,FullName,Id,Street,Email,CreatedAt)
VALUES
    (:City,:Country,:Phone,:FullName,:Id,:Street,:Email,:CreatedAt)";

/// Pattern search over names and cities.
pub const SEARCH_LIKE: &str = "SELECT FullName, City FROM Persons WHERE FullName LIKE :FullName OR City LIKE :City
ORDER BY FullName";

/// A row returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonHit {
    pub full_name: String,
    pub city: String,
}

impl fmt::Display for PersonHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name, self.city)
    }
}

/// Rows returned by one query, with the expression that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub rows: Vec<PersonHit>,
    pub total_count: usize,
    pub query_time_ms: f64,
    pub query: String,
}

impl SearchResult {
    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.full_name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Owner of the single connection a walkthrough uses.
pub struct PersonStore {
    db_path: Option<PathBuf>,
    conn: Connection,
    fts_config: FtsConfig,
}

impl PersonStore {
    /// Open an ephemeral in-memory database.
    pub fn open_in_memory(fts_config: FtsConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        debug!("Opened in-memory database");
        Ok(Self {
            db_path: None,
            conn,
            fts_config,
        })
    }

    /// Open a database file, or an in-memory one for `:memory:`.
    pub fn open(db_path: impl AsRef<Path>, fts_config: FtsConfig) -> Result<Self> {
        let db_path = db_path.as_ref();
        if db_path.as_os_str() == SqliteConfig::IN_MEMORY {
            return Self::open_in_memory(fts_config);
        }

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        conn.busy_timeout(std::time::Duration::from_millis(u64::from(
            SqliteConfig::BUSY_TIMEOUT_MS,
        )))?;
        info!("Opened database at {}", db_path.display());

        Ok(Self {
            db_path: Some(db_path.to_path_buf()),
            conn,
            fts_config,
        })
    }

    /// Database file path, `None` when in memory.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Manager for this store's full-text index.
    pub fn fts(&self) -> FtsManager<'_> {
        FtsManager::new(&self.fts_config)
    }

    /// Create the base table.
    pub fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(SQL_SCHEMA)?;
        debug!("Created Persons table");
        Ok(())
    }

    /// Drop the index and the base table, if present.
    ///
    /// Triggers go away with the base table.
    pub fn reset(&self) -> Result<()> {
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {};
             DROP TABLE IF EXISTS {};",
            self.fts_config.table_name, self.fts_config.source_table
        ))?;
        debug!("Reset database tables");
        Ok(())
    }

    /// The identifier the next inserted person should use.
    pub fn next_id(&self) -> Result<i64> {
        let id: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(Id), 0) + 1 FROM Persons",
            [],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Insert people in one transaction.
    pub fn insert_persons(&mut self, persons: &[Person]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(SQL_INSERT)?;
            for person in persons {
                stmt.execute(named_params! {
                    ":City": person.city,
                    ":Country": person.country,
                    ":Phone": person.phone,
                    ":FullName": person.full_name,
                    ":Id": person.id,
                    ":Street": person.street,
                    ":Email": person.email,
                    ":CreatedAt": person.created_at,
                })?;
            }
        }
        tx.commit()?;

        info!("Imported {} persons", persons.len());
        Ok(persons.len())
    }

    /// Insert a single person.
    pub fn insert_person(&mut self, person: &Person) -> Result<()> {
        self.insert_persons(std::slice::from_ref(person))?;
        Ok(())
    }

    /// Move a person to another city.
    pub fn update_city(&self, id: i64, city: &str) -> Result<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE Persons SET City = :City WHERE Id = :Id",
            named_params! { ":City": city, ":Id": id },
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a person by ID.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM Persons WHERE Id = :Id", named_params! { ":Id": id })?;

        if rows_affected > 0 {
            debug!("Deleted person: {}", id);
        }

        Ok(rows_affected > 0)
    }

    /// Get the count of people.
    pub fn count(&self) -> Result<usize> {
        let count: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM Persons", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Pattern search over names and cities.
    pub fn search_like(&self, name_pattern: &str, city_pattern: &str) -> Result<SearchResult> {
        let start = Instant::now();

        let mut stmt = self.conn.prepare(SEARCH_LIKE)?;
        let rows = stmt.query_map(
            named_params! { ":FullName": name_pattern, ":City": city_pattern },
            Self::row_to_hit,
        )?;
        let rows = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        let query = format!("FullName LIKE '{}' OR City LIKE '{}'", name_pattern, city_pattern);
        debug!("LIKE search [{}] returned {} rows", query, rows.len());

        Ok(SearchResult {
            total_count: rows.len(),
            rows,
            query_time_ms: start.elapsed().as_secs_f64() * 1000.0,
            query,
        })
    }

    /// Full-text search with a raw MATCH expression.
    pub fn search_match(&self, expr: &str) -> Result<SearchResult> {
        if expr.trim().is_empty() {
            return Err(TourError::validation("query", "empty MATCH expression"));
        }

        let fts = self.fts();
        if !fts.table_exists(&self.conn)? {
            return Err(TourError::IndexMissing {
                table: self.fts_config.table_name.clone(),
            });
        }

        let start = Instant::now();

        let mut stmt = self.conn.prepare(&self.fts_config.search_sql())?;
        let rows = stmt.query_map(named_params! { ":Content": expr }, Self::row_to_hit)?;
        let rows = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("MATCH search [{}] returned {} rows", expr, rows.len());

        Ok(SearchResult {
            total_count: rows.len(),
            rows,
            query_time_ms: start.elapsed().as_secs_f64() * 1000.0,
            query: expr.to_string(),
        })
    }

    /// Full-text search with a built query.
    pub fn search(&self, query: &MatchQuery) -> Result<SearchResult> {
        self.search_match(&query.to_match_string())
    }

    fn row_to_hit(row: &Row) -> rusqlite::Result<PersonHit> {
        Ok(PersonHit {
            full_name: row.get(0)?,
            city: row.get(1)?,
        })
    }
}
