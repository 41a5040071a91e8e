//! FTS3/FTS4 virtual table setup and management.

use crate::config::{FtsModule, SqliteConfig};
use crate::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for the full-text virtual table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtsConfig {
    /// Name of the virtual table.
    pub table_name: String,
    /// Name of the base table the index is built from.
    pub source_table: String,
    /// Full-text extension backing the virtual table.
    pub module: FtsModule,
}

impl Default for FtsConfig {
    fn default() -> Self {
        Self {
            table_name: SqliteConfig::INDEX_TABLE.to_string(),
            source_table: SqliteConfig::PERSONS_TABLE.to_string(),
            module: FtsModule::default(),
        }
    }
}

impl FtsConfig {
    /// DDL creating the virtual table.
    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE VIRTUAL TABLE {} USING {}(personId INT, content);",
            self.table_name, self.module
        )
    }

    /// Bulk copy of the base table into the index.
    pub fn populate_sql(&self) -> String {
        format!(
            "INSERT INTO {} (personId, content)
SELECT Id, FullName || ' ' || City || ' ' || Country || ' ' || Street
    FROM {}",
            self.table_name, self.source_table
        )
    }

    /// Query joining MATCH hits back to the base table.
    pub fn search_sql(&self) -> String {
        format!(
            "SELECT FullName, City FROM {} WHERE Id IN (
  SELECT personId FROM {} WHERE content MATCH :Content
)
ORDER BY FullName",
            self.source_table, self.table_name
        )
    }
}

/// Statistics about a full-text index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FtsStats {
    pub table_name: String,
    pub module: String,
    pub row_count: usize,
}

/// Manager for full-text index setup and maintenance.
pub struct FtsManager<'a> {
    config: &'a FtsConfig,
}

impl<'a> FtsManager<'a> {
    /// Create a new manager.
    pub fn new(config: &'a FtsConfig) -> Self {
        Self { config }
    }

    /// Check if the virtual table exists.
    pub fn table_exists(&self, conn: &Connection) -> Result<bool> {
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [&self.config.table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Check if the sync triggers exist.
    pub fn triggers_exist(&self, conn: &Connection) -> Result<bool> {
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='trigger' AND name IN (?1, ?2, ?3)",
            [
                self.trigger_name("ai"),
                self.trigger_name("au"),
                self.trigger_name("ad"),
            ],
            |row| row.get(0),
        )?;
        Ok(count == 3)
    }

    /// Ensure the index exists, is populated and stays in sync.
    pub fn ensure_setup(&self, conn: &Connection) -> Result<()> {
        if !self.table_exists(conn)? {
            self.create_table(conn)?;
            self.populate_from_persons(conn)?;
        } else if !self.triggers_exist(conn)? {
            // Rows may have changed while nothing kept the index current
            self.populate_from_persons(conn)?;
        }

        self.create_triggers(conn)?;
        Ok(())
    }

    /// Create the virtual table.
    pub fn create_table(&self, conn: &Connection) -> Result<()> {
        conn.execute(&self.config.create_table_sql(), [])?;
        info!(
            "Created {} table: {}",
            self.config.module, self.config.table_name
        );
        Ok(())
    }

    /// Replace the index content with a fresh copy of the base table.
    pub fn populate_from_persons(&self, conn: &Connection) -> Result<usize> {
        conn.execute_batch(&format!("DELETE FROM {};", self.config.table_name))?;
        let inserted = conn.execute(&self.config.populate_sql(), [])?;
        info!(
            "Populated {} with {} rows from {}",
            self.config.table_name, inserted, self.config.source_table
        );
        Ok(inserted)
    }

    /// Create triggers keeping the index in sync with the base table.
    pub fn create_triggers(&self, conn: &Connection) -> Result<()> {
        let table = &self.config.table_name;
        let source = &self.config.source_table;

        let insert_trigger = format!(
            "CREATE TRIGGER IF NOT EXISTS {} AFTER INSERT ON {} BEGIN
                INSERT INTO {} (personId, content)
                VALUES (
                    NEW.Id,
                    NEW.FullName || ' ' || NEW.City || ' ' || NEW.Country || ' ' || NEW.Street
                );
            END",
            self.trigger_name("ai"),
            source,
            table
        );
        conn.execute(&insert_trigger, [])?;

        let update_trigger = format!(
            "CREATE TRIGGER IF NOT EXISTS {} AFTER UPDATE ON {} BEGIN
                DELETE FROM {} WHERE personId = OLD.Id;
                INSERT INTO {} (personId, content)
                VALUES (
                    NEW.Id,
                    NEW.FullName || ' ' || NEW.City || ' ' || NEW.Country || ' ' || NEW.Street
                );
            END",
            self.trigger_name("au"),
            source,
            table,
            table
        );
        conn.execute(&update_trigger, [])?;

        let delete_trigger = format!(
            "CREATE TRIGGER IF NOT EXISTS {} AFTER DELETE ON {} BEGIN
                DELETE FROM {} WHERE personId = OLD.Id;
            END",
            self.trigger_name("ad"),
            source,
            table
        );
        conn.execute(&delete_trigger, [])?;

        debug!("Created sync triggers for {}", table);
        Ok(())
    }

    /// Drop and recreate the index, its triggers and its content.
    pub fn rebuild(&self, conn: &Connection) -> Result<()> {
        for suffix in ["ai", "au", "ad"] {
            conn.execute(
                &format!("DROP TRIGGER IF EXISTS {}", self.trigger_name(suffix)),
                [],
            )?;
        }
        conn.execute(
            &format!("DROP TABLE IF EXISTS {}", self.config.table_name),
            [],
        )?;

        self.create_table(conn)?;
        self.populate_from_persons(conn)?;
        self.create_triggers(conn)?;

        info!("Rebuilt full-text index {}", self.config.table_name);
        Ok(())
    }

    /// Merge the index b-trees into one.
    pub fn optimize(&self, conn: &Connection) -> Result<()> {
        let sql = format!(
            "INSERT INTO {}({}) VALUES('optimize')",
            self.config.table_name, self.config.table_name
        );
        conn.execute(&sql, [])?;
        debug!("Optimized full-text index {}", self.config.table_name);
        Ok(())
    }

    /// Get statistics about the index.
    pub fn get_stats(&self, conn: &Connection) -> Result<FtsStats> {
        let row_count: usize = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.config.table_name),
            [],
            |row| row.get(0),
        )?;

        Ok(FtsStats {
            table_name: self.config.table_name.clone(),
            module: self.config.module.to_string(),
            row_count,
        })
    }

    fn trigger_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.config.table_name, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_db() -> (Connection, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let conn = Connection::open(&db_path).unwrap();

        conn.execute(
            "CREATE TABLE Persons (
                Id INTEGER PRIMARY KEY AUTOINCREMENT,
                FullName VARCHAR,
                City VARCHAR,
                Country VARCHAR,
                Phone VARCHAR,
                Street VARCHAR,
                Email VARCHAR,
                CreatedAt datetime
            )",
            [],
        )
        .unwrap();

        (conn, temp_dir)
    }

    fn insert_person(conn: &Connection, id: i64, name: &str, city: &str) {
        conn.execute(
            "INSERT INTO Persons (Id, FullName, City, Country, Street)
             VALUES (?1, ?2, ?3, 'Norway', '1 Main Street')",
            rusqlite::params![id, name, city],
        )
        .unwrap();
    }

    fn matching_ids(conn: &Connection, expr: &str) -> Vec<i64> {
        let mut stmt = conn
            .prepare(
                "SELECT personId FROM Persons_index WHERE content MATCH ?1 ORDER BY personId",
            )
            .unwrap();
        stmt.query_map([expr], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<i64>>>()
            .unwrap()
    }

    #[test]
    fn test_sql_templates() {
        let config = FtsConfig::default();
        assert_eq!(
            config.create_table_sql(),
            "CREATE VIRTUAL TABLE Persons_index USING fts4(personId INT, content);"
        );
        assert!(config.search_sql().contains("content MATCH :Content"));
        assert!(config.populate_sql().starts_with("INSERT INTO Persons_index"));
    }

    #[test]
    fn test_fts_setup() {
        let (conn, _temp) = create_test_db();
        let config = FtsConfig::default();
        let manager = FtsManager::new(&config);

        assert!(!manager.table_exists(&conn).unwrap());

        manager.ensure_setup(&conn).unwrap();

        assert!(manager.table_exists(&conn).unwrap());
        assert!(manager.triggers_exist(&conn).unwrap());
    }

    #[test]
    fn test_populate_copies_existing_rows() {
        let (conn, _temp) = create_test_db();
        insert_person(&conn, 1, "Arden Wolf", "Oslo");
        insert_person(&conn, 2, "Neva King", "Bergen");

        let config = FtsConfig::default();
        let manager = FtsManager::new(&config);
        manager.create_table(&conn).unwrap();
        assert_eq!(manager.populate_from_persons(&conn).unwrap(), 2);

        // Populating twice must not duplicate rows
        assert_eq!(manager.populate_from_persons(&conn).unwrap(), 2);
        assert_eq!(manager.get_stats(&conn).unwrap().row_count, 2);
        assert_eq!(matching_ids(&conn, "arden"), vec![1]);
    }

    #[test]
    fn test_triggers_track_changes() {
        let (conn, _temp) = create_test_db();
        let config = FtsConfig::default();
        let manager = FtsManager::new(&config);
        manager.ensure_setup(&conn).unwrap();

        insert_person(&conn, 7, "Arden Wolf", "Oslo");
        assert_eq!(matching_ids(&conn, "arden"), vec![7]);

        conn.execute("UPDATE Persons SET City = 'Neva' WHERE Id = 7", [])
            .unwrap();
        assert!(matching_ids(&conn, "oslo").is_empty());
        assert_eq!(matching_ids(&conn, "neva"), vec![7]);

        conn.execute("DELETE FROM Persons WHERE Id = 7", []).unwrap();
        assert!(matching_ids(&conn, "arden").is_empty());
        assert_eq!(manager.get_stats(&conn).unwrap().row_count, 0);
    }

    #[test]
    fn test_fts3_module() {
        let (conn, _temp) = create_test_db();
        insert_person(&conn, 1, "Dillan King", "Oslo");

        let config = FtsConfig {
            module: FtsModule::Fts3,
            ..FtsConfig::default()
        };
        let manager = FtsManager::new(&config);
        manager.ensure_setup(&conn).unwrap();

        let stats = manager.get_stats(&conn).unwrap();
        assert_eq!(stats.module, "fts3");
        assert_eq!(stats.row_count, 1);
        assert_eq!(matching_ids(&conn, "\"dillan king\""), vec![1]);
    }

    #[test]
    fn test_rebuild_and_optimize() {
        let (conn, _temp) = create_test_db();
        let config = FtsConfig::default();
        let manager = FtsManager::new(&config);
        manager.ensure_setup(&conn).unwrap();

        insert_person(&conn, 1, "Neva Ortiz", "Adelaide");

        manager.rebuild(&conn).unwrap();
        assert!(manager.table_exists(&conn).unwrap());
        assert!(manager.triggers_exist(&conn).unwrap());
        assert_eq!(manager.get_stats(&conn).unwrap().row_count, 1);

        manager.optimize(&conn).unwrap();
        assert_eq!(matching_ids(&conn, "Ad*"), vec![1]);
    }
}
