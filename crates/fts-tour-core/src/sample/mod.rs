//! Embedded sample dataset.
//!
//! The dataset is a small CSV of fictional people, compiled into the binary so
//! a walkthrough never touches the filesystem.

use crate::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Raw CSV text of the embedded dataset.
pub const PERSONS_CSV: &str = include_str!("persons.csv");

/// A person row as loaded from the sample data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Full Name")]
    pub full_name: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Street")]
    pub street: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Created At")]
    pub created_at: NaiveDateTime,
}

impl Person {
    /// The text the full-text index stores for this person.
    pub fn index_content(&self) -> String {
        format!(
            "{} {} {} {}",
            self.full_name, self.city, self.country, self.street
        )
    }
}

/// Parse CSV text with a header row into people.
pub fn read_persons(csv_data: &str) -> Result<Vec<Person>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let mut persons = Vec::new();
    for row in reader.deserialize() {
        persons.push(row?);
    }
    Ok(persons)
}

/// Load the embedded dataset.
pub fn embedded_persons() -> Result<Vec<Person>> {
    read_persons(PERSONS_CSV)
}
