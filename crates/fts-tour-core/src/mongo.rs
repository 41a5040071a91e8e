//! The MongoDB text index walkthrough.

use crate::config::{MongoConfig, MongoOptions};
use crate::narrate::Narrator;
use crate::Result;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection, IndexModel};
use std::io::Write;
use tracing::{debug, info};

/// Walkthrough of MongoDB's `$text` search.
pub struct MongoWalkthrough {
    options: MongoOptions,
}

impl MongoWalkthrough {
    pub fn new(options: MongoOptions) -> Self {
        Self { options }
    }

    async fn collection(&self) -> Result<Collection<Document>> {
        let client = Client::with_uri_str(&self.options.uri).await?;
        debug!("Connected to {}", self.options.uri);
        Ok(client
            .database(&self.options.database)
            .collection::<Document>(&self.options.collection))
    }

    /// Insert one document, index it, search it, and return the hit count.
    pub async fn run<W: Write>(&self, out: W) -> Result<u64> {
        let mut n = Narrator::new(out);
        let collection = self.collection().await?;

        n.title("Full-text search in MongoDB")?;
        n.explain(&format!(
            "Collection {}.{}",
            self.options.database, self.options.collection
        ))?;

        if self.options.reset_collection {
            collection.drop().await?;
            debug!("Dropped collection {}", self.options.collection);
        }

        let mut document = Document::new();
        document.insert(MongoConfig::TEXT_FIELD, MongoConfig::SAMPLE_TEXT);
        n.explain(&format!("Inserting {}", document))?;
        collection.insert_one(document).await?;

        n.explain(&format!(
            "Creating a text index on '{}'",
            MongoConfig::TEXT_FIELD
        ))?;
        let mut keys = Document::new();
        keys.insert(MongoConfig::TEXT_FIELD, "text");
        let index = IndexModel::builder().keys(keys).build();
        collection.create_index(index).await?;

        let search = self.options.search.as_str();
        let filter = doc! { "$text": { "$search": search } };
        n.explain(&format!("Counting documents matching {}", filter))?;
        let count = collection.count_documents(filter).await?;

        n.text(&count.to_string())?;
        n.flush()?;

        info!(
            "MongoDB text search for '{}' matched {} documents",
            self.options.search, count
        );
        Ok(count)
    }
}
