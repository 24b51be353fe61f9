#![cfg(feature = "runtime")]

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::debug;

use crate::source::{DocumentSource, SourceError};
use crate::value::{FieldValue, Record};

/// How long the driver may spend finding a usable server before giving up.
pub const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// A [`DocumentSource`] backed by one MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoSource {
    client: Client,
    database: Database,
}

impl MongoSource {
    /// Connects and pings the server. The database named in the URI wins over
    /// `fallback_database`.
    pub async fn connect(uri: &str, fallback_database: &str) -> Result<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .context("invalid MongoDB connection string")?;
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);

        let client = Client::with_options(options).context("failed to build MongoDB client")?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(fallback_database));

        database
            .run_command(doc! { "ping": 1 })
            .await
            .with_context(|| format!("failed to reach MongoDB database '{}'", database.name()))?;

        Ok(Self { client, database })
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    pub async fn collection_names(&self) -> Result<Vec<String>> {
        self.database
            .list_collection_names()
            .await
            .context("failed to list collections")
    }

    /// Closes the client, waiting for in-flight operations.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

#[async_trait]
impl DocumentSource for MongoSource {
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Record>, SourceError> {
        let cursor = self
            .database
            .collection::<Document>(collection)
            .find(doc! {})
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        debug!(collection, count = documents.len(), "fetched documents");
        Ok(documents.iter().map(record_from_document).collect())
    }
}

pub fn record_from_document(document: &Document) -> Record {
    document
        .iter()
        .map(|(key, value)| (key.clone(), field_from_bson(value)))
        .collect()
}

pub fn field_from_bson(value: &Bson) -> FieldValue {
    match value {
        Bson::Null | Bson::Undefined => FieldValue::Null,
        Bson::Boolean(b) => FieldValue::Bool(*b),
        Bson::Int32(i) => FieldValue::Integer(i64::from(*i)),
        Bson::Int64(i) => FieldValue::Integer(*i),
        Bson::Double(f) => FieldValue::Float(*f),
        Bson::String(s) | Bson::Symbol(s) | Bson::JavaScriptCode(s) => FieldValue::Text(s.clone()),
        Bson::ObjectId(oid) => FieldValue::Reference(oid.to_hex()),
        Bson::DateTime(dt) => DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
            .map(FieldValue::Timestamp)
            .unwrap_or_else(|| FieldValue::Text(dt.to_string())),
        Bson::Timestamp(ts) => DateTime::<Utc>::from_timestamp(i64::from(ts.time), 0)
            .map(FieldValue::Timestamp)
            .unwrap_or(FieldValue::Null),
        Bson::Binary(binary) => FieldValue::Binary(binary.bytes.clone()),
        Bson::Document(child) => FieldValue::Nested(record_from_document(child)),
        Bson::Array(items) => FieldValue::list(items.iter().map(field_from_bson).collect()),
        Bson::JavaScriptCodeWithScope(code) => FieldValue::Text(code.code.clone()),
        Bson::RegularExpression(regex) => {
            FieldValue::Text(format!("/{}/{}", regex.pattern, regex.options))
        }
        other => FieldValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use mongodb::bson::spec::BinarySubtype;
    use mongodb::bson::Binary;

    #[test]
    fn converts_special_bson_types() {
        let oid = ObjectId::new();
        let document = doc! {
            "_id": oid,
            "createdAt": mongodb::bson::DateTime::from_millis(1_740_821_400_000),
            "poster": Binary { subtype: BinarySubtype::Generic, bytes: vec![1, 2, 3] },
            "members": [{ "name": "A" }],
            "tags": ["x", "y"],
            "age": 21_i32,
        };

        let record = record_from_document(&document);

        assert_eq!(record.get("_id"), Some(&FieldValue::Reference(oid.to_hex())));
        assert!(matches!(record.get("createdAt"), Some(FieldValue::Timestamp(_))));
        assert_eq!(record.get("poster"), Some(&FieldValue::Binary(vec![1, 2, 3])));
        assert!(matches!(record.get("members"), Some(FieldValue::RecordList(_))));
        assert!(matches!(record.get("tags"), Some(FieldValue::ScalarList(_))));
        assert_eq!(record.get("age"), Some(&FieldValue::Integer(21)));
    }
}
