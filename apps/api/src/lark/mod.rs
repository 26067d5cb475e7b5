//! Lark Base access.
//!
//! Handlers talk to tables through [`RecordStore`]; [`LarkClient`] is the HTTP
//! implementation and owns the tenant access token cache.

pub mod client;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod oauth;

use async_trait::async_trait;
use thiserror::Error;

pub use client::LarkClient;
pub use models::Record;

use crate::schema::FlatFields;

#[derive(Debug, Error)]
pub enum LarkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Lark API error {code}: {msg}")]
    Api { code: i64, msg: String },

    #[error("Unexpected Lark response: {0}")]
    Decode(String),
}

/// Row-level operations on Base tables.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All rows whose `field` equals `value`, across every result page.
    async fn search(
        &self,
        table_id: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Record>, LarkError>;

    async fn create(&self, table_id: &str, fields: FlatFields) -> Result<Record, LarkError>;

    async fn update(
        &self,
        table_id: &str,
        record_id: &str,
        fields: FlatFields,
    ) -> Result<Record, LarkError>;

    async fn find_one(
        &self,
        table_id: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>, LarkError> {
        Ok(self.search(table_id, field, value).await?.into_iter().next())
    }

    /// Updates the first row keyed by `field = value`, or creates one.
    async fn upsert(
        &self,
        table_id: &str,
        field: &str,
        value: &str,
        fields: FlatFields,
    ) -> Result<Record, LarkError> {
        match self.find_one(table_id, field, value).await? {
            Some(existing) => self.update(table_id, &existing.record_id, fields).await,
            None => self.create(table_id, fields).await,
        }
    }
}
