//! Where finished records end up.

mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::product::ProductRecord;

pub use postgres::PgSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Durable destination for extracted records.
///
/// `save` is called concurrently from every unit of a run, so
/// implementations must tolerate parallel calls. Each call stores exactly one
/// record and is independent of every other call.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn save(&self, record: &ProductRecord) -> Result<(), SinkError>;
}
