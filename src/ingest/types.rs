// src/ingest/types.rs
use anyhow::Result;

/// One announcement entry scraped from a listing page. `url` is the dedup
/// identity; `date` stays a raw string as published (parsed only by the
/// freshness filter).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub url: String,
    pub date: String,
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    /// Fetch the current listing, newest first as published by the page.
    async fn fetch_batch(&self) -> Result<Vec<Notice>>;
    fn name(&self) -> &'static str;
}
