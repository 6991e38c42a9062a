// src/ingest/providers/mod.rs
pub mod eea;
pub mod szu;

use crate::config::{SourceCfg, SourceKind};
use crate::ingest::types::SourceProvider;

/// Map configured listing pages onto their parser family. Similar pages share
/// one parser, so several sources may be the same provider type with
/// different URLs.
pub fn build(sources: &[SourceCfg], client: &reqwest::Client) -> Vec<Box<dyn SourceProvider>> {
    sources
        .iter()
        .map(|s| match s.kind {
            SourceKind::Eea => {
                Box::new(eea::EeaProvider::new(s.url.clone(), client.clone())) as Box<dyn SourceProvider>
            }
            SourceKind::Szu => {
                Box::new(szu::SzuProvider::new(s.url.clone(), client.clone())) as Box<dyn SourceProvider>
            }
        })
        .collect()
}
