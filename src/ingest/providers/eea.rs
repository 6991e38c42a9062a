// src/ingest/providers/eea.rs
//! Parser for the provincial education examination authority listing pages
//! (普通高考 / 自学考试 announcement lists share this layout).

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::ingest::types::{Notice, SourceProvider};

pub struct EeaProvider {
    url: String,
    client: reqwest::Client,
}

impl EeaProvider {
    pub fn new(url: String, client: reqwest::Client) -> Self {
        Self { url, client }
    }
}

/// Extract `{title, url, date}` rows from `.main .content ul.list li`.
/// Rows without a link are skipped; the feed occasionally carries decorative
/// list items.
pub fn parse_listing(html: &str) -> Vec<Notice> {
    let doc = Html::parse_document(html);
    let item_sel = Selector::parse(".main .content ul.list li").unwrap();
    let link_sel = Selector::parse("a").unwrap();
    let time_sel = Selector::parse("span.time").unwrap();

    let mut out = Vec::new();
    for li in doc.select(&item_sel) {
        let Some(link) = li.select(&link_sel).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let title = clean_text(&link.text().collect::<String>());
        let date = li
            .select(&time_sel)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        out.push(Notice {
            title,
            url: href.to_string(),
            date,
        });
    }
    out
}

fn clean_text(s: &str) -> String {
    html_escape::decode_html_entities(s)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl SourceProvider for EeaProvider {
    async fn fetch_batch(&self) -> Result<Vec<Notice>> {
        tracing::info!(url = %self.url, "fetching examination authority listing");
        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("eea listing get")?
            .error_for_status()
            .context("eea listing status")?
            .text()
            .await
            .context("eea listing body")?;
        Ok(parse_listing(&body))
    }

    fn name(&self) -> &'static str {
        "eea"
    }
}
