// src/ingest/providers/szu.rs
//! Parser for the university notice-board listing pages (考务 / 教务 lists
//! share this layout). Links are relative and get resolved against the page
//! URL; the datetime cell carries extra text around the date itself.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::ingest::types::{Notice, SourceProvider};

pub struct SzuProvider {
    url: String,
    client: reqwest::Client,
}

impl SzuProvider {
    pub fn new(url: String, client: reqwest::Client) -> Self {
        Self { url, client }
    }
}

fn date_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap())
}

/// Extract rows from `#content .articles ul li`. Titles are prefixed with a
/// decorative bullet on this layout; hrefs are site-relative paths.
pub fn parse_listing(html: &str, base: &Url) -> Vec<Notice> {
    let doc = Html::parse_document(html);
    let item_sel = Selector::parse("#content .articles ul li").unwrap();
    let link_sel = Selector::parse("a").unwrap();
    let time_sel = Selector::parse("span.datetime").unwrap();

    let mut out = Vec::new();
    for li in doc.select(&item_sel) {
        let Some(link) = li.select(&link_sel).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        let title = link
            .text()
            .collect::<String>()
            .replace('•', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let datetime = li
            .select(&time_sel)
            .next()
            .map(|t| t.text().collect::<String>())
            .unwrap_or_default();
        let date = date_re()
            .find(&datetime)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        out.push(Notice {
            title,
            url: resolved.to_string(),
            date,
        });
    }
    out
}

#[async_trait]
impl SourceProvider for SzuProvider {
    async fn fetch_batch(&self) -> Result<Vec<Notice>> {
        tracing::info!(url = %self.url, "fetching university notice listing");
        let base = Url::parse(&self.url).context("szu listing url")?;
        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("szu listing get")?
            .error_for_status()
            .context("szu listing status")?
            .text()
            .await
            .context("szu listing body")?;
        Ok(parse_listing(&body, &base))
    }

    fn name(&self) -> &'static str {
        "szu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body><div id="content"><div class="articles">
        <ul>
          <li><a href="/zk/content/101">• 关于2024年上半年考务安排的通知</a><span class="datetime">发布于 2024-03-05 10:00</span></li>
          <li><a href="/zk/content/102">•缓考申请流程</a><span class="datetime">2024-03-01</span></li>
        </ul>
        </div></div></body></html>"#;

    #[test]
    fn resolves_relative_links_and_strips_bullets() {
        let base = Url::parse("https://szu.example/zk/menu/29/list").unwrap();
        let notices = parse_listing(PAGE, &base);
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].url, "https://szu.example/zk/content/101");
        assert_eq!(notices[0].title, "关于2024年上半年考务安排的通知");
        assert_eq!(notices[0].date, "2024-03-05");
        assert_eq!(notices[1].title, "缓考申请流程");
        assert_eq!(notices[1].date, "2024-03-01");
    }

    #[test]
    fn missing_date_stays_empty() {
        let base = Url::parse("https://szu.example/zk/menu/29/list").unwrap();
        let html = r#"<div id="content"><div class="articles"><ul>
            <li><a href="/x">• 无日期公告</a></li></ul></div></div>"#;
        let notices = parse_listing(html, &base);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].date, "");
    }
}
