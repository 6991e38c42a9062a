// src/ingest/mod.rs
pub mod providers;
pub mod scheduler;
pub mod types;

use chrono::NaiveDate;
use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time metrics registration.
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("watcher_notices_total", "Notices pulled from the rotation.");
        describe_counter!(
            "watcher_notices_dispatched_total",
            "Notices that reached the dispatcher (after dedup + cutoff)."
        );
        describe_counter!(
            "watcher_fetch_exhausted_total",
            "Source fetches that failed through the whole retry budget."
        );
        describe_counter!(
            "watcher_idle_rotations_total",
            "Full rotations that yielded nothing and triggered the idle sleep."
        );
        describe_counter!("watcher_sends_total", "Individual recipient sends attempted.");
        describe_gauge!(
            "watcher_seen_urls",
            "Size of the in-memory seen-URL set."
        );
    });
}

/// URLs already dispatched this process lifetime. Append-only and unbounded;
/// acceptable at the scale of a handful of listing pages.
#[derive(Debug, Default)]
pub struct SeenSet {
    urls: HashSet<String>,
}

impl SeenSet {
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn insert(&mut self, url: String) {
        self.urls.insert(url);
        metrics::gauge!("watcher_seen_urls").set(self.urls.len() as f64);
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Start-of-day (local) at process launch. Notices dated before this are
/// permanently ignored.
pub fn startup_cutoff() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// A notice dated strictly before the cutoff is stale. Dates the page
/// published in an unexpected shape are kept rather than silently dropped.
pub fn is_fresh(date: &str, cutoff: NaiveDate) -> bool {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => d >= cutoff,
        Err(_) => true,
    }
}
