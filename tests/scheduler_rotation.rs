// tests/scheduler_rotation.rs
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use notice_watcher::ingest::scheduler::Rotation;
use notice_watcher::{Notice, RetryPolicy, SourceProvider};
use tokio::time::Instant;

fn notice(url: &str) -> Notice {
    Notice {
        title: format!("notice {url}"),
        url: url.to_string(),
        date: "2024-03-05".to_string(),
    }
}

/// Returns one scripted batch per fetch (empty once the script runs out) and
/// records every fetch in a shared log.
struct ScriptedSource {
    name: &'static str,
    batches: Mutex<VecDeque<Result<Vec<Notice>, String>>>,
    fetch_log: Arc<Mutex<Vec<&'static str>>>,
}

impl ScriptedSource {
    fn new(
        name: &'static str,
        batches: Vec<Result<Vec<Notice>, String>>,
        fetch_log: Arc<Mutex<Vec<&'static str>>>,
    ) -> Box<Self> {
        Box::new(Self {
            name,
            batches: Mutex::new(batches.into_iter().collect()),
            fetch_log,
        })
    }
}

#[async_trait]
impl SourceProvider for ScriptedSource {
    async fn fetch_batch(&self) -> Result<Vec<Notice>> {
        self.fetch_log.lock().unwrap().push(self.name);
        match self.batches.lock().unwrap().pop_front() {
            Some(Ok(batch)) => Ok(batch),
            Some(Err(msg)) => anyhow::bail!(msg),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(1, Duration::from_millis(1))
}

#[tokio::test(start_paused = true)]
async fn visits_sources_in_strict_rotation_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        ScriptedSource::new(
            "a",
            vec![Ok(vec![notice("a1")]), Ok(vec![notice("a2")])],
            log.clone(),
        ),
        ScriptedSource::new(
            "b",
            vec![Ok(vec![notice("b1")]), Ok(vec![notice("b2")])],
            log.clone(),
        ),
        ScriptedSource::new(
            "c",
            vec![Ok(vec![notice("c1")]), Ok(vec![notice("c2")])],
            log.clone(),
        ),
    ];
    let mut rotation = Rotation::new(providers, fast_retry(), Duration::from_secs(3600));

    let mut urls = Vec::new();
    for _ in 0..6 {
        urls.push(rotation.next().await.url);
    }

    assert_eq!(urls, vec!["a1", "b1", "c1", "a2", "b2", "c2"]);
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c", "a", "b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn buffered_items_interleave_without_refetch() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        ScriptedSource::new(
            "a",
            vec![Ok(vec![notice("a1"), notice("a2")])],
            log.clone(),
        ),
        ScriptedSource::new("b", vec![Ok(vec![notice("b1")])], log.clone()),
    ];
    let mut rotation = Rotation::new(providers, fast_retry(), Duration::from_secs(3600));

    let mut urls = Vec::new();
    for _ in 0..3 {
        urls.push(rotation.next().await.url);
    }

    // a2 comes from a's buffer on its second visit, no second fetch of a yet
    assert_eq!(urls, vec!["a1", "b1", "a2"]);
    assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn empty_rotation_sleeps_then_repolls_every_source() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        ScriptedSource::new(
            "a",
            vec![Ok(vec![]), Ok(vec![notice("late")])],
            log.clone(),
        ),
        ScriptedSource::new("b", vec![Ok(vec![])], log.clone()),
    ];
    let idle = Duration::from_secs(3600);
    let mut rotation = Rotation::new(providers, fast_retry(), idle);

    let start = Instant::now();
    let got = rotation.next().await;

    assert_eq!(got.url, "late");
    assert!(start.elapsed() >= idle, "idle sleep must precede the re-poll");
    // first rotation polled both sources, second rotation started with a
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "a"]);
}

#[tokio::test(start_paused = true)]
async fn failing_source_is_polled_every_rotation() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        ScriptedSource::new(
            "down",
            vec![Err("503".into()), Err("503".into())],
            log.clone(),
        ),
        ScriptedSource::new(
            "up",
            vec![Ok(vec![notice("u1")]), Ok(vec![notice("u2")])],
            log.clone(),
        ),
    ];
    let mut rotation = Rotation::new(providers, fast_retry(), Duration::from_secs(3600));

    assert_eq!(rotation.next().await.url, "u1");
    assert_eq!(rotation.next().await.url, "u2");

    // the failing source was attempted at the head of both rotations
    assert_eq!(*log.lock().unwrap(), vec!["down", "up", "down", "up"]);
}
