// src/ingest/scheduler.rs
use std::collections::VecDeque;
use std::time::Duration;

use metrics::counter;

use crate::ingest::types::{Notice, SourceProvider};
use crate::retry::{RetryOutcome, RetryPolicy};

struct Slot {
    provider: Box<dyn SourceProvider>,
    buffer: VecDeque<Notice>,
}

/// Merges N source providers into one infinite pull stream.
///
/// `next()` visits sources in strict rotation. A visit refetches a source only
/// when that source's buffer is empty, then yields at most one buffered item,
/// so a batch of k items is drained over k consecutive visits to that source.
/// The cursor advances on every visit; a source that keeps failing is still
/// polled each rotation. A full rotation that yields nothing puts the stream
/// to sleep for the idle interval before re-polling.
pub struct Rotation {
    slots: Vec<Slot>,
    cursor: usize,
    produced: bool,
    started: bool,
    retry: RetryPolicy,
    idle: Duration,
}

impl Rotation {
    pub fn new(providers: Vec<Box<dyn SourceProvider>>, retry: RetryPolicy, idle: Duration) -> Self {
        assert!(!providers.is_empty(), "rotation needs at least one source");
        Self {
            slots: providers
                .into_iter()
                .map(|provider| Slot {
                    provider,
                    buffer: VecDeque::new(),
                })
                .collect(),
            cursor: 0,
            produced: false,
            started: false,
            retry,
            idle,
        }
    }

    /// Pull the next notice, suspending through empty rotations. Never
    /// terminates; the process itself is the only cancellation point.
    pub async fn next(&mut self) -> Notice {
        loop {
            let idx = self.cursor;

            if idx == 0 {
                if self.started && !self.produced {
                    counter!("watcher_idle_rotations_total").increment(1);
                    tracing::debug!(idle_secs = self.idle.as_secs(), "rotation idle, sleeping");
                    tokio::time::sleep(self.idle).await;
                }
                self.started = true;
                self.produced = false;
            }

            if self.slots[idx].buffer.is_empty() {
                let batch = self.fetch_into(idx).await;
                self.slots[idx].buffer.extend(batch);
            }

            self.cursor = (self.cursor + 1) % self.slots.len();

            if let Some(notice) = self.slots[idx].buffer.pop_front() {
                self.produced = true;
                counter!("watcher_notices_total").increment(1);
                return notice;
            }
        }
    }

    /// Retry-wrapped fetch for one source; a fully exhausted retry budget
    /// degrades to an empty batch so the rotation keeps moving.
    async fn fetch_into(&self, idx: usize) -> Vec<Notice> {
        let retry = self.retry;
        let provider = &self.slots[idx].provider;
        match retry.run(|| provider.fetch_batch()).await {
            RetryOutcome::Ok(items) => items,
            RetryOutcome::Exhausted => {
                counter!("watcher_fetch_exhausted_total").increment(1);
                tracing::warn!(source = provider.name(), "fetch retries exhausted, treating as empty");
                Vec::new()
            }
        }
    }
}
