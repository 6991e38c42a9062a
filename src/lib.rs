// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod app;
pub mod config;
pub mod ingest;
pub mod push;
pub mod retry;

// ---- Re-exports for stable public API ----
pub use crate::ingest::types::{Notice, SourceProvider};
pub use crate::push::{Dispatcher, NoticeCard, PushChannel, TokenHandle};
pub use crate::retry::{RetryOutcome, RetryPolicy};
