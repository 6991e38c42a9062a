// src/push/dispatch.rs
use anyhow::{bail, Result};
use metrics::counter;
use std::time::Duration;

use crate::push::token::TokenHandle;
use crate::push::wechat::{NoticeCard, PushChannel};
use crate::retry::{RetryOutcome, RetryPolicy};

/// Fans one notice out to every subscriber, one send at a time with a pacing
/// sleep in between. Sequential on purpose: the template endpoint rate-limits
/// per call, and the pacing keeps this process under that limit.
pub struct Dispatcher<C> {
    channel: C,
    retry: RetryPolicy,
    recipient_delay: Duration,
}

impl<C: PushChannel> Dispatcher<C> {
    pub fn new(channel: C, retry: RetryPolicy, recipient_delay: Duration) -> Self {
        Self {
            channel,
            retry,
            recipient_delay,
        }
    }

    /// Deliver `card` to the full current audience.
    ///
    /// The recipient list is fetched fresh (retry-wrapped) on every call; an
    /// empty audience is a successful no-op. A failed send aborts the rest of
    /// the audience and fails the whole call — the retry wrapper at the outer
    /// call site then restarts the loop from the first recipient, so earlier
    /// recipients can receive the same card twice. The token is re-read from
    /// the handle before each API call.
    pub async fn notify(&self, token: &TokenHandle, card: &NoticeCard) -> Result<()> {
        let recipients = match self
            .retry
            .run(|| {
                let tok = token.current();
                async move { self.channel.recipients(&tok).await }
            })
            .await
        {
            RetryOutcome::Ok(list) => list,
            RetryOutcome::Exhausted => bail!("recipient list unavailable"),
        };

        if recipients.is_empty() {
            tracing::warn!("no subscribers, skipping notification");
            return Ok(());
        }

        let last = recipients.len() - 1;
        for (i, recipient) in recipients.iter().enumerate() {
            counter!("watcher_sends_total").increment(1);
            self.channel.send(&token.current(), recipient, card).await?;
            if i != last {
                tokio::time::sleep(self.recipient_delay).await;
            }
        }
        Ok(())
    }
}
