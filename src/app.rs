// src/app.rs
//! Process bootstrap and the steady-state polling loop.

use anyhow::Result;
use chrono::NaiveDate;
use metrics::counter;
use std::time::Duration;

use crate::config::AppConfig;
use crate::ingest::scheduler::Rotation;
use crate::ingest::{self, providers, SeenSet};
use crate::push::{Dispatcher, NoticeCard, PushChannel, TokenHandle, TokenRefresher, WeChatChannel};
use crate::retry::RetryPolicy;

/// Wire the real collaborators and run forever. Two states only: wait for the
/// first usable credential (a provider failure here is fatal), then poll.
pub async fn run(cfg: AppConfig) -> Result<()> {
    ingest::ensure_metrics_described();

    let client = reqwest::Client::new();
    let mut token = TokenRefresher::spawn(&cfg.wechat, client.clone());
    token.wait_ready().await?;
    tracing::info!("access token obtained, starting rotation");

    let retry = cfg.retry.policy();
    let rotation = Rotation::new(providers::build(&cfg.sources, &client), retry, cfg.pacing.idle());
    let channel = WeChatChannel::new(
        cfg.wechat.api_base.clone(),
        cfg.wechat.template_id.clone(),
        client,
    );
    let dispatcher = Dispatcher::new(channel, retry, cfg.pacing.recipient_delay());

    let cutoff = ingest::startup_cutoff();
    tracing::info!(%cutoff, sources = cfg.sources.len(), "entering polling loop");

    run_loop(
        rotation,
        dispatcher,
        token,
        retry,
        cutoff,
        cfg.pacing.item_delay(),
    )
    .await;
    unreachable!("polling loop does not exit");
}

/// The steady Polling state. Pulls from the rotation, drops stale or
/// already-dispatched notices, and hands the rest to the dispatcher with
/// best-effort semantics: after the retry budget the notice is given up on,
/// and its URL is recorded either way so a permanently-failing item is never
/// retried across iterations.
pub async fn run_loop<C: PushChannel>(
    mut rotation: Rotation,
    dispatcher: Dispatcher<C>,
    token: TokenHandle,
    retry: RetryPolicy,
    cutoff: NaiveDate,
    item_delay: Duration,
) {
    let mut seen = SeenSet::default();
    loop {
        let notice = rotation.next().await;
        if !ingest::is_fresh(&notice.date, cutoff) || seen.contains(&notice.url) {
            continue;
        }

        let card = NoticeCard {
            title: notice.title.clone(),
            url: notice.url.clone(),
        };
        let outcome = retry.run(|| dispatcher.notify(&token, &card)).await;
        if outcome.is_exhausted() {
            tracing::debug!(url = %notice.url, "notification given up after retries");
        }

        seen.insert(notice.url.clone());
        counter!("watcher_notices_dispatched_total").increment(1);
        tracing::info!(title = %notice.title, url = %notice.url, "notice processed");

        tokio::time::sleep(item_delay).await;
    }
}
