// src/push/token.rs
//! Background access-token refresher for the push channel. The rest of the
//! system never fetches tokens itself; it waits for the first valid one at
//! startup and reads the latest value at dispatch time.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::watch;

use crate::config::WeChatCfg;

#[derive(Debug, Clone)]
pub enum TokenState {
    Pending,
    Ready(String),
    Failed(String),
}

/// Read side of the refresher. Clones share the same underlying channel.
#[derive(Clone)]
pub struct TokenHandle {
    rx: watch::Receiver<TokenState>,
}

impl TokenHandle {
    /// Block until the provider publishes its first token. A provider failure
    /// before that point is fatal: without a usable credential there is
    /// nothing to start.
    pub async fn wait_ready(&mut self) -> Result<()> {
        loop {
            {
                let state = self.rx.borrow_and_update();
                match &*state {
                    TokenState::Ready(_) => return Ok(()),
                    TokenState::Failed(e) => bail!("credential provider failed at startup: {e}"),
                    TokenState::Pending => {}
                }
            }
            self.rx
                .changed()
                .await
                .context("credential provider task stopped")?;
        }
    }

    /// Latest token value. Empty until the first refresh lands; callers go
    /// through `wait_ready` before dispatching, so they never observe that.
    pub fn current(&self) -> String {
        match &*self.rx.borrow() {
            TokenState::Ready(t) => t.clone(),
            _ => String::new(),
        }
    }

    /// Handle pre-seeded with a fixed token, for wiring tests. The sender is
    /// dropped; readers only ever observe the `Ready` value.
    pub fn fixed(token: &str) -> Self {
        let (_tx, rx) = watch::channel(TokenState::Ready(token.to_string()));
        Self { rx }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    #[serde(default)]
    errcode: i64,
    errmsg: Option<String>,
}

pub struct TokenRefresher;

impl TokenRefresher {
    /// Spawn the refresh loop and hand back the read side. The task fetches a
    /// `client_credential` token, publishes it, and sleeps until shortly
    /// before expiry. Refresh failures after the first success keep the last
    /// good token and retry on a short interval.
    pub fn spawn(cfg: &WeChatCfg, client: reqwest::Client) -> TokenHandle {
        let (tx, rx) = watch::channel(TokenState::Pending);
        let cfg = cfg.clone();
        tokio::spawn(async move {
            refresh_loop(tx, cfg, client).await;
        });
        TokenHandle { rx }
    }
}

async fn refresh_loop(tx: watch::Sender<TokenState>, cfg: WeChatCfg, client: reqwest::Client) {
    let mut obtained_once = false;
    loop {
        match fetch_token(&client, &cfg).await {
            Ok((token, expires_in)) => {
                obtained_once = true;
                if tx.send(TokenState::Ready(token)).is_err() {
                    return;
                }
                // renew with headroom before the platform expires the token
                let renew_in = expires_in.saturating_sub(300).max(60);
                tracing::debug!(renew_in, "access token refreshed");
                tokio::time::sleep(Duration::from_secs(renew_in)).await;
            }
            Err(e) if !obtained_once => {
                tracing::error!(error = %e, "could not obtain initial access token");
                let _ = tx.send(TokenState::Failed(e.to_string()));
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed, keeping previous token");
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        }
    }
}

async fn fetch_token(client: &reqwest::Client, cfg: &WeChatCfg) -> Result<(String, u64)> {
    let url = format!(
        "{}/cgi-bin/token?grant_type=client_credential&appid={}&secret={}",
        cfg.api_base, cfg.app_id, cfg.app_secret
    );
    let resp: TokenResponse = client
        .get(&url)
        .send()
        .await
        .context("token request")?
        .error_for_status()
        .context("token status")?
        .json()
        .await
        .context("token body")?;

    if resp.errcode != 0 {
        bail!(
            "token endpoint errcode {}: {}",
            resp.errcode,
            resp.errmsg.unwrap_or_default()
        );
    }
    match resp.access_token {
        Some(t) => Ok((t, resp.expires_in.unwrap_or(7200))),
        None => bail!("token endpoint returned no access_token"),
    }
}
