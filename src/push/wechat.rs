// src/push/wechat.rs
//! Push-channel API surface. `PushChannel` is the seam the dispatcher works
//! against; `WeChatChannel` is the real implementation over the template
//! message endpoints.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Display color the template renders the title in.
pub const TITLE_COLOR: &str = "#23cdb6";

/// What one notification carries: the announcement title (rendered in the
/// fixed color) and the click-through link.
#[derive(Debug, Clone)]
pub struct NoticeCard {
    pub title: String,
    pub url: String,
}

#[async_trait::async_trait]
pub trait PushChannel: Send + Sync {
    /// Current subscriber identifiers. May legitimately be empty.
    async fn recipients(&self, token: &str) -> Result<Vec<String>>;
    /// Deliver one card to one recipient. A non-zero application error code
    /// is a failure even when the transport succeeded.
    async fn send(&self, token: &str, recipient: &str, card: &NoticeCard) -> Result<()>;
}

pub struct WeChatChannel {
    api_base: String,
    template_id: String,
    client: reqwest::Client,
}

impl WeChatChannel {
    pub fn new(api_base: String, template_id: String, client: reqwest::Client) -> Self {
        Self {
            api_base,
            template_id,
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserListResponse {
    #[serde(default)]
    errcode: i64,
    errmsg: Option<String>,
    data: Option<UserListData>,
}

#[derive(Debug, Deserialize)]
struct UserListData {
    #[serde(default)]
    openid: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    errcode: i64,
    errmsg: Option<String>,
}

#[async_trait::async_trait]
impl PushChannel for WeChatChannel {
    async fn recipients(&self, token: &str) -> Result<Vec<String>> {
        let url = format!("{}/cgi-bin/user/get?access_token={token}", self.api_base);
        let resp: UserListResponse = self
            .client
            .get(&url)
            .send()
            .await
            .context("user list request")?
            .error_for_status()
            .context("user list status")?
            .json()
            .await
            .context("user list body")?;

        if resp.errcode != 0 {
            bail!(
                "user list errcode {}: {}",
                resp.errcode,
                resp.errmsg.unwrap_or_default()
            );
        }
        Ok(resp.data.map(|d| d.openid).unwrap_or_default())
    }

    async fn send(&self, token: &str, recipient: &str, card: &NoticeCard) -> Result<()> {
        let url = format!(
            "{}/cgi-bin/message/template/send?access_token={token}",
            self.api_base
        );
        let body = serde_json::json!({
            "touser": recipient,
            "template_id": self.template_id,
            "url": card.url,
            "data": {
                "title": { "value": card.title, "color": TITLE_COLOR }
            }
        });

        let resp: SendResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("template send request")?
            .error_for_status()
            .context("template send status")?
            .json()
            .await
            .context("template send body")?;

        if resp.errcode != 0 {
            bail!(
                "template send errcode {}: {}",
                resp.errcode,
                resp.errmsg.unwrap_or_default()
            );
        }
        Ok(())
    }
}
