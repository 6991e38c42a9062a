// src/config.rs
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PATH: &str = "WATCHER_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/watcher.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub wechat: WeChatCfg,
    #[serde(default)]
    pub pacing: PacingCfg,
    #[serde(default)]
    pub retry: RetryCfg,
    pub sources: Vec<SourceCfg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeChatCfg {
    /// Overridable via WECHAT_APP_ID / WECHAT_APP_SECRET so secrets can stay
    /// out of the config file.
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_secret: String,
    pub template_id: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PacingCfg {
    /// Sleep after a rotation in which no source produced anything.
    pub idle_secs: u64,
    /// Sleep between two dispatched notices.
    pub item_delay_secs: u64,
    /// Sleep between two recipients of the same notice.
    pub recipient_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RetryCfg {
    pub attempts: u32,
    pub base_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceCfg {
    pub kind: SourceKind,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Eea,
    Szu,
}

fn default_api_base() -> String {
    "https://api.weixin.qq.com".to_string()
}

impl Default for PacingCfg {
    fn default() -> Self {
        Self {
            idle_secs: 3600,
            item_delay_secs: 5,
            recipient_delay_ms: 1000,
        }
    }
}

impl Default for RetryCfg {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 500,
        }
    }
}

impl PacingCfg {
    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }
    pub fn item_delay(&self) -> Duration {
        Duration::from_secs(self.item_delay_secs)
    }
    pub fn recipient_delay(&self) -> Duration {
        Duration::from_millis(self.recipient_delay_ms)
    }
}

impl RetryCfg {
    pub fn policy(&self) -> crate::retry::RetryPolicy {
        crate::retry::RetryPolicy::new(self.attempts, Duration::from_millis(self.base_delay_ms))
    }
}

/// Load config from an explicit path.
pub fn load_from(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let mut cfg: AppConfig = toml::from_str(&content)
        .with_context(|| format!("parsing config from {}", path.display()))?;

    if let Ok(v) = std::env::var("WECHAT_APP_ID") {
        cfg.wechat.app_id = v;
    }
    if let Ok(v) = std::env::var("WECHAT_APP_SECRET") {
        cfg.wechat.app_secret = v;
    }

    if cfg.wechat.app_id.is_empty() || cfg.wechat.app_secret.is_empty() {
        bail!("wechat app_id/app_secret missing (config file or WECHAT_APP_ID/WECHAT_APP_SECRET)");
    }
    if cfg.sources.is_empty() {
        bail!("no [[sources]] configured");
    }
    Ok(cfg)
}

/// Load config using `$WATCHER_CONFIG_PATH`, falling back to
/// `config/watcher.toml`.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var(ENV_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_PATH));
    load_from(&path)
}
