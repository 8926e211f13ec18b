//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::{Res, Void};

/// Configuration for the greeter-bot application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack bot token (`GREETER_BOT_SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Slack app-level token for Socket Mode (`GREETER_BOT_SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Channel that receives the bot's replies (`GREETER_BOT_REPLY_CHANNEL_ID`).
    pub reply_channel_id: String,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("GREETER_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Reject configurations with blank required values before any
    /// connection is attempted.
    fn validate(&self) -> Void {
        if self.slack_bot_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Slack bot token must not be empty."));
        }

        if self.slack_app_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Slack app token must not be empty."));
        }

        if self.reply_channel_id.trim().is_empty() {
            return Err(anyhow::anyhow!("Reply channel ID must not be empty."));
        }

        Ok(())
    }
}
