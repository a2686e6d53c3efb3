use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

use crate::config::EmailConfig;

#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Thin client for an HTTP mail relay. Delivery is best-effort: callers
/// dispatch through [`MailerClient::send_detached`] and never block a
/// request on the relay.
#[derive(Clone)]
pub struct MailerClient {
    client: Client,
    config: EmailConfig,
}

impl MailerClient {
    pub fn new(config: EmailConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build mail relay client")?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.config.enabled
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let message = RelayMessage {
            from: &self.config.from_address,
            to,
            subject,
            body,
        };

        let response = self
            .client
            .post(&self.config.relay_url)
            .bearer_auth(&self.config.relay_api_key)
            .json(&message)
            .send()
            .await
            .context("Mail relay request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Mail relay returned {}", response.status());
        }

        Ok(())
    }

    /// Fire-and-forget delivery on a spawned task. Relay failures are logged
    /// and swallowed so the calling request still succeeds.
    pub fn send_detached(&self, to: String, subject: String, body: String) {
        if !self.config.enabled {
            warn!("Email disabled, not sending '{subject}' to {to}");
            return;
        }

        let mailer = self.clone();
        tokio::spawn(async move {
            if let Err(err) = mailer.send(&to, &subject, &body).await {
                warn!("Failed to send '{subject}' to {to}: {err:#}");
            }
        });
    }
}
