//! Success hook notification manager
//!
//! Pings a webhook (healthchecks.io, Uptime Kuma or any URL) once a backup
//! pass has completed.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{NotificationConfig, DEFAULT_HEALTHCHECKS_HOST};
use crate::managers::backup::BackupReport;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Notification manager for the success hook
pub struct NotificationManager {
    url: String,
    include_logs: bool,
}

/// Pick the hook URL from the configured targets
///
/// Priority: explicit URL, then healthchecks ID (on the configured or default
/// host), then Uptime Kuma push URL.
pub fn resolve_hook_url(config: &NotificationConfig) -> Option<String> {
    if let Some(url) = &config.success_hook_url {
        return Some(url.clone());
    }

    if let Some(id) = &config.healthchecks_id {
        let host = config
            .healthchecks_host
            .as_deref()
            .unwrap_or(DEFAULT_HEALTHCHECKS_HOST);
        return Some(format!("https://{}/{}", host, id));
    }

    config.uptime_kuma_url.clone()
}

impl NotificationManager {
    /// Create a notification manager if a hook target is configured
    pub fn from_config(config: &NotificationConfig) -> Option<Self> {
        resolve_hook_url(config).map(|url| Self::new(url, config.include_logs))
    }

    pub fn new(url: String, include_logs: bool) -> Self {
        Self { url, include_logs }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Report a completed pass
    ///
    /// Sends a GET, or a POST with one backed-up container name per line when
    /// logs are included. Non-2xx responses are returned as errors.
    pub fn notify(&self, report: &BackupReport) -> Result<()> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        let response = self
            .build_request(&client, report)
            .send()
            .context("Failed to send success hook")?;

        let status = response.status();
        if status.is_success() {
            info!("Success hook sent to {}", self.url);
            Ok(())
        } else {
            let body = response.text().unwrap_or_default();
            debug!("Success hook response body: {}", body);
            anyhow::bail!("Success hook failed with status {}", status)
        }
    }

    fn build_request(&self, client: &Client, report: &BackupReport) -> RequestBuilder {
        if self.include_logs {
            client.post(&self.url).body(build_body(report))
        } else {
            client.get(&self.url)
        }
    }
}

/// Newline-joined names of the containers backed up in this pass
pub fn build_body(report: &BackupReport) -> String {
    report.backed_up.join("\n")
}
