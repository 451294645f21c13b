//! Grid submission to a remote collector.

use crate::config::ClientConfig;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use wordgrid_core::GridPayload;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("submit request failed: {0}")]
    Network(String),

    #[error("submit endpoint returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

/// POSTs `{"grid": [...]}` documents to a fixed URL.
pub struct GridSubmitter {
    http: reqwest::blocking::Client,
    url: String,
}

impl GridSubmitter {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SubmitError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SubmitError::Network(e.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// `None` when the config has no `submit_url`.
    pub fn from_config(config: &ClientConfig) -> Result<Option<Self>, SubmitError> {
        match config.submit_url.as_deref() {
            Some(url) if !url.trim().is_empty() => {
                Self::new(url, Duration::from_millis(config.timeout_ms)).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn submit(&self, payload: &GridPayload) -> Result<(), SubmitError> {
        let response = self
            .http
            .post(&self.url)
            .json(payload)
            .send()
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SubmitError::Http {
                status: status.as_u16(),
                body,
            });
        }
        info!(url = %self.url, cells = payload.grid.len(), "grid submitted");
        Ok(())
    }
}
