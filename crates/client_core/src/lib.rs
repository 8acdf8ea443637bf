use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{multipart::Form, Client};
use shared::{
    error::SubmissionFailed,
    protocol::{ResponseMode, SubmissionPayload, WireFormat, MESSAGE_FIELD, NAME_FIELD},
};
use tracing::{info, warn};
use url::Url;

pub mod bridge;
pub mod config;
pub mod controller;

pub use config::{load_settings, Settings};
pub use controller::{FormController, FormView, SubmitOutcome};

/// Delivers one payload to the collector. Implementations must perform at
/// most one outbound attempt per call and never retry on their own.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmissionFailed>;
}

#[async_trait]
impl<T> SubmissionClient for Arc<T>
where
    T: SubmissionClient + ?Sized,
{
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmissionFailed> {
        (**self).submit(payload).await
    }
}

pub struct HttpSubmissionClient {
    http: Client,
    endpoint: Url,
    wire_format: WireFormat,
    response_mode: ResponseMode,
}

impl HttpSubmissionClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let endpoint = settings.endpoint_url()?;
        let timeout = settings.timeout()?;
        Self::with_options(endpoint, settings.wire_format, settings.response_mode, timeout)
    }

    pub fn with_options(
        endpoint: Url,
        wire_format: WireFormat,
        response_mode: ResponseMode,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build submission http client")?;
        Ok(Self {
            http,
            endpoint,
            wire_format,
            response_mode,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionClient for HttpSubmissionClient {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmissionFailed> {
        let request = self.http.post(self.endpoint.clone());
        let request = match self.wire_format {
            WireFormat::Multipart => request.multipart(
                Form::new()
                    .text(NAME_FIELD, payload.name.clone())
                    .text(MESSAGE_FIELD, payload.message.clone()),
            ),
            WireFormat::Json => request.json(payload),
        };

        let response = request.send().await.map_err(describe_failure)?;
        let status = response.status();

        if self.response_mode == ResponseMode::Transparent {
            response.error_for_status().map_err(describe_failure)?;
        }

        info!(
            endpoint = %self.endpoint,
            wire_format = %self.wire_format,
            response_mode = %self.response_mode,
            status = status.as_u16(),
            "rsvp: submission delivered"
        );
        Ok(())
    }
}

fn describe_failure(err: reqwest::Error) -> SubmissionFailed {
    let detail = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("failed to connect to collector: {err}")
    } else if let Some(status) = err.status() {
        format!("collector responded with {status}")
    } else if err.is_builder() || err.is_body() {
        format!("failed to encode submission: {err}")
    } else {
        format!("request failed: {err}")
    };
    warn!(%detail, "rsvp: submission transport failure");
    SubmissionFailed::new(detail)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
