//! HTTP bindings for the exchange and report services.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::ServiceException,
    protocol::{ExchangeRequest, ExchangeResponse, Report, ReportEnvelope, ReportRequest},
};
use tracing::debug;
use url::Url;

use crate::{config::ClientSettings, ExchangeService, ReportService};

pub struct HttpInterviewService {
    http: Client,
    exchange_endpoint: Url,
    report_endpoint: Url,
}

impl HttpInterviewService {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            exchange_endpoint: settings.exchange_endpoint.clone(),
            report_endpoint: settings.report_endpoint.clone(),
        })
    }
}

#[async_trait]
impl ExchangeService for HttpInterviewService {
    async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeResponse> {
        debug!(
            endpoint = %self.exchange_endpoint,
            has_session = request.session_id.is_some(),
            "posting exchange"
        );
        let response: ExchangeResponse = self
            .http
            .post(self.exchange_endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("malformed exchange response")?;
        Ok(response)
    }
}

#[async_trait]
impl ReportService for HttpInterviewService {
    async fn fetch_report(&self, request: ReportRequest) -> Result<Report> {
        debug!(endpoint = %self.report_endpoint, session_id = %request.session_id, "posting report request");
        let envelope: ReportEnvelope = self
            .http
            .post(self.report_endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("malformed report response")?;

        match envelope {
            ReportEnvelope::Ready(body) => Ok(body.report),
            ReportEnvelope::Failed(err) => Err(ServiceException::from(err).into()),
        }
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
