//! Client-side core of the interview practice chat: owns the session
//! identity, the transcript and the switch into report mode, and talks to
//! the exchange and report services through the traits below.

use anyhow::Result;
use async_trait::async_trait;
use shared::protocol::{ExchangeRequest, ExchangeResponse, Report, ReportRequest};

pub mod config;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod transport;

pub use config::ClientSettings;
pub use controller::{ControllerEvent, Notice, SessionController, ViewMode, ViewSnapshot};
pub use conversation::EXCHANGE_ERROR_TEXT;
pub use transport::HttpInterviewService;

/// One user message in, one assistant reply out.
#[async_trait]
pub trait ExchangeService: Send + Sync {
    async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeResponse>;
}

#[async_trait]
pub trait ReportService: Send + Sync {
    async fn fetch_report(&self, request: ReportRequest) -> Result<Report>;
}
