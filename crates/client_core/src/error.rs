use shared::domain::{Role, UnknownRole};
use thiserror::Error;

use crate::controller::ViewMode;

#[derive(Debug, Error)]
pub enum RoleError {
    #[error(transparent)]
    Unknown(#[from] UnknownRole),
    #[error("role is locked to {current} once the interview has started")]
    RoleLocked { current: Role },
}

/// Reasons `send_message` declined to start an exchange. None of these
/// touch the transcript or issue a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendRejection {
    #[error("message is empty")]
    EmptyInput,
    #[error("an exchange is already in flight")]
    ExchangeInFlight,
    #[error("cannot send messages while in {0:?} mode")]
    NotConversing(ViewMode),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("interview not started")]
    NotStarted,
    #[error("a newer report already replaced this one")]
    Superseded,
    #[error("report request failed: {0}")]
    Service(#[source] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("no report is being shown (current mode: {0:?})")]
    NotViewingReport(ViewMode),
}
