//! Session controller: role selection, serialized exchanges, report
//! fetching and the view-mode state machine that ties them together.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use anyhow::Result;
use shared::{
    domain::{Message, Role, SessionId},
    protocol::{AssistantReply, ExchangeRequest, ExchangeResponse, ReplyKind, Report, ReportRequest},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, info, warn};

use crate::{
    config::ClientSettings,
    conversation::Conversation,
    error::{ReportError, RoleError, SendRejection, ViewError},
    transport::HttpInterviewService,
    ExchangeService, ReportService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    AwaitingRole,
    Conversing,
    ReportView,
}

/// Lightweight user-facing notices. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    InterviewNotStarted,
    ReportFailed,
}

impl Notice {
    pub fn text(self) -> &'static str {
        match self {
            Notice::InterviewNotStarted => "Interview not started!",
            Notice::ReportFailed => "Error generating report",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    MessageAppended(Message),
    PendingChanged(bool),
    SessionStarted(SessionId),
    ModeChanged(ViewMode),
    ReportReady(Report),
    /// The interviewer signalled that the planned questions are done.
    InterviewWrapUp,
    Notice(Notice),
}

/// Everything the presentation layer needs to render one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub mode: ViewMode,
    pub role: Option<Role>,
    pub transcript: Vec<Message>,
    pub pending: bool,
    pub report: Option<Report>,
}

struct ControllerState {
    mode: ViewMode,
    role: Option<Role>,
    session_id: Option<SessionId>,
    conversation: Conversation,
    report: Option<Report>,
    report_requests_issued: u64,
    report_applied: u64,
}

pub struct SessionController {
    exchange_service: Arc<dyn ExchangeService>,
    report_service: Arc<dyn ReportService>,
    pacing_delay: Duration,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl SessionController {
    pub fn new(settings: &ClientSettings) -> Result<Arc<Self>> {
        let service = Arc::new(HttpInterviewService::new(settings)?);
        Ok(Self::new_with_services(
            service.clone(),
            service,
            settings.pacing_delay(),
        ))
    }

    pub fn new_with_services(
        exchange_service: Arc<dyn ExchangeService>,
        report_service: Arc<dyn ReportService>,
        pacing_delay: Duration,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            exchange_service,
            report_service,
            pacing_delay,
            inner: Mutex::new(ControllerState {
                mode: ViewMode::AwaitingRole,
                role: None,
                session_id: None,
                conversation: Conversation::default(),
                report: None,
                report_requests_issued: 0,
                report_applied: 0,
            }),
            events,
        })
    }

    pub fn roles() -> &'static [Role] {
        &Role::ALL
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is fine; the snapshot stays authoritative.
        let _ = self.events.send(event);
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        let inner = self.inner.lock().await;
        ViewSnapshot {
            mode: inner.mode,
            role: inner.role,
            transcript: inner.conversation.messages().to_vec(),
            pending: inner.conversation.is_pending(),
            report: inner.report.clone(),
        }
    }

    pub async fn mode(&self) -> ViewMode {
        self.inner.lock().await.mode
    }

    pub async fn session_id(&self) -> Option<SessionId> {
        self.inner.lock().await.session_id.clone()
    }

    /// Picks the interview track. Re-selecting is allowed until the first
    /// message goes out.
    pub async fn select_role(&self, role: Role) -> Result<(), RoleError> {
        let entered_conversation = {
            let mut inner = self.inner.lock().await;
            if let (false, Some(current)) = (inner.conversation.is_empty(), inner.role) {
                return Err(RoleError::RoleLocked { current });
            }
            inner.role = Some(role);
            let entering = inner.mode == ViewMode::AwaitingRole;
            if entering {
                inner.mode = ViewMode::Conversing;
            }
            entering
        };

        info!(role = %role, "interview role selected");
        if entered_conversation {
            self.emit(ControllerEvent::ModeChanged(ViewMode::Conversing));
        }
        Ok(())
    }

    pub async fn select_role_id(&self, role_id: &str) -> Result<Role, RoleError> {
        let role = role_id.parse::<Role>()?;
        self.select_role(role).await?;
        Ok(role)
    }

    /// Starts one exchange. The user message is in the transcript and
    /// `input` is cleared by the time this returns; the reply is applied by
    /// the returned task.
    pub async fn send_message(
        self: &Arc<Self>,
        input: &mut String,
    ) -> Result<JoinHandle<()>, SendRejection> {
        if input.trim().is_empty() {
            return Err(SendRejection::EmptyInput);
        }

        let (ticket, request) = {
            let mut inner = self.inner.lock().await;
            if inner.conversation.is_pending() {
                return Err(SendRejection::ExchangeInFlight);
            }
            if inner.mode != ViewMode::Conversing {
                return Err(SendRejection::NotConversing(inner.mode));
            }
            let Some(ticket) = inner.conversation.begin_exchange(input.as_str()) else {
                return Err(SendRejection::ExchangeInFlight);
            };
            let request = ExchangeRequest {
                message: input.clone(),
                session_id: inner.session_id.clone(),
                role: inner.role,
            };
            (ticket, request)
        };

        input.clear();
        self.emit(ControllerEvent::MessageAppended(Message::user(
            request.message.clone(),
        )));
        self.emit(ControllerEvent::PendingChanged(true));

        let reveal_at = Instant::now() + self.pacing_delay;
        let controller = Arc::downgrade(self);
        let exchange_service = Arc::clone(&self.exchange_service);
        debug!(ticket, "exchange issued");

        Ok(tokio::spawn(async move {
            let outcome = exchange_service.exchange(request).await;
            Self::settle_exchange(controller, ticket, reveal_at, outcome).await;
        }))
    }

    async fn settle_exchange(
        controller: Weak<Self>,
        ticket: u64,
        reveal_at: Instant,
        outcome: Result<ExchangeResponse>,
    ) {
        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                warn!(ticket, error = %err, "exchange failed");
                match controller.upgrade() {
                    Some(this) => this.fail_exchange(ticket).await,
                    None => debug!(ticket, "controller dropped; ignoring failed exchange"),
                }
                return;
            }
        };

        match controller.upgrade() {
            Some(this) => this.adopt_session(ticket, response.session_id).await,
            None => {
                debug!(ticket, "controller dropped; ignoring exchange response");
                return;
            }
        }

        // Pacing overlaps network time: reveal at max(arrival, issue + delay).
        tokio::time::sleep_until(reveal_at).await;

        match controller.upgrade() {
            Some(this) => this.reveal_reply(ticket, response.response).await,
            None => debug!(ticket, "controller dropped before reply reveal"),
        }
    }

    async fn adopt_session(&self, ticket: u64, session_id: Option<SessionId>) {
        let started = {
            let mut inner = self.inner.lock().await;
            if inner.conversation.pending_ticket() != Some(ticket) {
                return;
            }
            match session_id {
                Some(assigned) if inner.session_id.is_none() => {
                    inner.session_id = Some(assigned.clone());
                    Some(assigned)
                }
                Some(other) => {
                    if let Some(current) = inner.session_id.as_ref().filter(|c| **c != other) {
                        warn!(
                            session_id = %current,
                            returned = %other,
                            "service returned a different session id; keeping the original"
                        );
                    }
                    None
                }
                None => None,
            }
        };

        if let Some(session_id) = started {
            info!(session_id = %session_id, "interview session started");
            self.emit(ControllerEvent::SessionStarted(session_id));
        }
    }

    async fn reveal_reply(&self, ticket: u64, reply: AssistantReply) {
        let appended = {
            let mut inner = self.inner.lock().await;
            inner.conversation.settle(ticket, reply.message).cloned()
        };
        let Some(message) = appended else {
            debug!(ticket, "stale exchange reply ignored");
            return;
        };

        self.emit(ControllerEvent::MessageAppended(message));
        self.emit(ControllerEvent::PendingChanged(false));
        if reply.kind == ReplyKind::FinalSummary {
            self.emit(ControllerEvent::InterviewWrapUp);
        }
    }

    async fn fail_exchange(&self, ticket: u64) {
        let appended = {
            let mut inner = self.inner.lock().await;
            inner.conversation.settle_failed(ticket).cloned()
        };
        if let Some(message) = appended {
            self.emit(ControllerEvent::MessageAppended(message));
            self.emit(ControllerEvent::PendingChanged(false));
        }
    }

    /// Fetches the cumulative report for the current session and switches
    /// to the report view. Never touches role, session or transcript.
    pub async fn request_report(&self) -> Result<Report, ReportError> {
        let (session_id, sequence) = {
            let mut inner = self.inner.lock().await;
            let Some(session_id) = inner.session_id.clone() else {
                drop(inner);
                self.emit(ControllerEvent::Notice(Notice::InterviewNotStarted));
                return Err(ReportError::NotStarted);
            };
            inner.report_requests_issued += 1;
            (session_id, inner.report_requests_issued)
        };

        let fetched = self
            .report_service
            .fetch_report(ReportRequest {
                session_id: session_id.clone(),
            })
            .await;

        let report = match fetched {
            Ok(report) => report,
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "report request failed");
                self.emit(ControllerEvent::Notice(Notice::ReportFailed));
                return Err(ReportError::Service(err));
            }
        };

        let mode_changed = {
            let mut inner = self.inner.lock().await;
            if sequence < inner.report_applied {
                debug!(sequence, applied = inner.report_applied, "discarding superseded report");
                return Err(ReportError::Superseded);
            }
            inner.report_applied = sequence;
            inner.report = Some(report.clone());
            let changed = inner.mode != ViewMode::ReportView;
            inner.mode = ViewMode::ReportView;
            changed
        };

        info!(
            session_id = %session_id,
            overall_score = report.final_summary.overall_score,
            "interview report ready"
        );
        self.emit(ControllerEvent::ReportReady(report.clone()));
        if mode_changed {
            self.emit(ControllerEvent::ModeChanged(ViewMode::ReportView));
        }
        Ok(report)
    }

    /// Leaves the report view. The stored report, session and transcript
    /// are kept.
    pub async fn back(&self) -> Result<(), ViewError> {
        {
            let mut inner = self.inner.lock().await;
            if inner.mode != ViewMode::ReportView {
                return Err(ViewError::NotViewingReport(inner.mode));
            }
            inner.mode = ViewMode::Conversing;
        }
        self.emit(ControllerEvent::ModeChanged(ViewMode::Conversing));
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
