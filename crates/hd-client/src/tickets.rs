//! Ticket creation and listing for the current session.

use std::sync::Arc;

use chrono::NaiveDate;
use hd_common::{ClientError, EmployeeRef, Result, StudentRef, Ticket, TicketDraft};
use hd_session::SessionResolver;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::router;

/// Create-ticket payload. The reporter reference fields are always
/// present on the wire; the one not matching the session's role is null.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTicketRequest<'a> {
    issue: &'a str,
    date_created: NaiveDate,
    status: &'a str,
    student: Option<StudentRef>,
    employee: Option<EmployeeRef>,
}

/// Creates and lists tickets. Each operation re-derives the session; a
/// missing session short-circuits before any network call.
pub struct TicketService {
    client: reqwest::Client,
    config: ApiConfig,
    resolver: Arc<SessionResolver>,
}

impl TicketService {
    pub fn new(
        client: reqwest::Client,
        config: ApiConfig,
        resolver: Arc<SessionResolver>,
    ) -> Self {
        Self {
            client,
            config,
            resolver,
        }
    }

    /// Submit a new ticket. A non-success response surfaces the server's
    /// raw body as the error; the server's failure text is displayable
    /// as-is.
    pub async fn create(&self, draft: &TicketDraft) -> Result<Ticket> {
        let session = self.resolver.resolve().await?;

        let (student, employee) = match router::reporter_for(session.role, &session.user_id) {
            Some(reporter) => reporter.into_wire(),
            None => (None, None),
        };

        let request = CreateTicketRequest {
            issue: &draft.issue,
            date_created: draft.date_created,
            status: &draft.status,
            student: student.clone(),
            employee: employee.clone(),
        };

        let url = router::ticket_add_endpoint(&self.config.base_url);
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, session.bearer())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!(status = %status, "ticket create rejected");
            return Err(ClientError::ServerRejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = %status, "ticket created");

        // The backend may echo the created ticket; fall back to assembling
        // it locally when the body is not one.
        let echoed = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .filter(|v| v.get("ticketId").is_some())
            .and_then(|v| serde_json::from_value::<Ticket>(v).ok());

        Ok(echoed.unwrap_or_else(|| Ticket {
            ticket_id: 0,
            issue: draft.issue.clone(),
            status: draft.status.clone(),
            date_created: Some(draft.date_created),
            date_finished: None,
            student,
            employee,
            assigned_staff: None,
        }))
    }

    /// List the session user's tickets. A `204 No Content` response is a
    /// distinct empty result, not an error; sparse entries parse
    /// tolerantly.
    pub async fn list(&self) -> Result<Vec<Ticket>> {
        let session = self.resolver.resolve().await?;

        let url = router::tickets_endpoint(&self.config.base_url, &session.user_id);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            debug!(user_id = %session.user_id, "no tickets for user");
            return Ok(Vec::new());
        }

        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(status = %status, "ticket list rejected");
            return Err(ClientError::ServerRejected {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let tickets: Vec<Ticket> = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "ticket list body was not a ticket array");
            ClientError::ServerRejected {
                status: status.as_u16(),
                body,
            }
        })?;

        debug!(count = tickets.len(), "tickets listed");
        Ok(tickets)
    }
}
