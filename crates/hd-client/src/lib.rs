//! Helpdesk mobile client core
//!
//! This crate provides the backend-facing half of the mobile ticketing
//! client:
//! - AuthFlow: login, registration handoff, OTP verification, password reset
//! - TicketService: create and list tickets for the current session
//! - ProfileService: fetch role-shaped profile data
//! - router: the single place role-conditional endpoints and payloads live
//!
//! Every authenticated operation re-derives its session through
//! [`hd_session::SessionResolver`], so a missing or torn-down credential
//! triple short-circuits before any network call.

pub mod auth;
pub mod config;
pub mod profile;
pub mod router;
pub mod tickets;

pub use auth::{AuthFlow, PendingReset};
pub use config::{build_http_client, ApiConfig};
pub use profile::ProfileService;
pub use tickets::TicketService;

// Re-export the domain surface callers need alongside the services.
pub use hd_common::{
    display_or_na, ClientError, EditProfileContext, EmployeeRef, Profile, RegistrationHandoff,
    Result, Role, Session, StaffName, StudentRef, Ticket, TicketDraft, TicketReporter,
};
pub use hd_session::{SessionOverrides, SessionResolver};
pub use hd_store::{clear_credentials, CredentialKey, CredentialStore, FileStore, MemoryStore};
