use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Roles
// ============================================================================

/// User category issued by the backend at login time.
///
/// Determines which service endpoints apply and how the ticket reporter
/// reference is shaped. Everything downstream consumes this closed enum,
/// never a raw role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Student,
    Employee,
    MisStaff,
    Unknown,
}

impl Role {
    /// Map a server-issued role label (`ROLE_STUDENT`, ...) to a `Role`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "ROLE_STUDENT" => Role::Student,
            "ROLE_EMPLOYEE" => Role::Employee,
            "ROLE_MISSTAFF" => Role::MisStaff,
            _ => Role::Unknown,
        }
    }

    /// Persisted form used for the `userType` credential key.
    pub fn as_store_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Employee => "employee",
            Role::MisStaff => "misStaff",
            Role::Unknown => "unknown",
        }
    }

    /// Inverse of [`Role::as_store_str`]. Unrecognized values map to
    /// `Unknown` rather than failing resolution.
    pub fn from_store_str(value: &str) -> Self {
        match value {
            "student" => Role::Student,
            "employee" => Role::Employee,
            "misStaff" => Role::MisStaff,
            _ => Role::Unknown,
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Immutable view over a complete credential triple.
///
/// Only the session resolver constructs one, and only from a triple whose
/// three parts all resolved. Re-derived per authenticated operation so a
/// logout is observable immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub role: Role,
}

impl Session {
    /// `Authorization` header value for authenticated calls.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

// ============================================================================
// Tickets
// ============================================================================

/// Reporter reference embedded in a ticket, shaped by the creating
/// session's role. Exactly one variant applies; the other wire field is
/// sent as null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketReporter {
    Student(StudentRef),
    Employee(EmployeeRef),
}

impl TicketReporter {
    pub fn student(student_number: impl Into<String>) -> Self {
        TicketReporter::Student(StudentRef {
            student_number: student_number.into(),
        })
    }

    pub fn employee(employee_number: impl Into<String>) -> Self {
        TicketReporter::Employee(EmployeeRef {
            employee_number: employee_number.into(),
        })
    }

    /// Split into the `(student, employee)` wire pair.
    pub fn into_wire(self) -> (Option<StudentRef>, Option<EmployeeRef>) {
        match self {
            TicketReporter::Student(r) => (Some(r), None),
            TicketReporter::Employee(r) => (None, Some(r)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    pub student_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRef {
    pub employee_number: String,
}

/// Staff member a ticket is assigned to. Either name part may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffName {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// A ticket as returned by the ticket service.
///
/// Deserialization is tolerant: the backend omits fields freely, and a
/// single sparse entry must not fail a whole list fetch. Missing text
/// fields take placeholder values; dates and the assigned staff stay
/// optional with display helpers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default)]
    pub ticket_id: i64,
    #[serde(default = "default_issue")]
    pub issue: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date_created: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date_finished: Option<NaiveDate>,
    #[serde(default)]
    pub student: Option<StudentRef>,
    #[serde(default)]
    pub employee: Option<EmployeeRef>,
    #[serde(default, rename = "misStaff")]
    pub assigned_staff: Option<StaffName>,
}

fn default_issue() -> String {
    "No Issue".to_string()
}

fn default_status() -> String {
    "No Status".to_string()
}

/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp, or null.
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_wire_date))
}

pub fn parse_wire_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

impl Ticket {
    pub fn date_created_display(&self) -> String {
        self.date_created
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "No Date".to_string())
    }

    pub fn date_finished_display(&self) -> String {
        self.date_finished
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Assigned staff name, or `Unassigned` when no name part is present.
    pub fn assigned_staff_display(&self) -> String {
        let name = self
            .assigned_staff
            .as_ref()
            .map(|staff| {
                format!(
                    "{} {}",
                    staff.first_name.as_deref().unwrap_or(""),
                    staff.last_name.as_deref().unwrap_or("")
                )
                .trim()
                .to_string()
            })
            .unwrap_or_default();

        if name.is_empty() {
            "Unassigned".to_string()
        } else {
            name
        }
    }
}

/// Input for creating a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub issue: String,
    pub date_created: NaiveDate,
    pub status: String,
}

// ============================================================================
// Profile
// ============================================================================

/// Profile data as returned by the student or employee service.
///
/// Every field is optional; absence renders as a placeholder and is never a
/// fetch failure. `student_number` is populated only for student sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub birthdate: Option<String>,
    pub student_number: Option<String>,
}

/// Placeholder rendering for optional profile fields.
pub fn display_or_na(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("N/A")
}

// ============================================================================
// Flow Handoffs
// ============================================================================

/// Stage-one registration context forwarded to the details-collection
/// stage. The core validates presence; the rest of registration lives
/// outside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationHandoff {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Navigation context handed to the edit-profile screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditProfileContext {
    pub user_id: String,
    pub role: Role,
}

// ============================================================================
// Error Types
// ============================================================================

/// A failed local input check, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No usable credential triple within the resolver's retry budget.
    #[error("no usable session; please log in again")]
    SessionMissing,

    /// Local validation failed. Never reaches the network layer.
    #[error("validation failed: {}", summarize_fields(.0))]
    Validation(Vec<FieldError>),

    /// The server rejected credentials or an OTP.
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// Transport-level failure with no response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status; the body is user-displayable as-is.
    #[error("server rejected request ({status}): {body}")]
    ServerRejected { status: u16, body: String },

    /// Credential persistence failure.
    #[error("credential store error: {message}")]
    Store { message: String },
}

fn summarize_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ClientError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn auth(message: impl Into<String>) -> Self {
        ClientError::Auth {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        ClientError::Store {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Extract the displayable `message` field from a server error payload,
/// when the body carries one.
pub fn server_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|p| p.message)
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_label() {
        assert_eq!(Role::from_label("ROLE_STUDENT"), Role::Student);
        assert_eq!(Role::from_label("ROLE_EMPLOYEE"), Role::Employee);
        assert_eq!(Role::from_label("ROLE_MISSTAFF"), Role::MisStaff);
        assert_eq!(Role::from_label("ROLE_ADMIN"), Role::Unknown);
        assert_eq!(Role::from_label(""), Role::Unknown);
    }

    #[test]
    fn test_role_store_round_trip() {
        for role in [Role::Student, Role::Employee, Role::MisStaff, Role::Unknown] {
            assert_eq!(Role::from_store_str(role.as_store_str()), role);
        }
        assert_eq!(Role::from_store_str("superuser"), Role::Unknown);
    }

    #[test]
    fn test_reporter_wire_split() {
        let (student, employee) = TicketReporter::student("42").into_wire();
        assert_eq!(student.unwrap().student_number, "42");
        assert!(employee.is_none());

        let (student, employee) = TicketReporter::employee("E7").into_wire();
        assert!(student.is_none());
        assert_eq!(employee.unwrap().employee_number, "E7");
    }

    #[test]
    fn test_ticket_tolerates_sparse_entry() {
        let ticket: Ticket = serde_json::from_str(r#"{"ticketId": 3}"#).unwrap();
        assert_eq!(ticket.ticket_id, 3);
        assert_eq!(ticket.issue, "No Issue");
        assert_eq!(ticket.status, "No Status");
        assert_eq!(ticket.date_created_display(), "No Date");
        assert_eq!(ticket.date_finished_display(), "N/A");
        assert_eq!(ticket.assigned_staff_display(), "Unassigned");
    }

    #[test]
    fn test_ticket_full_entry() {
        let ticket: Ticket = serde_json::from_str(
            r#"{
                "ticketId": 9,
                "issue": "broken printer",
                "status": "Done",
                "dateCreated": "2024-01-01",
                "dateFinished": "2024-01-05",
                "student": {"studentNumber": "42"},
                "misStaff": {"firstName": "Ana", "lastName": "Cruz"}
            }"#,
        )
        .unwrap();
        assert_eq!(ticket.issue, "broken printer");
        assert_eq!(ticket.date_created_display(), "2024-01-01");
        assert_eq!(ticket.date_finished_display(), "2024-01-05");
        assert_eq!(ticket.assigned_staff_display(), "Ana Cruz");
        assert!(ticket.employee.is_none());
    }

    #[test]
    fn test_staff_display_with_partial_name() {
        let ticket: Ticket =
            serde_json::from_str(r#"{"ticketId": 1, "misStaff": {"firstName": "Ana"}}"#).unwrap();
        assert_eq!(ticket.assigned_staff_display(), "Ana");
    }

    #[test]
    fn test_wire_date_accepts_timestamp() {
        let ticket: Ticket =
            serde_json::from_str(r#"{"ticketId": 1, "dateCreated": "2024-03-04T10:30:00Z"}"#)
                .unwrap();
        assert_eq!(ticket.date_created_display(), "2024-03-04");
    }

    #[test]
    fn test_profile_defaults_to_placeholders() {
        let profile: Profile = serde_json::from_str("{}").unwrap();
        assert_eq!(display_or_na(&profile.first_name), "N/A");
        assert_eq!(display_or_na(&profile.student_number), "N/A");
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"message": "Invalid OTP"}"#),
            Some("Invalid OTP".to_string())
        );
        assert_eq!(server_message(r#"{"error": "nope"}"#), None);
        assert_eq!(server_message("plain text failure"), None);
    }

    #[test]
    fn test_validation_error_names_fields() {
        let err = ClientError::Validation(vec![
            FieldError::new("otp", "OTP is required."),
            FieldError::new("password", "Password is required."),
        ]);
        let rendered = err.to_string();
        assert!(rendered.contains("otp"));
        assert!(rendered.contains("password"));
    }
}
