//! Role-conditional endpoint and payload routing.
//!
//! The single place the role→endpoint and role→payload-field mappings
//! live. Ticket and profile services consume these; nothing else branches
//! on role.

use hd_common::{Role, TicketReporter};

pub fn login_endpoint(auth_base: &str) -> String {
    format!("{}/user/login", auth_base)
}

pub fn verify_otp_endpoint(auth_base: &str) -> String {
    format!("{}/user/verify-otp", auth_base)
}

pub fn forgot_password_endpoint(auth_base: &str) -> String {
    format!("{}/user/forgot-password", auth_base)
}

pub fn verify_forgot_password_endpoint(auth_base: &str) -> String {
    format!("{}/user/verify-forgot-password", auth_base)
}

pub fn ticket_add_endpoint(base: &str) -> String {
    format!("{}/TicketService/ticket/add", base)
}

pub fn tickets_endpoint(base: &str, user_id: &str) -> String {
    format!("{}/TicketService/tickets/user/{}", base, user_id)
}

/// Profile endpoint for a role. Employees query the employee service;
/// every other role queries the student service, matching the backend's
/// observed routing.
pub fn profile_endpoint(base: &str, role: Role, user_id: &str) -> String {
    match role {
        Role::Employee => format!("{}/EmployeeService/employee/{}", base, user_id),
        _ => format!("{}/StudentService/student/{}", base, user_id),
    }
}

/// Reporter reference for a create-ticket payload. Students and employees
/// carry exactly their own reference; other roles carry none (both wire
/// fields null).
pub fn reporter_for(role: Role, user_id: &str) -> Option<TicketReporter> {
    match role {
        Role::Student => Some(TicketReporter::student(user_id)),
        Role::Employee => Some(TicketReporter::employee(user_id)),
        Role::MisStaff | Role::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_endpoint_by_role() {
        assert_eq!(
            profile_endpoint("http://h", Role::Employee, "9"),
            "http://h/EmployeeService/employee/9"
        );
        assert_eq!(
            profile_endpoint("http://h", Role::Student, "9"),
            "http://h/StudentService/student/9"
        );
        assert_eq!(
            profile_endpoint("http://h", Role::MisStaff, "9"),
            "http://h/StudentService/student/9"
        );
    }

    #[test]
    fn test_reporter_is_exactly_one_variant() {
        let (student, employee) = reporter_for(Role::Student, "42").unwrap().into_wire();
        assert!(student.is_some());
        assert!(employee.is_none());

        let (student, employee) = reporter_for(Role::Employee, "42").unwrap().into_wire();
        assert!(student.is_none());
        assert!(employee.is_some());

        assert!(reporter_for(Role::MisStaff, "42").is_none());
        assert!(reporter_for(Role::Unknown, "42").is_none());
    }

    #[test]
    fn test_ticket_endpoints() {
        assert_eq!(
            ticket_add_endpoint("http://h"),
            "http://h/TicketService/ticket/add"
        );
        assert_eq!(
            tickets_endpoint("http://h", "42"),
            "http://h/TicketService/tickets/user/42"
        );
    }
}
