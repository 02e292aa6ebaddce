use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::Modify;
use utoipa::OpenApi;

use crate::auth::SESSION_COOKIE;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GMS Portal",
        version = "1.0.0",
        description = "Role-based portal for generator maintenance: tickets, job cards, day tracking and reports"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Session
        crate::handlers::auth_handler::login,
        crate::handlers::auth_handler::logout,
        crate::handlers::auth_handler::get_me,

        // Dashboards
        crate::handlers::dashboard_handler::admin_dashboard,
        crate::handlers::dashboard_handler::employee_dashboard,

        // Users
        crate::handlers::users_handler::get_users,
        crate::handlers::users_handler::get_user,
        crate::handlers::users_handler::create_user,
        crate::handlers::users_handler::update_user,
        crate::handlers::users_handler::delete_user,

        // Generators
        crate::handlers::generators_handler::get_generators,
        crate::handlers::generators_handler::get_generator,
        crate::handlers::generators_handler::create_generator,
        crate::handlers::generators_handler::update_generator,
        crate::handlers::generators_handler::delete_generator,

        // Tickets
        crate::handlers::tickets_handler::get_tickets,
        crate::handlers::tickets_handler::get_ticket,
        crate::handlers::tickets_handler::create_ticket,
        crate::handlers::tickets_handler::update_ticket,
        crate::handlers::tickets_handler::delete_ticket,
        crate::handlers::tickets_handler::assign_ticket,
        crate::handlers::tickets_handler::update_ticket_status,
        crate::handlers::tickets_handler::get_pending_sub_tickets,
        crate::handlers::tickets_handler::approve_sub_ticket,

        // Admin job cards
        crate::handlers::admin_job_cards_handler::get_job_cards,
        crate::handlers::admin_job_cards_handler::get_job_card,
        crate::handlers::admin_job_cards_handler::get_pending_job_cards,
        crate::handlers::admin_job_cards_handler::approve_job_card,
        crate::handlers::admin_job_cards_handler::get_job_cards_by_ticket,

        // Reports
        crate::handlers::reports_handler::get_time_tracking_report,
        crate::handlers::reports_handler::get_ot_tracking_report,
        crate::handlers::reports_handler::export_time_tracking_csv,
        crate::handlers::reports_handler::export_ot_tracking_csv,
        crate::handlers::reports_handler::get_report_employees,

        // Day
        crate::handlers::day_handler::get_day_status,
        crate::handlers::day_handler::start_day,
        crate::handlers::day_handler::end_day,

        // Employee job cards
        crate::handlers::job_cards_handler::get_my_job_cards,
        crate::handlers::job_cards_handler::get_my_job_card,
        crate::handlers::job_cards_handler::update_job_card_status,
        crate::handlers::job_cards_handler::upload_job_card_image,

        // Employee tickets
        crate::handlers::employee_tickets_handler::get_my_tickets,
        crate::handlers::employee_tickets_handler::get_my_ticket,
        crate::handlers::employee_tickets_handler::update_my_ticket_status,
        crate::handlers::employee_tickets_handler::update_my_ticket_notes,
    ),
    components(
        schemas(
            // Core models
            crate::models::User,
            crate::models::Role,
            crate::models::Generator,
            crate::models::Ticket,
            crate::models::TicketStatus,
            crate::models::SubTicket,
            crate::models::SubTicketView,
            crate::models::JobCard,
            crate::models::JobCardView,
            crate::models::JobStatus,
            crate::models::DayStatus,
            crate::models::DayStatusView,
            crate::models::TimeTrackingReport,
            crate::models::TimeTrackingReportView,
            crate::models::OtTrackingReport,
            crate::models::OtTrackingReportView,

            // Input models
            crate::models::LoginInput,
            crate::models::LoginResponse,
            crate::models::UserInput,
            crate::models::GeneratorInput,
            crate::models::TicketInput,
            crate::models::AssignInput,
            crate::models::ApprovalInput,
            crate::models::StatusUpdateInput,
            crate::models::JobCardApprovalInput,

            // Handler types
            crate::handlers::auth_handler::CurrentUser,
            crate::handlers::dashboard_handler::AdminDashboard,
            crate::handlers::dashboard_handler::EmployeeDashboard,
            crate::handlers::dashboard_handler::JobCardCounts,
            crate::handlers::health::HealthStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "auth", description = "Login, logout and the current session"),
        (name = "dashboard", description = "Landing pages per role"),
        (name = "users", description = "User management"),
        (name = "generators", description = "Generator asset registry"),
        (name = "tickets", description = "Tickets, assignment and sub-ticket approval"),
        (name = "admin-job-cards", description = "Job card review"),
        (name = "reports", description = "Time and overtime reports with CSV export"),
        (name = "day", description = "Employee workday start and end"),
        (name = "job-cards", description = "Employee job cards"),
        (name = "employee-tickets", description = "Employee assignments"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            )
        }
    }
}
