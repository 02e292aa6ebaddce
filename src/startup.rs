use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{handlers, middleware, openapi::ApiDoc, AppState};

pub fn build_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);
    match HeaderValue::from_str(&state.config.cors_origin) {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(_) => tracing::warn!(origin = %state.config.cors_origin, "Ignoring invalid CORS origin"),
    }

    // Session routes
    let session_routes = Router::new()
        .route("/", get(handlers::auth_handler::home))
        .route("/login", get(handlers::auth_handler::login_page))
        .route("/login", post(handlers::auth_handler::login))
        .route("/logout", post(handlers::auth_handler::logout))
        .route("/me", get(handlers::auth_handler::get_me));

    // Admin: users
    let user_routes = Router::new()
        .route("/", get(handlers::users_handler::get_users))
        .route("/", post(handlers::users_handler::create_user))
        .route("/{id}", get(handlers::users_handler::get_user))
        .route("/{id}", put(handlers::users_handler::update_user))
        .route("/{id}", delete(handlers::users_handler::delete_user));

    // Admin: generators
    let generator_routes = Router::new()
        .route("/", get(handlers::generators_handler::get_generators))
        .route("/", post(handlers::generators_handler::create_generator))
        .route("/{id}", get(handlers::generators_handler::get_generator))
        .route("/{id}", put(handlers::generators_handler::update_generator))
        .route("/{id}", delete(handlers::generators_handler::delete_generator));

    // Admin: tickets - sub-ticket paths are static and win over /{id}
    let ticket_routes = Router::new()
        .route("/", get(handlers::tickets_handler::get_tickets))
        .route("/", post(handlers::tickets_handler::create_ticket))
        .route(
            "/sub-tickets/pending-approval",
            get(handlers::tickets_handler::get_pending_sub_tickets),
        )
        .route(
            "/sub-tickets/{id}/approve",
            post(handlers::tickets_handler::approve_sub_ticket),
        )
        .route("/{id}", get(handlers::tickets_handler::get_ticket))
        .route("/{id}", put(handlers::tickets_handler::update_ticket))
        .route("/{id}", delete(handlers::tickets_handler::delete_ticket))
        .route("/{id}/assign", post(handlers::tickets_handler::assign_ticket))
        .route("/{id}/status", patch(handlers::tickets_handler::update_ticket_status));

    // Admin: job cards
    let admin_job_card_routes = Router::new()
        .route("/", get(handlers::admin_job_cards_handler::get_job_cards))
        .route(
            "/pending-approval",
            get(handlers::admin_job_cards_handler::get_pending_job_cards),
        )
        .route(
            "/ticket/{ticket_id}",
            get(handlers::admin_job_cards_handler::get_job_cards_by_ticket),
        )
        .route("/{id}", get(handlers::admin_job_cards_handler::get_job_card))
        .route("/{id}/approve", post(handlers::admin_job_cards_handler::approve_job_card));

    // Admin: reports
    let report_routes = Router::new()
        .route("/employees", get(handlers::reports_handler::get_report_employees))
        .route("/time-tracking", get(handlers::reports_handler::get_time_tracking_report))
        .route("/time-tracking.csv", get(handlers::reports_handler::export_time_tracking_csv))
        .route("/ot-tracking", get(handlers::reports_handler::get_ot_tracking_report))
        .route("/ot-tracking.csv", get(handlers::reports_handler::export_ot_tracking_csv));

    // Employee: day
    let day_routes = Router::new()
        .route("/status", get(handlers::day_handler::get_day_status))
        .route("/start", post(handlers::day_handler::start_day))
        .route("/end", post(handlers::day_handler::end_day));

    // Employee: job cards
    let job_card_routes = Router::new()
        .route("/", get(handlers::job_cards_handler::get_my_job_cards))
        .route("/{id}", get(handlers::job_cards_handler::get_my_job_card))
        .route("/{id}/status", post(handlers::job_cards_handler::update_job_card_status))
        .route(
            "/{id}/image",
            post(handlers::job_cards_handler::upload_job_card_image)
                .layer(DefaultBodyLimit::max(state.config.max_image_bytes)),
        );

    // Employee: tickets
    let employee_ticket_routes = Router::new()
        .route("/", get(handlers::employee_tickets_handler::get_my_tickets))
        .route("/{id}", get(handlers::employee_tickets_handler::get_my_ticket))
        .route(
            "/{id}/status",
            patch(handlers::employee_tickets_handler::update_my_ticket_status),
        )
        .route(
            "/{id}/notes",
            patch(handlers::employee_tickets_handler::update_my_ticket_notes),
        );

    let mut router = Router::new()
        .merge(session_routes)
        .route("/admin/dashboard", get(handlers::dashboard_handler::admin_dashboard))
        .nest("/admin/users", user_routes)
        .nest("/admin/generators", generator_routes)
        .nest("/admin/tickets", ticket_routes)
        .nest("/admin/job-cards", admin_job_card_routes)
        .nest("/admin/reports", report_routes)
        .route("/employee/dashboard", get(handlers::dashboard_handler::employee_dashboard))
        .nest("/employee/day", day_routes)
        .nest("/employee/job-cards", job_card_routes)
        .nest("/employee/tickets", employee_ticket_routes)
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()));

    if state.config.debug_key.is_some() {
        let debug_routes = Router::new()
            .route("/debug", get(handlers::debug_handler))
            .route_layer(from_fn_with_state(state.clone(), middleware::require_debug_key));
        router = router.merge(debug_routes);
    }

    router
        .route_layer(from_fn(middleware::metrics_middleware))
        .layer(from_fn_with_state(state.clone(), middleware::require_role))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .layer(cors)
        .with_state(state)
}
