use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::{AppError, AppResult};

pub const MIN_ASSIGNEES: usize = 1;
pub const MAX_ASSIGNEES: usize = 5;
pub const MIN_WEIGHT: u8 = 1;
pub const MAX_WEIGHT: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Created,
    Assigned,
    InProgress,
    Completed,
    PendingApproval,
    Approved,
    Rejected,
    Closed,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Created => "CREATED",
            TicketStatus::Assigned => "ASSIGNED",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::Completed => "COMPLETED",
            TicketStatus::PendingApproval => "PENDING_APPROVAL",
            TicketStatus::Approved => "APPROVED",
            TicketStatus::Rejected => "REJECTED",
            TicketStatus::Closed => "CLOSED",
        }
    }

    /// Employees may only move their own sub-ticket into these.
    pub fn employee_settable(self) -> bool {
        matches!(self, TicketStatus::InProgress | TicketStatus::Completed)
    }
}

/// `*` repeated per weight point; empty for out-of-range weights.
pub fn weight_stars(weight: u8) -> String {
    if (MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
        "*".repeat(weight as usize)
    } else {
        String::new()
    }
}

/// Score the backend will lock in on approval; missing factors count as 1.0.
pub fn projected_score(weight: u8, completion_factor: Option<f64>, quality_factor: Option<f64>) -> f64 {
    f64::from(weight) * completion_factor.unwrap_or(1.0) * quality_factor.unwrap_or(1.0)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubTicket {
    pub id: i64,
    pub ticket_number: Option<String>,
    pub main_ticket_id: i64,
    pub main_ticket_number: Option<String>,
    pub main_ticket_title: Option<String>,
    pub main_ticket_description: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub main_ticket_weight: Option<u8>,
    pub generator_id: Option<i64>,
    pub generator_name: Option<String>,
    pub generator_model: Option<String>,
    pub generator_location: Option<String>,
    pub employee_id: i64,
    pub employee_name: Option<String>,
    pub employee_email: Option<String>,
    pub status: TicketStatus,
    pub notes: Option<String>,
    pub completion_factor: Option<f64>,
    pub quality_factor: Option<f64>,
    pub score: Option<f64>,
    pub approved: Option<bool>,
    pub approved_by_id: Option<i64>,
    pub approved_by_name: Option<String>,
    pub approved_at: Option<NaiveDateTime>,
    pub admin_review_notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

/// Sub-ticket in the admin review queue.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubTicketView {
    #[serde(flatten)]
    pub sub_ticket: SubTicket,
    pub weight_display: String,
    pub projected_score: Option<f64>,
}

impl From<SubTicket> for SubTicketView {
    fn from(sub_ticket: SubTicket) -> Self {
        let weight_display = sub_ticket.main_ticket_weight.map(weight_stars).unwrap_or_default();
        let projected_score = sub_ticket.score.or_else(|| {
            sub_ticket
                .main_ticket_weight
                .map(|w| projected_score(w, sub_ticket.completion_factor, sub_ticket.quality_factor))
        });
        Self {
            sub_ticket,
            weight_display,
            projected_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub ticket_number: String,
    pub generator_id: Option<i64>,
    pub generator_name: Option<String>,
    pub generator_model: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub weight: Option<u8>,
    pub weight_display: Option<String>,
    pub status: TicketStatus,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub created_by_id: Option<i64>,
    pub created_by_name: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub sub_tickets: Vec<SubTicket>,
    pub total_assignments: Option<u32>,
    pub completed_assignments: Option<u32>,
}

/// Create/update body. Validated locally so bad requests never leave the portal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketInput {
    pub generator_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub weight: u8,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub employee_ids: Vec<i64>,
}

impl TicketInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&self.weight) {
            return Err(AppError::Validation(format!(
                "Weight must be between {} and {}",
                MIN_WEIGHT, MAX_WEIGHT
            )));
        }
        validate_assignees(&self.employee_ids)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignInput {
    pub employee_ids: Vec<i64>,
}

pub fn validate_assignees(employee_ids: &[i64]) -> AppResult<()> {
    if employee_ids.len() < MIN_ASSIGNEES || employee_ids.len() > MAX_ASSIGNEES {
        return Err(AppError::Validation(format!(
            "Must assign between {} and {} employees",
            MIN_ASSIGNEES, MAX_ASSIGNEES
        )));
    }
    let unique: HashSet<_> = employee_ids.iter().collect();
    if unique.len() != employee_ids.len() {
        return Err(AppError::Validation("Each employee can only be assigned once".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalInput {
    pub approved: bool,
    pub completion_factor: Option<f64>,
    pub quality_factor: Option<f64>,
    pub admin_review_notes: Option<String>,
}

impl ApprovalInput {
    pub fn validate(&self) -> AppResult<()> {
        check_factor("Completion factor", self.completion_factor)?;
        check_factor("Quality factor", self.quality_factor)
    }
}

fn check_factor(label: &str, factor: Option<f64>) -> AppResult<()> {
    match factor {
        Some(f) if !f.is_finite() || !(0.0..=1.0).contains(&f) => Err(AppError::Validation(format!(
            "{} must be between 0 and 1",
            label
        ))),
        _ => Ok(()),
    }
}
