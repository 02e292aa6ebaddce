use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    day_status::{can_update_status, DayStatus},
    generator::{validate_coordinates, Generator},
    report::format_minutes,
};
use crate::{AppError, AppResult};

pub const LOCATION_REQUIRED: &str = "Please enable location access to update status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Traveling,
    Started,
    OnHold,
    Completed,
    Cancel,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Pending,
        JobStatus::Traveling,
        JobStatus::Started,
        JobStatus::OnHold,
        JobStatus::Completed,
        JobStatus::Cancel,
    ];

    /// Statuses reachable from `self` in one step.
    pub fn allowed_transitions(self) -> &'static [JobStatus] {
        use JobStatus::*;
        match self {
            Pending => &[Traveling, Cancel],
            Traveling => &[Started, OnHold, Cancel],
            Started => &[OnHold, Completed, Cancel],
            OnHold => &[Started, Cancel],
            Completed | Cancel => &[],
        }
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Traveling => "TRAVELING",
            JobStatus::Started => "STARTED",
            JobStatus::OnHold => "ON_HOLD",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Cancel => "CANCEL",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCard {
    pub id: i64,
    pub main_ticket_id: Option<i64>,
    pub ticket_number: Option<String>,
    pub ticket_title: Option<String>,
    pub generator: Option<Generator>,
    pub status: JobStatus,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub work_minutes: i64,
    #[serde(default)]
    pub approved: bool,
    pub image: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// Job card as presented to an employee: the card plus what they may do with it right now.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCardView {
    #[serde(flatten)]
    pub card: JobCard,
    pub available_transitions: Vec<JobStatus>,
    pub can_update_status: bool,
    pub work_time: String,
}

impl JobCardView {
    pub fn new(card: JobCard, day: Option<&DayStatus>) -> Self {
        let can_update_status = can_update_status(day, card.status);
        let available_transitions = if can_update_status {
            card.status.allowed_transitions().to_vec()
        } else {
            Vec::new()
        };
        let work_time = format_minutes(card.work_minutes);
        Self {
            card,
            available_transitions,
            can_update_status,
            work_time,
        }
    }
}

/// Browser-side request. Coordinates are optional on the wire so a denied
/// geolocation prompt can be reported instead of failing deserialization.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateInput {
    pub new_status: JobStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// What the backend receives.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub new_status: JobStatus,
    pub latitude: f64,
    pub longitude: f64,
}

impl StatusUpdateInput {
    /// Fails without touching the network when the location fix is missing.
    pub fn into_request(self) -> AppResult<StatusUpdateRequest> {
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return Err(AppError::BadRequest(LOCATION_REQUIRED.to_string()));
        };
        validate_coordinates(Some(latitude), Some(longitude))?;
        Ok(StatusUpdateRequest {
            new_status: self.new_status,
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadRequest {
    pub image_data: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCardApprovalInput {
    pub approved: bool,
    pub review_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use JobStatus::*;

    fn card(status: JobStatus) -> JobCard {
        JobCard {
            id: 1,
            main_ticket_id: Some(10),
            ticket_number: Some("TKT-20240501-0001".to_string()),
            ticket_title: Some("Service".to_string()),
            generator: None,
            status,
            start_time: None,
            end_time: None,
            work_minutes: 135,
            approved: false,
            image: None,
            created_at: None,
        }
    }

    fn open_day() -> DayStatus {
        DayStatus {
            day_started: true,
            day_ended: false,
            day_start_time: None,
            day_end_time: None,
        }
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(Pending.allowed_transitions(), &[Traveling, Cancel]);
        assert_eq!(Traveling.allowed_transitions(), &[Started, OnHold, Cancel]);
        assert_eq!(Started.allowed_transitions(), &[OnHold, Completed, Cancel]);
        assert_eq!(OnHold.allowed_transitions(), &[Started, Cancel]);
        assert!(Completed.allowed_transitions().is_empty());
        assert!(Cancel.allowed_transitions().is_empty());
    }

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = JobStatus::ALL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![Completed, Cancel]);
    }

    #[test]
    fn test_no_self_or_backward_to_pending() {
        for status in JobStatus::ALL {
            assert!(!status.can_transition_to(status));
            assert!(!status.can_transition_to(Pending));
        }
        assert!(OnHold.can_transition_to(Started));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&OnHold).unwrap(), "\"ON_HOLD\"");
        let s: JobStatus = serde_json::from_str("\"TRAVELING\"").unwrap();
        assert_eq!(s, Traveling);
        for status in JobStatus::ALL {
            assert_eq!(serde_json::to_string(&status).unwrap(), format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_view_for_open_day() {
        let view = JobCardView::new(card(Started), Some(&open_day()));
        assert!(view.can_update_status);
        assert_eq!(view.available_transitions, vec![OnHold, Completed, Cancel]);
        assert_eq!(view.work_time, "2h 15m");
    }

    #[test]
    fn test_view_hides_transitions_when_gated() {
        let mut day = open_day();
        day.day_ended = true;
        let view = JobCardView::new(card(Started), Some(&day));
        assert!(!view.can_update_status);
        assert!(view.available_transitions.is_empty());

        let view = JobCardView::new(card(Completed), Some(&open_day()));
        assert!(!view.can_update_status);

        let view = JobCardView::new(card(Pending), None);
        assert!(!view.can_update_status);
    }

    #[test]
    fn test_view_serializes_flat() {
        let json = serde_json::to_value(JobCardView::new(card(Pending), Some(&open_day()))).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["availableTransitions"], serde_json::json!(["TRAVELING", "CANCEL"]));
        assert_eq!(json["canUpdateStatus"], true);
    }

    #[test]
    fn test_missing_location_aborts() {
        let input = StatusUpdateInput {
            new_status: Traveling,
            latitude: Some(6.9),
            longitude: None,
        };
        match input.into_request() {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, LOCATION_REQUIRED),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_location_forwarded() {
        let input = StatusUpdateInput {
            new_status: Traveling,
            latitude: Some(6.9),
            longitude: Some(79.8),
        };
        let req = input.into_request().unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["newStatus"], "TRAVELING");
        assert_eq!(json["latitude"], 6.9);
        assert_eq!(json["longitude"], 79.8);

        let bad = StatusUpdateInput {
            new_status: Traveling,
            latitude: Some(123.0),
            longitude: Some(0.0),
        };
        assert!(bad.into_request().is_err());
    }
}
