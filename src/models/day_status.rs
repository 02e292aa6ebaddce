use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::job_card::JobStatus;

pub const DAY_NOT_STARTED_NOTICE: &str = "You must start your day before updating job card statuses";
pub const DAY_ENDED_NOTICE: &str = "Day has ended. You cannot update job statuses anymore";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayStatus {
    pub day_started: bool,
    pub day_ended: bool,
    pub day_start_time: Option<NaiveDateTime>,
    pub day_end_time: Option<NaiveDateTime>,
}

impl DayStatus {
    /// Workday is open: started and not yet ended.
    pub fn is_open(&self) -> bool {
        self.day_started && !self.day_ended
    }

    pub fn can_start(&self) -> bool {
        !self.day_started
    }

    pub fn can_end(&self) -> bool {
        self.is_open()
    }

    pub fn notice(&self) -> Option<&'static str> {
        if !self.day_started {
            Some(DAY_NOT_STARTED_NOTICE)
        } else if self.day_ended {
            Some(DAY_ENDED_NOTICE)
        } else {
            None
        }
    }
}

/// Whether an employee may request a status change on a card right now.
/// An unknown day status counts as closed.
pub fn can_update_status(day: Option<&DayStatus>, status: JobStatus) -> bool {
    day.is_some_and(DayStatus::is_open) && !status.is_terminal()
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayStatusView {
    #[serde(flatten)]
    pub status: DayStatus,
    pub can_start_day: bool,
    pub can_end_day: bool,
    pub can_update_job_cards: bool,
    pub notice: Option<String>,
}

impl From<DayStatus> for DayStatusView {
    fn from(status: DayStatus) -> Self {
        Self {
            can_start_day: status.can_start(),
            can_end_day: status.can_end(),
            can_update_job_cards: status.is_open(),
            notice: status.notice().map(str::to_string),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(started: bool, ended: bool) -> DayStatus {
        DayStatus {
            day_started: started,
            day_ended: ended,
            day_start_time: None,
            day_end_time: None,
        }
    }

    #[test]
    fn test_gate_truth_table() {
        for status in JobStatus::ALL {
            for (started, ended) in [(false, false), (true, false), (true, true), (false, true)] {
                let expected = started && !ended && !matches!(status, JobStatus::Completed | JobStatus::Cancel);
                assert_eq!(
                    can_update_status(Some(&day(started, ended)), status),
                    expected,
                    "status={:?} started={} ended={}",
                    status,
                    started,
                    ended
                );
            }
            assert!(!can_update_status(None, status));
        }
    }

    #[test]
    fn test_day_controls() {
        let fresh = DayStatusView::from(day(false, false));
        assert!(fresh.can_start_day);
        assert!(!fresh.can_end_day);
        assert_eq!(fresh.notice.as_deref(), Some(DAY_NOT_STARTED_NOTICE));

        let open = DayStatusView::from(day(true, false));
        assert!(!open.can_start_day);
        assert!(open.can_end_day);
        assert!(open.can_update_job_cards);
        assert!(open.notice.is_none());

        let closed = DayStatusView::from(day(true, true));
        assert!(!closed.can_start_day);
        assert!(!closed.can_end_day);
        assert_eq!(closed.notice.as_deref(), Some(DAY_ENDED_NOTICE));
    }

    #[test]
    fn test_deserialize_backend_shape() {
        let status: DayStatus = serde_json::from_str(
            r#"{"dayStarted":true,"dayEnded":false,"dayStartTime":"2024-05-01T07:58:12.345","dayEndTime":null}"#,
        )
        .unwrap();
        assert!(status.is_open());
        assert!(status.day_start_time.is_some());
    }
}
