use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

use crate::{AppError, AppResult};

/// Report window used when the caller gives no dates.
pub const DEFAULT_REPORT_DAYS: i64 = 30;

pub const TIME_TRACKING_CSV_HEADERS: [&str; 7] = [
    "Date",
    "Day Started",
    "Day Ended",
    "Total Work",
    "Morning OT",
    "Evening OT",
    "Total OT",
];
pub const OT_TRACKING_CSV_HEADERS: [&str; 6] = [
    "Date",
    "Day of Week",
    "Total Work",
    "Morning OT",
    "Evening OT",
    "Regular Work",
];

/// `135` -> `"2h 15m"`.
pub fn format_minutes(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    pub employee_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportParams {
    pub employee_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ReportQuery {
    pub fn resolve(&self, today: NaiveDate) -> AppResult<ReportParams> {
        let employee_id = self.employee_id.ok_or_else(|| {
            AppError::Validation("Please select employee and date range".to_string())
        })?;
        let end_date = self.end_date.unwrap_or(today);
        let start_date = self
            .start_date
            .unwrap_or(end_date - Duration::days(DEFAULT_REPORT_DAYS));
        if start_date > end_date {
            return Err(AppError::Validation(
                "Start date must not be after end date".to_string(),
            ));
        }
        Ok(ReportParams {
            employee_id,
            start_date,
            end_date,
        })
    }

    pub fn resolve_today(&self) -> AppResult<ReportParams> {
        self.resolve(Utc::now().date_naive())
    }
}

impl ReportParams {
    pub fn to_query(&self) -> Vec<(String, String)> {
        vec![
            ("employeeId".to_string(), self.employee_id.to_string()),
            ("startDate".to_string(), self.start_date.to_string()),
            ("endDate".to_string(), self.end_date.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCardSummary {
    pub job_card_id: i64,
    pub ticket_number: Option<String>,
    pub generator_name: Option<String>,
    pub status: String,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub work_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyWorkRecord {
    pub date: NaiveDate,
    pub day_start_time: Option<NaiveDateTime>,
    pub day_end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub total_work_minutes: i64,
    #[serde(default)]
    pub morning_ot_minutes: i64,
    #[serde(default)]
    pub evening_ot_minutes: i64,
    #[serde(default)]
    pub day_started: bool,
    #[serde(default)]
    pub day_ended: bool,
    #[serde(default)]
    pub job_cards: Vec<JobCardSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeTrackingReport {
    pub employee_id: i64,
    pub employee_name: String,
    pub employee_email: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub daily_records: Vec<DailyWorkRecord>,
    #[serde(default)]
    pub total_work_minutes: i64,
    #[serde(default)]
    pub total_morning_ot_minutes: i64,
    #[serde(default)]
    pub total_evening_ot_minutes: i64,
    #[serde(default)]
    pub total_ot_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorWork {
    pub generator_name: Option<String>,
    pub generator_model: Option<String>,
    pub job_card_type: Option<String>,
    #[serde(default)]
    pub work_minutes: i64,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyOtRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub day_of_week: String,
    #[serde(default)]
    pub total_work_minutes: i64,
    #[serde(default)]
    pub morning_ot_minutes: i64,
    #[serde(default)]
    pub evening_ot_minutes: i64,
    #[serde(default)]
    pub regular_work_minutes: i64,
    #[serde(default)]
    pub generator_works: Vec<GeneratorWork>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceAnalysis {
    pub average_work_minutes_per_day: f64,
    #[serde(rename = "averageOTMinutesPerDay")]
    pub average_ot_minutes_per_day: f64,
    pub total_jobs_completed: i64,
    pub total_jobs_in_progress: i64,
    pub total_jobs_cancelled: i64,
    pub job_completion_rate: f64,
    pub most_worked_job_type: Option<String>,
    pub most_worked_job_type_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OtTrackingReport {
    pub employee_id: i64,
    pub employee_name: String,
    pub employee_email: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub total_days_worked: i64,
    #[serde(default)]
    pub total_work_minutes: i64,
    #[serde(default)]
    pub total_morning_ot_minutes: i64,
    #[serde(default)]
    pub total_evening_ot_minutes: i64,
    #[serde(default)]
    pub total_ot_minutes: i64,
    #[serde(default, rename = "dailyOTRecords")]
    pub daily_ot_records: Vec<DailyOtRecord>,
    #[serde(default)]
    pub work_minutes_by_job_type: BTreeMap<String, i64>,
    #[serde(default)]
    pub performance_analysis: PerformanceAnalysis,
}

/// Human-readable totals shown next to the raw minute counts.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_work: String,
    pub morning_ot: String,
    pub evening_ot: String,
    pub total_ot: String,
}

impl ReportSummary {
    fn new(work: i64, morning: i64, evening: i64, total_ot: i64) -> Self {
        Self {
            total_work: format_minutes(work),
            morning_ot: format_minutes(morning),
            evening_ot: format_minutes(evening),
            total_ot: format_minutes(total_ot),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeTrackingReportView {
    #[serde(flatten)]
    pub report: TimeTrackingReport,
    pub summary: ReportSummary,
}

impl From<TimeTrackingReport> for TimeTrackingReportView {
    fn from(report: TimeTrackingReport) -> Self {
        let summary = ReportSummary::new(
            report.total_work_minutes,
            report.total_morning_ot_minutes,
            report.total_evening_ot_minutes,
            report.total_ot_minutes,
        );
        Self { report, summary }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OtTrackingReportView {
    #[serde(flatten)]
    pub report: OtTrackingReport,
    pub summary: ReportSummary,
}

impl From<OtTrackingReport> for OtTrackingReportView {
    fn from(report: OtTrackingReport) -> Self {
        let summary = ReportSummary::new(
            report.total_work_minutes,
            report.total_morning_ot_minutes,
            report.total_evening_ot_minutes,
            report.total_ot_minutes,
        );
        Self { report, summary }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn csv_error(e: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("CSV export failed: {}", e))
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> AppResult<String> {
    let bytes = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}

pub fn time_tracking_csv(report: &TimeTrackingReport) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(TIME_TRACKING_CSV_HEADERS).map_err(csv_error)?;
    for record in &report.daily_records {
        writer
            .write_record([
                record.date.to_string(),
                yes_no(record.day_started).to_string(),
                yes_no(record.day_ended).to_string(),
                format_minutes(record.total_work_minutes),
                format_minutes(record.morning_ot_minutes),
                format_minutes(record.evening_ot_minutes),
                format_minutes(record.morning_ot_minutes + record.evening_ot_minutes),
            ])
            .map_err(csv_error)?;
    }
    finish_csv(writer)
}

pub fn ot_tracking_csv(report: &OtTrackingReport) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(OT_TRACKING_CSV_HEADERS).map_err(csv_error)?;
    for record in &report.daily_ot_records {
        writer
            .write_record([
                record.date.to_string(),
                record.day_of_week.clone(),
                format_minutes(record.total_work_minutes),
                format_minutes(record.morning_ot_minutes),
                format_minutes(record.evening_ot_minutes),
                format_minutes(record.regular_work_minutes),
            ])
            .map_err(csv_error)?;
    }
    finish_csv(writer)
}

/// Download name, e.g. `time-report-Jane_Doe-2024-05-01-2024-05-31.csv`.
pub fn csv_file_name(kind: &str, employee_name: &str, params: &ReportParams) -> String {
    let employee: String = employee_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!(
        "{}-report-{}-{}-{}.csv",
        kind, employee, params.start_date, params.end_date
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32, work: i64, morning: i64, evening: i64) -> DailyWorkRecord {
        DailyWorkRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, d).unwrap(),
            day_start_time: None,
            day_end_time: None,
            total_work_minutes: work,
            morning_ot_minutes: morning,
            evening_ot_minutes: evening,
            day_started: true,
            day_ended: d % 2 == 0,
            job_cards: Vec::new(),
        }
    }

    fn report(records: Vec<DailyWorkRecord>) -> TimeTrackingReport {
        TimeTrackingReport {
            employee_id: 4,
            employee_name: "Jane Doe".to_string(),
            employee_email: None,
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            daily_records: records,
            total_work_minutes: 605,
            total_morning_ot_minutes: 30,
            total_evening_ot_minutes: 45,
            total_ot_minutes: 75,
        }
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0h 0m");
        assert_eq!(format_minutes(59), "0h 59m");
        assert_eq!(format_minutes(60), "1h 0m");
        assert_eq!(format_minutes(605), "10h 5m");
        assert_eq!(format_minutes(-5), "0h 0m");
    }

    #[test]
    fn test_time_csv_has_header_plus_one_line_per_record() {
        for n in [0usize, 1, 3] {
            let records = (1..=n as u32).map(|d| day(d, 480, 15, 30)).collect();
            let csv = time_tracking_csv(&report(records)).unwrap();
            assert_eq!(csv.lines().count(), n + 1);
            assert_eq!(csv.lines().next(), Some(TIME_TRACKING_CSV_HEADERS.join(",").as_str()));
        }
    }

    #[test]
    fn test_time_csv_row_format() {
        let csv = time_tracking_csv(&report(vec![day(2, 485, 20, 50)])).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "2024-05-02,Yes,Yes,8h 5m,0h 20m,0h 50m,1h 10m");
    }

    #[test]
    fn test_ot_csv() {
        let ot: OtTrackingReport = serde_json::from_str(
            r#"{"employeeId":4,"employeeName":"Jane","startDate":"2024-05-01","endDate":"2024-05-02",
                "dailyOTRecords":[
                  {"date":"2024-05-01","dayOfWeek":"WEDNESDAY","totalWorkMinutes":600,
                   "morningOtMinutes":30,"eveningOtMinutes":90,"regularWorkMinutes":480}
                ],
                "workMinutesByJobType":{"SERVICE":600},
                "performanceAnalysis":{"averageOTMinutesPerDay":120.0,"totalJobsCompleted":2}}"#,
        )
        .unwrap();
        assert_eq!(ot.performance_analysis.average_ot_minutes_per_day, 120.0);
        let csv = ot_tracking_csv(&ot).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], OT_TRACKING_CSV_HEADERS.join(","));
        assert_eq!(lines[1], "2024-05-01,WEDNESDAY,10h 0m,0h 30m,1h 30m,8h 0m");
    }

    #[test]
    fn test_ot_csv_quotes_commas_and_quotes() {
        let ot: OtTrackingReport = serde_json::from_str(
            r#"{"employeeId":4,"employeeName":"Jane","startDate":"2024-05-01","endDate":"2024-05-02",
                "dailyOTRecords":[
                  {"date":"2024-05-01","dayOfWeek":"Wed, holiday","totalWorkMinutes":60},
                  {"date":"2024-05-02","dayOfWeek":"Thu \"half\" day","totalWorkMinutes":30}
                ]}"#,
        )
        .unwrap();
        let exported = ot_tracking_csv(&ot).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(exported.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.len(), OT_TRACKING_CSV_HEADERS.len());
        }
        assert_eq!(&rows[1][1], "Wed, holiday");
        assert_eq!(&rows[2][1], "Thu \"half\" day");
    }

    #[test]
    fn test_view_summary() {
        let view = TimeTrackingReportView::from(report(vec![]));
        assert_eq!(view.summary.total_work, "10h 5m");
        assert_eq!(view.summary.total_ot, "1h 15m");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["employeeName"], "Jane Doe");
        assert_eq!(json["summary"]["eveningOt"], "0h 45m");
    }

    #[test]
    fn test_query_resolution() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let missing = ReportQuery {
            employee_id: None,
            start_date: None,
            end_date: None,
        };
        assert!(missing.resolve(today).is_err());

        let defaults = ReportQuery {
            employee_id: Some(9),
            start_date: None,
            end_date: None,
        }
        .resolve(today)
        .unwrap();
        assert_eq!(defaults.end_date, today);
        assert_eq!(defaults.start_date, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());

        let inverted = ReportQuery {
            employee_id: Some(9),
            start_date: Some(today),
            end_date: Some(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
        };
        assert!(inverted.resolve(today).is_err());
    }

    #[test]
    fn test_csv_file_name() {
        let params = ReportParams {
            employee_id: 1,
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
        };
        assert_eq!(
            csv_file_name("time", "Jane Doe", &params),
            "time-report-Jane_Doe-2024-05-01-2024-05-31.csv"
        );
    }
}
