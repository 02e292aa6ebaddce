pub mod auth;
pub mod day_status;
pub mod generator;
pub mod job_card;
pub mod page;
pub mod report;
pub mod ticket;
pub mod user;

pub use auth::{AuthResponse, LoginInput, LoginResponse, RefreshRequest, RefreshResponse};
pub use day_status::{DayStatus, DayStatusView};
pub use generator::{Generator, GeneratorInput};
pub use job_card::{
    ImageUploadRequest, JobCard, JobCardApprovalInput, JobCardView, JobStatus, StatusUpdateInput,
};
pub use page::{Page, PageQuery};
pub use report::{
    OtTrackingReport, OtTrackingReportView, ReportQuery, TimeTrackingReport, TimeTrackingReportView,
};
pub use ticket::{
    ApprovalInput, AssignInput, SubTicket, SubTicketView, Ticket, TicketInput, TicketStatus,
};
pub use user::{Role, User, UserInput};
