//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod change_request_repo;
pub mod department_repo;
pub mod milestone_repo;
pub mod notification_repo;
pub mod project_repo;
pub mod risk_issue_repo;
pub mod task_milestone_repo;
pub mod task_repo;
pub mod user_repo;
pub mod weekly_update_repo;

pub use change_request_repo::ChangeRequestRepo;
pub use department_repo::DepartmentRepo;
pub use milestone_repo::MilestoneRepo;
pub use notification_repo::NotificationRepo;
pub use project_repo::ProjectRepo;
pub use risk_issue_repo::RiskIssueRepo;
pub use task_milestone_repo::TaskMilestoneRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
pub use weekly_update_repo::WeeklyUpdateRepo;
