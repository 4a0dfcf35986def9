use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job status stored in MongoDB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobKind {
    ExportAttempts { user_id: i64 },
    MonthlyReport,
    DailyReminder,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::ExportAttempts { user_id } => write!(f, "export_attempts(user {})", user_id),
            JobKind::MonthlyReport => write!(f, "monthly_report"),
            JobKind::DailyReminder => write!(f, "daily_reminder"),
        }
    }
}

/// Background job document stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub kind: JobKind,
    pub status: JobStatus,
    pub requested_by: Option<i64>,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(kind: JobKind, requested_by: Option<i64>) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            kind,
            status: JobStatus::Pending,
            requested_by,
            result: None,
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_is_pending_with_unique_id() {
        let a = Job::new(JobKind::MonthlyReport, None);
        let b = Job::new(JobKind::ExportAttempts { user_id: 4 }, Some(4));

        assert_eq!(a.status, JobStatus::Pending);
        assert_ne!(a.job_id, b.job_id);
        assert!(!a.is_finished());
        assert_eq!(b.requested_by, Some(4));
    }

    #[test]
    fn job_kind_is_tagged_in_json() {
        let json = serde_json::to_value(JobKind::ExportAttempts { user_id: 9 }).unwrap();
        assert_eq!(json["type"], "export_attempts");
        assert_eq!(json["user_id"], 9);
    }

    #[test]
    fn status_displays_lowercase() {
        assert_eq!(JobStatus::Completed.to_string(), "completed");
        assert_eq!(JobStatus::Failed.to_string(), "failed");
    }
}
