use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    quiz_attempt::{format_submitted_at, format_time_taken},
    Chapter, Job, Quiz, QuizAttempt, Role, Subject, User,
};

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            active: user.active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

// Catalog views

#[derive(Debug, Clone, Serialize)]
pub struct SubjectDetailResponse {
    #[serde(flatten)]
    pub subject: Subject,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterDto {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub subject_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizDto {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub chapter_name: String,
    pub subject_name: String,
}

// Attempt engine

#[derive(Debug, Clone, Serialize)]
pub struct StartAttemptResponse {
    pub attempt_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    pub id: i64,
    pub text: String,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptInProgressResponse {
    pub attempt_id: i64,
    pub quiz_title: String,
    pub duration_minutes: i32,
    pub time_remaining_seconds: f64,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckAnswerResponse {
    pub correct: bool,
    pub correct_option_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitAttemptResponse {
    pub message: String,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub correct_answers: BTreeMap<i64, i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptDto {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub start_time: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub time_taken: String,
}

impl From<QuizAttempt> for AttemptDto {
    fn from(attempt: QuizAttempt) -> Self {
        AttemptDto {
            percentage: attempt.percentage_score(),
            time_taken: format_time_taken(attempt.time_taken()),
            id: attempt.id,
            user_id: attempt.user_id,
            quiz_id: attempt.quiz_id,
            score: attempt.score,
            total_questions: attempt.total_questions,
            start_time: attempt.start_time,
            submitted_at: attempt.submitted_at,
        }
    }
}

// History and analytics

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub attempt_id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub chapter_name: String,
    pub subject_name: String,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub submitted_at: String,
    pub time_taken: String,
}

impl HistoryEntry {
    pub fn new(attempt: &QuizAttempt, quiz_title: &str, chapter_name: &str, subject_name: &str) -> Self {
        HistoryEntry {
            attempt_id: attempt.id,
            user_id: attempt.user_id,
            quiz_id: attempt.quiz_id,
            quiz_title: quiz_title.to_string(),
            chapter_name: chapter_name.to_string(),
            subject_name: subject_name.to_string(),
            score: attempt.score,
            total_questions: attempt.total_questions,
            percentage: attempt.percentage_score(),
            submitted_at: format_submitted_at(attempt.submitted_at),
            time_taken: format_time_taken(attempt.time_taken()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectChartEntry {
    pub subject: String,
    pub highest_percentage: f64,
    pub average_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSummaryResponse {
    pub attempts: Vec<HistoryEntry>,
    pub chart_data: Vec<SubjectChartEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserActivityResponse {
    pub user: UserDto,
    pub attempts: Vec<HistoryEntry>,
}

/// Every attempt in history order, plus the per-user roll-up.
#[derive(Debug, Clone, Serialize)]
pub struct AdminHistoryResponse {
    pub attempts: Vec<HistoryEntry>,
    pub users: Vec<UserRollup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentCounts {
    pub users: usize,
    pub subjects: usize,
    pub chapters: usize,
    pub quizzes: usize,
    pub questions: usize,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRollup {
    pub user_id: i64,
    pub username: String,
    pub attempt_count: usize,
    pub best_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectStats {
    pub subject_id: i64,
    pub name: String,
    pub quiz_count: usize,
    pub attempt_count: usize,
    /// Highest raw score of any attempt on a quiz of this subject.
    pub top_score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizRef {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSummaryResponse {
    pub counts: ContentCounts,
    pub users: Vec<UserRollup>,
    pub subjects: Vec<SubjectStats>,
    pub quizzes_without_questions: Vec<QuizRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardQuiz {
    pub id: i64,
    pub title: String,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardChapter {
    pub id: i64,
    pub name: String,
    pub quizzes: Vec<DashboardQuiz>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSubject {
    pub id: i64,
    pub name: String,
    pub chapters: Vec<DashboardChapter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HighScore {
    pub score: i32,
    pub total: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub subjects: Vec<DashboardSubject>,
    pub high_scores: BTreeMap<i64, HighScore>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResponse {
    pub users: Vec<UserDto>,
    pub subjects: Vec<Subject>,
    pub quizzes: Vec<QuizDto>,
}

// Background jobs

#[derive(Debug, Clone, Serialize)]
pub struct TaskCreatedResponse {
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskStatusResponse {
    pub task_id: String,
    pub status: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl From<Job> for TaskStatusResponse {
    fn from(job: Job) -> Self {
        TaskStatusResponse {
            task_id: job.job_id,
            status: job.status.to_string(),
            result: job.result,
            error: job.error_message,
        }
    }
}
