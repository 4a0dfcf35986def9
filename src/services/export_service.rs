use std::{collections::HashMap, path::PathBuf, sync::Arc};

use chrono::Utc;
use serde::Serialize;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Quiz, QuizAttempt},
    repositories::{AttemptFilter, QuizAttemptRepository, QuizRepository, UserRepository},
    services::summary_service::history_order,
};

pub fn remarks(percentage: f64) -> &'static str {
    if percentage >= 80.0 {
        "Excellent"
    } else if percentage >= 50.0 {
        "Good"
    } else {
        "Needs Improvement"
    }
}

#[derive(Debug, Serialize)]
struct AttemptRow<'a> {
    quiz_id: i64,
    quiz_title: &'a str,
    chapter_id: Option<i64>,
    date_of_quiz: String,
    score: i32,
    total_questions: i32,
    percentage_score: String,
    remarks: &'static str,
}

/// Renders attempts as CSV with a header row, in the order given.
pub fn render_attempts_csv(attempts: &[QuizAttempt], quizzes: &HashMap<i64, Quiz>) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for attempt in attempts {
        let quiz = quizzes.get(&attempt.quiz_id);
        let percentage = attempt.percentage_score();
        writer.serialize(AttemptRow {
            quiz_id: attempt.quiz_id,
            quiz_title: quiz.map(|q| q.title.as_str()).unwrap_or(""),
            chapter_id: quiz.map(|q| q.chapter_id),
            date_of_quiz: attempt
                .submitted_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            score: attempt.score,
            total_questions: attempt.total_questions,
            percentage_score: format!("{:.1}%", percentage),
            remarks: remarks(percentage),
        })?;
    }

    if attempts.is_empty() {
        writer.write_record([
            "quiz_id",
            "quiz_title",
            "chapter_id",
            "date_of_quiz",
            "score",
            "total_questions",
            "percentage_score",
            "remarks",
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("Failed to flush CSV: {}", e)))
}

/// Writes a learner's attempt history to a CSV file in the export directory.
pub struct ExportService {
    users: Arc<dyn UserRepository>,
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    export_dir: PathBuf,
}

impl ExportService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            users,
            quizzes,
            attempts,
            export_dir: export_dir.into(),
        }
    }

    pub async fn export_user_attempts(&self, user_id: i64) -> AppResult<serde_json::Value> {
        log::info!("Starting CSV export for user {}", user_id);

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))?;

        let mut attempts = self
            .attempts
            .find_all(AttemptFilter::for_user(user_id))
            .await?;
        attempts.sort_by(history_order);

        let quizzes: HashMap<i64, Quiz> = self
            .quizzes
            .find_all()
            .await?
            .into_iter()
            .map(|q| (q.id, q))
            .collect();

        let content = render_attempts_csv(&attempts, &quizzes)?;

        tokio::fs::create_dir_all(&self.export_dir).await?;
        let filename = format!(
            "user_{}_attempts_{}.csv",
            user_id,
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        tokio::fs::write(self.export_dir.join(&filename), content).await?;

        log::info!("Exported {} attempts for user {} to {}", attempts.len(), user_id, filename);
        Ok(serde_json::json!({ "status": "SUCCESS", "filename": filename }))
    }
}
