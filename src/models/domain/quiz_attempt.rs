use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl QuizAttempt {
    pub fn start(id: i64, user_id: i64, quiz_id: i64, total_questions: i32) -> Self {
        QuizAttempt {
            id,
            user_id,
            quiz_id,
            score: 0,
            total_questions,
            start_time: Utc::now(),
            submitted_at: None,
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    pub fn percentage_score(&self) -> f64 {
        percentage(self.score, self.total_questions)
    }

    pub fn time_taken(&self) -> Option<Duration> {
        self.submitted_at.map(|submitted| submitted - self.start_time)
    }

    /// Seconds left on the clock. Negative once the window has passed.
    pub fn remaining_seconds(&self, duration_minutes: i32, now: DateTime<Utc>) -> f64 {
        let elapsed = (now - self.start_time).num_milliseconds() as f64 / 1000.0;
        f64::from(duration_minutes) * 60.0 - elapsed
    }
}

/// `score / total * 100` rounded to two decimals, 0 for an empty attempt.
pub fn percentage(score: i32, total: i32) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = f64::from(score) / f64::from(total) * 100.0;
    (raw * 100.0).round() / 100.0
}

pub fn format_time_taken(duration: Option<Duration>) -> String {
    match duration {
        Some(d) => {
            let seconds = d.num_seconds().max(0);
            format!("{}m {}s", seconds / 60, seconds % 60)
        }
        None => "N/A".to_string(),
    }
}

pub fn format_submitted_at(submitted_at: Option<DateTime<Utc>>) -> String {
    submitted_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "Incomplete".to_string())
}
