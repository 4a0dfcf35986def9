use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{QuizAttempt, Role, User},
    repositories::{AttemptFilter, QuizAttemptRepository, QuizRepository, UserRepository},
    services::mailer::Mailer,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Start of the previous calendar month and start of the current one.
pub fn previous_month_range(now: DateTime<Utc>) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let (year, month) = if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    };

    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::InternalError("Invalid report month".to_string()))?;
    let end = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::InternalError("Invalid report month".to_string()))?;

    Ok((start, end))
}

fn is_learner(user: &User) -> bool {
    user.role == Role::User && user.active
}

/// Monthly summaries and inactivity reminders, delivered through a [`Mailer`].
pub struct ReportService {
    users: Arc<dyn UserRepository>,
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    mailer: Arc<dyn Mailer>,
}

impl ReportService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            users,
            quizzes,
            attempts,
            mailer,
        }
    }

    pub async fn send_monthly_reports(&self, now: DateTime<Utc>) -> AppResult<DispatchSummary> {
        let (start, end) = previous_month_range(now)?;
        let month_name = start.format("%B %Y").to_string();
        log::info!("Running monthly report job for {}", month_name);

        let titles: HashMap<i64, String> = self
            .quizzes
            .find_all()
            .await?
            .into_iter()
            .map(|q| (q.id, q.title))
            .collect();

        let mut summary = DispatchSummary::default();
        for user in self.users.find_all().await?.iter().filter(|u| is_learner(u)) {
            let mut attempts: Vec<QuizAttempt> = self
                .attempts
                .find_all(AttemptFilter::for_user(user.id))
                .await?
                .into_iter()
                .filter(|a| a.submitted_at.is_some_and(|t| t >= start && t < end))
                .collect();

            if attempts.is_empty() {
                log::debug!("Skipping report for {} (no activity)", user.username);
                summary.skipped += 1;
                continue;
            }
            attempts.sort_by_key(|a| a.submitted_at);

            let average = attempts.iter().map(|a| a.percentage_score()).sum::<f64>()
                / attempts.len() as f64;
            let mut body = format!(
                "Hi {},\n\nIn {} you took {} quizzes with an average score of {:.1}%.\n\n",
                user.username,
                month_name,
                attempts.len(),
                average
            );
            for attempt in &attempts {
                body.push_str(&format!(
                    "- {}: {}/{} ({:.1}%)\n",
                    titles.get(&attempt.quiz_id).map(String::as_str).unwrap_or("Unknown quiz"),
                    attempt.score,
                    attempt.total_questions,
                    attempt.percentage_score()
                ));
            }

            let subject = format!("Your QuizMaster summary for {}", month_name);
            match self.mailer.send(&user.email, &subject, &body).await {
                Ok(()) => summary.sent += 1,
                Err(e) => {
                    log::error!("Failed to send monthly report to {}: {}", user.email, e);
                    summary.failed += 1;
                }
            }
        }

        log::info!(
            "Monthly reports: {} sent, {} skipped, {} failed",
            summary.sent,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    pub async fn send_daily_reminders(&self, now: DateTime<Utc>) -> AppResult<DispatchSummary> {
        let since = now - Duration::days(1);
        let attempts = self.attempts.find_all(AttemptFilter::default()).await?;

        let mut summary = DispatchSummary::default();
        for user in self.users.find_all().await?.iter().filter(|u| is_learner(u)) {
            let recently_active = attempts
                .iter()
                .any(|a| a.user_id == user.id && a.submitted_at.is_some_and(|t| t > since));
            if recently_active {
                summary.skipped += 1;
                continue;
            }

            let body = format!(
                "Hi {},\n\nWe haven't seen you in a while. New quizzes are waiting for you!",
                user.username
            );
            match self
                .mailer
                .send(&user.email, "Time for a quiz!", &body)
                .await
            {
                Ok(()) => summary.sent += 1,
                Err(e) => {
                    log::error!("Failed to send reminder to {}: {}", user.email, e);
                    summary.failed += 1;
                }
            }
        }

        log::info!("Daily reminders: {} sent, {} skipped", summary.sent, summary.skipped);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::Quiz,
        repositories::{
            quiz_attempt_repository::MockQuizAttemptRepository,
            quiz_repository::MockQuizRepository, user_repository::MockUserRepository,
        },
        services::mailer::MockMailer,
    };

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn users() -> Vec<User> {
        vec![
            User::new(1, "alice", "alice@example.com", Role::User),
            User::new(2, "bob", "bob@example.com", Role::User),
            User::new(3, "root", "root@example.com", Role::Admin),
        ]
    }

    fn submitted(id: i64, user_id: i64, when: DateTime<Utc>) -> QuizAttempt {
        let mut attempt = QuizAttempt::start(id, user_id, 7, 4);
        attempt.score = 3;
        attempt.submitted_at = Some(when);
        attempt
    }

    #[test]
    fn previous_month_wraps_the_year() {
        let (start, end) = previous_month_range(at(2024, 1, 15)).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let (start, _) = previous_month_range(at(2024, 3, 1)).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn monthly_report_only_goes_to_learners_with_activity() {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_all().returning(|| Ok(users()));
        let mut quiz_repo = MockQuizRepository::new();
        quiz_repo
            .expect_find_all()
            .returning(|| Ok(vec![Quiz::new(7, "Fractions", 1, 10, true, None)]));
        let mut attempt_repo = MockQuizAttemptRepository::new();
        attempt_repo.expect_find_all().returning(|filter| {
            Ok(match filter.user_id {
                Some(1) => vec![
                    submitted(1, 1, at(2024, 2, 10)),
                    submitted(2, 1, at(2024, 3, 2)),
                ],
                Some(2) => vec![submitted(3, 2, at(2024, 1, 20))],
                _ => vec![],
            })
        });
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|to, subject, body| {
                to == "alice@example.com"
                    && subject.contains("February 2024")
                    && body.contains("Fractions: 3/4 (75.0%)")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = ReportService::new(
            Arc::new(user_repo),
            Arc::new(quiz_repo),
            Arc::new(attempt_repo),
            Arc::new(mailer),
        );
        let summary = service.send_monthly_reports(at(2024, 3, 15)).await.unwrap();

        assert_eq!(
            summary,
            DispatchSummary {
                sent: 1,
                skipped: 1,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn reminders_skip_recently_active_learners() {
        let now = at(2024, 3, 15);
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_all().returning(|| Ok(users()));
        let mut attempt_repo = MockQuizAttemptRepository::new();
        attempt_repo
            .expect_find_all()
            .returning(move |_| Ok(vec![submitted(1, 1, now - Duration::hours(3))]));
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|to, _, _| to == "bob@example.com")
            .times(1)
            .returning(|_, _, _| Err(AppError::InternalError("smtp down".to_string())));

        let service = ReportService::new(
            Arc::new(user_repo),
            Arc::new(MockQuizRepository::new()),
            Arc::new(attempt_repo),
            Arc::new(mailer),
        );
        let summary = service.send_daily_reminders(now).await.unwrap();

        assert_eq!(summary.sent, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
    }
}
