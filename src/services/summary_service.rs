use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use crate::{
    auth::{require_owner_or_admin, Identity},
    errors::{AppError, AppResult},
    models::{
        domain::{Chapter, Quiz, QuizAttempt, Subject, User},
        dto::{
            request::AttemptListQuery,
            response::{
                AdminHistoryResponse, AdminSummaryResponse, AttemptDto, ContentCounts, DashboardResponse, HighScore,
                HistoryEntry, QuizRef, SubjectChartEntry, SubjectStats, UserActivityResponse,
                UserDto, UserRollup, UserSummaryResponse,
            },
        },
    },
    repositories::{
        AttemptFilter, ChapterRepository, QuestionRepository, QuizAttemptRepository,
        QuizRepository, SubjectRepository, UserRepository,
    },
    services::catalog_service::CatalogService,
};

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Submitted first, newest first; open attempts last.
pub fn history_order(a: &QuizAttempt, b: &QuizAttempt) -> Ordering {
    match (a.submitted_at, b.submitted_at) {
        (Some(x), Some(y)) => y.cmp(&x).then(b.id.cmp(&a.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.id.cmp(&a.id),
    }
}

/// Denormalised lookup of quiz → chapter → subject built from one read of
/// each collection.
pub struct CatalogIndex {
    subjects: HashMap<i64, Subject>,
    chapters: HashMap<i64, Chapter>,
    quizzes: HashMap<i64, Quiz>,
}

impl CatalogIndex {
    pub fn new(subjects: Vec<Subject>, chapters: Vec<Chapter>, quizzes: Vec<Quiz>) -> Self {
        Self {
            subjects: subjects.into_iter().map(|s| (s.id, s)).collect(),
            chapters: chapters.into_iter().map(|c| (c.id, c)).collect(),
            quizzes: quizzes.into_iter().map(|q| (q.id, q)).collect(),
        }
    }

    pub fn quiz(&self, quiz_id: i64) -> Option<&Quiz> {
        self.quizzes.get(&quiz_id)
    }

    pub fn chapter_of(&self, quiz_id: i64) -> Option<&Chapter> {
        self.quiz(quiz_id)
            .and_then(|quiz| self.chapters.get(&quiz.chapter_id))
    }

    pub fn subject_of(&self, quiz_id: i64) -> Option<&Subject> {
        self.chapter_of(quiz_id)
            .and_then(|chapter| self.subjects.get(&chapter.subject_id))
    }

    pub fn history_entry(&self, attempt: &QuizAttempt) -> HistoryEntry {
        HistoryEntry::new(
            attempt,
            self.quiz(attempt.quiz_id).map(|q| q.title.as_str()).unwrap_or(""),
            self.chapter_of(attempt.quiz_id).map(|c| c.name.as_str()).unwrap_or(""),
            self.subject_of(attempt.quiz_id).map(|s| s.name.as_str()).unwrap_or(""),
        )
    }
}

/// Per-subject highest and aggregate percentage, subjects ordered by name.
pub fn subject_chart(index: &CatalogIndex, attempts: &[QuizAttempt]) -> Vec<SubjectChartEntry> {
    // name -> (best percentage, sum of scores, sum of totals)
    let mut per_subject: BTreeMap<String, (f64, i64, i64)> = BTreeMap::new();

    for attempt in attempts.iter().filter(|a| a.total_questions > 0) {
        let Some(subject) = index.subject_of(attempt.quiz_id) else {
            continue;
        };
        let percentage = f64::from(attempt.score) * 100.0 / f64::from(attempt.total_questions);
        let entry = per_subject
            .entry(subject.name.clone())
            .or_insert((f64::MIN, 0, 0));
        entry.0 = entry.0.max(percentage);
        entry.1 += i64::from(attempt.score);
        entry.2 += i64::from(attempt.total_questions);
    }

    per_subject
        .into_iter()
        .map(|(subject, (best, score_sum, total_sum))| SubjectChartEntry {
            subject,
            highest_percentage: round1(best),
            average_percentage: round1(score_sum as f64 * 100.0 / total_sum as f64),
        })
        .collect()
}

/// Attempt count and best submitted percentage per user, busiest first.
pub fn user_rollup(users: &[User], attempts: &[QuizAttempt]) -> Vec<UserRollup> {
    let mut rollup: Vec<UserRollup> = users
        .iter()
        .map(|user| {
            let own: Vec<&QuizAttempt> = attempts.iter().filter(|a| a.user_id == user.id).collect();
            UserRollup {
                user_id: user.id,
                username: user.username.clone(),
                attempt_count: own.len(),
                best_percentage: own
                    .iter()
                    .filter(|a| a.is_submitted())
                    .map(|a| a.percentage_score())
                    .fold(0.0, f64::max),
            }
        })
        .collect();
    rollup.sort_by(|a, b| {
        b.attempt_count
            .cmp(&a.attempt_count)
            .then_with(|| a.username.cmp(&b.username))
    });
    rollup
}

pub struct SummaryRepositories {
    pub users: Arc<dyn UserRepository>,
    pub subjects: Arc<dyn SubjectRepository>,
    pub chapters: Arc<dyn ChapterRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub attempts: Arc<dyn QuizAttemptRepository>,
}

/// Read-only views over attempts: learner history, dashboards, admin analytics.
pub struct SummaryService {
    users: Arc<dyn UserRepository>,
    subjects: Arc<dyn SubjectRepository>,
    chapters: Arc<dyn ChapterRepository>,
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuestionRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    catalog: Arc<CatalogService>,
}

impl SummaryService {
    pub fn new(repositories: SummaryRepositories, catalog: Arc<CatalogService>) -> Self {
        Self {
            users: repositories.users,
            subjects: repositories.subjects,
            chapters: repositories.chapters,
            quizzes: repositories.quizzes,
            questions: repositories.questions,
            attempts: repositories.attempts,
            catalog,
        }
    }

    pub async fn catalog_index(&self) -> AppResult<CatalogIndex> {
        Ok(CatalogIndex::new(
            self.subjects.find_all().await?,
            self.chapters.find_all().await?,
            self.quizzes.find_all().await?,
        ))
    }

    async fn history(&self, index: &CatalogIndex, user_id: i64) -> AppResult<Vec<QuizAttempt>> {
        let mut attempts = self
            .attempts
            .find_all(AttemptFilter::for_user(user_id))
            .await?;
        attempts.retain(|a| index.quiz(a.quiz_id).is_some());
        attempts.sort_by(history_order);
        Ok(attempts)
    }

    pub async fn user_summary(&self, identity: &Identity) -> AppResult<UserSummaryResponse> {
        let index = self.catalog_index().await?;
        let attempts = self.history(&index, identity.user_id).await?;

        Ok(UserSummaryResponse {
            chart_data: subject_chart(&index, &attempts),
            attempts: attempts.iter().map(|a| index.history_entry(a)).collect(),
        })
    }

    pub async fn dashboard(&self, identity: &Identity) -> AppResult<DashboardResponse> {
        let mut high_scores: BTreeMap<i64, HighScore> = BTreeMap::new();
        for attempt in self
            .attempts
            .find_all(AttemptFilter::for_user(identity.user_id))
            .await?
        {
            let best = high_scores.entry(attempt.quiz_id).or_insert(HighScore {
                score: attempt.score,
                total: attempt.total_questions,
            });
            if attempt.score > best.score {
                *best = HighScore {
                    score: attempt.score,
                    total: attempt.total_questions,
                };
            }
        }

        Ok(DashboardResponse {
            subjects: self.catalog.catalog_tree().await?,
            high_scores,
        })
    }

    pub async fn user_activity(&self, user_id: i64) -> AppResult<UserActivityResponse> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))?;

        let index = self.catalog_index().await?;
        let attempts = self.history(&index, user_id).await?;

        Ok(UserActivityResponse {
            user: UserDto::from(user),
            attempts: attempts.iter().map(|a| index.history_entry(a)).collect(),
        })
    }

    /// All attempts across users, in the same shape as a learner's history.
    pub async fn admin_history(&self) -> AppResult<AdminHistoryResponse> {
        let index = self.catalog_index().await?;
        let mut attempts = self.attempts.find_all(AttemptFilter::default()).await?;
        attempts.retain(|a| index.quiz(a.quiz_id).is_some());
        attempts.sort_by(history_order);

        let users = self.users.find_all().await?;
        Ok(AdminHistoryResponse {
            attempts: attempts.iter().map(|a| index.history_entry(a)).collect(),
            users: user_rollup(&users, &attempts),
        })
    }

    pub async fn admin_summary(&self) -> AppResult<AdminSummaryResponse> {
        let users = self.users.find_all().await?;
        let subjects = self.subjects.find_all().await?;
        let chapters = self.chapters.find_all().await?;
        let quizzes = self.quizzes.find_all().await?;
        let attempts = self.attempts.find_all(AttemptFilter::default()).await?;

        let counts = ContentCounts {
            users: users.len(),
            subjects: subjects.len(),
            chapters: chapters.len(),
            quizzes: quizzes.len(),
            questions: self.questions.count().await?,
            attempts: attempts.len(),
        };

        let mut quizzes_without_questions = Vec::new();
        for quiz in &quizzes {
            if self.questions.count_by_quiz(quiz.id).await? == 0 {
                quizzes_without_questions.push(QuizRef {
                    id: quiz.id,
                    title: quiz.title.clone(),
                });
            }
        }

        let rollup = user_rollup(&users, &attempts);

        let index = CatalogIndex::new(subjects.clone(), chapters, quizzes.clone());
        let subject_stats = subjects
            .iter()
            .map(|subject| {
                let in_subject = |quiz_id: i64| {
                    index.subject_of(quiz_id).map(|s| s.id) == Some(subject.id)
                };
                let subject_attempts: Vec<&QuizAttempt> =
                    attempts.iter().filter(|a| in_subject(a.quiz_id)).collect();
                SubjectStats {
                    subject_id: subject.id,
                    name: subject.name.clone(),
                    quiz_count: quizzes.iter().filter(|q| in_subject(q.id)).count(),
                    attempt_count: subject_attempts.len(),
                    top_score: subject_attempts.iter().map(|a| a.score).max().unwrap_or(0),
                }
            })
            .collect();

        Ok(AdminSummaryResponse {
            counts,
            users: rollup,
            subjects: subject_stats,
            quizzes_without_questions,
        })
    }

    /// Admins see everything (optionally filtered); everyone else only
    /// their own attempts.
    pub async fn list_attempts(
        &self,
        identity: &Identity,
        query: AttemptListQuery,
    ) -> AppResult<Vec<AttemptDto>> {
        let filter = AttemptFilter {
            user_id: if identity.is_admin() {
                query.user_id
            } else {
                Some(identity.user_id)
            },
            quiz_id: query.quiz_id,
        };

        let attempts = self.attempts.find_all(filter).await?;
        Ok(attempts.into_iter().map(AttemptDto::from).collect())
    }

    pub async fn get_attempt(&self, identity: &Identity, attempt_id: i64) -> AppResult<AttemptDto> {
        let attempt = self.attempts.find_by_id(attempt_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Quiz attempt with id '{}' not found", attempt_id))
        })?;
        require_owner_or_admin(identity, attempt.user_id)?;

        Ok(AttemptDto::from(attempt))
    }

    pub async fn delete_attempt(&self, attempt_id: i64) -> AppResult<()> {
        self.attempts.delete(attempt_id).await?;
        log::info!("Deleted quiz attempt {}", attempt_id);
        Ok(())
    }
}
