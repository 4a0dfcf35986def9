#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quizmaster_server::{
    app_state::{AppState, Repositories},
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{
        Chapter, Job, JobStatus, Question, Quiz, QuizAttempt, Role, Subject, User,
    },
    repositories::{
        AttemptFilter, ChapterRepository, JobRepository, QuestionRepository,
        QuizAttemptRepository, QuizRepository, SubjectRepository, UserRepository,
    },
    services::mailer::LogMailer,
};

/// Rows keyed by numeric id plus a sequence for new ids.
struct Table<T> {
    rows: RwLock<HashMap<i64, T>>,
    sequence: AtomicI64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            sequence: AtomicI64::new(0),
        }
    }

    fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn get(&self, id: i64) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    async fn all(&self) -> Vec<T> {
        self.rows.read().await.values().cloned().collect()
    }

    async fn insert(&self, id: i64, row: T) -> T {
        self.rows.write().await.insert(id, row.clone());
        row
    }

    async fn replace(&self, id: i64, row: T, kind: &str) -> AppResult<T> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&id) {
            return Err(AppError::NotFound(format!("{} with id '{}' not found", kind, id)));
        }
        rows.insert(id, row.clone());
        Ok(row)
    }

    async fn remove(&self, id: i64, kind: &str) -> AppResult<()> {
        self.rows
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("{} with id '{}' not found", kind, id)))
    }

    async fn remove_where(&self, predicate: impl Fn(&T) -> bool) -> u64 {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, row| !predicate(row));
        (before - rows.len()) as u64
    }

    async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub struct InMemoryUserRepository {
    table: Table<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self { table: Table::new() }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn next_id(&self) -> AppResult<i64> {
        Ok(self.table.next_id())
    }

    async fn create(&self, user: User) -> AppResult<User> {
        if self.find_by_username(&user.username).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "User with username '{}' already exists",
                user.username
            )));
        }
        Ok(self.table.insert(user.id, user).await)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.table.get(id).await)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.table.all().await.into_iter().find(|u| u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.table.all().await.into_iter().find(|u| u.email == email))
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let mut users = self.table.all().await;
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.table.remove(id, "User").await
    }

    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self
            .find_all()
            .await?
            .into_iter()
            .filter(|u| contains_ci(&u.username, term) || contains_ci(&u.email, term))
            .collect();
        users.truncate(limit.max(0) as usize);
        Ok(users)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.table.len().await)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemorySubjectRepository {
    table: Table<Subject>,
}

impl InMemorySubjectRepository {
    pub fn new() -> Self {
        Self { table: Table::new() }
    }
}

#[async_trait]
impl SubjectRepository for InMemorySubjectRepository {
    async fn next_id(&self) -> AppResult<i64> {
        Ok(self.table.next_id())
    }

    async fn create(&self, subject: Subject) -> AppResult<Subject> {
        Ok(self.table.insert(subject.id, subject).await)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Subject>> {
        Ok(self.table.get(id).await)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Subject>> {
        Ok(self.table.all().await.into_iter().find(|s| s.name == name))
    }

    async fn find_all(&self) -> AppResult<Vec<Subject>> {
        let mut subjects = self.table.all().await;
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }

    async fn update(&self, subject: Subject) -> AppResult<Subject> {
        self.table.replace(subject.id, subject, "Subject").await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.table.remove(id, "Subject").await
    }

    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<Subject>> {
        let mut subjects: Vec<Subject> = self
            .find_all()
            .await?
            .into_iter()
            .filter(|s| {
                contains_ci(&s.name, term)
                    || s.description.as_deref().is_some_and(|d| contains_ci(d, term))
            })
            .collect();
        subjects.truncate(limit.max(0) as usize);
        Ok(subjects)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.table.len().await)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryChapterRepository {
    table: Table<Chapter>,
}

impl InMemoryChapterRepository {
    pub fn new() -> Self {
        Self { table: Table::new() }
    }
}

#[async_trait]
impl ChapterRepository for InMemoryChapterRepository {
    async fn next_id(&self) -> AppResult<i64> {
        Ok(self.table.next_id())
    }

    async fn create(&self, chapter: Chapter) -> AppResult<Chapter> {
        Ok(self.table.insert(chapter.id, chapter).await)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Chapter>> {
        Ok(self.table.get(id).await)
    }

    async fn find_by_subject_and_name(
        &self,
        subject_id: i64,
        name: &str,
    ) -> AppResult<Option<Chapter>> {
        Ok(self
            .table
            .all()
            .await
            .into_iter()
            .find(|c| c.subject_id == subject_id && c.name == name))
    }

    async fn find_all(&self) -> AppResult<Vec<Chapter>> {
        let mut chapters = self.table.all().await;
        chapters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(chapters)
    }

    async fn find_by_subject(&self, subject_id: i64) -> AppResult<Vec<Chapter>> {
        let mut chapters = self.find_all().await?;
        chapters.retain(|c| c.subject_id == subject_id);
        Ok(chapters)
    }

    async fn update(&self, chapter: Chapter) -> AppResult<Chapter> {
        self.table.replace(chapter.id, chapter, "Chapter").await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.table.remove(id, "Chapter").await
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.table.len().await)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryQuizRepository {
    table: Table<Quiz>,
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self { table: Table::new() }
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn next_id(&self) -> AppResult<i64> {
        Ok(self.table.next_id())
    }

    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        Ok(self.table.insert(quiz.id, quiz).await)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Quiz>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self) -> AppResult<Vec<Quiz>> {
        let mut quizzes = self.table.all().await;
        quizzes.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(quizzes)
    }

    async fn find_by_chapter(&self, chapter_id: i64) -> AppResult<Vec<Quiz>> {
        let mut quizzes = self.find_all().await?;
        quizzes.retain(|q| q.chapter_id == chapter_id);
        Ok(quizzes)
    }

    async fn update(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.table.replace(quiz.id, quiz, "Quiz").await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.table.remove(id, "Quiz").await
    }

    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<Quiz>> {
        let mut quizzes = self.find_all().await?;
        quizzes.retain(|q| contains_ci(&q.title, term));
        quizzes.truncate(limit.max(0) as usize);
        Ok(quizzes)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.table.len().await)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryQuestionRepository {
    table: Table<Question>,
    option_sequence: AtomicI64,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
            option_sequence: AtomicI64::new(100),
        }
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn next_id(&self) -> AppResult<i64> {
        Ok(self.table.next_id())
    }

    async fn next_option_id(&self) -> AppResult<i64> {
        Ok(self.option_sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn create(&self, question: Question) -> AppResult<Question> {
        Ok(self.table.insert(question.id, question).await)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Question>> {
        Ok(self.table.get(id).await)
    }

    async fn find_by_quiz(&self, quiz_id: i64) -> AppResult<Vec<Question>> {
        let mut questions: Vec<Question> = self
            .table
            .all()
            .await
            .into_iter()
            .filter(|q| q.quiz_id == quiz_id)
            .collect();
        questions.sort_by_key(|q| q.id);
        Ok(questions)
    }

    async fn count_by_quiz(&self, quiz_id: i64) -> AppResult<usize> {
        Ok(self.find_by_quiz(quiz_id).await?.len())
    }

    async fn update(&self, question: Question) -> AppResult<Question> {
        self.table.replace(question.id, question, "Question").await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.table.remove(id, "Question").await
    }

    async fn delete_by_quiz(&self, quiz_id: i64) -> AppResult<u64> {
        Ok(self.table.remove_where(|q| q.quiz_id == quiz_id).await)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.table.len().await)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryQuizAttemptRepository {
    table: Table<QuizAttempt>,
}

impl InMemoryQuizAttemptRepository {
    pub fn new() -> Self {
        Self { table: Table::new() }
    }
}

#[async_trait]
impl QuizAttemptRepository for InMemoryQuizAttemptRepository {
    async fn next_id(&self) -> AppResult<i64> {
        Ok(self.table.next_id())
    }

    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        Ok(self.table.insert(attempt.id, attempt).await)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<QuizAttempt>> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self, filter: AttemptFilter) -> AppResult<Vec<QuizAttempt>> {
        let mut attempts: Vec<QuizAttempt> = self
            .table
            .all()
            .await
            .into_iter()
            .filter(|a| filter.matches(a))
            .collect();
        attempts.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        Ok(attempts)
    }

    /// Check-and-set under the write lock, mirroring the conditional update.
    async fn finalize(
        &self,
        id: i64,
        score: i32,
        submitted_at: DateTime<Utc>,
    ) -> AppResult<Option<QuizAttempt>> {
        let mut rows = self.table.rows.write().await;
        match rows.get_mut(&id) {
            Some(attempt) if attempt.submitted_at.is_none() => {
                attempt.score = score;
                attempt.submitted_at = Some(submitted_at);
                Ok(Some(attempt.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.table.remove(id, "Quiz attempt").await
    }

    async fn delete_by_quiz(&self, quiz_id: i64) -> AppResult<u64> {
        Ok(self.table.remove_where(|a| a.quiz_id == quiz_id).await)
    }

    async fn delete_by_user(&self, user_id: i64) -> AppResult<u64> {
        Ok(self.table.remove_where(|a| a.user_id == user_id).await)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.table.len().await)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<String, Job>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    async fn update(&self, job_id: &str, apply: impl FnOnce(&mut Job)) -> AppResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;
        apply(job);
        Ok(())
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: Job) -> AppResult<Job> {
        self.jobs.write().await.insert(job.job_id.clone(), job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, job_id: &str) -> AppResult<Option<Job>> {
        Ok(self.jobs.read().await.get(job_id).cloned())
    }

    async fn mark_running(&self, job_id: &str) -> AppResult<()> {
        self.update(job_id, |job| {
            job.status = JobStatus::Running;
            job.started_at = Some(Utc::now());
        })
        .await
    }

    async fn mark_completed(&self, job_id: &str, result: serde_json::Value) -> AppResult<()> {
        self.update(job_id, |job| {
            job.status = JobStatus::Completed;
            job.result = Some(result);
            job.completed_at = Some(Utc::now());
        })
        .await
    }

    async fn mark_failed(&self, job_id: &str, error: String) -> AppResult<()> {
        self.update(job_id, |job| {
            job.status = JobStatus::Failed;
            job.error_message = Some(error);
            job.completed_at = Some(Utc::now());
        })
        .await
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Handles to the concrete in-memory stores behind a [`Repositories`] bundle.
pub struct TestStore {
    pub users: Arc<InMemoryUserRepository>,
    pub subjects: Arc<InMemorySubjectRepository>,
    pub chapters: Arc<InMemoryChapterRepository>,
    pub quizzes: Arc<InMemoryQuizRepository>,
    pub questions: Arc<InMemoryQuestionRepository>,
    pub attempts: Arc<InMemoryQuizAttemptRepository>,
    pub jobs: Arc<InMemoryJobRepository>,
}

impl TestStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            subjects: Arc::new(InMemorySubjectRepository::new()),
            chapters: Arc::new(InMemoryChapterRepository::new()),
            quizzes: Arc::new(InMemoryQuizRepository::new()),
            questions: Arc::new(InMemoryQuestionRepository::new()),
            attempts: Arc::new(InMemoryQuizAttemptRepository::new()),
            jobs: Arc::new(InMemoryJobRepository::new()),
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: self.users.clone(),
            subjects: self.subjects.clone(),
            chapters: self.chapters.clone(),
            quizzes: self.quizzes.clone(),
            questions: self.questions.clone(),
            attempts: self.attempts.clone(),
            jobs: self.jobs.clone(),
        }
    }

    pub fn state(&self) -> AppState {
        let mut config = Config::test_config();
        config.export_dir = std::env::temp_dir()
            .join(format!("quizmaster-exports-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned();
        AppState::from_repositories(config, self.repositories(), Arc::new(LogMailer))
    }

    pub async fn add_user(&self, username: &str, role: Role) -> User {
        let id = self.users.next_id().await.unwrap();
        let user = User::new(id, username, &format!("{}@example.com", username), role);
        self.users.create(user).await.unwrap()
    }

    /// A subject, chapter and quiz, returned as the quiz.
    pub async fn add_quiz(&self, title: &str, is_active: bool) -> Quiz {
        let subject_id = self.subjects.next_id().await.unwrap();
        let subject = self
            .subjects
            .create(Subject::new(subject_id, &format!("{} subject", title), None))
            .await
            .unwrap();
        let chapter_id = self.chapters.next_id().await.unwrap();
        let chapter = self
            .chapters
            .create(Chapter::new(chapter_id, "Chapter 1", subject.id))
            .await
            .unwrap();
        let quiz_id = self.quizzes.next_id().await.unwrap();
        self.quizzes
            .create(Quiz::new(quiz_id, title, chapter.id, 10, is_active, None))
            .await
            .unwrap()
    }

    /// Adds a four-option question; `correct` is the 1-based position.
    pub async fn add_question(&self, quiz_id: i64, option_ids: [i64; 4], correct: usize) -> Question {
        let id = self.questions.next_id().await.unwrap();
        let texts: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        self.questions
            .create(Question::new(
                id,
                quiz_id,
                &format!("Question {}", id),
                &option_ids,
                &texts,
                correct,
            ))
            .await
            .unwrap()
    }

    /// Quiz with four questions whose correct options are 101, 205, 303 and 404.
    pub async fn scenario_quiz(&self) -> (Quiz, Vec<Question>) {
        let quiz = self.add_quiz("Scenario", true).await;
        let questions = vec![
            self.add_question(quiz.id, [101, 102, 103, 104], 1).await,
            self.add_question(quiz.id, [205, 206, 207, 208], 1).await,
            self.add_question(quiz.id, [301, 302, 303, 304], 3).await,
            self.add_question(quiz.id, [401, 402, 403, 404], 4).await,
        ];
        (quiz, questions)
    }
}
