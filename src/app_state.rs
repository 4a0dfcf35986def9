use std::{sync::Arc, time::Duration};

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        ChapterRepository, JobRepository, MongoChapterRepository, MongoJobRepository,
        MongoQuestionRepository, MongoQuizAttemptRepository, MongoQuizRepository,
        MongoSubjectRepository, MongoUserRepository, QuestionRepository, QuizAttemptRepository,
        QuizRepository, SubjectRepository, UserRepository,
    },
    services::{
        catalog_service::{CacheSettings, CatalogCaches, CatalogRepositories, CatalogService},
        export_service::ExportService,
        job_queue::{JobQueue, JobRunner},
        mailer::{LogMailer, Mailer, SmtpMailer},
        quiz_attempt_service::QuizAttemptService,
        report_service::ReportService,
        search_service::SearchService,
        summary_service::{SummaryRepositories, SummaryService},
        user_service::UserService,
    },
};

/// Every repository the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub subjects: Arc<dyn SubjectRepository>,
    pub chapters: Arc<dyn ChapterRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub attempts: Arc<dyn QuizAttemptRepository>,
    pub jobs: Arc<dyn JobRepository>,
}

impl Repositories {
    pub fn mongo(db: &Database) -> Self {
        Self {
            users: Arc::new(MongoUserRepository::new(db)),
            subjects: Arc::new(MongoSubjectRepository::new(db)),
            chapters: Arc::new(MongoChapterRepository::new(db)),
            quizzes: Arc::new(MongoQuizRepository::new(db)),
            questions: Arc::new(MongoQuestionRepository::new(db)),
            attempts: Arc::new(MongoQuizAttemptRepository::new(db)),
            jobs: Arc::new(MongoJobRepository::new(db)),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        self.users.ensure_indexes().await?;
        self.subjects.ensure_indexes().await?;
        self.chapters.ensure_indexes().await?;
        self.quizzes.ensure_indexes().await?;
        self.questions.ensure_indexes().await?;
        self.attempts.ensure_indexes().await?;
        self.jobs.ensure_indexes().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub catalog_service: Arc<CatalogService>,
    pub attempt_service: Arc<QuizAttemptService>,
    pub summary_service: Arc<SummaryService>,
    pub search_service: Arc<SearchService>,
    pub job_queue: Arc<JobQueue>,
    pub job_runner: Arc<JobRunner>,
    pub jwt_service: Arc<JwtService>,
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let repositories = Repositories::mongo(&db);
        repositories.ensure_indexes().await?;

        let mailer: Arc<dyn Mailer> = match SmtpMailer::from_config(&config)? {
            Some(smtp) => Arc::new(smtp),
            None => {
                log::warn!("SMTP_HOST not set; outgoing mail is written to the log");
                Arc::new(LogMailer)
            }
        };

        let mut state = Self::from_repositories(config, repositories, mailer);
        state.db = Some(db);
        Ok(state)
    }

    /// Wires the services over the given repositories. No database handle is
    /// attached, so readiness checks report the store as unavailable.
    pub fn from_repositories(
        config: Config,
        repositories: Repositories,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let cache_settings = CacheSettings {
            subject_list_ttl: Duration::from_secs(config.subject_list_cache_secs),
            subject_detail_ttl: Duration::from_secs(config.subject_detail_cache_secs),
            ..CacheSettings::default()
        };

        let catalog_service = Arc::new(CatalogService::new(
            CatalogRepositories {
                subjects: Arc::clone(&repositories.subjects),
                chapters: Arc::clone(&repositories.chapters),
                quizzes: Arc::clone(&repositories.quizzes),
                questions: Arc::clone(&repositories.questions),
                attempts: Arc::clone(&repositories.attempts),
            },
            CatalogCaches::new(cache_settings),
        ));

        let attempt_service = Arc::new(QuizAttemptService::new(
            Arc::clone(&repositories.quizzes),
            Arc::clone(&repositories.questions),
            Arc::clone(&repositories.attempts),
        ));

        let summary_service = Arc::new(SummaryService::new(
            SummaryRepositories {
                users: Arc::clone(&repositories.users),
                subjects: Arc::clone(&repositories.subjects),
                chapters: Arc::clone(&repositories.chapters),
                quizzes: Arc::clone(&repositories.quizzes),
                questions: Arc::clone(&repositories.questions),
                attempts: Arc::clone(&repositories.attempts),
            },
            Arc::clone(&catalog_service),
        ));

        let user_service = Arc::new(UserService::new(
            Arc::clone(&repositories.users),
            Arc::clone(&repositories.attempts),
        ));

        let search_service = Arc::new(SearchService::new(
            Arc::clone(&repositories.users),
            Arc::clone(&repositories.subjects),
            Arc::clone(&repositories.quizzes),
            Arc::clone(&catalog_service),
        ));

        let export_service = Arc::new(ExportService::new(
            Arc::clone(&repositories.users),
            Arc::clone(&repositories.quizzes),
            Arc::clone(&repositories.attempts),
            config.export_dir.clone(),
        ));
        let report_service = Arc::new(ReportService::new(
            Arc::clone(&repositories.users),
            Arc::clone(&repositories.quizzes),
            Arc::clone(&repositories.attempts),
            mailer,
        ));
        let job_runner = Arc::new(JobRunner::new(export_service, report_service));
        let job_queue = Arc::new(JobQueue::new(
            Arc::clone(&repositories.jobs),
            config.job_queue_capacity,
        ));

        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
        ));

        Self {
            user_service,
            catalog_service,
            attempt_service,
            summary_service,
            search_service,
            job_queue,
            job_runner,
            jwt_service,
            db: None,
            config: Arc::new(config),
        }
    }
}
