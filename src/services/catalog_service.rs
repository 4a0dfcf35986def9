use std::{collections::HashMap, sync::Arc, time::Duration};

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Chapter, Question, Quiz, Subject, OPTIONS_PER_QUESTION},
        dto::{
            request::{ChapterRequest, QuestionRequest, QuizRequest, SubjectRequest},
            response::{
                ChapterDto, DashboardChapter, DashboardQuiz, DashboardSubject, QuizDto,
                SubjectDetailResponse,
            },
        },
    },
    repositories::{
        ChapterRepository, QuestionRepository, QuizAttemptRepository, QuizRepository,
        SubjectRepository,
    },
    services::cache::TtlCache,
};

const SUBJECT_LIST_KEY: &str = "subjects:all";
const CATALOG_TREE_KEY: &str = "catalog:tree";

#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub subject_list_ttl: Duration,
    pub subject_detail_ttl: Duration,
    pub catalog_tree_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            subject_list_ttl: Duration::from_secs(5 * 60),
            subject_detail_ttl: Duration::from_secs(30 * 60),
            catalog_tree_ttl: Duration::from_secs(5 * 60),
        }
    }
}

/// The caches behind the catalog's read-mostly views, with their timeouts.
pub struct CatalogCaches {
    pub settings: CacheSettings,
    pub subject_list: Arc<TtlCache<Vec<Subject>>>,
    pub subject_detail: Arc<TtlCache<SubjectDetailResponse>>,
    pub catalog_tree: Arc<TtlCache<Vec<DashboardSubject>>>,
}

impl CatalogCaches {
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            settings,
            subject_list: Arc::new(TtlCache::new()),
            subject_detail: Arc::new(TtlCache::new()),
            catalog_tree: Arc::new(TtlCache::new()),
        }
    }
}

pub struct CatalogRepositories {
    pub subjects: Arc<dyn SubjectRepository>,
    pub chapters: Arc<dyn ChapterRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub attempts: Arc<dyn QuizAttemptRepository>,
}

/// Subjects, chapters, quizzes and questions. Read-mostly lists are cached
/// and every mutation drops all cached views.
pub struct CatalogService {
    subjects: Arc<dyn SubjectRepository>,
    chapters: Arc<dyn ChapterRepository>,
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuestionRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    settings: CacheSettings,
    subject_list_cache: Arc<TtlCache<Vec<Subject>>>,
    subject_detail_cache: Arc<TtlCache<SubjectDetailResponse>>,
    catalog_tree_cache: Arc<TtlCache<Vec<DashboardSubject>>>,
}

impl CatalogService {
    pub fn new(repositories: CatalogRepositories, caches: CatalogCaches) -> Self {
        Self {
            subjects: repositories.subjects,
            chapters: repositories.chapters,
            quizzes: repositories.quizzes,
            questions: repositories.questions,
            attempts: repositories.attempts,
            settings: caches.settings,
            subject_list_cache: caches.subject_list,
            subject_detail_cache: caches.subject_detail,
            catalog_tree_cache: caches.catalog_tree,
        }
    }

    async fn invalidate(&self) {
        log::debug!("Invalidating catalog caches");
        self.subject_list_cache.clear().await;
        self.subject_detail_cache.clear().await;
        self.catalog_tree_cache.clear().await;
    }

    // Subjects

    pub async fn list_subjects(&self) -> AppResult<Vec<Subject>> {
        if let Some(subjects) = self.subject_list_cache.get(SUBJECT_LIST_KEY).await {
            return Ok(subjects);
        }

        let subjects = self.subjects.find_all().await?;
        self.subject_list_cache
            .set(SUBJECT_LIST_KEY, subjects.clone(), self.settings.subject_list_ttl)
            .await;
        Ok(subjects)
    }

    pub async fn get_subject(&self, id: i64) -> AppResult<SubjectDetailResponse> {
        let key = format!("subject:{}", id);
        if let Some(detail) = self.subject_detail_cache.get(&key).await {
            return Ok(detail);
        }

        let subject = self.find_subject(id).await?;
        let chapters = self.chapters.find_by_subject(id).await?;
        let detail = SubjectDetailResponse { subject, chapters };

        self.subject_detail_cache
            .set(&key, detail.clone(), self.settings.subject_detail_ttl)
            .await;
        Ok(detail)
    }

    async fn find_subject(&self, id: i64) -> AppResult<Subject> {
        self.subjects
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Subject with id '{}' not found", id)))
    }

    async fn ensure_subject_name_free(&self, name: &str, except: Option<i64>) -> AppResult<()> {
        if let Some(existing) = self.subjects.find_by_name(name).await? {
            if Some(existing.id) != except {
                return Err(AppError::AlreadyExists(format!(
                    "Subject '{}' already exists",
                    name
                )));
            }
        }
        Ok(())
    }

    pub async fn create_subject(&self, request: SubjectRequest) -> AppResult<Subject> {
        request.validate()?;
        let name = request.name.trim();
        self.ensure_subject_name_free(name, None).await?;

        let id = self.subjects.next_id().await?;
        let subject = self
            .subjects
            .create(Subject::new(id, name, request.description))
            .await?;

        log::info!("Created subject {} ('{}')", subject.id, subject.name);
        self.invalidate().await;
        Ok(subject)
    }

    pub async fn update_subject(&self, id: i64, request: SubjectRequest) -> AppResult<Subject> {
        request.validate()?;
        let mut subject = self.find_subject(id).await?;
        let name = request.name.trim();
        self.ensure_subject_name_free(name, Some(id)).await?;

        subject.name = name.to_string();
        subject.description = request.description;
        let subject = self.subjects.update(subject).await?;

        self.invalidate().await;
        Ok(subject)
    }

    pub async fn delete_subject(&self, id: i64) -> AppResult<()> {
        self.find_subject(id).await?;

        for chapter in self.chapters.find_by_subject(id).await? {
            self.delete_chapter_cascade(chapter.id).await?;
        }
        self.subjects.delete(id).await?;

        log::info!("Deleted subject {} and its content", id);
        self.invalidate().await;
        Ok(())
    }

    // Chapters

    pub async fn list_chapters(&self, subject_id: Option<i64>) -> AppResult<Vec<ChapterDto>> {
        let subject_names = self.subject_names().await?;
        let chapters = match subject_id {
            Some(subject_id) => self.chapters.find_by_subject(subject_id).await?,
            None => self.chapters.find_all().await?,
        };

        let mut dtos: Vec<ChapterDto> = chapters
            .into_iter()
            .map(|chapter| ChapterDto {
                subject_name: subject_names
                    .get(&chapter.subject_id)
                    .cloned()
                    .unwrap_or_default(),
                chapter,
            })
            .collect();

        dtos.sort_by(|a, b| {
            a.subject_name
                .cmp(&b.subject_name)
                .then_with(|| a.chapter.name.cmp(&b.chapter.name))
        });
        Ok(dtos)
    }

    pub async fn get_chapter(&self, id: i64) -> AppResult<ChapterDto> {
        let chapter = self.find_chapter(id).await?;
        let subject = self.find_subject(chapter.subject_id).await?;

        Ok(ChapterDto {
            chapter,
            subject_name: subject.name,
        })
    }

    async fn find_chapter(&self, id: i64) -> AppResult<Chapter> {
        self.chapters
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Chapter with id '{}' not found", id)))
    }

    async fn ensure_chapter_name_free(
        &self,
        subject_id: i64,
        name: &str,
        except: Option<i64>,
    ) -> AppResult<()> {
        if let Some(existing) = self.chapters.find_by_subject_and_name(subject_id, name).await? {
            if Some(existing.id) != except {
                return Err(AppError::AlreadyExists(format!(
                    "Chapter '{}' already exists in this subject",
                    name
                )));
            }
        }
        Ok(())
    }

    pub async fn create_chapter(&self, request: ChapterRequest) -> AppResult<Chapter> {
        request.validate()?;
        self.find_subject(request.subject_id).await?;
        let name = request.name.trim();
        self.ensure_chapter_name_free(request.subject_id, name, None)
            .await?;

        let id = self.chapters.next_id().await?;
        let chapter = self
            .chapters
            .create(Chapter::new(id, name, request.subject_id))
            .await?;

        self.invalidate().await;
        Ok(chapter)
    }

    pub async fn update_chapter(&self, id: i64, request: ChapterRequest) -> AppResult<Chapter> {
        request.validate()?;
        let mut chapter = self.find_chapter(id).await?;
        self.find_subject(request.subject_id).await?;
        let name = request.name.trim();
        self.ensure_chapter_name_free(request.subject_id, name, Some(id))
            .await?;

        chapter.name = name.to_string();
        chapter.subject_id = request.subject_id;
        let chapter = self.chapters.update(chapter).await?;

        self.invalidate().await;
        Ok(chapter)
    }

    pub async fn delete_chapter(&self, id: i64) -> AppResult<()> {
        self.find_chapter(id).await?;
        self.delete_chapter_cascade(id).await?;

        self.invalidate().await;
        Ok(())
    }

    async fn delete_chapter_cascade(&self, id: i64) -> AppResult<()> {
        for quiz in self.quizzes.find_by_chapter(id).await? {
            self.delete_quiz_cascade(quiz.id).await?;
        }
        self.chapters.delete(id).await
    }

    // Quizzes

    pub async fn list_quizzes(&self, chapter_id: Option<i64>) -> AppResult<Vec<QuizDto>> {
        let quizzes = match chapter_id {
            Some(chapter_id) => self.quizzes.find_by_chapter(chapter_id).await?,
            None => self.quizzes.find_all().await?,
        };

        let mut dtos = self.describe_quizzes(quizzes).await?;
        dtos.sort_by(|a, b| {
            a.subject_name
                .cmp(&b.subject_name)
                .then_with(|| a.chapter_name.cmp(&b.chapter_name))
                .then_with(|| a.quiz.title.cmp(&b.quiz.title))
        });
        Ok(dtos)
    }

    /// Attaches chapter and subject names to each quiz.
    pub async fn describe_quizzes(&self, quizzes: Vec<Quiz>) -> AppResult<Vec<QuizDto>> {
        let subject_names = self.subject_names().await?;
        let chapters: HashMap<i64, Chapter> = self
            .chapters
            .find_all()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(quizzes
            .into_iter()
            .map(|quiz| {
                let chapter = chapters.get(&quiz.chapter_id);
                QuizDto {
                    chapter_name: chapter.map(|c| c.name.clone()).unwrap_or_default(),
                    subject_name: chapter
                        .and_then(|c| subject_names.get(&c.subject_id))
                        .cloned()
                        .unwrap_or_default(),
                    quiz,
                }
            })
            .collect())
    }

    pub async fn get_quiz(&self, id: i64) -> AppResult<QuizDto> {
        let quiz = self.find_quiz(id).await?;
        self.describe_quizzes(vec![quiz])
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError(format!("Quiz {} vanished while loading", id)))
    }

    async fn find_quiz(&self, id: i64) -> AppResult<Quiz> {
        self.quizzes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))
    }

    pub async fn create_quiz(&self, request: QuizRequest) -> AppResult<Quiz> {
        request.validate()?;
        self.find_chapter(request.chapter_id).await?;

        let id = self.quizzes.next_id().await?;
        let quiz = Quiz::new(
            id,
            request.title.trim(),
            request.chapter_id,
            request.duration_minutes,
            request.is_active.unwrap_or(true),
            request.scheduled_date,
        );
        let quiz = self.quizzes.create(quiz).await?;

        log::info!("Created quiz {} ('{}')", quiz.id, quiz.title);
        self.invalidate().await;
        Ok(quiz)
    }

    pub async fn update_quiz(&self, id: i64, request: QuizRequest) -> AppResult<Quiz> {
        request.validate()?;
        let mut quiz = self.find_quiz(id).await?;
        self.find_chapter(request.chapter_id).await?;

        quiz.title = request.title.trim().to_string();
        quiz.chapter_id = request.chapter_id;
        quiz.duration_minutes = request.duration_minutes;
        quiz.is_active = request.is_active.unwrap_or(quiz.is_active);
        quiz.scheduled_date = request.scheduled_date;
        let quiz = self.quizzes.update(quiz).await?;

        self.invalidate().await;
        Ok(quiz)
    }

    pub async fn delete_quiz(&self, id: i64) -> AppResult<()> {
        self.find_quiz(id).await?;
        self.delete_quiz_cascade(id).await?;

        self.invalidate().await;
        Ok(())
    }

    async fn delete_quiz_cascade(&self, id: i64) -> AppResult<()> {
        let questions = self.questions.delete_by_quiz(id).await?;
        let attempts = self.attempts.delete_by_quiz(id).await?;
        self.quizzes.delete(id).await?;

        log::info!(
            "Deleted quiz {} with {} questions and {} attempts",
            id,
            questions,
            attempts
        );
        Ok(())
    }

    // Questions

    pub async fn list_questions(&self, quiz_id: i64) -> AppResult<Vec<Question>> {
        self.find_quiz(quiz_id).await?;
        self.questions.find_by_quiz(quiz_id).await
    }

    pub async fn get_question(&self, id: i64) -> AppResult<Question> {
        self.questions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question with id '{}' not found", id)))
    }

    pub async fn create_question(&self, quiz_id: i64, request: QuestionRequest) -> AppResult<Question> {
        request.validate()?;
        self.find_quiz(quiz_id).await?;

        let id = self.questions.next_id().await?;
        let mut option_ids = Vec::with_capacity(OPTIONS_PER_QUESTION);
        for _ in 0..OPTIONS_PER_QUESTION {
            option_ids.push(self.questions.next_option_id().await?);
        }

        let question = Question::new(
            id,
            quiz_id,
            request.text.trim(),
            &option_ids,
            &request.options,
            request.correct_option_index,
        );
        let question = self.questions.create(question).await?;

        self.invalidate().await;
        Ok(question)
    }

    /// Rewrites the text and all four options in one write, keeping option ids.
    pub async fn update_question(&self, id: i64, request: QuestionRequest) -> AppResult<Question> {
        request.validate()?;
        let mut question = self.get_question(id).await?;

        if question.options.len() != OPTIONS_PER_QUESTION {
            return Err(AppError::ConfigurationError(format!(
                "Question {} does not have exactly {} options",
                id, OPTIONS_PER_QUESTION
            )));
        }

        question.options.sort_by_key(|option| option.id);
        for (index, (option, text)) in question
            .options
            .iter_mut()
            .zip(request.options.iter())
            .enumerate()
        {
            option.text = text.clone();
            option.is_correct = index + 1 == request.correct_option_index;
        }
        question.text = request.text.trim().to_string();
        let question = self.questions.update(question).await?;

        self.invalidate().await;
        Ok(question)
    }

    pub async fn delete_question(&self, id: i64) -> AppResult<()> {
        self.questions.delete(id).await?;
        self.invalidate().await;
        Ok(())
    }

    // Learner-facing tree

    /// Subjects → chapters → active quizzes, omitting empty branches.
    pub async fn catalog_tree(&self) -> AppResult<Vec<DashboardSubject>> {
        if let Some(tree) = self.catalog_tree_cache.get(CATALOG_TREE_KEY).await {
            return Ok(tree);
        }

        let mut quizzes_by_chapter: HashMap<i64, Vec<Quiz>> = HashMap::new();
        for quiz in self.quizzes.find_all().await? {
            if quiz.is_active {
                quizzes_by_chapter.entry(quiz.chapter_id).or_default().push(quiz);
            }
        }

        let mut tree = Vec::new();
        for subject in self.list_subjects().await? {
            let mut chapters = self.chapters.find_by_subject(subject.id).await?;
            chapters.sort_by(|a, b| a.name.cmp(&b.name));

            let chapters: Vec<DashboardChapter> = chapters
                .into_iter()
                .filter_map(|chapter| {
                    let mut quizzes = quizzes_by_chapter.remove(&chapter.id)?;
                    quizzes.sort_by(|a, b| a.title.cmp(&b.title));
                    Some(DashboardChapter {
                        id: chapter.id,
                        name: chapter.name,
                        quizzes: quizzes
                            .into_iter()
                            .map(|q| DashboardQuiz {
                                id: q.id,
                                title: q.title,
                                duration_minutes: q.duration_minutes,
                            })
                            .collect(),
                    })
                })
                .collect();

            if !chapters.is_empty() {
                tree.push(DashboardSubject {
                    id: subject.id,
                    name: subject.name,
                    chapters,
                });
            }
        }

        self.catalog_tree_cache
            .set(CATALOG_TREE_KEY, tree.clone(), self.settings.catalog_tree_ttl)
            .await;
        Ok(tree)
    }

    async fn subject_names(&self) -> AppResult<HashMap<i64, String>> {
        Ok(self
            .list_subjects()
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{
        chapter_repository::MockChapterRepository, question_repository::MockQuestionRepository,
        quiz_attempt_repository::MockQuizAttemptRepository, quiz_repository::MockQuizRepository,
        subject_repository::MockSubjectRepository,
    };
    use mockall::predicate::eq;

    struct Mocks {
        subjects: MockSubjectRepository,
        chapters: MockChapterRepository,
        quizzes: MockQuizRepository,
        questions: MockQuestionRepository,
        attempts: MockQuizAttemptRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                subjects: MockSubjectRepository::new(),
                chapters: MockChapterRepository::new(),
                quizzes: MockQuizRepository::new(),
                questions: MockQuestionRepository::new(),
                attempts: MockQuizAttemptRepository::new(),
            }
        }

        fn into_service(self) -> CatalogService {
            self.into_service_with(CatalogCaches::new(CacheSettings::default()))
        }

        fn into_service_with(self, caches: CatalogCaches) -> CatalogService {
            CatalogService::new(
                CatalogRepositories {
                    subjects: Arc::new(self.subjects),
                    chapters: Arc::new(self.chapters),
                    quizzes: Arc::new(self.quizzes),
                    questions: Arc::new(self.questions),
                    attempts: Arc::new(self.attempts),
                },
                caches,
            )
        }
    }

    fn question_request(correct: usize) -> QuestionRequest {
        QuestionRequest {
            text: "Which planet is largest?".to_string(),
            options: ["Mars", "Jupiter", "Venus", "Earth"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            correct_option_index: correct,
        }
    }

    #[tokio::test]
    async fn subject_list_is_served_from_cache() {
        let mut mocks = Mocks::new();
        mocks
            .subjects
            .expect_find_all()
            .times(1)
            .returning(|| Ok(vec![Subject::new(1, "Maths", None)]));

        let service = mocks.into_service();
        assert_eq!(service.list_subjects().await.unwrap().len(), 1);
        assert_eq!(service.list_subjects().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn injected_cache_is_shared_with_the_service() {
        let mut mocks = Mocks::new();
        mocks.subjects.expect_find_all().never();

        let caches = CatalogCaches::new(CacheSettings::default());
        caches
            .subject_list
            .set(
                SUBJECT_LIST_KEY,
                vec![Subject::new(3, "History", None)],
                Duration::from_secs(60),
            )
            .await;
        let shared = caches.subject_list.clone();

        let service = mocks.into_service_with(caches);
        let subjects = service.list_subjects().await.unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].name, "History");

        shared.clear().await;
        assert!(service.subject_list_cache.get(SUBJECT_LIST_KEY).await.is_none());
    }

    #[tokio::test]
    async fn creating_a_subject_invalidates_the_list() {
        let mut mocks = Mocks::new();
        mocks
            .subjects
            .expect_find_all()
            .times(2)
            .returning(|| Ok(vec![]));
        mocks.subjects.expect_find_by_name().returning(|_| Ok(None));
        mocks.subjects.expect_next_id().returning(|| Ok(7));
        mocks.subjects.expect_create().returning(Ok);

        let service = mocks.into_service();
        service.list_subjects().await.unwrap();
        let created = service
            .create_subject(SubjectRequest {
                name: "  Physics ".to_string(),
                description: None,
            })
            .await
            .unwrap();
        service.list_subjects().await.unwrap();

        assert_eq!(created.id, 7);
        assert_eq!(created.name, "Physics");
    }

    #[tokio::test]
    async fn duplicate_subject_name_is_rejected() {
        let mut mocks = Mocks::new();
        mocks
            .subjects
            .expect_find_by_name()
            .returning(|_| Ok(Some(Subject::new(1, "Maths", None))));

        let result = mocks
            .into_service()
            .create_subject(SubjectRequest {
                name: "Maths".to_string(),
                description: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn chapter_requires_existing_subject() {
        let mut mocks = Mocks::new();
        mocks
            .subjects
            .expect_find_by_id()
            .with(eq(99))
            .returning(|_| Ok(None));

        let result = mocks
            .into_service()
            .create_chapter(ChapterRequest {
                name: "Algebra".to_string(),
                subject_id: 99,
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn question_is_created_with_four_fresh_option_ids() {
        let mut mocks = Mocks::new();
        mocks
            .quizzes
            .expect_find_by_id()
            .returning(|id| Ok(Some(Quiz::new(id, "Planets", 1, 10, true, None))));
        mocks.questions.expect_next_id().returning(|| Ok(11));
        let mut next_option = 100;
        mocks.questions.expect_next_option_id().times(4).returning(move || {
            next_option += 1;
            Ok(next_option)
        });
        mocks.questions.expect_create().returning(Ok);

        let question = mocks
            .into_service()
            .create_question(3, question_request(2))
            .await
            .unwrap();

        let ids: Vec<i64> = question.options.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![101, 102, 103, 104]);
        assert_eq!(question.correct_option().map(|o| o.id), Some(102));
        assert_eq!(question.quiz_id, 3);
    }

    #[tokio::test]
    async fn update_question_keeps_option_ids() {
        let mut mocks = Mocks::new();
        let texts: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let stored = Question::new(5, 3, "Old text", &[201, 202, 203, 204], &texts, 1);
        mocks
            .questions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        mocks.questions.expect_update().returning(Ok);

        let updated = mocks
            .into_service()
            .update_question(5, question_request(4))
            .await
            .unwrap();

        assert_eq!(updated.text, "Which planet is largest?");
        assert_eq!(updated.options[1].text, "Jupiter");
        assert_eq!(updated.correct_option().map(|o| o.id), Some(204));
    }

    #[tokio::test]
    async fn malformed_stored_question_refuses_update() {
        let mut mocks = Mocks::new();
        let texts: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let stored = Question::new(5, 3, "Broken", &[201, 202], &texts, 1);
        mocks
            .questions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));

        let result = mocks
            .into_service()
            .update_question(5, question_request(1))
            .await;

        assert!(matches!(result, Err(AppError::ConfigurationError(_))));
    }

    #[tokio::test]
    async fn deleting_a_quiz_cascades_to_questions_and_attempts() {
        let mut mocks = Mocks::new();
        mocks
            .quizzes
            .expect_find_by_id()
            .returning(|id| Ok(Some(Quiz::new(id, "Planets", 1, 10, true, None))));
        mocks
            .questions
            .expect_delete_by_quiz()
            .with(eq(4))
            .times(1)
            .returning(|_| Ok(3));
        mocks
            .attempts
            .expect_delete_by_quiz()
            .with(eq(4))
            .times(1)
            .returning(|_| Ok(2));
        mocks
            .quizzes
            .expect_delete()
            .with(eq(4))
            .times(1)
            .returning(|_| Ok(()));

        mocks.into_service().delete_quiz(4).await.unwrap();
    }

    #[tokio::test]
    async fn catalog_tree_keeps_only_branches_with_active_quizzes() {
        let mut mocks = Mocks::new();
        mocks.subjects.expect_find_all().returning(|| {
            Ok(vec![
                Subject::new(1, "Maths", None),
                Subject::new(2, "Physics", None),
            ])
        });
        mocks.chapters.expect_find_by_subject().returning(|subject_id| {
            Ok(match subject_id {
                1 => vec![Chapter::new(10, "Geometry", 1), Chapter::new(11, "Algebra", 1)],
                _ => vec![Chapter::new(20, "Optics", 2)],
            })
        });
        mocks.quizzes.expect_find_all().returning(|| {
            Ok(vec![
                Quiz::new(100, "Triangles", 10, 10, true, None),
                Quiz::new(101, "Circles", 10, 15, true, None),
                Quiz::new(102, "Equations", 11, 20, false, None),
                Quiz::new(103, "Lenses", 20, 5, false, None),
            ])
        });

        let tree = mocks.into_service().catalog_tree().await.unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name, "Maths");
        assert_eq!(tree[0].chapters.len(), 1);
        let titles: Vec<&str> = tree[0].chapters[0]
            .quizzes
            .iter()
            .map(|q| q.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Circles", "Triangles"]);
    }
}
