use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, Bson, Document},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::QuizAttempt,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptFilter {
    pub user_id: Option<i64>,
    pub quiz_id: Option<i64>,
}

impl AttemptFilter {
    pub fn for_user(user_id: i64) -> Self {
        AttemptFilter {
            user_id: Some(user_id),
            quiz_id: None,
        }
    }

    pub fn matches(&self, attempt: &QuizAttempt) -> bool {
        self.user_id.map_or(true, |id| attempt.user_id == id)
            && self.quiz_id.map_or(true, |id| attempt.quiz_id == id)
    }

    fn to_document(self) -> Document {
        let mut filter = Document::new();
        if let Some(user_id) = self.user_id {
            filter.insert("user_id", user_id);
        }
        if let Some(quiz_id) = self.quiz_id {
            filter.insert("quiz_id", quiz_id);
        }
        filter
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    async fn next_id(&self) -> AppResult<i64>;
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<QuizAttempt>>;
    /// Attempts matching the filter, most recently started first.
    async fn find_all(&self, filter: AttemptFilter) -> AppResult<Vec<QuizAttempt>>;
    /// Writes score and submission time only if the attempt is still open.
    /// Returns `None` when the attempt was already submitted.
    async fn finalize(
        &self,
        id: i64,
        score: i32,
        submitted_at: DateTime<Utc>,
    ) -> AppResult<Option<QuizAttempt>>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn delete_by_quiz(&self, quiz_id: i64) -> AppResult<u64>;
    async fn delete_by_user(&self, user_id: i64) -> AppResult<u64>;
    async fn count(&self) -> AppResult<usize>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuizAttemptRepository {
    db: Database,
    collection: Collection<QuizAttempt>,
}

impl MongoQuizAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("quiz_attempts");
        Self {
            db: db.clone(),
            collection,
        }
    }
}

#[async_trait]
impl QuizAttemptRepository for MongoQuizAttemptRepository {
    async fn next_id(&self) -> AppResult<i64> {
        self.db.next_sequence("quiz_attempts").await
    }

    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<QuizAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_all(&self, filter: AttemptFilter) -> AppResult<Vec<QuizAttempt>> {
        let mut attempts: Vec<QuizAttempt> = self
            .collection
            .find(filter.to_document())
            .await?
            .try_collect()
            .await?;

        // start_time is stored as an RFC 3339 string, so order in memory
        attempts.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        Ok(attempts)
    }

    async fn finalize(
        &self,
        id: i64,
        score: i32,
        submitted_at: DateTime<Utc>,
    ) -> AppResult<Option<QuizAttempt>> {
        let attempt = self
            .collection
            .find_one_and_update(
                doc! { "id": id, "submitted_at": Bson::Null },
                doc! {
                    "$set": {
                        "score": score,
                        "submitted_at": to_bson(&submitted_at)?,
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(attempt)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Quiz attempt with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn delete_by_quiz(&self, quiz_id: i64) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "quiz_id": quiz_id })
            .await?;
        Ok(result.deleted_count)
    }

    async fn delete_by_user(&self, user_id: i64) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "user_id": user_id })
            .await?;
        Ok(result.deleted_count)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.collection.count_documents(doc! {}).await? as usize)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_quiz_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "quiz_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_quiz".to_string())
                    .build(),
            )
            .build();

        let quiz_id_index = IndexModel::builder()
            .keys(doc! { "quiz_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("quiz_id".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_quiz_index).await?;
        self.collection.create_index(quiz_id_index).await?;

        log::info!("Successfully created indexes for quiz_attempts collection");
        Ok(())
    }
}
