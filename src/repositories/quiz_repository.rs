use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Quiz,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn next_id(&self) -> AppResult<i64>;
    async fn create(&self, quiz: Quiz) -> AppResult<Quiz>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Quiz>>;
    async fn find_all(&self) -> AppResult<Vec<Quiz>>;
    async fn find_by_chapter(&self, chapter_id: i64) -> AppResult<Vec<Quiz>>;
    async fn update(&self, quiz: Quiz) -> AppResult<Quiz>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    /// Case-insensitive substring match on the title.
    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<Quiz>>;
    async fn count(&self) -> AppResult<usize>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuizRepository {
    db: Database,
    collection: Collection<Quiz>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("quizzes");
        Self {
            db: db.clone(),
            collection,
        }
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn next_id(&self) -> AppResult<i64> {
        self.db.next_sequence("quizzes").await
    }

    async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
        self.collection.insert_one(&quiz).await?;
        Ok(quiz)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Quiz>> {
        let quiz = self.collection.find_one(doc! { "id": id }).await?;
        Ok(quiz)
    }

    async fn find_all(&self) -> AppResult<Vec<Quiz>> {
        let quizzes = self
            .collection
            .find(doc! {})
            .sort(doc! { "title": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(quizzes)
    }

    async fn find_by_chapter(&self, chapter_id: i64) -> AppResult<Vec<Quiz>> {
        let quizzes = self
            .collection
            .find(doc! { "chapter_id": chapter_id })
            .sort(doc! { "title": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(quizzes)
    }

    async fn update(&self, quiz: Quiz) -> AppResult<Quiz> {
        let result = self
            .collection
            .replace_one(doc! { "id": quiz.id }, &quiz)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Quiz with id '{}' not found",
                quiz.id
            )));
        }

        Ok(quiz)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Quiz with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<Quiz>> {
        let pattern = regex::escape(term);
        let quizzes = self
            .collection
            .find(doc! { "title": { "$regex": pattern, "$options": "i" } })
            .sort(doc! { "title": 1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(quizzes)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.collection.count_documents(doc! {}).await? as usize)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quizzes collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let chapter_index = IndexModel::builder()
            .keys(doc! { "chapter_id": 1 })
            .options(IndexOptions::builder().name("chapter_id".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(chapter_index).await?;

        log::info!("Successfully created indexes for quizzes collection");
        Ok(())
    }
}
