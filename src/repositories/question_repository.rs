use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Question,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn next_id(&self) -> AppResult<i64>;
    /// Option ids share one sequence across all questions.
    async fn next_option_id(&self) -> AppResult<i64>;
    async fn create(&self, question: Question) -> AppResult<Question>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Question>>;
    /// Questions of a quiz ordered by id.
    async fn find_by_quiz(&self, quiz_id: i64) -> AppResult<Vec<Question>>;
    async fn count_by_quiz(&self, quiz_id: i64) -> AppResult<usize>;
    async fn update(&self, question: Question) -> AppResult<Question>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn delete_by_quiz(&self, quiz_id: i64) -> AppResult<u64>;
    async fn count(&self) -> AppResult<usize>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuestionRepository {
    db: Database,
    collection: Collection<Question>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("questions");
        Self {
            db: db.clone(),
            collection,
        }
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn next_id(&self) -> AppResult<i64> {
        self.db.next_sequence("questions").await
    }

    async fn next_option_id(&self) -> AppResult<i64> {
        self.db.next_sequence("options").await
    }

    async fn create(&self, question: Question) -> AppResult<Question> {
        self.collection.insert_one(&question).await?;
        Ok(question)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Question>> {
        let question = self.collection.find_one(doc! { "id": id }).await?;
        Ok(question)
    }

    async fn find_by_quiz(&self, quiz_id: i64) -> AppResult<Vec<Question>> {
        let questions = self
            .collection
            .find(doc! { "quiz_id": quiz_id })
            .sort(doc! { "id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn count_by_quiz(&self, quiz_id: i64) -> AppResult<usize> {
        let count = self
            .collection
            .count_documents(doc! { "quiz_id": quiz_id })
            .await?;
        Ok(count as usize)
    }

    async fn update(&self, question: Question) -> AppResult<Question> {
        let result = self
            .collection
            .replace_one(doc! { "id": question.id }, &question)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
                question.id
            )));
        }

        Ok(question)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Question with id '{}' not found",
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

    async fn count(&self) -> AppResult<usize> {
        Ok(self.collection.count_documents(doc! {}).await? as usize)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for questions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let quiz_index = IndexModel::builder()
            .keys(doc! { "quiz_id": 1, "id": 1 })
            .options(IndexOptions::builder().name("quiz_id".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(quiz_index).await?;

        log::info!("Successfully created indexes for questions collection");
        Ok(())
    }
}
