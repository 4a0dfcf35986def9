use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Chapter,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChapterRepository: Send + Sync {
    async fn next_id(&self) -> AppResult<i64>;
    async fn create(&self, chapter: Chapter) -> AppResult<Chapter>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Chapter>>;
    async fn find_by_subject_and_name(&self, subject_id: i64, name: &str) -> AppResult<Option<Chapter>>;
    async fn find_all(&self) -> AppResult<Vec<Chapter>>;
    async fn find_by_subject(&self, subject_id: i64) -> AppResult<Vec<Chapter>>;
    async fn update(&self, chapter: Chapter) -> AppResult<Chapter>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    async fn count(&self) -> AppResult<usize>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoChapterRepository {
    db: Database,
    collection: Collection<Chapter>,
}

impl MongoChapterRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("chapters");
        Self {
            db: db.clone(),
            collection,
        }
    }
}

#[async_trait]
impl ChapterRepository for MongoChapterRepository {
    async fn next_id(&self) -> AppResult<i64> {
        self.db.next_sequence("chapters").await
    }

    async fn create(&self, chapter: Chapter) -> AppResult<Chapter> {
        self.collection.insert_one(&chapter).await?;
        Ok(chapter)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Chapter>> {
        let chapter = self.collection.find_one(doc! { "id": id }).await?;
        Ok(chapter)
    }

    async fn find_by_subject_and_name(&self, subject_id: i64, name: &str) -> AppResult<Option<Chapter>> {
        let chapter = self
            .collection
            .find_one(doc! { "subject_id": subject_id, "name": name })
            .await?;
        Ok(chapter)
    }

    async fn find_all(&self) -> AppResult<Vec<Chapter>> {
        let chapters = self
            .collection
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(chapters)
    }

    async fn find_by_subject(&self, subject_id: i64) -> AppResult<Vec<Chapter>> {
        let chapters = self
            .collection
            .find(doc! { "subject_id": subject_id })
            .sort(doc! { "name": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(chapters)
    }

    async fn update(&self, chapter: Chapter) -> AppResult<Chapter> {
        let result = self
            .collection
            .replace_one(doc! { "id": chapter.id }, &chapter)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Chapter with id '{}' not found",
                chapter.id
            )));
        }

        Ok(chapter)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Chapter with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.collection.count_documents(doc! {}).await? as usize)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for chapters collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let subject_name_index = IndexModel::builder()
            .keys(doc! { "subject_id": 1, "name": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("subject_name_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(subject_name_index).await?;

        log::info!("Successfully created indexes for chapters collection");
        Ok(())
    }
}
