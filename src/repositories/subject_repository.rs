use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Subject,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    async fn next_id(&self) -> AppResult<i64>;
    async fn create(&self, subject: Subject) -> AppResult<Subject>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Subject>>;
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Subject>>;
    /// All subjects ordered by name.
    async fn find_all(&self) -> AppResult<Vec<Subject>>;
    async fn update(&self, subject: Subject) -> AppResult<Subject>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    /// Case-insensitive substring match on name or description.
    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<Subject>>;
    async fn count(&self) -> AppResult<usize>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoSubjectRepository {
    db: Database,
    collection: Collection<Subject>,
}

impl MongoSubjectRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("subjects");
        Self {
            db: db.clone(),
            collection,
        }
    }
}

#[async_trait]
impl SubjectRepository for MongoSubjectRepository {
    async fn next_id(&self) -> AppResult<i64> {
        self.db.next_sequence("subjects").await
    }

    async fn create(&self, subject: Subject) -> AppResult<Subject> {
        self.collection.insert_one(&subject).await?;
        Ok(subject)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Subject>> {
        let subject = self.collection.find_one(doc! { "id": id }).await?;
        Ok(subject)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Subject>> {
        let subject = self.collection.find_one(doc! { "name": name }).await?;
        Ok(subject)
    }

    async fn find_all(&self) -> AppResult<Vec<Subject>> {
        let subjects = self
            .collection
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(subjects)
    }

    async fn update(&self, subject: Subject) -> AppResult<Subject> {
        let result = self
            .collection
            .replace_one(doc! { "id": subject.id }, &subject)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Subject with id '{}' not found",
                subject.id
            )));
        }

        Ok(subject)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Subject with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<Subject>> {
        let pattern = regex::escape(term);
        let filter = doc! {
            "$or": [
                { "name": { "$regex": pattern.as_str(), "$options": "i" } },
                { "description": { "$regex": pattern.as_str(), "$options": "i" } },
            ]
        };

        let subjects = self
            .collection
            .find(filter)
            .sort(doc! { "name": 1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(subjects)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.collection.count_documents(doc! {}).await? as usize)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for subjects collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("name_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(name_index).await?;

        log::info!("Successfully created indexes for subjects collection");
        Ok(())
    }
}
