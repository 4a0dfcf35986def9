use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{Job, JobStatus},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: Job) -> AppResult<Job>;
    async fn find_by_id(&self, job_id: &str) -> AppResult<Option<Job>>;
    async fn mark_running(&self, job_id: &str) -> AppResult<()>;
    async fn mark_completed(&self, job_id: &str, result: serde_json::Value) -> AppResult<()>;
    async fn mark_failed(&self, job_id: &str, error: String) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoJobRepository {
    collection: Collection<Job>,
}

impl MongoJobRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("jobs");
        Self { collection }
    }

    async fn set_fields(&self, job_id: &str, fields: mongodb::bson::Document) -> AppResult<()> {
        let result = self
            .collection
            .update_one(doc! { "job_id": job_id }, doc! { "$set": fields })
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Job {} not found", job_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl JobRepository for MongoJobRepository {
    async fn create(&self, job: Job) -> AppResult<Job> {
        self.collection.insert_one(&job).await?;
        Ok(job)
    }

    async fn find_by_id(&self, job_id: &str) -> AppResult<Option<Job>> {
        let job = self.collection.find_one(doc! { "job_id": job_id }).await?;
        Ok(job)
    }

    async fn mark_running(&self, job_id: &str) -> AppResult<()> {
        self.set_fields(
            job_id,
            doc! {
                "status": to_bson(&JobStatus::Running)?,
                "started_at": to_bson(&Utc::now())?,
            },
        )
        .await
    }

    async fn mark_completed(&self, job_id: &str, result: serde_json::Value) -> AppResult<()> {
        self.set_fields(
            job_id,
            doc! {
                "status": to_bson(&JobStatus::Completed)?,
                "result": to_bson(&result)?,
                "completed_at": to_bson(&Utc::now())?,
            },
        )
        .await
    }

    async fn mark_failed(&self, job_id: &str, error: String) -> AppResult<()> {
        self.set_fields(
            job_id,
            doc! {
                "status": to_bson(&JobStatus::Failed)?,
                "error_message": error,
                "completed_at": to_bson(&Utc::now())?,
            },
        )
        .await
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for jobs collection");

        let job_id_index = IndexModel::builder()
            .keys(doc! { "job_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("job_id_unique".to_string())
                    .build(),
            )
            .build();

        let status_index = IndexModel::builder().keys(doc! { "status": 1 }).build();

        self.collection.create_index(job_id_index).await?;
        self.collection.create_index(status_index).await?;

        log::info!("Successfully created indexes for jobs collection");
        Ok(())
    }
}
