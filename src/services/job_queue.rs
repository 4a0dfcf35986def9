use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{mpsc, Mutex, RwLock};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Job, JobKind},
    repositories::JobRepository,
    services::{export_service::ExportService, report_service::ReportService},
};

/// Executes the work behind a job kind and returns its JSON result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn run(&self, kind: &JobKind) -> AppResult<serde_json::Value>;
}

pub struct JobRunner {
    export: Arc<ExportService>,
    reports: Arc<ReportService>,
}

impl JobRunner {
    pub fn new(export: Arc<ExportService>, reports: Arc<ReportService>) -> Self {
        Self { export, reports }
    }
}

#[async_trait]
impl JobHandler for JobRunner {
    async fn run(&self, kind: &JobKind) -> AppResult<serde_json::Value> {
        match kind {
            JobKind::ExportAttempts { user_id } => self.export.export_user_attempts(*user_id).await,
            JobKind::MonthlyReport => {
                let summary = self.reports.send_monthly_reports(Utc::now()).await?;
                Ok(serde_json::to_value(summary)
                    .map_err(|e| AppError::InternalError(e.to_string()))?)
            }
            JobKind::DailyReminder => {
                let summary = self.reports.send_daily_reminders(Utc::now()).await?;
                Ok(serde_json::to_value(summary)
                    .map_err(|e| AppError::InternalError(e.to_string()))?)
            }
        }
    }
}

/// Persistent job records fed to a single background worker over a channel.
pub struct JobQueue {
    jobs: Arc<dyn JobRepository>,
    sender: mpsc::Sender<String>,
    receiver: Mutex<Option<mpsc::Receiver<String>>>,
    worker_handle: RwLock<Option<tokio::task::JoinHandle<()>>>,
}

impl JobQueue {
    pub fn new(jobs: Arc<dyn JobRepository>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            jobs,
            sender,
            receiver: Mutex::new(Some(receiver)),
            worker_handle: RwLock::new(None),
        }
    }

    pub async fn submit(&self, kind: JobKind, requested_by: Option<i64>) -> AppResult<String> {
        let job = self.jobs.create(Job::new(kind, requested_by)).await?;
        log::info!("Queued job {} ({})", job.job_id, job.kind);

        if self.sender.send(job.job_id.clone()).await.is_err() {
            let message = "Job queue is closed".to_string();
            // The record would otherwise stay pending forever.
            if let Err(e) = self.jobs.mark_failed(&job.job_id, message.clone()).await {
                log::error!("Job {} could not be marked failed: {}", job.job_id, e);
            }
            return Err(AppError::InternalError(message));
        }

        Ok(job.job_id)
    }

    pub async fn poll(&self, job_id: &str) -> AppResult<Job> {
        self.jobs
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", job_id)))
    }

    /// Spawns the worker. Only the first call has any effect.
    pub async fn start_worker(&self, handler: Arc<dyn JobHandler>) {
        let Some(mut receiver) = self.receiver.lock().await.take() else {
            log::warn!("Job worker already started");
            return;
        };
        let jobs = Arc::clone(&self.jobs);

        let handle = tokio::spawn(async move {
            while let Some(job_id) = receiver.recv().await {
                if let Err(e) = process_job(jobs.as_ref(), handler.as_ref(), &job_id).await {
                    log::error!("Job {} could not be processed: {}", job_id, e);
                }
            }
            log::info!("Job worker stopped");
        });

        *self.worker_handle.write().await = Some(handle);
    }

    pub async fn stop_worker(&self) {
        if let Some(handle) = self.worker_handle.write().await.take() {
            handle.abort();
        }
    }
}

/// Runs one job to completion, recording the outcome on the job record.
pub(crate) async fn process_job(
    jobs: &dyn JobRepository,
    handler: &dyn JobHandler,
    job_id: &str,
) -> AppResult<()> {
    let job = jobs
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", job_id)))?;

    jobs.mark_running(job_id).await?;
    log::info!("Running job {} ({})", job_id, job.kind);

    match handler.run(&job.kind).await {
        Ok(result) => {
            jobs.mark_completed(job_id, result).await?;
            log::info!("Job {} completed", job_id);
        }
        Err(e) => {
            log::error!("Job {} failed: {}", job_id, e);
            jobs.mark_failed(job_id, e.to_string()).await?;
        }
    }
    Ok(())
}
