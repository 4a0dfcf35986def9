use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::JobKind,
    services::job_queue::JobQueue,
};

fn scheduler_error(err: impl std::fmt::Display) -> AppError {
    AppError::InternalError(format!("Scheduler error: {}", err))
}

fn enqueue_on(cron: &str, kind: JobKind, queue: Arc<JobQueue>) -> AppResult<CronJob> {
    CronJob::new_async(cron, move |_id, _scheduler| {
        let queue = Arc::clone(&queue);
        let kind = kind.clone();
        Box::pin(async move {
            if let Err(e) = queue.submit(kind.clone(), None).await {
                log::error!("Failed to enqueue scheduled {}: {}", kind, e);
            }
        })
    })
    .map_err(scheduler_error)
}

/// Registers the periodic report jobs and starts the scheduler.
pub async fn start_scheduler(config: &Config, queue: Arc<JobQueue>) -> AppResult<JobScheduler> {
    let scheduler = JobScheduler::new().await.map_err(scheduler_error)?;

    scheduler
        .add(enqueue_on(&config.report_cron, JobKind::MonthlyReport, Arc::clone(&queue))?)
        .await
        .map_err(scheduler_error)?;
    scheduler
        .add(enqueue_on(&config.reminder_cron, JobKind::DailyReminder, queue)?)
        .await
        .map_err(scheduler_error)?;

    scheduler.start().await.map_err(scheduler_error)?;
    log::info!(
        "Scheduled monthly reports ({}) and daily reminders ({})",
        config.report_cron,
        config.reminder_cron
    );

    Ok(scheduler)
}
