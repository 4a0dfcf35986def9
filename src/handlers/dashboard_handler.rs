use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::{domain::JobKind, dto::response::TaskCreatedResponse},
};

#[get("/user/summary-data")]
async fn summary_data(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let summary = state.summary_service.user_summary(&auth.0).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/user/dashboard-data")]
async fn dashboard_data(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let dashboard = state.summary_service.dashboard(&auth.0).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

/// Queues a CSV export of the caller's attempt history.
#[post("/user/export-attempts")]
async fn export_attempts(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user_id = auth.0.user_id;
    let task_id = state
        .job_queue
        .submit(JobKind::ExportAttempts { user_id }, Some(user_id))
        .await?;
    Ok(HttpResponse::Accepted().json(TaskCreatedResponse { task_id }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(summary_data)
        .service(dashboard_data)
        .service(export_attempts);
}
