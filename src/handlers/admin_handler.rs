use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::{
        domain::JobKind,
        dto::{request::SearchQuery, response::TaskCreatedResponse},
    },
};

#[get("/summary")]
async fn admin_summary(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let summary = state.summary_service.admin_summary().await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/admin/attempts")]
async fn attempt_history(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let history = state.summary_service.admin_history().await?;
    Ok(HttpResponse::Ok().json(history))
}

#[get("/admin/users/{id}/activity")]
async fn user_activity(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let activity = state.summary_service.user_activity(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(activity))
}

#[post("/admin/reports/monthly")]
async fn trigger_monthly_report(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let task_id = state
        .job_queue
        .submit(JobKind::MonthlyReport, Some(auth.0.user_id))
        .await?;
    Ok(HttpResponse::Accepted().json(TaskCreatedResponse { task_id }))
}

#[get("/search")]
async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let results = state.search_service.search(Some(&query.q)).await?;
    Ok(HttpResponse::Ok().json(results))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(admin_summary)
        .service(attempt_history)
        .service(user_activity)
        .service(trigger_monthly_report)
        .service(search);
}
