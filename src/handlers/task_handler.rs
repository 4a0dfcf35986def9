use actix_web::{get, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, require_owner_or_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::response::TaskStatusResponse,
};

#[get("/tasks/{task_id}/status")]
async fn task_status(
    state: web::Data<AppState>,
    task_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let job = state.job_queue.poll(&task_id).await?;

    // Scheduled jobs have no requester and are visible to admins only.
    match job.requested_by {
        Some(owner) => require_owner_or_admin(&auth.0, owner)?,
        None => require_admin(&auth.0)?,
    }

    Ok(HttpResponse::Ok().json(TaskStatusResponse::from(job)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(task_status);
}
