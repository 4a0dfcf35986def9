use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    middleware::get_request_id,
    models::dto::{
        request::{AttemptListQuery, CheckAnswerRequest, SubmitAttemptRequest},
        response::{MessageResponse, StartAttemptResponse},
    },
};

#[post("/user/quizzes/{quiz_id}/start")]
async fn start_attempt(
    state: web::Data<AppState>,
    quiz_id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .attempt_service
        .start_attempt(&auth.0, quiz_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(StartAttemptResponse {
        attempt_id: attempt.id,
    }))
}

#[get("/user/attempts/{attempt_id}")]
async fn get_attempt_in_progress(
    state: web::Data<AppState>,
    attempt_id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .attempt_service
        .get_attempt_in_progress(&auth.0, attempt_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/user/attempts/{attempt_id}/check")]
async fn check_answer(
    state: web::Data<AppState>,
    attempt_id: web::Path<i64>,
    request: web::Json<CheckAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .attempt_service
        .check_answer(&auth.0, attempt_id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/user/attempts/{attempt_id}")]
async fn submit_attempt(
    req: HttpRequest,
    state: web::Data<AppState>,
    attempt_id: web::Path<i64>,
    request: web::Json<SubmitAttemptRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt_id = attempt_id.into_inner();
    let response = state
        .attempt_service
        .submit_attempt(&auth.0, attempt_id, &request.answers)
        .await?;

    log::debug!(
        "[{}] Submission of attempt {} accepted",
        get_request_id(&req).unwrap_or_default(),
        attempt_id
    );
    Ok(HttpResponse::Ok().json(response))
}

#[get("/attempts")]
async fn list_attempts(
    state: web::Data<AppState>,
    query: web::Query<AttemptListQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempts = state
        .summary_service
        .list_attempts(&auth.0, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(attempts))
}

#[get("/attempts/{attempt_id}")]
async fn get_attempt(
    state: web::Data<AppState>,
    attempt_id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .summary_service
        .get_attempt(&auth.0, attempt_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(attempt))
}

#[delete("/attempts/{attempt_id}")]
async fn delete_attempt(
    state: web::Data<AppState>,
    attempt_id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state
        .summary_service
        .delete_attempt(attempt_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Quiz attempt deleted")))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(start_attempt)
        .service(check_answer)
        .service(get_attempt_in_progress)
        .service(submit_attempt)
        .service(list_attempts)
        .service(get_attempt)
        .service(delete_attempt);
}
