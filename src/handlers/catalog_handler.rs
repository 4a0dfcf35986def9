use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::{
        request::{
            ChapterListQuery, ChapterRequest, QuestionRequest, QuizListQuery, QuizRequest,
            SubjectRequest,
        },
        response::MessageResponse,
    },
};

// Subjects

#[get("/subjects")]
async fn list_subjects(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let subjects = state.catalog_service.list_subjects().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "subjects": subjects })))
}

#[get("/subjects/{id}")]
async fn get_subject(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let subject = state.catalog_service.get_subject(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(subject))
}

#[post("/subjects")]
async fn create_subject(
    state: web::Data<AppState>,
    request: web::Json<SubjectRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let subject = state
        .catalog_service
        .create_subject(request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(subject))
}

#[put("/subjects/{id}")]
async fn update_subject(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    request: web::Json<SubjectRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let subject = state
        .catalog_service
        .update_subject(id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(subject))
}

#[delete("/subjects/{id}")]
async fn delete_subject(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.catalog_service.delete_subject(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Subject deleted")))
}

// Chapters

#[get("/chapters")]
async fn list_chapters(
    state: web::Data<AppState>,
    query: web::Query<ChapterListQuery>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let chapters = state
        .catalog_service
        .list_chapters(query.subject_id)
        .await?;
    Ok(HttpResponse::Ok().json(chapters))
}

#[get("/chapters/{id}")]
async fn get_chapter(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let chapter = state.catalog_service.get_chapter(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(chapter))
}

#[post("/chapters")]
async fn create_chapter(
    state: web::Data<AppState>,
    request: web::Json<ChapterRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let chapter = state
        .catalog_service
        .create_chapter(request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(chapter))
}

#[put("/chapters/{id}")]
async fn update_chapter(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    request: web::Json<ChapterRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let chapter = state
        .catalog_service
        .update_chapter(id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(chapter))
}

#[delete("/chapters/{id}")]
async fn delete_chapter(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.catalog_service.delete_chapter(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Chapter deleted")))
}

// Quizzes

#[get("/quizzes")]
async fn list_quizzes(
    state: web::Data<AppState>,
    query: web::Query<QuizListQuery>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quizzes = state
        .catalog_service
        .list_quizzes(query.chapter_id)
        .await?;
    Ok(HttpResponse::Ok().json(quizzes))
}

#[get("/quizzes/{id}")]
async fn get_quiz(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state.catalog_service.get_quiz(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[post("/quizzes")]
async fn create_quiz(
    state: web::Data<AppState>,
    request: web::Json<QuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let quiz = state.catalog_service.create_quiz(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(quiz))
}

#[put("/quizzes/{id}")]
async fn update_quiz(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    request: web::Json<QuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let quiz = state
        .catalog_service
        .update_quiz(id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[delete("/quizzes/{id}")]
async fn delete_quiz(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.catalog_service.delete_quiz(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Quiz deleted")))
}

// Questions carry correctness flags, so every route here is admin-only.

#[get("/quizzes/{quiz_id}/questions")]
async fn list_questions(
    state: web::Data<AppState>,
    quiz_id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let questions = state
        .catalog_service
        .list_questions(quiz_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(questions))
}

#[post("/quizzes/{quiz_id}/questions")]
async fn create_question(
    state: web::Data<AppState>,
    quiz_id: web::Path<i64>,
    request: web::Json<QuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let question = state
        .catalog_service
        .create_question(quiz_id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(question))
}

#[get("/questions/{id}")]
async fn get_question(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let question = state.catalog_service.get_question(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(question))
}

#[put("/questions/{id}")]
async fn update_question(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    request: web::Json<QuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let question = state
        .catalog_service
        .update_question(id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(question))
}

#[delete("/questions/{id}")]
async fn delete_question(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.catalog_service.delete_question(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Question deleted")))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_subjects)
        .service(get_subject)
        .service(create_subject)
        .service(update_subject)
        .service(delete_subject)
        .service(list_chapters)
        .service(get_chapter)
        .service(create_chapter)
        .service(update_chapter)
        .service(delete_chapter)
        .service(list_quizzes)
        .service(list_questions)
        .service(create_question)
        .service(get_quiz)
        .service(create_quiz)
        .service(update_quiz)
        .service(delete_quiz)
        .service(get_question)
        .service(update_question)
        .service(delete_question);
}
