use actix_web::{delete, get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::{request::CreateUserRequest, response::MessageResponse},
};

#[post("/users")]
async fn create_user(
    state: web::Data<AppState>,
    request: web::Json<CreateUserRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let user = state.user_service.create_user(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

#[get("/users/{id}")]
async fn get_user(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.get_user(&auth.0, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/users")]
async fn get_all_users(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let users = state.user_service.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[delete("/users/{id}")]
async fn delete_user(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.user_service.delete_user(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted")))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_user)
        .service(get_user)
        .service(get_all_users)
        .service(delete_user);
}
