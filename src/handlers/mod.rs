pub mod admin_handler;
pub mod attempt_handler;
pub mod catalog_handler;
pub mod dashboard_handler;
pub mod health_handler;
pub mod task_handler;
pub mod user_handler;

use actix_web::web;

use crate::errors::AppError;

/// Routes served under `/api`; every one of them needs a bearer token.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(attempt_handler::configure)
        .configure(dashboard_handler::configure)
        .configure(catalog_handler::configure)
        .configure(user_handler::configure)
        .configure(admin_handler::configure)
        .configure(task_handler::configure);
}

/// Malformed JSON bodies answer with the usual `{error, code}` shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

pub use health_handler::configure as configure_health;
