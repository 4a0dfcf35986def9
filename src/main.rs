use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};

use quizmaster_server::{
    app_state::AppState,
    auth::AuthMiddleware,
    config::Config,
    handlers,
    middleware::RequestIdMiddleware,
    services::{job_queue::JobHandler, scheduler},
};

fn is_dev_mode() -> bool {
    std::env::var("APP_ENV")
        .map(|env| env == "development" || env == "dev")
        .unwrap_or(true)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    if !is_dev_mode() {
        config.validate_for_production();
    }

    let state = AppState::new(config.clone())
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let handler: Arc<dyn JobHandler> = state.job_runner.clone();
    state.job_queue.start_worker(handler).await;

    let _scheduler = scheduler::start_scheduler(&config, Arc::clone(&state.job_queue))
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let bind_address = (config.web_server_host.clone(), config.web_server_port);
    log::info!(
        "Starting HTTP server on {}:{}",
        config.web_server_host,
        config.web_server_port
    );

    let state_data = web::Data::new(state.clone());
    let allowed_origin = config.cors_allowed_origin.clone();

    let result = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
            .max_age(3600);

        App::new()
            .app_data(state_data.clone())
            .app_data(handlers::json_config())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .configure(handlers::configure_health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(handlers::configure_api),
            )
    })
    .bind(bind_address)?
    .run()
    .await;

    state.job_queue.stop_worker().await;
    result
}
