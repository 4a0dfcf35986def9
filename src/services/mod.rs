pub mod cache;
pub mod catalog_service;
pub mod export_service;
pub mod job_queue;
pub mod mailer;
pub mod quiz_attempt_service;
pub mod report_service;
pub mod scheduler;
pub mod search_service;
pub mod summary_service;
pub mod user_service;
