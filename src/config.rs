use secrecy::SecretString;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: String,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub subject_list_cache_secs: u64,
    pub subject_detail_cache_secs: u64,
    pub export_dir: String,
    pub report_cron: String,
    pub reminder_cron: String,
    pub job_queue_capacity: usize,
    /// Outgoing mail is only delivered when a host is configured.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<SecretString>,
    pub mail_from: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "quizmaster-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            jwt_secret: SecretString::from(
                env::var("JWT_SECRET")
                    .unwrap_or_else(|_| "dev_secret_key_change_in_production".to_string()),
            ),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(1),
            subject_list_cache_secs: env::var("SUBJECT_LIST_CACHE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60 * 5),
            subject_detail_cache_secs: env::var("SUBJECT_DETAIL_CACHE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60 * 30),
            export_dir: env::var("EXPORT_DIR").unwrap_or_else(|_| "instance/exports".to_string()),
            // sec min hour day-of-month month day-of-week
            report_cron: env::var("REPORT_CRON").unwrap_or_else(|_| "0 0 8 1 * *".to_string()),
            reminder_cron: env::var("REMINDER_CRON")
                .unwrap_or_else(|_| "0 0 18 * * *".to_string()),
            job_queue_capacity: env::var("JOB_QUEUE_CAPACITY")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(64),
            smtp_host: env::var("SMTP_HOST").ok().filter(|h| !h.trim().is_empty()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok().map(SecretString::from),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "QuizMaster <no-reply@quizmaster.local>".to_string()),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == "dev_secret_key_change_in_production" {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }
    }

    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "quizmaster-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            cors_allowed_origin: "http://localhost:5173".to_string(),
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            subject_list_cache_secs: 300,
            subject_detail_cache_secs: 1800,
            export_dir: std::env::temp_dir()
                .join("quizmaster-exports")
                .to_string_lossy()
                .into_owned(),
            report_cron: "0 0 8 1 * *".to_string(),
            reminder_cron: "0 0 18 * * *".to_string(),
            job_queue_capacity: 16,
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            mail_from: "QuizMaster <no-reply@quizmaster.local>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        assert!(!config.mongo_conn_string.is_empty());
        assert!(!config.mongo_db_name.is_empty());
        assert!(config.job_queue_capacity > 0);
    }

    #[test]
    fn test_test_config() {
        let config = Config::test_config();

        assert_eq!(config.mongo_db_name, "quizmaster-test");
        assert_eq!(config.subject_list_cache_secs, 300);
        assert_eq!(config.subject_detail_cache_secs, 1800);
    }

    #[test]
    #[should_panic(expected = "too short")]
    fn short_jwt_secret_fails_production_validation() {
        let config = Config::test_config();
        config.validate_for_production();
    }
}
