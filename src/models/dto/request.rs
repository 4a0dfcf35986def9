use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::domain::{question::OPTIONS_PER_QUESTION, Role};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub role: Option<Role>,

    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubjectRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChapterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    pub subject_id: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub chapter_id: i64,

    #[validate(range(min = 1, message = "Duration must be at least one minute"))]
    pub duration_minutes: i32,

    pub is_active: Option<bool>,

    pub scheduled_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionRequest {
    #[validate(length(min = 1))]
    pub text: String,

    #[validate(custom(function = "validate_option_texts"))]
    pub options: Vec<String>,

    #[validate(range(min = 1, max = 4, message = "Correct option index must be between 1 and 4"))]
    pub correct_option_index: usize,
}

fn validate_option_texts(options: &[String]) -> Result<(), ValidationError> {
    if options.len() != OPTIONS_PER_QUESTION {
        return Err(ValidationError::new("exactly_four_options"));
    }
    if options.iter().any(|text| text.trim().is_empty()) {
        return Err(ValidationError::new("empty_option_text"));
    }
    Ok(())
}

/// Both ids are optional on the wire so a missing one can be reported
/// with a domain error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckAnswerRequest {
    pub question_id: Option<i64>,
    pub selected_option_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitAttemptRequest {
    #[serde(default)]
    pub answers: HashMap<i64, i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttemptListQuery {
    pub user_id: Option<i64>,
    pub quiz_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChapterListQuery {
    pub subject_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizListQuery {
    pub chapter_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}
