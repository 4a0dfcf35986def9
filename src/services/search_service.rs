use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::dto::response::{SearchResponse, UserDto},
    repositories::{QuizRepository, SubjectRepository, UserRepository},
    services::catalog_service::CatalogService,
};

pub const SEARCH_LIMIT: i64 = 20;

/// Case-insensitive substring search across users, subjects and quizzes.
pub struct SearchService {
    users: Arc<dyn UserRepository>,
    subjects: Arc<dyn SubjectRepository>,
    quizzes: Arc<dyn QuizRepository>,
    catalog: Arc<CatalogService>,
}

impl SearchService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        subjects: Arc<dyn SubjectRepository>,
        quizzes: Arc<dyn QuizRepository>,
        catalog: Arc<CatalogService>,
    ) -> Self {
        Self {
            users,
            subjects,
            quizzes,
            catalog,
        }
    }

    pub async fn search(&self, term: Option<&str>) -> AppResult<SearchResponse> {
        let term = term.map(str::trim).unwrap_or_default();
        if term.is_empty() {
            return Ok(SearchResponse::default());
        }

        let users = self.users.search(term, SEARCH_LIMIT).await?;
        let subjects = self.subjects.search(term, SEARCH_LIMIT).await?;
        let quizzes = self.quizzes.search(term, SEARCH_LIMIT).await?;
        log::debug!(
            "Search '{}' matched {} users, {} subjects, {} quizzes",
            term,
            users.len(),
            subjects.len(),
            quizzes.len()
        );

        Ok(SearchResponse {
            users: users.into_iter().map(UserDto::from).collect(),
            subjects,
            quizzes: self.catalog.describe_quizzes(quizzes).await?,
        })
    }
}
