use crate::{
    auth::Identity,
    models::domain::{Question, Role, User},
};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// Creates a standard learner account
    pub fn test_user() -> User {
        User::new(1, "testuser", "test@example.com", Role::User)
    }

    pub fn test_admin() -> User {
        User::new(99, "admin", "admin@example.com", Role::Admin)
    }

    pub fn learner(id: i64) -> Identity {
        Identity::new(id, "learner", Role::User)
    }

    pub fn admin() -> Identity {
        Identity::new(99, "admin", Role::Admin)
    }

    /// A four-option question; `correct` is the 1-based position of the right answer.
    pub fn question(id: i64, quiz_id: i64, option_ids: [i64; 4], correct: usize) -> Question {
        let texts: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        Question::new(id, quiz_id, "Pick one", &option_ids, &texts, correct)
    }

    /// Four questions on quiz 9 whose correct options are 101, 205, 303 and 404.
    pub fn scenario_questions() -> Vec<Question> {
        vec![
            question(1, 9, [101, 102, 103, 104], 1),
            question(2, 9, [205, 206, 207, 208], 1),
            question(3, 9, [301, 302, 303, 304], 3),
            question(4, 9, [401, 402, 403, 404], 4),
        ]
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Arc;

    use actix_web::http::StatusCode;

    use crate::{
        app_state::{AppState, Repositories},
        config::Config,
        repositories::{
            chapter_repository::MockChapterRepository, job_repository::MockJobRepository,
            question_repository::MockQuestionRepository,
            quiz_attempt_repository::MockQuizAttemptRepository,
            quiz_repository::MockQuizRepository, subject_repository::MockSubjectRepository,
            user_repository::MockUserRepository,
        },
        services::mailer::LogMailer,
    };

    /// Mocks for every repository; set expectations, then build the state.
    pub struct MockRepositories {
        pub users: MockUserRepository,
        pub subjects: MockSubjectRepository,
        pub chapters: MockChapterRepository,
        pub quizzes: MockQuizRepository,
        pub questions: MockQuestionRepository,
        pub attempts: MockQuizAttemptRepository,
        pub jobs: MockJobRepository,
    }

    impl MockRepositories {
        pub fn new() -> Self {
            Self {
                users: MockUserRepository::new(),
                subjects: MockSubjectRepository::new(),
                chapters: MockChapterRepository::new(),
                quizzes: MockQuizRepository::new(),
                questions: MockQuestionRepository::new(),
                attempts: MockQuizAttemptRepository::new(),
                jobs: MockJobRepository::new(),
            }
        }

        pub fn into_state(self) -> AppState {
            let repositories = Repositories {
                users: Arc::new(self.users),
                subjects: Arc::new(self.subjects),
                chapters: Arc::new(self.chapters),
                quizzes: Arc::new(self.quizzes),
                questions: Arc::new(self.questions),
                attempts: Arc::new(self.attempts),
                jobs: Arc::new(self.jobs),
            };
            AppState::from_repositories(Config::test_config(), repositories, Arc::new(LogMailer))
        }
    }

    /// `Authorization` header value for the given user.
    pub fn bearer(state: &AppState, user: &crate::models::domain::User) -> String {
        let token = state
            .jwt_service
            .create_token(user)
            .expect("token should be created");
        format!("Bearer {}", token)
    }

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_roles() {
        assert!(!test_user().is_admin());
        assert!(test_admin().is_admin());
        assert!(admin().is_admin());
        assert!(!learner(3).is_admin());
    }

    #[test]
    fn scenario_questions_have_one_correct_option_each() {
        let correct: Vec<i64> = scenario_questions()
            .iter()
            .filter_map(|q| q.correct_option().map(|o| o.id))
            .collect();
        assert_eq!(correct, vec![101, 205, 303, 404]);
    }
}
