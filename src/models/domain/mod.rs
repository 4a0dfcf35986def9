pub mod job;
pub mod question;
pub mod quiz;
pub mod quiz_attempt;
pub mod subject;
pub mod user;

pub use job::{Job, JobKind, JobStatus};
pub use question::{Question, QuestionOption, OPTIONS_PER_QUESTION};
pub use quiz::Quiz;
pub use quiz_attempt::QuizAttempt;
pub use subject::{Chapter, Subject};
pub use user::{Role, User};
