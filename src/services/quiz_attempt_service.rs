use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use chrono::Utc;

use crate::{
    auth::{require_owner, Identity},
    errors::{AppError, AppResult},
    models::{
        domain::{Question, Quiz, QuizAttempt},
        dto::{
            request::CheckAnswerRequest,
            response::{
                AttemptInProgressResponse, CheckAnswerResponse, OptionView, QuestionView,
                SubmitAttemptResponse,
            },
        },
    },
    repositories::{QuestionRepository, QuizAttemptRepository, QuizRepository},
};

pub const SUBMITTED_MESSAGE: &str = "Quiz submitted successfully!";

/// Result of scoring a set of answers against a quiz's questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grading {
    pub score: i32,
    pub correct_answers: BTreeMap<i64, i64>,
}

/// Counts one point per question whose answer is its correct option.
/// Questions without a correct option are left out of `correct_answers`
/// and can never score.
pub fn grade_answers(questions: &[Question], answers: &HashMap<i64, i64>) -> Grading {
    let mut score = 0;
    let mut correct_answers = BTreeMap::new();

    for question in questions {
        let Some(correct_option) = question.correct_option() else {
            log::warn!("Question {} has no correct option; scored as wrong", question.id);
            continue;
        };

        correct_answers.insert(question.id, correct_option.id);
        if answers.get(&question.id) == Some(&correct_option.id) {
            score += 1;
        }
    }

    Grading {
        score,
        correct_answers,
    }
}

/// The attempt lifecycle: start, resume, check a single answer, submit.
pub struct QuizAttemptService {
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuestionRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
}

impl QuizAttemptService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        questions: Arc<dyn QuestionRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
    ) -> Self {
        Self {
            quizzes,
            questions,
            attempts,
        }
    }

    async fn find_quiz(&self, id: i64) -> AppResult<Quiz> {
        self.quizzes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))
    }

    async fn find_attempt(&self, id: i64) -> AppResult<QuizAttempt> {
        self.attempts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz attempt with id '{}' not found", id)))
    }

    /// Loads an attempt that belongs to the caller and is still open.
    async fn open_attempt(&self, identity: &Identity, attempt_id: i64) -> AppResult<QuizAttempt> {
        let attempt = self.find_attempt(attempt_id).await?;
        require_owner(identity, attempt.user_id)?;

        if attempt.is_submitted() {
            return Err(AppError::InvalidState(
                "This quiz has already been submitted.".to_string(),
            ));
        }
        Ok(attempt)
    }

    pub async fn start_attempt(&self, identity: &Identity, quiz_id: i64) -> AppResult<QuizAttempt> {
        let quiz = self.find_quiz(quiz_id).await?;

        if !quiz.is_active {
            return Err(AppError::Forbidden(
                "This quiz is not currently active.".to_string(),
            ));
        }

        let question_count = self.questions.count_by_quiz(quiz.id).await?;
        if question_count == 0 {
            return Err(AppError::InvalidState(
                "This quiz has no questions yet.".to_string(),
            ));
        }

        let id = self.attempts.next_id().await?;
        let attempt = self
            .attempts
            .create(QuizAttempt::start(
                id,
                identity.user_id,
                quiz.id,
                question_count as i32,
            ))
            .await?;

        log::info!(
            "User {} started attempt {} on quiz {} ({} questions)",
            identity.user_id,
            attempt.id,
            quiz.id,
            attempt.total_questions
        );
        Ok(attempt)
    }

    pub async fn get_attempt_in_progress(
        &self,
        identity: &Identity,
        attempt_id: i64,
    ) -> AppResult<AttemptInProgressResponse> {
        let attempt = self.open_attempt(identity, attempt_id).await?;
        let quiz = self.find_quiz(attempt.quiz_id).await?;

        let mut questions = self.questions.find_by_quiz(quiz.id).await?;
        questions.sort_by_key(|q| q.id);

        let questions = questions
            .iter()
            .map(|question| QuestionView {
                id: question.id,
                text: question.text.clone(),
                options: question
                    .sorted_options()
                    .into_iter()
                    .map(|option| OptionView {
                        id: option.id,
                        text: option.text.clone(),
                    })
                    .collect(),
            })
            .collect();

        Ok(AttemptInProgressResponse {
            attempt_id: attempt.id,
            time_remaining_seconds: attempt.remaining_seconds(quiz.duration_minutes, Utc::now()),
            quiz_title: quiz.title,
            duration_minutes: quiz.duration_minutes,
            questions,
        })
    }

    pub async fn check_answer(
        &self,
        identity: &Identity,
        attempt_id: i64,
        request: CheckAnswerRequest,
    ) -> AppResult<CheckAnswerResponse> {
        let attempt = self.open_attempt(identity, attempt_id).await?;

        let (Some(question_id), Some(selected_option_id)) =
            (request.question_id, request.selected_option_id)
        else {
            return Err(AppError::ValidationError(
                "Missing question or option ID".to_string(),
            ));
        };

        let question = self
            .questions
            .find_by_id(question_id)
            .await?
            .filter(|q| q.quiz_id == attempt.quiz_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Question with id '{}' not found in this quiz",
                    question_id
                ))
            })?;

        let correct_option = question.correct_option().ok_or_else(|| {
            log::error!("Question {} has no correct option", question.id);
            AppError::ConfigurationError("Question configuration error".to_string())
        })?;

        Ok(CheckAnswerResponse {
            correct: selected_option_id == correct_option.id,
            correct_option_id: correct_option.id,
        })
    }

    pub async fn submit_attempt(
        &self,
        identity: &Identity,
        attempt_id: i64,
        answers: &HashMap<i64, i64>,
    ) -> AppResult<SubmitAttemptResponse> {
        let attempt = self.open_attempt(identity, attempt_id).await?;
        let questions = self.questions.find_by_quiz(attempt.quiz_id).await?;

        let grading = grade_answers(&questions, answers);
        // Questions added after the start can not lift the score past the
        // total fixed at start.
        let score = grading.score.min(attempt.total_questions);
        // A late submission is still accepted; the clock is advisory.
        let finalized = self
            .attempts
            .finalize(attempt.id, score, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::InvalidState("This quiz has already been submitted.".to_string())
            })?;

        log::info!(
            "User {} submitted attempt {}: {}/{}",
            identity.user_id,
            finalized.id,
            finalized.score,
            finalized.total_questions
        );

        Ok(SubmitAttemptResponse {
            message: SUBMITTED_MESSAGE.to_string(),
            score: finalized.score,
            total_questions: finalized.total_questions,
            percentage: finalized.percentage_score(),
            correct_answers: grading.correct_answers,
        })
    }
}
