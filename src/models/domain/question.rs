use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const OPTIONS_PER_QUESTION: usize = 4;

/// A multiple-choice question. Its options are stored inside the question
/// document so the question and its four options are always written together.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
    pub options: Vec<QuestionOption>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionOption {
    pub id: i64,
    pub text: String,
    pub is_correct: bool,
}

impl Question {
    /// Builds a question from four option texts; `correct_index` is 1-based.
    pub fn new(
        id: i64,
        quiz_id: i64,
        text: &str,
        option_ids: &[i64],
        option_texts: &[String],
        correct_index: usize,
    ) -> Self {
        let options = option_ids
            .iter()
            .zip(option_texts)
            .enumerate()
            .map(|(i, (option_id, option_text))| QuestionOption {
                id: *option_id,
                text: option_text.clone(),
                is_correct: i + 1 == correct_index,
            })
            .collect();

        Question {
            id,
            quiz_id,
            text: text.to_string(),
            options,
            created_at: Utc::now(),
        }
    }

    /// The first option flagged correct, if the content is configured at all.
    pub fn correct_option(&self) -> Option<&QuestionOption> {
        self.options.iter().find(|option| option.is_correct)
    }

    /// Options ordered by id, which is the order learners see them in.
    pub fn sorted_options(&self) -> Vec<&QuestionOption> {
        let mut options: Vec<_> = self.options.iter().collect();
        options.sort_by_key(|option| option.id);
        options
    }
}
