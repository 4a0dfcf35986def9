use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(id: i64, name: &str, description: Option<String>) -> Self {
        Subject {
            id,
            name: name.to_string(),
            description,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Chapter {
    pub id: i64,
    pub name: String,
    pub subject_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Chapter {
    pub fn new(id: i64, name: &str, subject_id: i64) -> Self {
        Chapter {
            id,
            name: name.to_string(),
            subject_id,
            created_at: Utc::now(),
        }
    }
}
