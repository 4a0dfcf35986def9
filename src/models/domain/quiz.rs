use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub chapter_id: i64,
    pub duration_minutes: i32, // always > 0
    pub is_active: bool,
    #[serde(default)]
    pub scheduled_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(
        id: i64,
        title: &str,
        chapter_id: i64,
        duration_minutes: i32,
        is_active: bool,
        scheduled_date: Option<DateTime<Utc>>,
    ) -> Self {
        Quiz {
            id,
            title: title.to_string(),
            chapter_id,
            duration_minutes,
            is_active,
            scheduled_date,
            created_at: Utc::now(),
        }
    }
}
