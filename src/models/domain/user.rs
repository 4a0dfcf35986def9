use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::dto::request::CreateUserRequest;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(id: i64, username: &str, email: &str, role: Role) -> Self {
        User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            role,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn from_request(id: i64, request: CreateUserRequest) -> Self {
        User {
            id,
            username: request.username,
            email: request.email,
            role: request.role.unwrap_or_default(),
            active: request.active.unwrap_or(true),
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
