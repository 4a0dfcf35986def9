use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_admin, Identity},
    errors::{AppError, AppResult},
    models::{
        domain::User,
        dto::{request::CreateUserRequest, response::UserDto},
    },
    repositories::{QuizAttemptRepository, UserRepository},
};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, attempts: Arc<dyn QuizAttemptRepository>) -> Self {
        Self { users, attempts }
    }

    pub async fn list_users(&self) -> AppResult<Vec<UserDto>> {
        let users = self.users.find_all().await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    pub async fn find_user(&self, id: i64) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))
    }

    /// Users may read their own record; admins may read any.
    pub async fn get_user(&self, identity: &Identity, id: i64) -> AppResult<UserDto> {
        if identity.user_id != id {
            require_admin(identity)?;
        }
        Ok(self.find_user(id).await?.into())
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<UserDto> {
        request.validate()?;

        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "User with username '{}' already exists",
                request.username
            )));
        }
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "User with email '{}' already exists",
                request.email
            )));
        }

        let id = self.users.next_id().await?;
        let user = self.users.create(User::from_request(id, request)).await?;
        log::info!("Created user {} ({})", user.username, user.role);

        Ok(user.into())
    }

    /// Removes the user and every attempt they own.
    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        self.find_user(id).await?;

        let removed = self.attempts.delete_by_user(id).await?;
        self.users.delete(id).await?;
        log::info!("Deleted user {} and {} attempts", id, removed);

        Ok(())
    }
}
