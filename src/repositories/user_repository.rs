use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::User,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn next_id(&self) -> AppResult<i64>;
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// All users ordered by username.
    async fn find_all(&self) -> AppResult<Vec<User>>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    /// Case-insensitive substring match on username or email.
    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<User>>;
    async fn count(&self) -> AppResult<usize>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    db: Database,
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("users");
        Self {
            db: db.clone(),
            collection,
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn next_id(&self) -> AppResult<i64> {
        self.db.next_sequence("users").await
    }

    async fn create(&self, user: User) -> AppResult<User> {
        self.collection.insert_one(&user).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "id": id }).await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "username": 1 })
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<User>> {
        let pattern = regex::escape(term);
        let filter = doc! {
            "$or": [
                { "username": { "$regex": pattern.as_str(), "$options": "i" } },
                { "email": { "$regex": pattern.as_str(), "$options": "i" } },
            ]
        };

        let users = self
            .collection
            .find(filter)
            .sort(doc! { "username": 1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(users)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.collection.count_documents(doc! {}).await? as usize)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        for field in ["id", "username", "email"] {
            let options = IndexOptions::builder()
                .unique(true)
                .name(format!("{}_unique", field))
                .build();
            let model = IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(options)
                .build();

            self.collection.create_index(model).await?;
        }

        log::info!("Created unique indexes on users collection");
        Ok(())
    }
}
