//! User Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{User, UserCreate, UserUpdate};
use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all users
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY created_at")
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let record_id = parse_record_id(USER_TABLE, id);
        let user: Option<User> = self.base.db().select(record_id).await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user
    ///
    /// 密码经 argon2 散列后存储，email 唯一。
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        // Check duplicate email
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate("User already exists".to_string()));
        }

        // Hash password
        let hash_pass = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    name = $name,
                    email = $email,
                    hash_pass = $hash_pass,
                    is_admin = $is_admin,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("email", data.email))
            .bind(("hash_pass", hash_pass))
            .bind(("is_admin", data.is_admin))
            .bind(("created_at", Utc::now()))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Update a user
    pub async fn update(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let record_id = parse_record_id(USER_TABLE, id);
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))?;

        // Check duplicate email if changing
        if let Some(ref new_email) = data.email
            && new_email != &existing.email
            && self.find_by_email(new_email).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already in use",
                new_email
            )));
        }

        let hash_pass = match data.password {
            Some(ref password) => Some(
                User::hash_password(password)
                    .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?,
            ),
            None => None,
        };

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name OR name,
                    email = $email OR email,
                    hash_pass = $hash_pass OR hash_pass,
                    is_admin = IF $has_is_admin THEN $is_admin ELSE is_admin END
                RETURN AFTER"#,
            )
            .bind(("thing", record_id))
            .bind(("name", data.name))
            .bind(("email", data.email))
            .bind(("hash_pass", hash_pass))
            .bind(("has_is_admin", data.is_admin.is_some()))
            .bind(("is_admin", data.is_admin))
            .await?;

        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Hard delete a user
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let record_id = parse_record_id(USER_TABLE, id);
        let deleted: Option<User> = self.base.db().delete(record_id).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("User {} not found", id)));
        }
        Ok(true)
    }
}
