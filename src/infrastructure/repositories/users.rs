use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, query_scalar};

use crate::domain::RepositoryError;
use crate::domain::ids::UserId;
use crate::domain::repositories::UserRepository;
use crate::domain::users::{NewUser, UpdateProfile, User, UserProfile};
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlUserRepository {
    pool: DatabasePool,
}

impl SqlUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn ensure_exists(&self, id: UserId) -> Result<(), RepositoryError> {
        let found = query_scalar::<_, i64>("SELECT id FROM users WHERE id = ?")
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
        match found {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let record = query_as::<_, UserRecord>(
            r"INSERT INTO users (username, email, password_hash, created_at)
              VALUES (?, ?, ?, ?)
              RETURNING id, username, email, password_hash, created_at",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return RepositoryError::conflict("username or email already in use");
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        Ok(record.into_user())
    }

    async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        let record = query_as::<_, UserRecord>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into_user())
    }

    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        let record = query_as::<_, UserRecord>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into_user())
    }

    async fn get_profile(&self, id: UserId) -> Result<UserProfile, RepositoryError> {
        let user = self.get(id).await?;

        let following =
            query_scalar::<_, i64>("SELECT followed_id FROM follows WHERE follower_id = ? ORDER BY followed_id")
                .bind(id.into_inner())
                .fetch_all(&self.pool)
                .await
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let followers =
            query_scalar::<_, i64>("SELECT follower_id FROM follows WHERE followed_id = ? ORDER BY follower_id")
                .bind(id.into_inner())
                .fetch_all(&self.pool)
                .await
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(UserProfile {
            id: user.id,
            username: user.username,
            email: user.email,
            following: following.into_iter().map(UserId::new).collect(),
            followers: followers.into_iter().map(UserId::new).collect(),
            created_at: user.created_at,
        })
    }

    async fn update_profile(
        &self,
        id: UserId,
        changes: UpdateProfile,
    ) -> Result<User, RepositoryError> {
        let record = query_as::<_, UserRecord>(
            r"UPDATE users SET
                username = COALESCE(?, username),
                email = COALESCE(?, email)
              WHERE id = ?
              RETURNING id, username, email, password_hash, created_at",
        )
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return RepositoryError::conflict("username or email already in use");
            }
            RepositoryError::unexpected(err.to_string())
        })?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into_user())
    }

    async fn follow(&self, follower: UserId, followed: UserId) -> Result<(), RepositoryError> {
        self.ensure_exists(followed).await?;

        query("INSERT INTO follows (follower_id, followed_id, created_at) VALUES (?, ?, ?)")
            .bind(follower.into_inner())
            .bind(followed.into_inner())
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if let sqlx::Error::Database(db_err) = &err
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::conflict("already following this user");
                }
                RepositoryError::unexpected(err.to_string())
            })?;

        Ok(())
    }

    async fn unfollow(&self, follower: UserId, followed: UserId) -> Result<(), RepositoryError> {
        self.ensure_exists(followed).await?;

        // Removing an absent edge is a no-op, matching the toggle-free
        // unfollow semantics of the API.
        query("DELETE FROM follows WHERE follower_id = ? AND followed_id = ?")
            .bind(follower.into_inner())
            .bind(followed.into_inner())
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn into_user(self) -> User {
        User {
            id: UserId::new(self.id),
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
        }
    }
}
