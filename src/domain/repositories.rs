use std::collections::HashSet;

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::books::{
    Book, BookDetail, BookWithCreator, Comment, LikeState, NewBook, RatingSummary, UpdateBook,
};
use crate::domain::ids::{BookId, UserId};
use crate::domain::users::{NewUser, UpdateProfile, User, UserProfile};

#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn insert(&self, book: NewBook, added_by: UserId) -> Result<Book, RepositoryError>;
    async fn get(&self, id: BookId) -> Result<Book, RepositoryError>;
    /// Book plus its ratings, likes, and comments, with identities resolved.
    async fn get_detail(&self, id: BookId) -> Result<BookDetail, RepositoryError>;
    async fn list_all(&self) -> Result<Vec<BookWithCreator>, RepositoryError>;
    /// Plain book records for the recommendation engine.
    async fn list_books(&self) -> Result<Vec<Book>, RepositoryError>;
    async fn update(&self, id: BookId, changes: UpdateBook) -> Result<Book, RepositoryError>;
    async fn delete(&self, id: BookId) -> Result<(), RepositoryError>;

    /// Upsert the user's rating and refresh the stored average, atomically.
    async fn rate(
        &self,
        id: BookId,
        user_id: UserId,
        rating: f64,
    ) -> Result<RatingSummary, RepositoryError>;

    /// Flip the user's membership in the book's like set, atomically.
    async fn toggle_like(&self, id: BookId, user_id: UserId)
    -> Result<LikeState, RepositoryError>;

    /// Append a comment and return the full updated log.
    async fn add_comment(
        &self,
        id: BookId,
        user_id: UserId,
        text: &str,
    ) -> Result<Vec<Comment>, RepositoryError>;

    /// Ids of every book the user has rated or liked.
    async fn engaged_book_ids(&self, user_id: UserId)
    -> Result<HashSet<BookId>, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;
    async fn get(&self, id: UserId) -> Result<User, RepositoryError>;
    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError>;
    async fn get_profile(&self, id: UserId) -> Result<UserProfile, RepositoryError>;
    async fn update_profile(
        &self,
        id: UserId,
        changes: UpdateProfile,
    ) -> Result<User, RepositoryError>;
    /// Record `follower` following `followed`. The follower/following sets
    /// are two projections of one edge, so they can never disagree.
    async fn follow(&self, follower: UserId, followed: UserId) -> Result<(), RepositoryError>;
    /// Remove the follow edge. Removing an absent edge is not an error.
    async fn unfollow(&self, follower: UserId, followed: UserId) -> Result<(), RepositoryError>;
}
