use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, query_scalar};

use crate::domain::RepositoryError;
use crate::domain::books::{
    Book, BookDetail, BookWithCreator, Comment, CreatorInfo, LikeState, NewBook, Rating,
    RatingSummary, UpdateBook,
};
use crate::domain::ids::{BookId, CommentId, UserId};
use crate::domain::repositories::BookRepository;
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlBookRepository {
    pool: DatabasePool,
}

impl SqlBookRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Fail with `NotFound` unless the book row exists. Used inside
    /// engagement transactions so a rating/like/comment on a deleted book
    /// cannot create orphan rows.
    async fn ensure_exists<'e, E>(executor: E, id: BookId) -> Result<(), RepositoryError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let found = query_scalar::<_, i64>("SELECT id FROM books WHERE id = ?")
            .bind(id.into_inner())
            .fetch_optional(executor)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
        match found {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn fetch_comments<'e, E>(
        executor: E,
        id: BookId,
    ) -> Result<Vec<Comment>, RepositoryError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let records = query_as::<_, CommentRecord>(
            r"SELECT c.id, c.user_id, u.username, c.body, c.created_at
              FROM comments c
              JOIN users u ON u.id = c.user_id
              WHERE c.book_id = ?
              ORDER BY c.created_at ASC, c.id ASC",
        )
        .bind(id.into_inner())
        .fetch_all(executor)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records.into_iter().map(CommentRecord::into_comment).collect())
    }
}

#[async_trait]
impl BookRepository for SqlBookRepository {
    async fn insert(&self, book: NewBook, added_by: UserId) -> Result<Book, RepositoryError> {
        let record = query_as::<_, BookRecord>(
            r"INSERT INTO books (title, author, genre, description, cover_image, added_by, average_rating, created_at)
              VALUES (?, ?, ?, ?, ?, ?, 0, ?)
              RETURNING id, title, author, genre, description, cover_image, added_by, average_rating, created_at",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre.as_deref())
        .bind(book.description.as_deref())
        .bind(book.cover_image.as_deref())
        .bind(added_by.into_inner())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(record.into_book())
    }

    async fn get(&self, id: BookId) -> Result<Book, RepositoryError> {
        let record = query_as::<_, BookRecord>(
            r"SELECT id, title, author, genre, description, cover_image, added_by, average_rating, created_at
              FROM books WHERE id = ?",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into_book())
    }

    async fn get_detail(&self, id: BookId) -> Result<BookDetail, RepositoryError> {
        let record = query_as::<_, BookWithCreatorRecord>(
            r"SELECT b.id, b.title, b.author, b.genre, b.description, b.cover_image,
                     b.added_by, b.average_rating, b.created_at,
                     u.username AS creator_username, u.email AS creator_email
              FROM books b
              JOIN users u ON u.id = b.added_by
              WHERE b.id = ?",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        let ratings = query_as::<_, RatingRecord>(
            r"SELECT user_id, rating, created_at FROM ratings
              WHERE book_id = ? ORDER BY created_at ASC, user_id ASC",
        )
        .bind(id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let likes = query_scalar::<_, i64>("SELECT user_id FROM likes WHERE book_id = ? ORDER BY user_id ASC")
            .bind(id.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let comments = Self::fetch_comments(&self.pool, id).await?;

        Ok(BookDetail {
            book: record.into_book_with_creator(),
            ratings: ratings.into_iter().map(RatingRecord::into_rating).collect(),
            likes: likes.into_iter().map(UserId::new).collect(),
            comments,
        })
    }

    async fn list_all(&self) -> Result<Vec<BookWithCreator>, RepositoryError> {
        let records = query_as::<_, BookWithCreatorRecord>(
            r"SELECT b.id, b.title, b.author, b.genre, b.description, b.cover_image,
                     b.added_by, b.average_rating, b.created_at,
                     u.username AS creator_username, u.email AS creator_email
              FROM books b
              JOIN users u ON u.id = b.added_by
              ORDER BY b.created_at DESC, b.id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records
            .into_iter()
            .map(BookWithCreatorRecord::into_book_with_creator)
            .collect())
    }

    async fn list_books(&self) -> Result<Vec<Book>, RepositoryError> {
        let records = query_as::<_, BookRecord>(
            r"SELECT id, title, author, genre, description, cover_image, added_by, average_rating, created_at
              FROM books ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records.into_iter().map(BookRecord::into_book).collect())
    }

    async fn update(&self, id: BookId, changes: UpdateBook) -> Result<Book, RepositoryError> {
        let record = query_as::<_, BookRecord>(
            r"UPDATE books SET
                title = COALESCE(?, title),
                author = COALESCE(?, author),
                genre = COALESCE(?, genre),
                description = COALESCE(?, description),
                cover_image = COALESCE(?, cover_image)
              WHERE id = ?
              RETURNING id, title, author, genre, description, cover_image, added_by, average_rating, created_at",
        )
        .bind(changes.title.as_deref())
        .bind(changes.author.as_deref())
        .bind(changes.genre.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.cover_image.as_deref())
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(record.into_book())
    }

    async fn delete(&self, id: BookId) -> Result<(), RepositoryError> {
        let result = query("DELETE FROM books WHERE id = ?")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn rate(
        &self,
        id: BookId,
        user_id: UserId,
        rating: f64,
    ) -> Result<RatingSummary, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Self::ensure_exists(&mut *tx, id).await?;

        // Replace-on-conflict keeps at most one rating per user per book.
        query(
            r"INSERT INTO ratings (book_id, user_id, rating, created_at)
              VALUES (?, ?, ?, ?)
              ON CONFLICT (book_id, user_id)
              DO UPDATE SET rating = excluded.rating, created_at = excluded.created_at",
        )
        .bind(id.into_inner())
        .bind(user_id.into_inner())
        .bind(rating)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        // Refresh the derived average inside the same transaction so it can
        // never be observed stale.
        query(
            r"UPDATE books
              SET average_rating = COALESCE((SELECT AVG(rating) FROM ratings WHERE book_id = ?), 0)
              WHERE id = ?",
        )
        .bind(id.into_inner())
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let (average_rating, ratings_count) = query_as::<_, (f64, i64)>(
            r"SELECT average_rating, (SELECT COUNT(*) FROM ratings WHERE book_id = books.id)
              FROM books WHERE id = ?",
        )
        .bind(id.into_inner())
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        tx.commit()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(RatingSummary {
            average_rating,
            ratings_count,
        })
    }

    async fn toggle_like(
        &self,
        id: BookId,
        user_id: UserId,
    ) -> Result<LikeState, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Self::ensure_exists(&mut *tx, id).await?;

        let removed = query("DELETE FROM likes WHERE book_id = ? AND user_id = ?")
            .bind(id.into_inner())
            .bind(user_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?
            .rows_affected();

        let liked = removed == 0;
        if liked {
            query("INSERT INTO likes (book_id, user_id, created_at) VALUES (?, ?, ?)")
                .bind(id.into_inner())
                .bind(user_id.into_inner())
                .bind(Utc::now())
                .execute(&mut *tx)
                .await
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?;
        }

        let likes_count = query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE book_id = ?")
            .bind(id.into_inner())
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        tx.commit()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(LikeState { liked, likes_count })
    }

    async fn add_comment(
        &self,
        id: BookId,
        user_id: UserId,
        text: &str,
    ) -> Result<Vec<Comment>, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Self::ensure_exists(&mut *tx, id).await?;

        query("INSERT INTO comments (book_id, user_id, body, created_at) VALUES (?, ?, ?, ?)")
            .bind(id.into_inner())
            .bind(user_id.into_inner())
            .bind(text)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let comments = Self::fetch_comments(&mut *tx, id).await?;

        tx.commit()
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(comments)
    }

    async fn engaged_book_ids(
        &self,
        user_id: UserId,
    ) -> Result<HashSet<BookId>, RepositoryError> {
        let ids = query_scalar::<_, i64>(
            r"SELECT book_id FROM ratings WHERE user_id = ?
              UNION
              SELECT book_id FROM likes WHERE user_id = ?",
        )
        .bind(user_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(ids.into_iter().map(BookId::new).collect())
    }
}

#[derive(sqlx::FromRow)]
struct BookRecord {
    id: i64,
    title: String,
    author: String,
    genre: Option<String>,
    description: Option<String>,
    cover_image: Option<String>,
    added_by: i64,
    average_rating: f64,
    created_at: DateTime<Utc>,
}

impl BookRecord {
    fn into_book(self) -> Book {
        Book {
            id: BookId::new(self.id),
            title: self.title,
            author: self.author,
            genre: self.genre,
            description: self.description,
            cover_image: self.cover_image,
            added_by: UserId::new(self.added_by),
            average_rating: self.average_rating,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookWithCreatorRecord {
    id: i64,
    title: String,
    author: String,
    genre: Option<String>,
    description: Option<String>,
    cover_image: Option<String>,
    added_by: i64,
    average_rating: f64,
    created_at: DateTime<Utc>,
    creator_username: String,
    creator_email: String,
}

impl BookWithCreatorRecord {
    fn into_book_with_creator(self) -> BookWithCreator {
        BookWithCreator {
            id: BookId::new(self.id),
            title: self.title,
            author: self.author,
            genre: self.genre,
            description: self.description,
            cover_image: self.cover_image,
            average_rating: self.average_rating,
            created_at: self.created_at,
            added_by: CreatorInfo {
                id: UserId::new(self.added_by),
                username: self.creator_username,
                email: self.creator_email,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct RatingRecord {
    user_id: i64,
    rating: f64,
    created_at: DateTime<Utc>,
}

impl RatingRecord {
    fn into_rating(self) -> Rating {
        Rating {
            user_id: UserId::new(self.user_id),
            rating: self.rating,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRecord {
    id: i64,
    user_id: i64,
    username: String,
    body: String,
    created_at: DateTime<Utc>,
}

impl CommentRecord {
    fn into_comment(self) -> Comment {
        Comment {
            id: CommentId::new(self.id),
            user_id: UserId::new(self.user_id),
            username: self.username,
            text: self.body,
            created_at: self.created_at,
        }
    }
}
