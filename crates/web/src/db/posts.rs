//! Post repository for database operations.
//!
//! Listings resolve the owner's public fields with a join; the like toggle is
//! a single atomic statement so concurrent toggles cannot interleave a
//! read-modify-write on the liked set.

use sqlx::PgPool;

use shutterbook_core::{PostId, UserId};

use super::RepositoryError;
use crate::models::post::{Author, Post, PostWithAuthor};

/// Database row for a post.
#[derive(sqlx::FromRow)]
struct PostRow {
    id: PostId,
    photo_url: String,
    about: String,
    created_at: chrono::DateTime<chrono::Utc>,
    liked_user_ids: Vec<UserId>,
    user_id: UserId,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            photo_url: row.photo_url,
            about: row.about,
            created_at: row.created_at,
            liked_user_ids: row.liked_user_ids,
            user_id: row.user_id,
        }
    }
}

/// Database row for a post joined with its owner's public fields.
#[derive(sqlx::FromRow)]
struct PostWithAuthorRow {
    id: PostId,
    photo_url: String,
    about: String,
    created_at: chrono::DateTime<chrono::Utc>,
    liked_user_ids: Vec<UserId>,
    user_id: UserId,
    author_first_name: String,
    author_last_name: String,
    author_photo_url: String,
}

impl From<PostWithAuthorRow> for PostWithAuthor {
    fn from(row: PostWithAuthorRow) -> Self {
        Self {
            post: Post {
                id: row.id,
                photo_url: row.photo_url,
                about: row.about,
                created_at: row.created_at,
                liked_user_ids: row.liked_user_ids,
                user_id: row.user_id,
            },
            author: Author {
                id: row.user_id,
                first_name: row.author_first_name,
                last_name: row.author_last_name,
                photo_url: row.author_photo_url,
            },
        }
    }
}

const POST_COLUMNS: &str = "id, photo_url, about, created_at, liked_user_ids, user_id";

const JOINED_COLUMNS: &str = "p.id, p.photo_url, p.about, p.created_at, p.liked_user_ids, \
     p.user_id, u.first_name AS author_first_name, u.last_name AS author_last_name, \
     u.photo_url AS author_photo_url";

/// Repository for post database operations.
pub struct PostRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new post owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        photo_url: &str,
        about: &str,
    ) -> Result<Post, RepositoryError> {
        let sql = format!(
            "INSERT INTO posts (photo_url, about, user_id)
             VALUES ($1, $2, $3)
             RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(photo_url)
            .bind(about)
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        Ok(row.into())
    }

    /// Get a post by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// All posts in insertion order, each with its owner's public fields.
    ///
    /// No pagination; the feed is unbounded by design.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_feed(&self) -> Result<Vec<PostWithAuthor>, RepositoryError> {
        let sql = format!(
            "SELECT {JOINED_COLUMNS}
             FROM posts p
             JOIN users u ON u.id = p.user_id
             ORDER BY p.id"
        );
        let rows = sqlx::query_as::<_, PostWithAuthorRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All posts owned by `user_id`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<Post>, RepositoryError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE user_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count posts owned by `user_id`.
    ///
    /// Used for the quota check at creation. Read-then-write, not
    /// transactional; see the integration test suite for the accepted race.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_owner(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Replace a post's photo and caption.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: PostId,
        photo_url: &str,
        about: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE posts SET photo_url = $1, about = $2 WHERE id = $3")
            .bind(photo_url)
            .bind(about)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a post by its ID.
    ///
    /// # Returns
    ///
    /// Returns `true` if the post was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: PostId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Toggle `user_id` in the post's liked set and return the updated post.
    ///
    /// Single atomic statement: adds the user when absent, removes when
    /// present, so the set never holds a liker twice even under concurrent
    /// toggles.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn toggle_like(
        &self,
        id: PostId,
        user_id: UserId,
    ) -> Result<Post, RepositoryError> {
        let sql = format!(
            "UPDATE posts
             SET liked_user_ids = CASE
                 WHEN $2 = ANY(liked_user_ids) THEN array_remove(liked_user_ids, $2)
                 ELSE array_append(liked_user_ids, $2)
             END
             WHERE id = $1
             RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }
}
