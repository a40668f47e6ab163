use crate::domain::{models::comment::Comment, ports::CommentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

pub struct SqliteCommentRepo {
    pool: SqlitePool,
}

impl SqliteCommentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepo {
    async fn upsert(&self, comment: &Comment) -> Result<Comment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM comments WHERE apartment = ? AND day IS ? AND reservation_id IS ?"
        )
            .bind(&comment.apartment)
            .bind(comment.day)
            .bind(&comment.reservation_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let stored = match existing {
            Some(id) => sqlx::query_as::<_, Comment>(
                "UPDATE comments SET body = ?, author = ?, updated_at = ? WHERE id = ? RETURNING *"
            )
                .bind(&comment.body)
                .bind(&comment.author)
                .bind(comment.updated_at)
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?,
            None => sqlx::query_as::<_, Comment>(
                "INSERT INTO comments (id, apartment, day, reservation_id, body, author, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 RETURNING *"
            )
                .bind(&comment.id)
                .bind(&comment.apartment)
                .bind(comment.day)
                .bind(&comment.reservation_id)
                .bind(&comment.body)
                .bind(&comment.author)
                .bind(comment.updated_at)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?,
        };

        tx.commit().await.map_err(AppError::Database)?;
        Ok(stored)
    }

    async fn delete_by_key(&self, apartment: &str, day: Option<NaiveDate>, reservation_id: Option<&str>) -> Result<(), AppError> {
        sqlx::query("DELETE FROM comments WHERE apartment = ? AND day IS ? AND reservation_id IS ?")
            .bind(apartment)
            .bind(day)
            .bind(reservation_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Comment not found".into()));
        }
        Ok(())
    }

    async fn list_by_range(&self, apartment: &str, start: NaiveDate, end: NaiveDate, reservation_ids: &[String]) -> Result<Vec<Comment>, AppError> {
        let ids = serde_json::to_string(reservation_ids)
            .map_err(|e| AppError::InternalWithMsg(format!("Failed to encode reservation ids: {}", e)))?;

        sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments
             WHERE apartment = ?
             AND (
                (day >= ? AND day <= ?)
                OR (day IS NULL AND reservation_id IN (SELECT value FROM json_each(?)))
             )
             ORDER BY day ASC, updated_at ASC"
        )
            .bind(apartment)
            .bind(start)
            .bind(end)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
