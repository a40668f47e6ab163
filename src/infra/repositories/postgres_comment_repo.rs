use crate::domain::{models::comment::Comment, ports::CommentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

pub struct PostgresCommentRepo {
    pool: PgPool,
}

impl PostgresCommentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepo {
    async fn upsert(&self, comment: &Comment) -> Result<Comment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM comments WHERE apartment = $1 AND day IS NOT DISTINCT FROM $2 AND reservation_id IS NOT DISTINCT FROM $3"
        )
            .bind(&comment.apartment)
            .bind(comment.day)
            .bind(&comment.reservation_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let stored = match existing {
            Some(id) => sqlx::query_as::<_, Comment>(
                "UPDATE comments SET body = $1, author = $2, updated_at = $3 WHERE id = $4 RETURNING *"
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
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
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
        sqlx::query("DELETE FROM comments WHERE apartment = $1 AND day IS NOT DISTINCT FROM $2 AND reservation_id IS NOT DISTINCT FROM $3")
            .bind(apartment)
            .bind(day)
            .bind(reservation_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Comment not found".into()));
        }
        Ok(())
    }

    async fn list_by_range(&self, apartment: &str, start: NaiveDate, end: NaiveDate, reservation_ids: &[String]) -> Result<Vec<Comment>, AppError> {
        sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments
             WHERE apartment = $1
             AND (
                (day >= $2 AND day <= $3)
                OR (day IS NULL AND reservation_id = ANY($4))
             )
             ORDER BY day ASC NULLS FIRST, updated_at ASC"
        )
            .bind(apartment)
            .bind(start)
            .bind(end)
            .bind(reservation_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
