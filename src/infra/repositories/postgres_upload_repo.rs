use crate::domain::{models::reservation::UploadedReservation, ports::UploadedReservationRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

pub struct PostgresUploadRepo {
    pool: PgPool,
}

impl PostgresUploadRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UploadedReservationRepository for PostgresUploadRepo {
    async fn upsert(&self, reservation: &UploadedReservation) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO uploaded_reservations (
                id, arrival, departure, house_name, source, guest_name, guest_email,
                guest_phone, total_amount, currency, uploaded_by, uploaded_at
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             ON CONFLICT(id) DO UPDATE SET
                arrival = excluded.arrival,
                departure = excluded.departure,
                house_name = excluded.house_name,
                source = excluded.source,
                guest_name = excluded.guest_name,
                guest_email = excluded.guest_email,
                guest_phone = excluded.guest_phone,
                total_amount = excluded.total_amount,
                currency = excluded.currency,
                uploaded_by = excluded.uploaded_by,
                uploaded_at = excluded.uploaded_at"
        )
            .bind(&reservation.id)
            .bind(reservation.arrival)
            .bind(reservation.departure)
            .bind(&reservation.house_name)
            .bind(&reservation.source)
            .bind(&reservation.guest_name)
            .bind(&reservation.guest_email)
            .bind(&reservation.guest_phone)
            .bind(&reservation.total_amount)
            .bind(&reservation.currency)
            .bind(&reservation.uploaded_by)
            .bind(reservation.uploaded_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<UploadedReservation>, AppError> {
        sqlx::query_as::<_, UploadedReservation>(
            "SELECT * FROM uploaded_reservations ORDER BY arrival ASC, id ASC"
        )
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<UploadedReservation>, AppError> {
        sqlx::query_as::<_, UploadedReservation>(
            "SELECT * FROM uploaded_reservations
             WHERE arrival <= $1 AND departure >= $2
             ORDER BY arrival ASC, id ASC"
        )
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM uploaded_reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Reservation not found".into()));
        }
        Ok(())
    }
}
