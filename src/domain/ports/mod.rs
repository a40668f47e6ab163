use crate::domain::models::{
    user::User, auth::RefreshTokenRecord, comment::Comment,
    reservation::{DateWindow, Reservation, UploadedReservation},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_refresh_family(&self, family_id: Uuid) -> Result<(), AppError>;
    async fn delete_expired_for_user(&self, user_id: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert or replace the comment stored under the same (apartment, day, reservation) key.
    async fn upsert(&self, comment: &Comment) -> Result<Comment, AppError>;
    async fn delete_by_key(&self, apartment: &str, day: Option<NaiveDate>, reservation_id: Option<&str>) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    /// Dated comments inside `[start, end]` plus the undated (booking-level)
    /// comments of `reservation_ids`.
    async fn list_by_range(&self, apartment: &str, start: NaiveDate, end: NaiveDate, reservation_ids: &[String]) -> Result<Vec<Comment>, AppError>;
}

#[async_trait]
pub trait UploadedReservationRepository: Send + Sync {
    async fn upsert(&self, reservation: &UploadedReservation) -> Result<(), AppError>;
    async fn list(&self) -> Result<Vec<UploadedReservation>, AppError>;
    async fn list_by_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<UploadedReservation>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// External system that can list reservations touching a date window.
#[async_trait]
pub trait ReservationSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch(&self, window: DateWindow) -> Result<Vec<Reservation>, AppError>;
}

/// Short-lived store for raw feed bodies keyed by URL.
#[async_trait]
pub trait FeedCache: Send + Sync {
    async fn get(&self, url: &str) -> Option<String>;
    async fn set(&self, url: &str, body: String);
    async fn invalidate_all(&self);
}
