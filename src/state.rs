use std::sync::Arc;
use crate::domain::models::property::PropertyCatalog;
use crate::domain::ports::{
    AuthRepository, CommentRepository, FeedCache, UploadedReservationRepository, UserRepository,
};
use crate::domain::services::accounting::CommissionPolicy;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::reservation_service::ReservationService;
use crate::config::Config;
use chrono_tz::Tz;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<PropertyCatalog>,
    pub calendar_tz: Tz,
    pub user_repo: Arc<dyn UserRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    pub upload_repo: Arc<dyn UploadedReservationRepository>,
    pub feed_cache: Arc<dyn FeedCache>,
    pub reservation_service: Arc<ReservationService>,
    pub auth_service: Arc<AuthService>,
    pub commission_policy: Arc<CommissionPolicy>,
    pub templates: Arc<Tera>,
}
