use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const ROLE_OWNER: &str = "OWNER";
pub const ROLE_STAFF: &str = "STAFF";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            role: role.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_owner(&self) -> bool {
        self.role == ROLE_OWNER
    }
}
