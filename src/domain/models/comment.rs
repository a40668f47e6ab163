use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// A note attached to a calendar day, a booking, or a booking on a given day.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Comment {
    pub id: String,
    pub apartment: String,
    pub day: Option<NaiveDate>,
    pub reservation_id: Option<String>,
    pub body: String,
    pub author: String,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        apartment: String,
        day: Option<NaiveDate>,
        reservation_id: Option<String>,
        body: String,
        author: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            apartment,
            day,
            reservation_id,
            body,
            author,
            updated_at: Utc::now(),
        }
    }
}
