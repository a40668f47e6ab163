use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Option<String>,
}

/// `?apartment=&year=&month=` for a single apartment's month.
#[derive(Deserialize)]
pub struct ApartmentMonthQuery {
    pub apartment: String,
    pub year: i32,
    pub month: u32,
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
    pub apartment: Option<String>,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub source: Option<String>,
}

#[derive(Deserialize)]
pub struct UpsertCommentRequest {
    pub apartment: String,
    pub day: Option<NaiveDate>,
    pub reservation_id: Option<String>,
    #[serde(default)]
    pub body: String,
}
