pub mod accounting;
pub mod auth;
pub mod calendar;
pub mod comment;
pub mod property;
pub mod reservation;
pub mod user;
