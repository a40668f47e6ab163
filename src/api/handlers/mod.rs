pub mod accounting;
pub mod apartment;
pub mod auth;
pub mod calendar;
pub mod comment;
pub mod health;
pub mod reservation;
pub mod user;
