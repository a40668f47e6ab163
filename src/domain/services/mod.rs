pub mod accounting;
pub mod auth_service;
pub mod calendar_grid;
pub mod color;
pub mod csv_import;
pub mod ics;
pub mod print;
pub mod reservation_service;
