pub mod factory;
pub mod ics;
pub mod lodgify;
pub mod repositories;
