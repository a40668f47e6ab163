pub mod ics_feed_source;
pub mod moka_feed_cache;
