//! Card binder backend.
//!
//! JSON API over Postgres for browsing scraped card catalogs, managing a
//! personal collection and saved searches, plus the scraping endpoints that
//! stream progress as NDJSON while a catalog run executes.

pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::Config;
