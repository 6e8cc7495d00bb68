//! Scraped catalog data: collections (sets) and their cards.

pub mod data;
pub mod models;

pub use models::{Card, Collection};
