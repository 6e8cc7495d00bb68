//! Saved marketplace searches.
//!
//! Only the persisted rows live here; executing a search against the
//! marketplace is a separate service this API doesn't proxy.

pub mod data;
pub mod models;

pub use models::{NewSavedSearch, SavedSearch};
