//! The binder: cards a user owns.
//!
//! One row per (user, card, condition, language); owning several identical
//! copies bumps `quantity` instead of adding rows. The uniqueness is
//! enforced by a database constraint and the upsert in [`data::add_card`].

pub mod data;
pub mod models;

pub use models::{BinderEntry, CollectedCard, NewCollectedCard};
