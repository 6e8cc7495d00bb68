//! Shared types: typed entity ids and the franchise enum.

use std::fmt;

use uuid::Uuid;

pub use catalog_scrapers::{Franchise, UnknownFranchise};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            serde::Serialize,
            serde::Deserialize,
            sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Typed id for catalog collections (sets).
    CollectionId
);
entity_id!(
    /// Typed id for catalog cards.
    CardId
);
entity_id!(
    /// Typed id for users. Issued by the auth layer; opaque here.
    UserId
);
entity_id!(
    /// Typed id for user-owned card copies.
    CollectedCardId
);
entity_id!(
    /// Typed id for saved searches.
    SavedSearchId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_uuid_strings() {
        let id = CardId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));

        let back: CardId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
