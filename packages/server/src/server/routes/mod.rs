// HTTP routes
pub mod binder;
pub mod collections;
pub mod health;
pub mod scrape;
pub mod searches;

pub use binder::*;
pub use collections::*;
pub use health::*;
pub use scrape::*;
pub use searches::*;
