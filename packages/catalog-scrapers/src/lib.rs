//! Catalog scraping for the card binder backend.
//!
//! Per-franchise scrapers extract structured card and collection data from
//! third-party catalog sites, deduplicate it against persisted records and
//! report progress as a newline-delimited JSON event stream.
//!
//! The pieces:
//! - [`sites`]: site-specific parsing (selectors and pagination quirks).
//! - [`fetch`]: the shared HTTP fetcher behind the [`PageFetcher`] seam.
//! - [`runner`]: orchestration, pagination, bounded detail fan-out, dedup.
//! - [`storage`]: the [`CatalogStore`] seam and its Postgres impl.
//! - [`progress`]: the event protocol the HTTP layer streams to clients.

pub mod fetch;
pub mod progress;
pub mod runner;
pub mod sites;
pub mod storage;
pub mod types;

pub use fetch::{HttpFetcher, PageFetcher};
pub use progress::{CardStatus, ChannelSink, ProgressEvent, ProgressSink, SinkClosed};
pub use runner::{RunnerOptions, ScrapeRunner};
pub use sites::{scraper_for, CatalogScraper, Franchise, UnknownFranchise};
pub use storage::{CatalogStore, PgCatalogStore, StoredCard};
pub use types::{CardSummary, ContentHash, ScrapeTotals, ScrapedCard, ScrapedCollection};
