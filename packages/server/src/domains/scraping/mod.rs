//! Scrape orchestration for the HTTP layer.
//!
//! A scrape request spawns the run as its own task and hands the handler a
//! receiver of progress events; the handler turns that into a chunked
//! NDJSON response body. Dropping the receiver (client disconnect) closes
//! the sink and cancels the run.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use catalog_scrapers::{
    scraper_for, ChannelSink, Franchise, HttpFetcher, PgCatalogStore, ProgressEvent,
    RunnerOptions, ScrapeRunner,
};

/// Buffered events between the runner and the response body. Small on
/// purpose: backpressure from a slow client throttles the scrape.
const PROGRESS_BUFFER: usize = 64;

/// Start a scrape run in the background and return its progress stream.
pub fn spawn_scrape(
    pool: PgPool,
    fetcher: Arc<HttpFetcher>,
    options: RunnerOptions,
    franchise: Franchise,
    set_code: String,
) -> mpsc::Receiver<ProgressEvent> {
    let (sink, rx) = ChannelSink::new(PROGRESS_BUFFER);

    tokio::spawn(async move {
        let store = Arc::new(PgCatalogStore::new(pool));
        let runner = ScrapeRunner::new(fetcher, store, options);
        let scraper = scraper_for(franchise);
        // The runner already logs and emits the terminal event; errors
        // surfaced here were delivered to the client as `error` lines.
        let _ = runner.run(scraper, &set_code, &sink).await;
    });

    rx
}

/// Encode progress events as NDJSON body chunks.
pub fn ndjson_stream(
    rx: mpsc::Receiver<ProgressEvent>,
) -> impl Stream<Item = Result<Bytes, Infallible>> {
    ReceiverStream::new(rx).map(|event| {
        let line = event.to_ndjson().unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to serialize progress event");
            "{\"type\":\"error\",\"message\":\"progress serialization failed\"}\n".to_string()
        });
        Ok(Bytes::from(line))
    })
}
