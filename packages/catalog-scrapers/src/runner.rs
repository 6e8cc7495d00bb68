//! Scrape run orchestration.
//!
//! One run covers one collection (set) on one catalog site: fetch the
//! collection page, walk the listing pagination, fetch card detail pages in
//! bounded parallel batches, dedup each card against the store and report
//! every step through the progress sink.
//!
//! Failure policy: a broken detail page is a `warning` and the run
//! continues; a broken collection or listing page is fatal. The sink
//! closing (client hung up) cancels the run at the next emit.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;

use crate::fetch::PageFetcher;
use crate::progress::{CardStatus, ProgressEvent, ProgressSink, SinkClosed};
use crate::sites::CatalogScraper;
use crate::storage::CatalogStore;
use crate::types::{CardSummary, ScrapeTotals, ScrapedCard};

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Maximum concurrent detail-page requests.
    pub detail_concurrency: usize,
    /// Hard cap on listing pages, guards against pagination loops.
    pub max_pages: u32,
    /// Politeness delay before each detail request.
    pub request_delay: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            detail_concurrency: 5,
            max_pages: 50,
            request_delay: Duration::ZERO,
        }
    }
}

pub struct ScrapeRunner<F, S> {
    fetcher: Arc<F>,
    store: Arc<S>,
    options: RunnerOptions,
}

impl<F, S> ScrapeRunner<F, S>
where
    F: PageFetcher + 'static,
    S: CatalogStore,
{
    pub fn new(fetcher: Arc<F>, store: Arc<S>, options: RunnerOptions) -> Self {
        Self {
            fetcher,
            store,
            options,
        }
    }

    /// Drive a full scrape of `set_code`, reporting into `sink`.
    ///
    /// Always terminates the stream: `done` on success, `error` on fatal
    /// failure. A closed sink aborts silently; there is nobody left to
    /// tell.
    pub async fn run(
        &self,
        scraper: &dyn CatalogScraper,
        set_code: &str,
        sink: &dyn ProgressSink,
    ) -> Result<ScrapeTotals> {
        match self.run_inner(scraper, set_code, sink).await {
            Ok(totals) => {
                let _ = sink.emit(ProgressEvent::done(totals)).await;
                tracing::info!(
                    franchise = %scraper.franchise(),
                    set_code = %set_code,
                    inserted = totals.cards_inserted,
                    updated = totals.cards_updated,
                    unchanged = totals.cards_unchanged,
                    warnings = totals.warnings,
                    "Scrape completed"
                );
                Ok(totals)
            }
            Err(e) if e.is::<SinkClosed>() => {
                tracing::info!(
                    franchise = %scraper.franchise(),
                    set_code = %set_code,
                    "Client disconnected, scrape cancelled"
                );
                Err(e)
            }
            Err(e) => {
                tracing::error!(
                    franchise = %scraper.franchise(),
                    set_code = %set_code,
                    error = %e,
                    "Scrape failed"
                );
                let _ = sink
                    .emit(ProgressEvent::Error {
                        message: format!("{:#}", e),
                    })
                    .await;
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        scraper: &dyn CatalogScraper,
        set_code: &str,
        sink: &dyn ProgressSink,
    ) -> Result<ScrapeTotals> {
        let mut totals = ScrapeTotals::default();
        let mut url = scraper.collection_url(set_code);

        sink.emit(ProgressEvent::Started {
            franchise: scraper.franchise().to_string(),
            source_url: url.clone(),
        })
        .await?;

        let mut html = self
            .fetcher
            .fetch_html(&url)
            .await
            .context("Failed to fetch collection page")?;

        let collection = scraper
            .parse_collection(&html, set_code)
            .context("Failed to parse collection page")?;
        let collection_id = self
            .store
            .upsert_collection(scraper.franchise(), &collection)
            .await?;
        totals.collections += 1;

        sink.emit(ProgressEvent::Collection {
            name: collection.name.clone(),
            code: collection.code.clone(),
            card_count: collection.card_count,
        })
        .await?;

        let mut page_no: u32 = 1;
        loop {
            let parsed = scraper.parse_card_list(&html, &url);

            sink.emit(ProgressEvent::Page {
                page: page_no,
                url: url.clone(),
                cards_found: parsed.cards.len(),
            })
            .await?;

            for message in &parsed.skipped {
                totals.warnings += 1;
                sink.emit(ProgressEvent::Warning {
                    url: url.clone(),
                    message: message.clone(),
                })
                .await?;
            }

            let fetched = self
                .fetch_details(parsed.cards, scraper.needs_detail_fetch())
                .await?;

            for (summary, detail) in fetched {
                let detail_url = summary.detail_url.clone().unwrap_or_else(|| url.clone());
                let card = match detail {
                    Some(Ok(detail_html)) => {
                        match scraper.parse_card_detail(&detail_html, &summary) {
                            Ok(card) => card,
                            Err(e) => {
                                totals.warnings += 1;
                                sink.emit(ProgressEvent::Warning {
                                    url: detail_url,
                                    message: format!("Failed to parse detail page: {:#}", e),
                                })
                                .await?;
                                continue;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        totals.warnings += 1;
                        sink.emit(ProgressEvent::Warning {
                            url: detail_url,
                            message: format!("Failed to fetch detail page: {:#}", e),
                        })
                        .await?;
                        continue;
                    }
                    None => ScrapedCard::from_summary(summary),
                };

                let status = self.persist_card(collection_id, &card).await?;
                match status {
                    CardStatus::Inserted => totals.cards_inserted += 1,
                    CardStatus::Updated => totals.cards_updated += 1,
                    CardStatus::Unchanged => totals.cards_unchanged += 1,
                }

                sink.emit(ProgressEvent::Card {
                    name: card.name.clone(),
                    number: card.number.clone(),
                    collection_code: collection.code.clone(),
                    status,
                })
                .await?;
            }

            let next = match parsed.next_page {
                Some(next) => next,
                None => break,
            };
            if page_no >= self.options.max_pages {
                totals.warnings += 1;
                sink.emit(ProgressEvent::Warning {
                    url: next,
                    message: format!("Stopping at page cap ({})", self.options.max_pages),
                })
                .await?;
                break;
            }

            page_no += 1;
            url = next;
            html = self
                .fetcher
                .fetch_html(&url)
                .await
                .with_context(|| format!("Failed to fetch listing page {}", page_no))?;
        }

        Ok(totals)
    }

    /// Fetch detail pages for one listing page, bounded by a semaphore.
    ///
    /// Results come back in listing order. Summaries without a detail URL
    /// (or on sites that publish everything inline) pass through without a
    /// fetch.
    async fn fetch_details(
        &self,
        summaries: Vec<CardSummary>,
        wants_detail: bool,
    ) -> Result<Vec<(CardSummary, Option<Result<String>>)>> {
        let semaphore = Arc::new(Semaphore::new(self.options.detail_concurrency.max(1)));
        let mut handles = Vec::with_capacity(summaries.len());

        for summary in summaries {
            let fetcher = self.fetcher.clone();
            let semaphore = semaphore.clone();
            let delay = self.options.request_delay;
            handles.push(tokio::spawn(async move {
                let detail = match (&summary.detail_url, wants_detail) {
                    (Some(detail_url), true) => {
                        // Err only if the semaphore is closed, which we never do.
                        let _permit = semaphore.acquire().await;
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        Some(fetcher.fetch_html(detail_url).await)
                    }
                    _ => None,
                };
                (summary, detail)
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.context("Detail fetch task panicked")?);
        }
        Ok(results)
    }

    async fn persist_card(
        &self,
        collection_id: uuid::Uuid,
        card: &ScrapedCard,
    ) -> Result<CardStatus> {
        let hash = card.content_hash();
        match self.store.find_card(collection_id, &card.number).await? {
            Some(existing) if existing.content_hash == hash.to_hex() => Ok(CardStatus::Unchanged),
            Some(existing) => {
                self.store.update_card(existing.id, card, &hash).await?;
                Ok(CardStatus::Updated)
            }
            None => {
                self.store.insert_card(collection_id, card, &hash).await?;
                Ok(CardStatus::Inserted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ChannelSink;
    use crate::sites::{MtgScraper, OnePieceScraper};
    use crate::storage::StoredCard;
    use crate::types::{ContentHash, ScrapedCollection};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct MockFetcher {
        pages: HashMap<String, String>,
    }

    impl MockFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait::async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch_html(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("HTTP 404 for {}", url))
        }
    }

    #[derive(Default)]
    struct MockStore {
        collections: Mutex<HashMap<String, Uuid>>,
        cards: Mutex<HashMap<(Uuid, String), StoredCard>>,
    }

    #[async_trait::async_trait]
    impl CatalogStore for MockStore {
        async fn upsert_collection(
            &self,
            franchise: crate::sites::Franchise,
            collection: &ScrapedCollection,
        ) -> Result<Uuid> {
            let key = format!("{}:{}", franchise, collection.code);
            let mut collections = self.collections.lock().unwrap();
            Ok(*collections.entry(key).or_insert_with(Uuid::now_v7))
        }

        async fn find_card(
            &self,
            collection_id: Uuid,
            number: &str,
        ) -> Result<Option<StoredCard>> {
            Ok(self
                .cards
                .lock()
                .unwrap()
                .get(&(collection_id, number.to_string()))
                .cloned())
        }

        async fn insert_card(
            &self,
            collection_id: Uuid,
            card: &ScrapedCard,
            hash: &ContentHash,
        ) -> Result<Uuid> {
            let id = Uuid::now_v7();
            self.cards.lock().unwrap().insert(
                (collection_id, card.number.clone()),
                StoredCard {
                    id,
                    content_hash: hash.to_hex(),
                },
            );
            Ok(id)
        }

        async fn update_card(
            &self,
            id: Uuid,
            card: &ScrapedCard,
            hash: &ContentHash,
        ) -> Result<()> {
            let mut cards = self.cards.lock().unwrap();
            for stored in cards.values_mut() {
                if stored.id == id {
                    stored.content_hash = hash.to_hex();
                    return Ok(());
                }
            }
            let _ = card;
            anyhow::bail!("update for unknown card id")
        }
    }

    /// Sink that records everything and never closes.
    #[derive(Default)]
    struct VecSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    #[async_trait::async_trait]
    impl ProgressSink for VecSink {
        async fn emit(&self, event: ProgressEvent) -> Result<(), SinkClosed> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    const ONEPIECE_LIST: &str = r#"
        <h2 class="series-title">Romance Dawn</h2>
        <div class="card-list">
          <div class="card-entry">
            <span class="card-id">OP01-001</span>
            <span class="card-name">Roronoa Zoro</span>
            <span class="card-rarity">L</span>
          </div>
          <div class="card-entry">
            <span class="card-id">OP01-025</span>
            <span class="card-name">Monkey D. Luffy</span>
            <span class="card-rarity">SR</span>
          </div>
        </div>
    "#;

    fn onepiece_runner(
        store: Arc<MockStore>,
    ) -> ScrapeRunner<MockFetcher, MockStore> {
        let fetcher = MockFetcher::new(&[(
            "https://opcardlist.example/cardlist/op-01",
            ONEPIECE_LIST,
        )]);
        ScrapeRunner::new(Arc::new(fetcher), store, RunnerOptions::default())
    }

    #[tokio::test]
    async fn test_run_inserts_then_reports_unchanged_on_rerun() {
        let store = Arc::new(MockStore::default());

        let sink = VecSink::default();
        let totals = onepiece_runner(store.clone())
            .run(&OnePieceScraper, "OP-01", &sink)
            .await
            .unwrap();
        assert_eq!(totals.cards_inserted, 2);
        assert_eq!(totals.cards_unchanged, 0);

        // Same content again: everything dedups to unchanged.
        let sink = VecSink::default();
        let totals = onepiece_runner(store)
            .run(&OnePieceScraper, "OP-01", &sink)
            .await
            .unwrap();
        assert_eq!(totals.cards_inserted, 0);
        assert_eq!(totals.cards_unchanged, 2);
    }

    #[tokio::test]
    async fn test_event_stream_shape() {
        let store = Arc::new(MockStore::default());
        let sink = VecSink::default();
        onepiece_runner(store)
            .run(&OnePieceScraper, "OP-01", &sink)
            .await
            .unwrap();

        let events = sink.events.lock().unwrap();
        assert!(matches!(events.first(), Some(ProgressEvent::Started { .. })));
        assert!(matches!(events.last(), Some(ProgressEvent::Done { .. })));

        let card_events = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Card { .. }))
            .count();
        assert_eq!(card_events, 2);
        match events.last().unwrap() {
            ProgressEvent::Done { cards_inserted, .. } => assert_eq!(*cards_inserted, 2),
            other => panic!("unexpected terminal event: {:?}", other),
        }
    }

    const MTG_PAGE_1: &str = r#"
        <h1 class="set-name">Limited Edition Alpha</h1>
        <table class="card-table"><tbody>
          <tr>
            <td class="name"><a href="/cards/lea/232">Black Lotus</a></td>
            <td class="number">232</td><td class="rarity">Rare</td>
          </tr>
          <tr>
            <td class="name"><a href="/cards/lea/48">Broken Link</a></td>
            <td class="number">48</td><td class="rarity">Common</td>
          </tr>
        </tbody></table>
        <a rel="next" href="?page=2">Next</a>
    "#;

    const MTG_PAGE_2: &str = r#"
        <h1 class="set-name">Limited Edition Alpha</h1>
        <table class="card-table"><tbody>
          <tr>
            <td class="name"><a href="/cards/lea/1">Animate Wall</a></td>
            <td class="number">1</td><td class="rarity">Rare</td>
          </tr>
        </tbody></table>
    "#;

    const MTG_DETAIL: &str = r#"
        <div class="card-profile">
          <h1>Card</h1>
          <span class="mana-cost">{1}</span>
        </div>
    "#;

    #[tokio::test]
    async fn test_pagination_and_detail_failures_are_warnings() {
        let fetcher = MockFetcher::new(&[
            ("https://www.mtgcatalog.example/sets/lea", MTG_PAGE_1),
            ("https://www.mtgcatalog.example/sets/lea?page=2", MTG_PAGE_2),
            ("https://www.mtgcatalog.example/cards/lea/232", MTG_DETAIL),
            ("https://www.mtgcatalog.example/cards/lea/1", MTG_DETAIL),
            // /cards/lea/48 intentionally missing -> fetch warning
        ]);
        let runner = ScrapeRunner::new(
            Arc::new(fetcher),
            Arc::new(MockStore::default()),
            RunnerOptions::default(),
        );

        let sink = VecSink::default();
        let totals = runner.run(&MtgScraper, "LEA", &sink).await.unwrap();

        assert_eq!(totals.cards_inserted, 2);
        assert_eq!(totals.warnings, 1);

        let events = sink.events.lock().unwrap();
        let pages: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Page { page, .. } => Some(*page),
                _ => None,
            })
            .collect();
        assert_eq!(pages, vec![1, 2]);
        assert!(events.iter().any(|e| matches!(
            e,
            ProgressEvent::Warning { url, .. } if url.contains("/cards/lea/48")
        )));
    }

    #[tokio::test]
    async fn test_page_cap_stops_pagination() {
        // Page links back to itself: without the cap this would never end.
        let looping = r#"
            <h1 class="set-name">Loop</h1>
            <table class="card-table"><tbody></tbody></table>
            <a rel="next" href="https://www.mtgcatalog.example/sets/loop">Next</a>
        "#;
        let fetcher = MockFetcher::new(&[("https://www.mtgcatalog.example/sets/loop", looping)]);
        let runner = ScrapeRunner::new(
            Arc::new(fetcher),
            Arc::new(MockStore::default()),
            RunnerOptions {
                max_pages: 3,
                ..RunnerOptions::default()
            },
        );

        let sink = VecSink::default();
        let totals = runner.run(&MtgScraper, "loop", &sink).await.unwrap();
        assert_eq!(totals.warnings, 1);

        let events = sink.events.lock().unwrap();
        let page_count = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Page { .. }))
            .count();
        assert_eq!(page_count, 3);
    }

    #[tokio::test]
    async fn test_empty_listing_completes_with_zero_counts() {
        let empty = r#"
            <h2 class="series-title">Placeholder Series</h2>
            <div class="card-list"></div>
        "#;
        let fetcher =
            MockFetcher::new(&[("https://opcardlist.example/cardlist/op-99", empty)]);
        let runner = ScrapeRunner::new(
            Arc::new(fetcher),
            Arc::new(MockStore::default()),
            RunnerOptions::default(),
        );

        let sink = VecSink::default();
        let totals = runner.run(&OnePieceScraper, "OP-99", &sink).await.unwrap();

        assert_eq!(totals.collections, 1);
        assert_eq!(totals.cards_inserted, 0);
        assert_eq!(totals.cards_updated, 0);
        assert_eq!(totals.cards_unchanged, 0);
        assert_eq!(totals.warnings, 0);

        let events = sink.events.lock().unwrap();
        assert!(matches!(events.last(), Some(ProgressEvent::Done { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_number_within_run_dedups_to_unchanged() {
        // The same card listed twice: the first write inserts, the second
        // matches the stored hash and must not count as an insert.
        let listing = r#"
            <h2 class="series-title">Romance Dawn</h2>
            <div class="card-list">
              <div class="card-entry">
                <span class="card-id">OP01-001</span>
                <span class="card-name">Roronoa Zoro</span>
                <span class="card-rarity">L</span>
              </div>
              <div class="card-entry">
                <span class="card-id">OP01-001</span>
                <span class="card-name">Roronoa Zoro</span>
                <span class="card-rarity">L</span>
              </div>
            </div>
        "#;
        let fetcher =
            MockFetcher::new(&[("https://opcardlist.example/cardlist/op-01", listing)]);
        let runner = ScrapeRunner::new(
            Arc::new(fetcher),
            Arc::new(MockStore::default()),
            RunnerOptions::default(),
        );

        let sink = VecSink::default();
        let totals = runner.run(&OnePieceScraper, "OP-01", &sink).await.unwrap();

        assert_eq!(totals.cards_inserted, 1);
        assert_eq!(totals.cards_unchanged, 1);

        let events = sink.events.lock().unwrap();
        let statuses: Vec<CardStatus> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Card { status, .. } => Some(*status),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![CardStatus::Inserted, CardStatus::Unchanged]);
    }

    #[tokio::test]
    async fn test_fatal_listing_error_emits_error_event() {
        let fetcher = MockFetcher::new(&[]);
        let runner = ScrapeRunner::new(
            Arc::new(fetcher),
            Arc::new(MockStore::default()),
            RunnerOptions::default(),
        );

        let sink = VecSink::default();
        let result = runner.run(&OnePieceScraper, "OP-01", &sink).await;
        assert!(result.is_err());

        let events = sink.events.lock().unwrap();
        assert!(matches!(events.last(), Some(ProgressEvent::Error { .. })));
    }

    #[tokio::test]
    async fn test_closed_sink_cancels_run() {
        let store = Arc::new(MockStore::default());
        let (sink, rx) = ChannelSink::new(8);
        drop(rx);

        let result = onepiece_runner(store.clone())
            .run(&OnePieceScraper, "OP-01", &sink)
            .await;
        let err = result.unwrap_err();
        assert!(err.is::<SinkClosed>());
        // Cancelled before any card was written.
        assert!(store.cards.lock().unwrap().is_empty());
    }
}
