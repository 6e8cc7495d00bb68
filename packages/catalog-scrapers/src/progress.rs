//! Scrape progress protocol.
//!
//! A scrape run reports progress as a stream of JSON events, one per line
//! (NDJSON). The HTTP layer forwards them verbatim over a chunked response.
//!
//! Stream shape: exactly one `started` event first, then any number of
//! `collection` / `page` / `card` / `warning` events, then exactly one
//! terminal event: `done` on success, `error` on fatal failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::types::ScrapeTotals;

/// Outcome of persisting one scraped card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    Inserted,
    Updated,
    Unchanged,
}

/// One line of the progress stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started {
        franchise: String,
        source_url: String,
    },
    Collection {
        name: String,
        code: String,
        card_count: Option<u32>,
    },
    Page {
        page: u32,
        url: String,
        cards_found: usize,
    },
    Card {
        name: String,
        number: String,
        collection_code: String,
        status: CardStatus,
    },
    /// A non-fatal problem (usually a failed detail page). The run continues.
    Warning {
        url: String,
        message: String,
    },
    /// Fatal. Terminal: nothing follows.
    Error {
        message: String,
    },
    /// Terminal summary of a successful run.
    Done {
        collections: u32,
        cards_inserted: u32,
        cards_updated: u32,
        cards_unchanged: u32,
        warnings: u32,
    },
}

impl ProgressEvent {
    pub fn done(totals: ScrapeTotals) -> Self {
        Self::Done {
            collections: totals.collections,
            cards_inserted: totals.cards_inserted,
            cards_updated: totals.cards_updated,
            cards_unchanged: totals.cards_unchanged,
            warnings: totals.warnings,
        }
    }

    /// Serialize as one NDJSON line, trailing newline included.
    pub fn to_ndjson(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// The consumer went away (client closed the connection).
#[derive(Debug, thiserror::Error)]
#[error("progress sink closed by consumer")]
pub struct SinkClosed;

/// Where progress events go. Emitting into a closed sink fails, which is
/// how a client disconnect cancels the run.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn emit(&self, event: ProgressEvent) -> Result<(), SinkClosed>;
}

/// mpsc-backed sink; the receiver side feeds the HTTP response body.
pub struct ChannelSink {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ProgressSink for ChannelSink {
    async fn emit(&self, event: ProgressEvent) -> Result<(), SinkClosed> {
        self.tx.send(event).await.map_err(|_| SinkClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_serialize_with_type_tag() {
        let event = ProgressEvent::Started {
            franchise: "pokemon".to_string(),
            source_url: "https://example.com/sets/base".to_string(),
        };
        let line = event.to_ndjson().unwrap();
        assert!(line.ends_with('\n'));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "started");
        assert_eq!(value["franchise"], "pokemon");
    }

    #[test]
    fn test_card_status_is_snake_case() {
        let event = ProgressEvent::Card {
            name: "Pikachu".to_string(),
            number: "025/102".to_string(),
            collection_code: "base".to_string(),
            status: CardStatus::Unchanged,
        };
        let value: serde_json::Value = serde_json::from_str(&event.to_ndjson().unwrap()).unwrap();
        assert_eq!(value["status"], "unchanged");
    }

    #[test]
    fn test_done_carries_totals() {
        let totals = ScrapeTotals {
            collections: 1,
            cards_inserted: 10,
            cards_updated: 2,
            cards_unchanged: 90,
            warnings: 1,
        };
        let value: serde_json::Value =
            serde_json::from_str(&ProgressEvent::done(totals).to_ndjson().unwrap()).unwrap();
        assert_eq!(value["type"], "done");
        assert_eq!(value["cards_inserted"], 10);
        assert_eq!(value["warnings"], 1);
    }

    #[tokio::test]
    async fn test_channel_sink_delivers_events() {
        let (sink, mut rx) = ChannelSink::new(8);
        sink.emit(ProgressEvent::Error {
            message: "boom".to_string(),
        })
        .await
        .unwrap();

        match rx.recv().await.unwrap() {
            ProgressEvent::Error { message } => assert_eq!(message, "boom"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_emit_after_receiver_drop_reports_closed() {
        let (sink, rx) = ChannelSink::new(8);
        drop(rx);
        let result = sink
            .emit(ProgressEvent::Page {
                page: 1,
                url: "https://example.com".to_string(),
                cards_found: 0,
            })
            .await;
        assert!(result.is_err());
    }
}
