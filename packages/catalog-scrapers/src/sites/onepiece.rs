//! One Piece catalog scraper.
//!
//! The catalog publishes each set as a single long listing page with every
//! field inline, with no pagination and no detail pages. Card ids look like
//! `OP01-001`.

use anyhow::{Context, Result};
use scraper::{Html, Selector};

use super::{child_attr, child_text, select_text, CatalogScraper, Franchise, ParsedPage};
use crate::types::{CardSummary, ScrapedCard, ScrapedCollection};

const BASE_URL: &str = "https://opcardlist.example";

const SERIES_TITLE: &str = "h2.series-title";
const SERIES_RELEASE: &str = ".series-info .release";
const CARD_ENTRY: &str = "div.card-list div.card-entry";
const ENTRY_ID: &str = ".card-id";
const ENTRY_NAME: &str = ".card-name";
const ENTRY_RARITY: &str = ".card-rarity";
const ENTRY_COST: &str = ".card-cost";
const ENTRY_POWER: &str = ".card-power";
const ENTRY_COLOR: &str = ".card-color";
const ENTRY_IMAGE: &str = "img";

pub struct OnePieceScraper;

impl CatalogScraper for OnePieceScraper {
    fn franchise(&self) -> Franchise {
        Franchise::OnePiece
    }

    fn collection_url(&self, set_code: &str) -> String {
        format!("{}/cardlist/{}", BASE_URL, set_code.to_lowercase())
    }

    fn parse_collection(&self, html: &str, set_code: &str) -> Result<ScrapedCollection> {
        let document = Html::parse_document(html);

        let name = select_text(&document, SERIES_TITLE).context("Card list missing series title")?;
        let release_date = select_text(&document, SERIES_RELEASE);

        // The listing is a single page: the entry count is the card count.
        let card_count = Selector::parse(CARD_ENTRY)
            .ok()
            .map(|s| document.select(&s).count() as u32)
            .filter(|&n| n > 0);

        Ok(ScrapedCollection {
            name,
            code: set_code.to_lowercase(),
            source_url: self.collection_url(set_code),
            release_date,
            card_count,
        })
    }

    fn parse_card_list(&self, html: &str, _page_url: &str) -> ParsedPage {
        let document = Html::parse_document(html);
        let mut page = ParsedPage::default();

        let entry_selector = match Selector::parse(CARD_ENTRY) {
            Ok(s) => s,
            Err(_) => return page,
        };

        for entry in document.select(&entry_selector) {
            let number = child_text(entry, ENTRY_ID);
            let name = child_text(entry, ENTRY_NAME);

            let (name, number) = match (name, number) {
                (Some(name), Some(number)) => (name, number),
                (_, number) => {
                    page.skipped
                        .push(format!("entry missing name or id (id: {:?})", number));
                    continue;
                }
            };

            let mut summary = CardSummary::new(name, number);
            summary.rarity = child_text(entry, ENTRY_RARITY);
            summary.image_url = child_attr(entry, ENTRY_IMAGE, "src");
            summary.extra = serde_json::json!({
                "cost": child_text(entry, ENTRY_COST),
                "power": child_text(entry, ENTRY_POWER),
                "color": child_text(entry, ENTRY_COLOR),
            });
            page.cards.push(summary);
        }

        // Single-page listing: never a next page.
        page
    }

    fn needs_detail_fetch(&self) -> bool {
        false
    }

    fn parse_card_detail(&self, _html: &str, summary: &CardSummary) -> Result<ScrapedCard> {
        // No detail pages; everything came from the listing.
        Ok(ScrapedCard::from_summary(summary.clone()))
    }
}
