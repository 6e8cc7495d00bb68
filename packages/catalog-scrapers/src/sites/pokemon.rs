//! Pokémon catalog scraper.
//!
//! Grid listing with numbered pagination links; card numbers are printed as
//! `NNN/MMM`. Detail pages carry HP, type and rarity.

use anyhow::{Context, Result};
use scraper::{Html, Selector};

use super::{
    child_attr, child_text, resolve_href, select_first, select_text, CatalogScraper, Franchise,
    ParsedPage,
};
use crate::types::{CardSummary, ScrapedCard, ScrapedCollection};

const BASE_URL: &str = "https://pokedex-cards.example";

const SET_NAME: &str = "h1.expansion-title";
const SET_RELEASE: &str = ".expansion-meta time";
const SET_CARD_COUNT: &str = ".expansion-meta .total-cards";
const GRID_TILE: &str = "div.card-grid div.card-tile";
const TILE_NAME: &str = ".card-name";
const TILE_NUMBER: &str = ".card-number";
const TILE_LINK: &str = "a.card-link";
const TILE_IMAGE: &str = "img";
const PAGINATION_NEXT: &str = "ul.pagination li.next a";
const DETAIL_NAME: &str = ".card-detail h1";
const DETAIL_HP: &str = ".card-detail .hp";
const DETAIL_TYPE: &str = ".card-detail .energy-type";
const DETAIL_RARITY: &str = ".card-detail .rarity";
const DETAIL_ILLUSTRATOR: &str = ".card-detail .illustrator";
const DETAIL_IMAGE: &str = ".card-detail img.card-image";

pub struct PokemonScraper;

impl CatalogScraper for PokemonScraper {
    fn franchise(&self) -> Franchise {
        Franchise::Pokemon
    }

    fn collection_url(&self, set_code: &str) -> String {
        format!("{}/expansions/{}", BASE_URL, set_code.to_lowercase())
    }

    fn parse_collection(&self, html: &str, set_code: &str) -> Result<ScrapedCollection> {
        let document = Html::parse_document(html);

        let name =
            select_text(&document, SET_NAME).context("Expansion page missing title")?;
        let release_date = select_text(&document, SET_RELEASE);
        // "102 cards in this expansion"
        let card_count = select_text(&document, SET_CARD_COUNT).and_then(|t| {
            t.split_whitespace()
                .find_map(|word| word.parse::<u32>().ok())
        });

        Ok(ScrapedCollection {
            name,
            code: set_code.to_lowercase(),
            source_url: self.collection_url(set_code),
            release_date,
            card_count,
        })
    }

    fn parse_card_list(&self, html: &str, page_url: &str) -> ParsedPage {
        let document = Html::parse_document(html);
        let mut page = ParsedPage::default();

        let tile_selector = match Selector::parse(GRID_TILE) {
            Ok(s) => s,
            Err(_) => return page,
        };

        for tile in document.select(&tile_selector) {
            let name = child_text(tile, TILE_NAME);
            let number = child_text(tile, TILE_NUMBER);

            let (name, number) = match (name, number) {
                (Some(name), Some(number)) => (name, number),
                (name, _) => {
                    page.skipped
                        .push(format!("tile missing name or number (name: {:?})", name));
                    continue;
                }
            };

            let mut summary = CardSummary::new(name, number);
            summary.detail_url =
                child_attr(tile, TILE_LINK, "href").and_then(|href| resolve_href(page_url, &href));
            summary.image_url = child_attr(tile, TILE_IMAGE, "src");
            page.cards.push(summary);
        }

        page.next_page = select_first(&document, PAGINATION_NEXT)
            .and_then(|el| el.value().attr("href").map(|h| h.to_string()))
            .and_then(|href| resolve_href(page_url, &href));

        page
    }

    fn parse_card_detail(&self, html: &str, summary: &CardSummary) -> Result<ScrapedCard> {
        let document = Html::parse_document(html);

        let mut card = ScrapedCard::from_summary(summary.clone());
        if let Some(name) = select_text(&document, DETAIL_NAME) {
            card.name = name;
        }
        if let Some(rarity) = select_text(&document, DETAIL_RARITY) {
            card.rarity = Some(rarity);
        }
        if let Some(src) = select_first(&document, DETAIL_IMAGE)
            .and_then(|el| el.value().attr("src").map(|s| s.to_string()))
        {
            card.image_url = Some(src);
        }

        card.extra = serde_json::json!({
            "hp": select_text(&document, DETAIL_HP),
            "energy_type": select_text(&document, DETAIL_TYPE),
            "illustrator": select_text(&document, DETAIL_ILLUSTRATOR),
        });

        Ok(card)
    }
}
