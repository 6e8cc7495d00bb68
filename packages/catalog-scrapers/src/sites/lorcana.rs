//! Disney Lorcana catalog scraper.
//!
//! Grid listing that hangs card data off `data-*` attributes; "load more"
//! pagination is surfaced to non-JS clients as a link with a `data-next`
//! URL. Detail pages carry ink cost, ink color and lore value.

use anyhow::{Context, Result};
use scraper::{Html, Selector};

use super::{
    child_attr, resolve_href, select_first, select_text, CatalogScraper, Franchise, ParsedPage,
};
use crate::types::{CardSummary, ScrapedCard, ScrapedCollection};

const BASE_URL: &str = "https://lorcanagallery.example";

const SET_NAME: &str = "h1[data-set-name]";
const SET_RELEASE: &str = ".set-header .release-date";
const GRID_CARD: &str = "div.gallery div.card[data-card-name][data-card-number]";
const CARD_LINK: &str = "a";
const CARD_IMAGE: &str = "img";
const LOAD_MORE: &str = "a.load-more[data-next]";
const DETAIL_NAME: &str = ".card-page h1";
const DETAIL_INK_COST: &str = ".card-page .ink-cost";
const DETAIL_INK_COLOR: &str = ".card-page .ink-color";
const DETAIL_LORE: &str = ".card-page .lore-value";
const DETAIL_RARITY: &str = ".card-page .rarity";
const DETAIL_IMAGE: &str = ".card-page img.full-art";

pub struct LorcanaScraper;

impl CatalogScraper for LorcanaScraper {
    fn franchise(&self) -> Franchise {
        Franchise::Lorcana
    }

    fn collection_url(&self, set_code: &str) -> String {
        format!("{}/sets/{}", BASE_URL, set_code.to_lowercase())
    }

    fn parse_collection(&self, html: &str, set_code: &str) -> Result<ScrapedCollection> {
        let document = Html::parse_document(html);

        let name = select_first(&document, SET_NAME)
            .and_then(|el| el.value().attr("data-set-name").map(|v| v.to_string()))
            .context("Set page missing data-set-name")?;
        let release_date = select_text(&document, SET_RELEASE);

        Ok(ScrapedCollection {
            name,
            code: set_code.to_lowercase(),
            source_url: self.collection_url(set_code),
            release_date,
            card_count: None,
        })
    }

    fn parse_card_list(&self, html: &str, page_url: &str) -> ParsedPage {
        let document = Html::parse_document(html);
        let mut page = ParsedPage::default();

        let card_selector = match Selector::parse(GRID_CARD) {
            Ok(s) => s,
            Err(_) => return page,
        };

        for card_el in document.select(&card_selector) {
            // The selector requires both attributes, so these can't miss;
            // empty values can.
            let name = card_el.value().attr("data-card-name").unwrap_or_default();
            let number = card_el.value().attr("data-card-number").unwrap_or_default();
            if name.is_empty() || number.is_empty() {
                page.skipped
                    .push(format!("card with empty data attributes (number: {:?})", number));
                continue;
            }

            let mut summary = CardSummary::new(name, number);
            summary.rarity = card_el.value().attr("data-rarity").map(|v| v.to_string());
            summary.detail_url =
                child_attr(card_el, CARD_LINK, "href").and_then(|href| resolve_href(page_url, &href));
            summary.image_url = child_attr(card_el, CARD_IMAGE, "src");
            page.cards.push(summary);
        }

        page.next_page = select_first(&document, LOAD_MORE)
            .and_then(|el| el.value().attr("data-next").map(|v| v.to_string()))
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
            "ink_cost": select_text(&document, DETAIL_INK_COST),
            "ink_color": select_text(&document, DETAIL_INK_COLOR),
            "lore_value": select_text(&document, DETAIL_LORE),
        });

        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SET_PAGE: &str = r##"
        <html><body>
          <h1 data-set-name="The First Chapter">The First Chapter</h1>
          <div class="set-header"><span class="release-date">2023-08-18</span></div>
          <div class="gallery">
            <div class="card" data-card-name="Elsa - Snow Queen" data-card-number="42/204" data-rarity="Legendary">
              <a href="/cards/tfc/42"><img src="https://lorcanagallery.example/img/tfc/42.webp"></a>
            </div>
            <div class="card" data-card-name="Mickey Mouse - Brave Little Tailor" data-card-number="115/204" data-rarity="Super Rare">
              <a href="/cards/tfc/115"><img src="https://lorcanagallery.example/img/tfc/115.webp"></a>
            </div>
            <div class="card" data-card-name="" data-card-number="0/204"></div>
          </div>
          <a class="load-more" data-next="/sets/tfc?offset=60" href="#">Load more</a>
        </body></html>
    "##;

    #[test]
    fn test_parse_collection_from_data_attribute() {
        let collection = LorcanaScraper.parse_collection(SET_PAGE, "TFC").unwrap();
        assert_eq!(collection.name, "The First Chapter");
        assert_eq!(collection.release_date.as_deref(), Some("2023-08-18"));
    }

    #[test]
    fn test_parse_card_list_data_attributes_and_load_more() {
        let page =
            LorcanaScraper.parse_card_list(SET_PAGE, "https://lorcanagallery.example/sets/tfc");

        assert_eq!(page.cards.len(), 2);
        assert_eq!(page.cards[0].name, "Elsa - Snow Queen");
        assert_eq!(page.cards[0].number, "42/204");
        assert_eq!(page.cards[0].rarity.as_deref(), Some("Legendary"));
        assert_eq!(
            page.cards[0].detail_url.as_deref(),
            Some("https://lorcanagallery.example/cards/tfc/42")
        );
        assert_eq!(page.skipped.len(), 1);
        assert_eq!(
            page.next_page.as_deref(),
            Some("https://lorcanagallery.example/sets/tfc?offset=60")
        );
    }

    #[test]
    fn test_parse_card_detail() {
        let html = r#"
            <div class="card-page">
              <h1>Elsa - Snow Queen</h1>
              <span class="ink-cost">8</span>
              <span class="ink-color">Amethyst</span>
              <span class="lore-value">3</span>
              <span class="rarity">Legendary</span>
              <img class="full-art" src="https://lorcanagallery.example/img/tfc/42-full.webp">
            </div>
        "#;
        let summary = CardSummary::new("Elsa - Snow Queen", "42/204");
        let card = LorcanaScraper.parse_card_detail(html, &summary).unwrap();

        assert_eq!(card.extra["ink_cost"], "8");
        assert_eq!(card.extra["ink_color"], "Amethyst");
        assert_eq!(card.extra["lore_value"], "3");
        assert_eq!(card.rarity.as_deref(), Some("Legendary"));
    }
}
