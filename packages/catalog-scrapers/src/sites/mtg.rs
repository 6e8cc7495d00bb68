//! Magic: The Gathering catalog scraper.
//!
//! Table-based set listings paginated with `?page=N` (followed via the
//! `rel="next"` link). Detail pages carry mana cost, type line and oracle
//! text.

use anyhow::{Context, Result};
use scraper::{Html, Selector};

use super::{
    child_attr, child_text, element_text, resolve_href, select_first, select_text, CatalogScraper,
    Franchise, ParsedPage,
};
use crate::types::{CardSummary, ScrapedCard, ScrapedCollection};

const BASE_URL: &str = "https://www.mtgcatalog.example";

const SET_NAME: &str = "h1.set-name";
const SET_RELEASE: &str = ".set-info .release-date";
const SET_CARD_COUNT: &str = ".set-info .card-count";
const LIST_ROW: &str = "table.card-table tbody tr";
const ROW_NAME_LINK: &str = "td.name a";
const ROW_NUMBER: &str = "td.number";
const ROW_RARITY: &str = "td.rarity";
const NEXT_LINK: &str = "a[rel='next']";
const DETAIL_NAME: &str = ".card-profile h1";
const DETAIL_MANA: &str = ".card-profile .mana-cost";
const DETAIL_TYPE: &str = ".card-profile .type-line";
const DETAIL_TEXT: &str = ".card-profile .oracle-text";
const DETAIL_RARITY: &str = ".card-profile .rarity";
const DETAIL_IMAGE: &str = "img.card-image";

pub struct MtgScraper;

impl CatalogScraper for MtgScraper {
    fn franchise(&self) -> Franchise {
        Franchise::Magic
    }

    fn collection_url(&self, set_code: &str) -> String {
        format!("{}/sets/{}", BASE_URL, set_code.to_lowercase())
    }

    fn parse_collection(&self, html: &str, set_code: &str) -> Result<ScrapedCollection> {
        let document = Html::parse_document(html);

        let name = select_text(&document, SET_NAME).context("Set page missing set name")?;
        let release_date = select_text(&document, SET_RELEASE);
        let card_count = select_text(&document, SET_CARD_COUNT).and_then(|t| parse_count(&t));

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

        let row_selector = match Selector::parse(LIST_ROW) {
            Ok(s) => s,
            Err(_) => return page,
        };

        for row in document.select(&row_selector) {
            let name = child_text(row, ROW_NAME_LINK);
            let number = child_text(row, ROW_NUMBER);

            let (name, number) = match (name, number) {
                (Some(name), Some(number)) => (name, number),
                _ => {
                    page.skipped
                        .push(format!("row missing name or number: {:?}", element_text(row)));
                    continue;
                }
            };

            let mut summary = CardSummary::new(name, number);
            summary.rarity = child_text(row, ROW_RARITY);
            summary.detail_url = child_attr(row, ROW_NAME_LINK, "href")
                .and_then(|href| resolve_href(page_url, &href));
            page.cards.push(summary);
        }

        page.next_page = select_first(&document, NEXT_LINK)
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
            "mana_cost": select_text(&document, DETAIL_MANA),
            "type_line": select_text(&document, DETAIL_TYPE),
            "oracle_text": select_text(&document, DETAIL_TEXT),
        });

        Ok(card)
    }
}

fn parse_count(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SET_PAGE: &str = r#"
        <html><body>
          <h1 class="set-name">Limited Edition Alpha</h1>
          <div class="set-info">
            <span class="release-date">1993-08-05</span>
            <span class="card-count">295 cards</span>
          </div>
          <table class="card-table">
            <tbody>
              <tr>
                <td class="name"><a href="/cards/lea/232">Black Lotus</a></td>
                <td class="number">232</td>
                <td class="rarity">Rare</td>
              </tr>
              <tr>
                <td class="name"><a href="/cards/lea/1">Animate Wall</a></td>
                <td class="number">1</td>
                <td class="rarity">Rare</td>
              </tr>
              <tr>
                <td class="name"></td>
                <td class="number">999</td>
              </tr>
            </tbody>
          </table>
          <a rel="next" href="?page=2">Next</a>
        </body></html>
    "#;

    #[test]
    fn test_parse_collection() {
        let collection = MtgScraper.parse_collection(SET_PAGE, "LEA").unwrap();
        assert_eq!(collection.name, "Limited Edition Alpha");
        assert_eq!(collection.code, "lea");
        assert_eq!(collection.release_date.as_deref(), Some("1993-08-05"));
        assert_eq!(collection.card_count, Some(295));
    }

    #[test]
    fn test_parse_collection_requires_name() {
        assert!(MtgScraper
            .parse_collection("<html><body></body></html>", "lea")
            .is_err());
    }

    #[test]
    fn test_parse_card_list_rows_and_pagination() {
        let page = MtgScraper.parse_card_list(SET_PAGE, "https://www.mtgcatalog.example/sets/lea");

        assert_eq!(page.cards.len(), 2);
        assert_eq!(page.cards[0].name, "Black Lotus");
        assert_eq!(page.cards[0].number, "232");
        assert_eq!(page.cards[0].rarity.as_deref(), Some("Rare"));
        assert_eq!(
            page.cards[0].detail_url.as_deref(),
            Some("https://www.mtgcatalog.example/cards/lea/232")
        );
        // Row with no name is skipped, not fatal
        assert_eq!(page.skipped.len(), 1);
        assert_eq!(
            page.next_page.as_deref(),
            Some("https://www.mtgcatalog.example/sets/lea?page=2")
        );
    }

    #[test]
    fn test_parse_card_detail() {
        let html = r#"
            <div class="card-profile">
              <h1>Black Lotus</h1>
              <span class="mana-cost">{0}</span>
              <span class="type-line">Artifact</span>
              <p class="oracle-text">Sacrifice this artifact: Add three mana of any one color.</p>
              <span class="rarity">Rare</span>
            </div>
            <img class="card-image" src="https://img.mtgcatalog.example/lea/232.jpg">
        "#;
        let summary = CardSummary::new("Black Lotus", "232");
        let card = MtgScraper.parse_card_detail(html, &summary).unwrap();

        assert_eq!(card.extra["mana_cost"], "{0}");
        assert_eq!(card.extra["type_line"], "Artifact");
        assert_eq!(
            card.image_url.as_deref(),
            Some("https://img.mtgcatalog.example/lea/232.jpg")
        );
        assert_eq!(card.rarity.as_deref(), Some("Rare"));
    }

    #[test]
    fn test_detail_falls_back_to_summary_fields() {
        let summary = CardSummary::new("Animate Wall", "1");
        let card = MtgScraper.parse_card_detail("<html></html>", &summary).unwrap();
        assert_eq!(card.name, "Animate Wall");
        assert_eq!(card.number, "1");
    }
}
