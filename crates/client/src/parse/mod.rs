//! Genre listing page parsing.
//!
//! Extraction is tolerant at two levels:
//!
//! - Genre metadata (title and synopsis) is all-or-nothing. If either is
//!   missing the page is rejected with a [`ParseError`].
//! - Title items are extracted field by field. An item missing any field is
//!   counted in [`GenrePage::skipped`] and the rest of the page is still used.

mod items;

use scraper::{ElementRef, Html, Selector};

pub use items::TitleEntry;

/// Why a genre page could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("genre title not found")]
    MissingGenreTitle,

    #[error("genre synopsis not found")]
    MissingSynopsis,
}

/// Everything extracted from one genre page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenrePage {
    pub name: String,
    pub synopsis: String,
    pub titles: Vec<TitleEntry>,
    /// Items present in a content row that could not be extracted.
    pub skipped: usize,
}

impl GenrePage {
    /// Number of title items extracted successfully.
    pub fn found(&self) -> usize {
        self.titles.len()
    }
}

/// Stable parser trait so the markup library can be swapped without touching
/// the crawl driver.
pub trait PageParser: Send + Sync {
    /// Parse a genre page from raw response bytes.
    fn parse(&self, body: &[u8]) -> Result<GenrePage, ParseError>;
}

/// Parser for the fixed genre page layout, built on `scraper`.
pub struct ScraperParser {
    genre_title: Selector,
    genre_synopsis: Selector,
    content_row: Selector,
    items: items::ItemExtractor,
}

impl ScraperParser {
    pub fn new() -> Self {
        Self {
            genre_title: Selector::parse("div[class='nm-collections-metadata-title']").expect("invalid selector"),
            genre_synopsis: Selector::parse("div[class='nm-collections-metadata-synopsis']")
                .expect("invalid selector"),
            content_row: Selector::parse("div[class='nm-content-horizontal-row'] > ul").expect("invalid selector"),
            items: items::ItemExtractor::new(),
        }
    }

    fn first_text(document: &Html, selector: &Selector) -> Option<String> {
        document.select(selector).next().map(text_of)
    }
}

impl Default for ScraperParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PageParser for ScraperParser {
    fn parse(&self, body: &[u8]) -> Result<GenrePage, ParseError> {
        let html = String::from_utf8_lossy(body);
        let document = Html::parse_document(&html);

        let name = Self::first_text(&document, &self.genre_title).ok_or(ParseError::MissingGenreTitle)?;
        let synopsis = Self::first_text(&document, &self.genre_synopsis).ok_or(ParseError::MissingSynopsis)?;

        let mut titles = Vec::new();
        let mut skipped = 0;
        for row in document.select(&self.content_row) {
            for item in child_elements(row) {
                match self.items.extract(item) {
                    Some(entry) => titles.push(entry),
                    None => skipped += 1,
                }
            }
        }

        Ok(GenrePage { name, synopsis, titles, skipped })
    }
}

/// Concatenated, trimmed text content of an element.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Direct element children, skipping text and comment nodes.
pub(crate) fn child_elements(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap)
}
