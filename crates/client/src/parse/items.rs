//! Per-item extraction inside a content row.

use regex::Regex;
use scraper::ElementRef;

use super::{child_elements, text_of};

const LINK_CLASS: &str = "nm-collections-link";
const NAME_CLASS: &str = "nm-collections-title-name";
const IMG_CLASS: &str = "nm-collections-title-img";

/// One title listed on a genre page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleEntry {
    pub id: i64,
    pub name: String,
    pub img_src: String,
}

pub(super) struct ItemExtractor {
    title_id: Regex,
}

impl ItemExtractor {
    pub(super) fn new() -> Self {
        Self { title_id: Regex::new(r"^.+/(\d+)").expect("invalid regex") }
    }

    /// Extract a title from a row item, or `None` if any field is missing.
    ///
    /// All fields come from the item's link anchor: the id from its `href`,
    /// the name and image from its direct children.
    pub(super) fn extract(&self, item: ElementRef<'_>) -> Option<TitleEntry> {
        let (anchor, link) = Self::anchor(item)?;
        let id = self.title_id(link)?;
        let name = Self::child_with_class(anchor, "span", NAME_CLASS).map(text_of)?;
        let img_src = Self::child_with_class(anchor, "img", IMG_CLASS)
            .and_then(|img| img.value().attr("src"))?
            .trim()
            .to_string();

        Some(TitleEntry { id, name, img_src })
    }

    /// First direct child anchor carrying the link class and an `href`.
    fn anchor<'a>(item: ElementRef<'a>) -> Option<(ElementRef<'a>, &'a str)> {
        child_elements(item)
            .filter(|el| el.value().name() == "a")
            .filter(|el| el.value().attr("class").is_some_and(|c| c.contains(LINK_CLASS)))
            .find_map(|el| el.value().attr("href").map(|href| (el, href.trim())))
    }

    /// First direct child of `parent` named `tag` whose class is exactly `class`.
    fn child_with_class<'a>(parent: ElementRef<'a>, tag: &str, class: &str) -> Option<ElementRef<'a>> {
        child_elements(parent).find(|el| el.value().name() == tag && el.value().attr("class") == Some(class))
    }

    fn title_id(&self, link: &str) -> Option<i64> {
        self.title_id
            .captures(link)?
            .get(1)?
            .as_str()
            .parse()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn extract_from(fragment: &str) -> Option<TitleEntry> {
        let document = Html::parse_fragment(&format!("<ul>{fragment}</ul>"));
        let li = Selector::parse("li").unwrap();
        let item = document.select(&li).next().unwrap();
        ItemExtractor::new().extract(item)
    }

    #[test]
    fn test_title_id_from_absolute_link() {
        let extractor = ItemExtractor::new();
        assert_eq!(extractor.title_id("https://www.netflix.com/title/80057281"), Some(80057281));
    }

    #[test]
    fn test_title_id_ignores_query_suffix() {
        let extractor = ItemExtractor::new();
        assert_eq!(extractor.title_id("/title/70143836?trkid=13747225"), Some(70143836));
    }

    #[test]
    fn test_title_id_requires_digits_after_slash() {
        let extractor = ItemExtractor::new();
        assert_eq!(extractor.title_id("/title/"), None);
        assert_eq!(extractor.title_id("80057281"), None);
        assert_eq!(extractor.title_id("/title/abc"), None);
    }

    #[test]
    fn test_extract_complete_item() {
        let entry = extract_from(
            r#"<li><a class="nm-collections-link" href=" /title/42 ">
                <img class="nm-collections-title-img" src=" https://img.example.com/42.jpg "/>
                <span class="nm-collections-title-name">
                    The Answer
                </span></a></li>"#,
        )
        .unwrap();
        assert_eq!(entry.id, 42);
        assert_eq!(entry.name, "The Answer");
        assert_eq!(entry.img_src, "https://img.example.com/42.jpg");
    }

    #[test]
    fn test_link_must_be_direct_child() {
        let entry = extract_from(
            r#"<li><div><a class="nm-collections-link" href="/title/42">
                <img class="nm-collections-title-img" src="42.jpg"/>
                <span class="nm-collections-title-name">Nested</span></a></div></li>"#,
        );
        assert!(entry.is_none());
    }

    #[test]
    fn test_name_and_image_come_from_link_anchor() {
        let entry = extract_from(
            r#"<li><a class="nm-collections-link" href="/title/42">
                <div><img class="nm-collections-title-img" src="nested.jpg"/>
                <span class="nm-collections-title-name">Nested</span></div></a>
                <div><a><img class="nm-collections-title-img" src="other.jpg"/>
                <span class="nm-collections-title-name">Other</span></a></div></li>"#,
        );
        assert!(entry.is_none());
    }

    #[test]
    fn test_name_and_image_require_exact_class() {
        let entry = extract_from(
            r#"<li><a class="nm-collections-link" href="/title/42">
                <img class="nm-collections-title-img boxart" src="42.jpg"/>
                <span class="nm-collections-title-name">Name</span></a></li>"#,
        );
        assert!(entry.is_none());
    }

    #[test]
    fn test_missing_name_skips_item() {
        let entry = extract_from(
            r#"<li><a class="nm-collections-link" href="/title/42">
                <img class="nm-collections-title-img" src="42.jpg"/></a></li>"#,
        );
        assert!(entry.is_none());
    }
}
