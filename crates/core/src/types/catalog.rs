//! Catalogue listing and search parameters.
//!
//! Query strings come straight from the shop front-end, so parsing here is
//! lenient: unknown sort keys fall back to the default, and paging values are
//! clamped instead of rejected.

use serde::{Deserialize, Serialize};

/// Sort order for the shop product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProductSort {
    #[default]
    #[serde(rename = "price-lowtohigh")]
    PriceLowToHigh,
    #[serde(rename = "price-hightolow")]
    PriceHighToLow,
    #[serde(rename = "title-atoz")]
    TitleAToZ,
    #[serde(rename = "title-ztoa")]
    TitleZToA,
}

impl ProductSort {
    /// Parse a `sortBy` value, defaulting to price ascending.
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("price-hightolow") => Self::PriceHighToLow,
            Some("title-atoz") => Self::TitleAToZ,
            Some("title-ztoa") => Self::TitleZToA,
            _ => Self::PriceLowToHigh,
        }
    }
}

/// Sort order for keyword search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchSort {
    /// Most recently added products first.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    Newest,
}

impl SearchSort {
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("price-asc") => Self::PriceAsc,
            Some("price-desc") => Self::PriceDesc,
            Some("newest") => Self::Newest,
            _ => Self::Relevance,
        }
    }
}

/// Split a comma-separated filter (`"men,women, kids"`) into trimmed,
/// non-empty values.
#[must_use]
pub fn parse_csv_filter(value: Option<&str>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Escape `LIKE`/`ILIKE` wildcards so user input matches literally.
///
/// Uses backslash, the `PostgreSQL` default escape character.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A page window over a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// Build a page from optional query values.
    ///
    /// `page` is at least 1, `limit` is between 1 and [`Self::MAX_LIMIT`].
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Rows to skip before this page.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_sort_defaults_to_price_ascending() {
        assert_eq!(ProductSort::parse_or_default(None), ProductSort::PriceLowToHigh);
        assert_eq!(
            ProductSort::parse_or_default(Some("bogus")),
            ProductSort::PriceLowToHigh
        );
        assert_eq!(
            ProductSort::parse_or_default(Some("title-ztoa")),
            ProductSort::TitleZToA
        );
        assert_eq!(
            ProductSort::parse_or_default(Some("price-hightolow")),
            ProductSort::PriceHighToLow
        );
    }

    #[test]
    fn test_search_sort() {
        assert_eq!(SearchSort::parse_or_default(Some("newest")), SearchSort::Newest);
        assert_eq!(SearchSort::parse_or_default(Some("")), SearchSort::Relevance);
    }

    #[test]
    fn test_parse_csv_filter() {
        assert_eq!(
            parse_csv_filter(Some(" men, ,women,")),
            vec!["men".to_owned(), "women".to_owned()]
        );
        assert!(parse_csv_filter(Some(",,")).is_empty());
        assert!(parse_csv_filter(None).is_empty());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("shirt"), "shirt");
    }

    #[test]
    fn test_page_clamps() {
        let page = Page::new(Some(0), Some(500));
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), Page::MAX_LIMIT);
        assert_eq!(page.offset(), 0);

        let page = Page::new(Some(3), Some(0));
        assert_eq!(page.limit(), 1);
        assert_eq!(page.offset(), 2);

        let page = Page::default();
        assert_eq!((page.page(), page.limit()), (1, 20));
        assert_eq!(Page::new(Some(2), None).offset(), 20);
    }
}
