//! Page-number pagination for list endpoints.
//!
//! Every collection response uses the same envelope:
//! `{count, next, previous, results}`, where `next`/`previous` are relative
//! URLs or null. Page size defaults to 5 and is client-overridable via
//! `page_size` up to a cap of 50.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Raw `page` / `page_size` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageParams {
    /// Apply defaults and bounds: page >= 1, size in [1, 50].
    pub fn resolve(self) -> Page {
        let number = i64::from(self.page.unwrap_or(1).max(1));
        let size = self
            .page_size
            .map_or(DEFAULT_PAGE_SIZE, i64::from)
            .clamp(1, MAX_PAGE_SIZE);
        Page { number, size }
    }
}

/// Validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub number: i64,
    pub size: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    /// Whether this page starts beyond the last row. Page 1 is always valid,
    /// even for an empty result set.
    pub fn is_past_end(&self, count: i64) -> bool {
        self.number > 1 && self.offset() >= count
    }
}

/// The fixed-shape collection wrapper every list response uses.
#[derive(Debug, Serialize)]
pub struct PageEnvelope<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Build the response envelope for one page of `results`.
///
/// `extra` holds query parameters to carry through into the `next`/`previous`
/// links (e.g. the search `q`); values are percent-encoded.
pub fn envelope<T>(
    path: &str,
    extra: &[(&str, &str)],
    page: Page,
    count: i64,
    results: Vec<T>,
) -> PageEnvelope<T> {
    let next = if page.number * page.size < count {
        Some(page_url(path, extra, page.number + 1, page.size))
    } else {
        None
    };
    let previous = if page.number > 1 {
        Some(page_url(path, extra, page.number - 1, page.size))
    } else {
        None
    };
    PageEnvelope {
        count,
        next,
        previous,
        results,
    }
}

fn page_url(path: &str, extra: &[(&str, &str)], number: i64, size: i64) -> String {
    let mut query = String::new();
    for (key, value) in extra {
        query.push_str(key);
        query.push('=');
        query.push_str(&urlencoding::encode(value));
        query.push('&');
    }
    format!("{path}?{query}page={number}&page_size={size}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageParams::default().resolve();
        assert_eq!(page, Page { number: 1, size: 5 });
    }

    #[test]
    fn test_page_size_is_capped() {
        let page = PageParams {
            page: Some(2),
            page_size: Some(500),
        }
        .resolve();
        assert_eq!(page.size, 50);
        assert_eq!(page.number, 2);
    }

    #[test]
    fn test_page_size_floor_and_zero_page() {
        let page = PageParams {
            page: Some(0),
            page_size: Some(0),
        }
        .resolve();
        assert_eq!(page, Page { number: 1, size: 1 });
    }

    #[test]
    fn test_offset() {
        let page = Page { number: 3, size: 5 };
        assert_eq!(page.offset(), 10);
        assert_eq!(page.limit(), 5);
    }

    #[test]
    fn test_past_end() {
        let page = Page { number: 2, size: 5 };
        assert!(page.is_past_end(5));
        assert!(!page.is_past_end(6));
        // Page 1 of an empty set is a valid empty page.
        let first = Page { number: 1, size: 5 };
        assert!(!first.is_past_end(0));
    }

    #[test]
    fn test_envelope_links() {
        let page = Page { number: 2, size: 5 };
        let envelope = envelope("/contacts", &[], page, 12, vec![1, 2, 3, 4, 5]);
        assert_eq!(envelope.count, 12);
        assert_eq!(envelope.next.as_deref(), Some("/contacts?page=3&page_size=5"));
        assert_eq!(
            envelope.previous.as_deref(),
            Some("/contacts?page=1&page_size=5")
        );
    }

    #[test]
    fn test_envelope_edges() {
        let first = envelope("/contacts", &[], Page { number: 1, size: 5 }, 3, vec![1, 2, 3]);
        assert!(first.next.is_none());
        assert!(first.previous.is_none());

        let last = envelope("/contacts", &[], Page { number: 3, size: 5 }, 12, vec![11, 12]);
        assert!(last.next.is_none());
        assert_eq!(last.previous.as_deref(), Some("/contacts?page=2&page_size=5"));
    }

    #[test]
    fn test_envelope_carries_extra_query() {
        let page = Page { number: 1, size: 5 };
        let envelope = envelope("/contacts/search", &[("q", "john doe")], page, 6, vec![1]);
        assert_eq!(
            envelope.next.as_deref(),
            Some("/contacts/search?q=john%20doe&page=2&page_size=5")
        );
    }
}
