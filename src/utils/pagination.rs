use serde::Deserialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Raw list query. Numbers are kept as strings so that garbage values fall
/// back to the defaults instead of rejecting the request.
#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<String>,
    #[serde(alias = "per_page")]
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    /// Saturates instead of overflowing; an offset past the last row just
    /// yields an empty page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn page_counts(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.limit - 1) / self.limit
    }
}

impl ListQuery {
    pub fn page(&self) -> Page {
        let page = match parse(&self.page) {
            Some(p) if p > 0 => p,
            _ => DEFAULT_PAGE,
        };

        let limit = match parse(&self.limit) {
            Some(l) if l > MAX_LIMIT => MAX_LIMIT,
            Some(l) if l > 0 => l,
            _ => DEFAULT_LIMIT,
        };

        Page { page, limit }
    }

    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn parse(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> ListQuery {
        ListQuery {
            search: None,
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn defaults_when_missing() {
        assert_eq!(query(None, None).page(), Page { page: 1, limit: 10 });
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(query(Some("0"), Some("500")).page(), Page { page: 1, limit: 100 });
        assert_eq!(query(Some("-3"), Some("-1")).page(), Page { page: 1, limit: 10 });
        assert_eq!(query(Some("abc"), Some("x")).page(), Page { page: 1, limit: 10 });
    }

    #[test]
    fn offset_and_page_counts() {
        let page = query(Some("3"), Some("20")).page();
        assert_eq!(page.offset(), 40);
        assert_eq!(page.page_counts(0), 0);
        assert_eq!(page.page_counts(20), 1);
        assert_eq!(page.page_counts(41), 3);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let page = query(Some("9223372036854775807"), Some("10")).page();
        assert_eq!(page.page, i64::MAX);
        assert_eq!(page.offset(), i64::MAX);

        let page = query(Some("922337203685477581"), Some("100")).page();
        assert!(page.offset() > 0);
    }

    #[test]
    fn blank_search_is_ignored() {
        let mut q = query(None, None);
        q.search = Some(String::from("   "));
        assert_eq!(q.search(), None);
        q.search = Some(String::from(" soup "));
        assert_eq!(q.search(), Some("soup"));
    }

    #[test]
    fn per_page_alias_is_accepted() {
        let q: ListQuery = serde_json::from_str(r#"{"page":"2","per_page":"5"}"#).unwrap();
        assert_eq!(q.page(), Page { page: 2, limit: 5 });
    }
}
