use serde::Deserialize;

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Raw `page`/`per_page` query parameters.
///
/// Both are kept as strings so that garbage input degrades to the defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// A clamped offset/limit window over an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        let page = if page <= 0 { 1 } else { page };
        let per_page = match per_page {
            p if p <= 0 => DEFAULT_PER_PAGE,
            p if p > MAX_PER_PAGE => MAX_PER_PAGE,
            p => p,
        };
        Self { page, per_page }
    }

    pub fn from_query(query: &PageQuery) -> Self {
        Self::new(
            leading_integer(query.page.as_deref()),
            leading_integer(query.per_page.as_deref()),
        )
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Reads the leading integer of a string, yielding 0 when there is none
/// ("12abc" is 12, "abc" is 0).
fn leading_integer(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim_start) else {
        return 0;
    };

    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = digits[..end].parse::<i64>().unwrap_or(if end > 0 { i64::MAX } else { 0 });

    if negative { -value } else { value }
}
