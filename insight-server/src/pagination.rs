//! Pagination utilities for the record listing
//!
//! Query values are coerced, never rejected: a missing or unparsable `page`
//! becomes 1, a missing or unparsable `limit` becomes [`DEFAULT_PAGE_SIZE`],
//! and both are clamped into their valid ranges.

/// Page size when the request does not name one
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Pagination window for one listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page
    pub limit: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

impl Pagination {
    /// Build a window from raw query values
    ///
    /// # Examples
    /// ```
    /// use insight_server::pagination::Pagination;
    ///
    /// let p = Pagination::from_params(Some("3"), Some("20"), 1000);
    /// assert_eq!(p.page, 3);
    /// assert_eq!(p.limit, 20);
    /// assert_eq!(p.offset, 40);
    ///
    /// // Out-of-range values get clamped
    /// let p = Pagination::from_params(Some("0"), Some("5000"), 1000);
    /// assert_eq!(p.page, 1);
    /// assert_eq!(p.limit, 1000);
    /// ```
    pub fn from_params(page: Option<&str>, limit: Option<&str>, max_limit: i64) -> Self {
        let page = page.and_then(parse_leading_int).unwrap_or(1).max(1);
        let limit = limit
            .and_then(parse_leading_int)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, max_limit.max(1));

        Self {
            page,
            limit,
            offset: page.saturating_sub(1).saturating_mul(limit),
        }
    }

    /// `ceil(total / limit)`
    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}

/// Leading optional sign plus digits, the rest ignored ("12abc" -> 12)
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    // Overlong input saturates instead of failing
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}
