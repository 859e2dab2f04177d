use serde::{Deserialize, Serialize};

use crate::types::SortOrder;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Raw paging inputs as they arrive on the query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Canonical offset/limit/sort triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub skip: i64,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Normalize raw inputs. Never fails: garbage falls back to defaults and
    /// out-of-range numbers are clamped.
    ///
    /// An absent `sortOrder` takes `default_order`; any supplied value other
    /// than the literal `asc` means descending.
    pub fn parse(raw: &PageRequest, default_sort_by: &str, default_order: SortOrder) -> Self {
        let page = raw
            .page
            .as_deref()
            .and_then(parse_int_prefix)
            .unwrap_or(DEFAULT_PAGE)
            .max(1);
        let limit = raw
            .limit
            .as_deref()
            .and_then(parse_int_prefix)
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);
        let sort_by = raw
            .sort_by
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default_sort_by)
            .to_string();
        let sort_order = match raw.sort_order.as_deref() {
            None => default_order,
            Some("asc") => SortOrder::Asc,
            Some(_) => SortOrder::Desc,
        };

        Self {
            page,
            limit,
            skip: (page - 1).saturating_mul(limit),
            sort_by,
            sort_order,
        }
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta::new(self.page, self.limit, total)
    }
}

impl PageMeta {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

/// Integer parse with the forgiving prefix rules of a browser `parseInt(s, 10)`:
/// leading whitespace, an optional sign, then as many digits as follow.
/// Returns `None` when no digits are present.
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    // Overlong inputs saturate rather than fail; they are clamped afterwards anyway.
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}
