use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Normalized page/limit pair. Out-of-range values fall back to the
/// defaults and the limit is capped so a single request cannot pull
/// the whole table.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p,
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(l) if l >= 1 => l.min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(total: i64, params: PageParams) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + params.limit - 1) / params.limit
        };
        Self {
            total,
            page: params.page,
            limit: params.limit,
            total_pages,
        }
    }
}

/// Wrap a search term for ILIKE contains-matching, escaping the LIKE
/// metacharacters in the user input.
pub fn contains_pattern(query: &str) -> String {
    format!("%{}%", escape_like_pattern(query))
}

fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '%' | '_' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}
