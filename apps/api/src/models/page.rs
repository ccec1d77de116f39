use serde::{Deserialize, Serialize};

fn default_page_number() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

/// Paging parameters taken from the query string. A page size of 0 or less
/// disables paging and returns every matching row.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page_number: default_page_number(),
            page_size: default_page_size(),
        }
    }
}

impl PageRequest {
    /// Page numbers below 1 are treated as page 1.
    pub fn normalized(self) -> Self {
        PageRequest {
            page_number: self.page_number.max(1),
            page_size: self.page_size,
        }
    }

    /// Row offset for the normalized page, or 0 when paging is disabled.
    pub fn offset(&self) -> i64 {
        if self.page_size <= 0 {
            0
        } else {
            (self.page_number.max(1) - 1) * self.page_size
        }
    }

    /// LIMIT bind value; `None` (SQL NULL) lists everything.
    pub fn limit(&self) -> Option<i64> {
        (self.page_size > 0).then_some(self.page_size)
    }
}

/// A page of results plus the paging echo the listing UIs render.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total_records: i64,
    pub current_page: i64,
    pub page_size: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total_records: i64, page: PageRequest) -> Self {
        Paginated {
            items,
            total_records,
            current_page: page.page_number.max(1),
            page_size: page.page_size,
        }
    }
}
