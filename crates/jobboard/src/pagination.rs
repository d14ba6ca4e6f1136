use serde::{Deserialize, Serialize};

/// Query-string parameters accepted by list endpoints. Pages are numbered
/// from 1; an absent `page_size` falls back to the configured default.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Envelope returned by paginated endpoints. `total` is the overall match
/// count, not the length of the returned slice.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub total: usize,
    pub results: Vec<T>,
}

/// Slice `items` according to `params`, recording the pre-slice count.
pub fn paginate<T>(items: Vec<T>, params: PageParams, default_page_size: usize) -> Page<T> {
    let total = items.len();
    let page_size = params.page_size.filter(|size| *size > 0).unwrap_or(default_page_size);
    let page = params.page.filter(|page| *page > 0).unwrap_or(1);
    let start = (page - 1).saturating_mul(page_size);

    let results = if start >= total {
        Vec::new()
    } else {
        items
            .into_iter()
            .skip(start)
            .take(page_size)
            .collect()
    };

    Page { total, results }
}
