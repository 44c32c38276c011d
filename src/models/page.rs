use serde::Serialize;

/// One page of an already-ranked list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually returned
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T: Clone> Page<T> {
    /// Slices `items` into pages of `per_page`, clamping `page` to the valid range
    pub fn slice(items: &[T], page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(per_page).max(1);
        let page = page.clamp(1, total_pages);

        let start = (page - 1) * per_page;
        let end = (start + per_page).min(total_items);
        let items = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

        Self {
            items,
            page,
            total_pages,
            total_items,
        }
    }
}
