use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Pages with up to this many numbers are all shown in the page control
const FULL_WINDOW_PAGES: usize = 7;

/// One page of a section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

pub fn validate_page_size(page_size: usize) -> AppResult<usize> {
    if page_size == 0 {
        return Err(AppError::InvalidInput(
            "Page size must be at least 1".to_string(),
        ));
    }
    Ok(page_size)
}

/// Slices page `page` (1-based) out of `items`
///
/// Returns `None` when the page lies outside `[1, total_pages]`. Page 1 of an
/// empty list is a valid, empty page.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, page: usize) -> Option<Page<T>> {
    if page_size == 0 || page == 0 {
        return None;
    }

    let total = total_pages(items.len(), page_size);
    if page > total.max(1) {
        return None;
    }

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());

    Some(Page {
        items: items[start..end].to_vec(),
        page,
        page_size,
        total_items: items.len(),
        total_pages: total,
        has_prev: page > 1,
        has_next: page < total,
    })
}

/// Navigation state of one section's page control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    current_page: usize,
}

impl Paginator {
    pub fn new(page_size: usize) -> AppResult<Self> {
        Ok(Self {
            page_size: validate_page_size(page_size)?,
            current_page: 1,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Changing the page size always returns to the first page
    pub fn set_page_size(&mut self, page_size: usize) -> AppResult<()> {
        self.page_size = validate_page_size(page_size)?;
        self.current_page = 1;
        Ok(())
    }

    /// Moves to `page` if it exists; returns whether the page changed
    pub fn go_to(&mut self, page: usize, total_items: usize) -> bool {
        let total = total_pages(total_items, self.page_size);
        if page == 0 || page > total || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn next_page(&mut self, total_items: usize) -> bool {
        self.go_to(self.current_page + 1, total_items)
    }

    pub fn prev_page(&mut self) -> bool {
        if self.current_page <= 1 {
            return false;
        }
        self.current_page -= 1;
        true
    }

    /// Pulls the current page back into range after the list shrank
    pub fn clamp(&mut self, total_items: usize) {
        let last = total_pages(total_items, self.page_size).max(1);
        self.current_page = self.current_page.min(last);
    }

    pub fn has_next(&self, total_items: usize) -> bool {
        self.current_page < total_pages(total_items, self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn slice<T: Clone>(&self, items: &[T]) -> Option<Page<T>> {
        paginate(items, self.page_size, self.current_page)
    }
}

/// One entry of the compact page control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "page", rename_all = "snake_case")]
pub enum PageLink {
    Number(usize),
    Ellipsis,
}

/// Page numbers to render for `current` out of `total` pages
///
/// Small page counts are shown in full. Larger ones show the first page, a
/// window of at least three pages around `current`, and the last page, with
/// ellipses over the gaps.
pub fn page_window(current: usize, total: usize) -> Vec<PageLink> {
    if total == 0 {
        return Vec::new();
    }
    if total <= FULL_WINDOW_PAGES {
        return (1..=total).map(PageLink::Number).collect();
    }

    let current = current.clamp(1, total);
    let mut start = current.saturating_sub(1).max(2);
    let mut end = (current + 1).min(total - 1);

    if end - start < 2 {
        if current * 2 < total {
            end = (start + 2).min(total - 1);
        } else {
            start = end.saturating_sub(2).max(2);
        }
    }

    let mut links = vec![PageLink::Number(1)];
    if start > 2 {
        links.push(PageLink::Ellipsis);
    }
    links.extend((start..=end).map(PageLink::Number));
    if end < total - 1 {
        links.push(PageLink::Ellipsis);
    }
    links.push(PageLink::Number(total));
    links
}
