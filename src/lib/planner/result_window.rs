//! Watermark pagination over the filtered lectures: rows are revealed a page at a
//! time as the end of the list scrolls into view, and a new result starts over.
use std::sync::Arc;

use log::debug;

use super::{lecture_filter::Lectures, models::lecture_model::Lecture};

pub const PAGE_SIZE: usize = 100;

pub struct ResultWindow {
    source: Lectures,
    page: usize,
    page_size: usize,
    scroll_reset: bool,
}

impl ResultWindow {
    pub fn new(page_size: usize) -> Self {
        Self {
            source: Arc::new(Vec::new()),
            page: 1,
            page_size: page_size.max(1),
            scroll_reset: false,
        }
    }

    /// Points the window at the latest filter result. A different result
    /// (by identity) collapses the window back to the first page.
    pub fn sync(&mut self, filtered: &Lectures) {
        if Arc::ptr_eq(&self.source, filtered) {
            return;
        }
        self.source = Arc::clone(filtered);
        self.page = 1;
        self.scroll_reset = true;
    }

    /// The sentinel below the last rendered row became visible.
    pub fn on_sentinel_visible(&mut self) {
        let next = (self.page + 1).min(self.last_page()).max(1);
        if next != self.page {
            debug!("Revealing page {} of {}", next, self.last_page());
        }
        self.page = next;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn last_page(&self) -> usize {
        self.source.len().div_ceil(self.page_size)
    }

    pub fn total(&self) -> usize {
        self.source.len()
    }

    pub fn visible(&self) -> &[Arc<Lecture>] {
        let end = self.source.len().min(self.page * self.page_size);
        &self.source[..end]
    }

    /// Whether the viewport should jump back to the top; asking clears the request.
    pub fn take_scroll_reset(&mut self) -> bool {
        std::mem::take(&mut self.scroll_reset)
    }
}

impl Default for ResultWindow {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}
