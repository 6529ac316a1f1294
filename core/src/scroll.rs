// Auto-scroll after swaps
use tracing::trace;

use crate::page::{ElementHandle, Page};

/// Keeps the log region of freshly swapped content pinned to the bottom
#[derive(Debug, Clone)]
pub struct AutoScroll {
    tag: String,
}

impl AutoScroll {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// Scroll the first matching region under `root` to its end. Must run after
    /// the swapped content is attached. Returns whether a region was found.
    pub fn after_swap<P: Page + ?Sized>(&self, page: &mut P, root: ElementHandle) -> bool {
        let Some(region) = page.find_by_tag(root, &self.tag) else {
            return false;
        };
        let height = page.scroll_height(region);
        page.set_scroll_top(region, height);
        trace!(target: "scroll", region = %region, offset = page.scroll_top(region), "Scrolled to bottom");
        true
    }
}

impl Default for AutoScroll {
    fn default() -> Self {
        Self::new("pre")
    }
}
