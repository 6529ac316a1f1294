// Document abstraction
//
// The controller never touches a concrete DOM: it reads and writes through the
// `Page` trait. `MemoryPage` is the in-process implementation used by headless
// hosts and tests.

pub mod markup;
pub mod memory;

use std::fmt;
use std::str::FromStr;

use crate::Result;

/// Opaque reference to an element of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle {
    pub(crate) index: usize,
    /// Bumped each time the slot is reused
    pub(crate) generation: u32,
}

impl ElementHandle {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// How a fetched fragment replaces its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwapStyle {
    /// Replace the target's children
    #[default]
    Inner,
    /// Replace the target element itself
    Outer,
}

impl FromStr for SwapStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // modifiers such as "outerHTML swap:1s" are ignored
        match s.split_whitespace().next().unwrap_or_default() {
            "" | "innerHTML" => Ok(SwapStyle::Inner),
            "outerHTML" => Ok(SwapStyle::Outer),
            other => Err(format!("unsupported swap style: {}", other)),
        }
    }
}

/// Element-level operations the controller needs from the rendering layer.
///
/// Setters on detached or unknown handles are no-ops. Searches cover the
/// subtree rooted at the given element, the root included.
pub trait Page {
    fn element_by_id(&self, id: &str) -> Option<ElementHandle>;

    /// Whether the element is still part of the document
    fn is_attached(&self, element: ElementHandle) -> bool;

    /// Nearest ancestor-or-self declaring `attribute`
    fn closest_with_attribute(&self, element: ElementHandle, attribute: &str)
        -> Option<ElementHandle>;

    fn find_by_class(&self, root: ElementHandle, class: &str) -> Option<ElementHandle>;

    fn find_by_tag(&self, root: ElementHandle, tag: &str) -> Option<ElementHandle>;

    /// Attached elements declaring `attribute`, in document order
    fn elements_with_attribute(&self, attribute: &str) -> Vec<ElementHandle>;

    fn attribute(&self, element: ElementHandle, name: &str) -> Option<String>;

    fn set_attribute(&mut self, element: ElementHandle, name: &str, value: &str);

    fn has_class(&self, element: ElementHandle, class: &str) -> bool;

    fn add_class(&mut self, element: ElementHandle, class: &str);

    fn remove_class(&mut self, element: ElementHandle, class: &str);

    /// Concatenated text of the subtree
    fn text(&self, element: ElementHandle) -> String;

    /// Replace the element's children with a single text node
    fn set_text(&mut self, element: ElementHandle, text: &str);

    /// Current value of a form field
    fn value(&self, element: ElementHandle) -> Option<String>;

    fn set_value(&mut self, element: ElementHandle, value: &str);

    fn scroll_height(&self, element: ElementHandle) -> u32;

    fn scroll_top(&self, element: ElementHandle) -> u32;

    fn set_scroll_top(&mut self, element: ElementHandle, offset: u32);

    fn clear_children(&mut self, element: ElementHandle);

    /// Replace `target` (or its children) with `markup` and return the roots
    /// of the inserted content: the target itself for inner swaps, every new
    /// top-level element for outer swaps (none when the fragment held only
    /// text).
    fn swap(&mut self, target: ElementHandle, style: SwapStyle, markup: &str)
        -> Result<Vec<ElementHandle>>;
}
