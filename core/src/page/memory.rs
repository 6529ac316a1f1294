// In-memory document
//
// Arena of elements built from markup. Handles are slot indexes plus the
// slot's generation; freed slots are reused with a bumped generation, so a
// stale handle can't alias a new element.

use super::markup::{self, MarkupNode};
use super::{ElementHandle, Page, SwapStyle};
use crate::{ConsoleError, Result};

const DEFAULT_VIEWPORT_LINES: u32 = 20;

#[derive(Debug, Clone)]
enum Child {
    Element(ElementHandle),
    Text(String),
}

#[derive(Debug, Clone)]
struct ElementNode {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Child>,
    parent: Option<ElementHandle>,
    scroll_top: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<ElementNode>,
}

/// Headless page model
#[derive(Debug, Clone)]
pub struct MemoryPage {
    slots: Vec<Slot>,
    free_slots: Vec<usize>,
    root: ElementHandle,
    viewport_lines: u32,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    /// Empty document
    pub fn new() -> Self {
        let root = ElementNode {
            tag: "#document".to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
            scroll_top: 0,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root),
            }],
            free_slots: Vec::new(),
            root: ElementHandle::new(0, 0),
            viewport_lines: DEFAULT_VIEWPORT_LINES,
        }
    }

    pub fn from_markup(source: &str) -> Result<Self> {
        let mut page = Self::new();
        let nodes = markup::parse(source)?;
        let root = page.root;
        let children = page.build(root, nodes);
        if let Some(node) = page.node_mut(root) {
            node.children = children;
        }
        Ok(page)
    }

    /// Number of lines a scrollable region shows at once
    pub fn with_viewport(mut self, lines: u32) -> Self {
        self.viewport_lines = lines;
        self
    }

    pub fn root(&self) -> ElementHandle {
        self.root
    }

    pub fn tag(&self, element: ElementHandle) -> Option<&str> {
        self.node(element).map(|n| n.tag.as_str())
    }

    /// Direct element children, in order
    pub fn children(&self, element: ElementHandle) -> Vec<ElementHandle> {
        self.node(element)
            .map(|n| {
                n.children
                    .iter()
                    .filter_map(|c| match c {
                        Child::Element(h) => Some(*h),
                        Child::Text(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Live elements in the arena, detached subtrees included
    pub fn element_count(&self) -> usize {
        self.slots.len() - self.free_slots.len()
    }

    fn node(&self, element: ElementHandle) -> Option<&ElementNode> {
        self.slots
            .get(element.index)
            .filter(|slot| slot.generation == element.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, element: ElementHandle) -> Option<&mut ElementNode> {
        self.slots
            .get_mut(element.index)
            .filter(|slot| slot.generation == element.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn alloc(&mut self, node: ElementNode) -> ElementHandle {
        match self.free_slots.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                ElementHandle::new(index, slot.generation)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                ElementHandle::new(self.slots.len() - 1, 0)
            }
        }
    }

    fn build(&mut self, parent: ElementHandle, nodes: Vec<MarkupNode>) -> Vec<Child> {
        let mut children = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                MarkupNode::Text(text) => children.push(Child::Text(text)),
                MarkupNode::Element {
                    tag,
                    attributes,
                    children: nested,
                } => {
                    let handle = self.alloc(ElementNode {
                        tag,
                        attributes,
                        children: Vec::new(),
                        parent: Some(parent),
                        scroll_top: 0,
                    });
                    let built = self.build(handle, nested);
                    if let Some(n) = self.node_mut(handle) {
                        n.children = built;
                    }
                    children.push(Child::Element(handle));
                }
            }
        }
        children
    }

    fn free(&mut self, element: ElementHandle) {
        let Some(slot) = self
            .slots
            .get_mut(element.index)
            .filter(|slot| slot.generation == element.generation)
        else {
            return;
        };
        let Some(node) = slot.node.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(element.index);
        for child in node.children {
            if let Child::Element(h) = child {
                self.free(h);
            }
        }
    }

    fn free_children(&mut self, element: ElementHandle) {
        let old = match self.node_mut(element) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in old {
            if let Child::Element(h) = child {
                self.free(h);
            }
        }
    }

    /// Subtree in document order, root first
    fn subtree(&self, root: ElementHandle) -> Vec<ElementHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(h) = stack.pop() {
            let Some(node) = self.node(h) else { continue };
            out.push(h);
            for child in node.children.iter().rev() {
                if let Child::Element(c) = child {
                    stack.push(*c);
                }
            }
        }
        out
    }

    fn collect_text(&self, element: ElementHandle, out: &mut String) {
        let Some(node) = self.node(element) else { return };
        for child in &node.children {
            match child {
                Child::Text(t) => out.push_str(t),
                Child::Element(h) => self.collect_text(*h, out),
            }
        }
    }

    fn class_list(&self, element: ElementHandle) -> Vec<String> {
        self.attribute(element, "class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

impl Page for MemoryPage {
    fn element_by_id(&self, id: &str) -> Option<ElementHandle> {
        self.subtree(self.root)
            .into_iter()
            .find(|h| self.attribute(*h, "id").as_deref() == Some(id))
    }

    fn is_attached(&self, element: ElementHandle) -> bool {
        let mut current = element;
        loop {
            if current == self.root {
                return true;
            }
            match self.node(current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn closest_with_attribute(
        &self,
        element: ElementHandle,
        attribute: &str,
    ) -> Option<ElementHandle> {
        let mut current = Some(element);
        while let Some(h) = current {
            if h != self.root && self.attribute(h, attribute).is_some() {
                return Some(h);
            }
            current = self.node(h).and_then(|n| n.parent);
        }
        None
    }

    fn find_by_class(&self, root: ElementHandle, class: &str) -> Option<ElementHandle> {
        self.subtree(root)
            .into_iter()
            .find(|h| self.has_class(*h, class))
    }

    fn find_by_tag(&self, root: ElementHandle, tag: &str) -> Option<ElementHandle> {
        self.subtree(root)
            .into_iter()
            .find(|h| self.tag(*h).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
    }

    fn elements_with_attribute(&self, attribute: &str) -> Vec<ElementHandle> {
        self.subtree(self.root)
            .into_iter()
            .filter(|h| self.attribute(*h, attribute).is_some())
            .collect()
    }

    fn attribute(&self, element: ElementHandle, name: &str) -> Option<String> {
        self.node(element)?
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&mut self, element: ElementHandle, name: &str, value: &str) {
        let Some(node) = self.node_mut(element) else { return };
        match node.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => node
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    fn has_class(&self, element: ElementHandle, class: &str) -> bool {
        self.class_list(element).iter().any(|c| c == class)
    }

    fn add_class(&mut self, element: ElementHandle, class: &str) {
        if self.node(element).is_none() || self.has_class(element, class) {
            return;
        }
        let mut classes = self.class_list(element);
        classes.push(class.to_string());
        self.set_attribute(element, "class", &classes.join(" "));
    }

    fn remove_class(&mut self, element: ElementHandle, class: &str) {
        if !self.has_class(element, class) {
            return;
        }
        let classes: Vec<String> = self
            .class_list(element)
            .into_iter()
            .filter(|c| c != class)
            .collect();
        self.set_attribute(element, "class", &classes.join(" "));
    }

    fn text(&self, element: ElementHandle) -> String {
        let mut out = String::new();
        self.collect_text(element, &mut out);
        out
    }

    fn set_text(&mut self, element: ElementHandle, text: &str) {
        if self.node(element).is_none() {
            return;
        }
        self.free_children(element);
        if let Some(node) = self.node_mut(element) {
            node.children = vec![Child::Text(text.to_string())];
        }
    }

    fn value(&self, element: ElementHandle) -> Option<String> {
        self.node(element)?;
        Some(self.attribute(element, "value").unwrap_or_default())
    }

    fn set_value(&mut self, element: ElementHandle, value: &str) {
        self.set_attribute(element, "value", value);
    }

    fn scroll_height(&self, element: ElementHandle) -> u32 {
        self.text(element).lines().count() as u32
    }

    fn scroll_top(&self, element: ElementHandle) -> u32 {
        self.node(element).map(|n| n.scroll_top).unwrap_or(0)
    }

    fn set_scroll_top(&mut self, element: ElementHandle, offset: u32) {
        let max = self
            .scroll_height(element)
            .saturating_sub(self.viewport_lines);
        if let Some(node) = self.node_mut(element) {
            node.scroll_top = offset.min(max);
        }
    }

    fn clear_children(&mut self, element: ElementHandle) {
        self.free_children(element);
    }

    fn swap(
        &mut self,
        target: ElementHandle,
        style: SwapStyle,
        source: &str,
    ) -> Result<Vec<ElementHandle>> {
        if !self.is_attached(target) {
            return Err(ConsoleError::SwapError(format!(
                "target {} is not attached",
                target
            )));
        }
        let fragment = markup::parse(source)?;

        match style {
            SwapStyle::Inner => {
                self.free_children(target);
                let children = self.build(target, fragment);
                if let Some(node) = self.node_mut(target) {
                    node.children = children;
                }
                Ok(vec![target])
            }
            SwapStyle::Outer => {
                let parent = self
                    .node(target)
                    .and_then(|n| n.parent)
                    .ok_or_else(|| {
                        ConsoleError::SwapError("cannot replace the document root".to_string())
                    })?;
                let position = self
                    .node(parent)
                    .and_then(|p| {
                        p.children
                            .iter()
                            .position(|c| matches!(c, Child::Element(h) if *h == target))
                    })
                    .ok_or_else(|| {
                        ConsoleError::SwapError(format!("target {} lost its parent", target))
                    })?;

                // the old subtree goes first so the new one can take its slots
                self.free(target);
                let replacement = self.build(parent, fragment);
                let roots = replacement
                    .iter()
                    .filter_map(|c| match c {
                        Child::Element(h) => Some(*h),
                        Child::Text(_) => None,
                    })
                    .collect();
                if let Some(node) = self.node_mut(parent) {
                    node.children.splice(position..=position, replacement);
                }
                Ok(roots)
            }
        }
    }
}
