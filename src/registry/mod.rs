//! Explicit ordered list of the page's editable caption fields.
//!
//! Traversal works against this list rather than re-querying the document,
//! so reordering the rendered rows (sort, filter) just means republishing
//! the order.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TraversalKey {
    Next,
    Prev,
}

/// Map a keydown to a traversal direction. Tab and ArrowDown move forward,
/// Shift+Tab and ArrowUp move back; everything else is left to the browser.
pub(crate) fn traversal_key(key: &str, shift: bool) -> Option<TraversalKey> {
    match key {
        "Tab" if shift => Some(TraversalKey::Prev),
        "Tab" => Some(TraversalKey::Next),
        "ArrowDown" => Some(TraversalKey::Next),
        "ArrowUp" => Some(TraversalKey::Prev),
        _ => None,
    }
}

/// Position of the adjacent field, or None at the sequence boundaries (no
/// wraparound).
pub(crate) fn adjacent_index(idx: usize, len: usize, key: TraversalKey) -> Option<usize> {
    match key {
        TraversalKey::Next => {
            let next = idx.checked_add(1)?;
            (next < len).then_some(next)
        }
        TraversalKey::Prev => idx.checked_sub(1),
    }
}

/// Registry handle provided via context by the library page. `RwSignal` is
/// `Copy`, so field components can capture the handle in event closures.
#[derive(Clone, Copy)]
pub(crate) struct FieldRegistry {
    order: RwSignal<Vec<String>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self {
            order: RwSignal::new(vec![]),
        }
    }

    /// Publish the record ids of editable fields in their rendered order.
    pub fn set_order(&self, ids: Vec<String>) {
        self.order.set(ids);
    }

    /// Record id of the field adjacent to `record_id`, in page order.
    pub fn adjacent_of(&self, record_id: &str, key: TraversalKey) -> Option<String> {
        let order = self.order.get_untracked();
        let idx = order.iter().position(|id| id == record_id)?;
        adjacent_index(idx, order.len(), key).map(|i| order[i].clone())
    }
}

/// Focus a field by its DOM id.
pub(crate) fn focus_element(dom_id: &str) {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(el) = doc.get_element_by_id(dom_id) {
        if let Ok(el) = el.dyn_into::<web_sys::HtmlElement>() {
            let _ = el.focus();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traversal_key_mapping() {
        assert_eq!(traversal_key("Tab", false), Some(TraversalKey::Next));
        assert_eq!(traversal_key("Tab", true), Some(TraversalKey::Prev));
        assert_eq!(traversal_key("ArrowDown", false), Some(TraversalKey::Next));
        assert_eq!(traversal_key("ArrowUp", false), Some(TraversalKey::Prev));
        // Shift doesn't change the arrows.
        assert_eq!(traversal_key("ArrowDown", true), Some(TraversalKey::Next));
        // Anything else stays with the browser.
        assert_eq!(traversal_key("Enter", false), None);
        assert_eq!(traversal_key("a", false), None);
    }

    #[test]
    fn test_adjacent_index_moves_without_wraparound() {
        // Scenario D: position 2 of 5 (index 1) moves down to index 2…
        assert_eq!(adjacent_index(1, 5, TraversalKey::Next), Some(2));
        // …and the last field is a no-op.
        assert_eq!(adjacent_index(4, 5, TraversalKey::Next), None);

        assert_eq!(adjacent_index(1, 5, TraversalKey::Prev), Some(0));
        assert_eq!(adjacent_index(0, 5, TraversalKey::Prev), None);
    }

    #[test]
    fn test_adjacent_index_single_field_never_moves() {
        assert_eq!(adjacent_index(0, 1, TraversalKey::Next), None);
        assert_eq!(adjacent_index(0, 1, TraversalKey::Prev), None);
    }
}
