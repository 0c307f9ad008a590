//! Document - the persistent element collection.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult, Element, ElementId};

/// All elements of a drawing, indexed by ID.
///
/// Storage is shared copy-on-write, so cloning a document is O(1) and a
/// snapshot taken before an edit stays untouched by later writes. Every
/// mutating call bumps [`Document::version`] exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// All elements in the document, indexed by ID.
    elements: Arc<HashMap<ElementId, Element>>,
    /// Element IDs in insertion order.
    order: Arc<Vec<ElementId>>,
    /// Incremented on every mutation.
    version: u64,
}

impl Document {
    /// Create a new empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from a list of elements.
    #[must_use]
    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        let mut doc = Self::new();
        for element in elements {
            doc.add_element(element);
        }
        doc
    }

    /// Current mutation counter.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Add an element to the document.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = element.id;
        if Arc::make_mut(&mut self.elements).insert(id, element).is_none() {
            Arc::make_mut(&mut self.order).push(id);
        }
        self.version += 1;
        id
    }

    /// Remove an element from the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove_element(&mut self, id: &ElementId) -> CanvasResult<Element> {
        if !self.elements.contains_key(id) {
            return Err(CanvasError::ElementNotFound(id.to_string()));
        }
        Arc::make_mut(&mut self.order).retain(|eid| eid != id);
        let removed = Arc::make_mut(&mut self.elements)
            .remove(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?;
        self.version += 1;
        Ok(removed)
    }

    /// Replace existing elements wholesale in a single version step.
    ///
    /// IDs not present in the document are ignored; the number of replaced
    /// elements is returned.
    pub fn replace_elements(&mut self, updates: impl IntoIterator<Item = Element>) -> usize {
        let mut replaced = 0;
        let mut updates = updates.into_iter().peekable();
        if updates.peek().is_none() {
            return 0;
        }
        let elements = Arc::make_mut(&mut self.elements);
        for element in updates {
            if let Some(slot) = elements.get_mut(&element.id) {
                *slot = element;
                replaced += 1;
            }
        }
        if replaced > 0 {
            self.version += 1;
        }
        tracing::debug!(replaced, version = self.version, "elements replaced");
        replaced
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Whether the document contains the element.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// The element map.
    #[must_use]
    pub fn elements_by_id(&self) -> &HashMap<ElementId, Element> {
        &self.elements
    }

    /// Find the topmost (highest z-index) element containing the point.
    #[must_use]
    pub fn element_at(&self, point: crate::Point) -> Option<ElementId> {
        self.elements()
            .filter(|e| {
                let local = point.rotate_around(e.center(), -e.rotation);
                let b = e.bounds;
                local.x >= b.min_x && local.x <= b.max_x && local.y >= b.min_y && local.y <= b.max_y
            })
            .max_by_key(|e| e.z_index)
            .map(|e| e.id)
    }

    /// Get the number of elements in the document.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the document is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string(self).map_err(CanvasError::Serialization)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        serde_json::from_str(json).map_err(CanvasError::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, Point, Rect};

    fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Element {
        Element::new(ElementKind::Rectangle, Rect::new(min_x, min_y, max_x, max_y))
    }

    #[test]
    fn test_document_add_remove() {
        let mut doc = Document::new();
        assert!(doc.is_empty());

        let id = doc.add_element(rect(0.0, 0.0, 10.0, 10.0));
        assert_eq!(doc.element_count(), 1);
        assert!(doc.get_element(id).is_some());
        assert_eq!(doc.version(), 1);

        doc.remove_element(&id).expect("should remove");
        assert!(doc.is_empty());
        assert_eq!(doc.version(), 2);
        assert!(doc.remove_element(&id).is_err());
    }

    #[test]
    fn test_replace_is_one_version_step() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(20.0, 0.0, 30.0, 10.0);
        let mut doc = Document::from_elements([a.clone(), b.clone()]);
        let before = doc.version();

        let replaced = doc.replace_elements([a.translated(1.0, 0.0), b.translated(1.0, 0.0)]);
        assert_eq!(replaced, 2);
        assert_eq!(doc.version(), before + 1);
        assert_eq!(doc.get_element(a.id).map(|e| e.bounds.min_x), Some(1.0));
    }

    #[test]
    fn test_clone_is_isolated_from_writes() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let mut doc = Document::from_elements([a.clone()]);
        let snapshot = doc.clone();
        doc.replace_elements([a.translated(5.0, 5.0)]);
        assert_eq!(snapshot.get_element(a.id), Some(&a));
        assert_ne!(snapshot, doc);
    }

    #[test]
    fn test_element_at_respects_z_index() {
        let low = rect(0.0, 0.0, 100.0, 100.0);
        let high = rect(50.0, 50.0, 150.0, 150.0).with_z_index(2);
        let high_id = high.id;
        let doc = Document::from_elements([low, high]);

        assert_eq!(doc.element_at(Point::new(75.0, 75.0)), Some(high_id));
        assert!(doc.element_at(Point::new(500.0, 500.0)).is_none());
    }
}
