use super::{ElementId, UiTree};
use crate::geometry::{Rect, Size};

/// Single-child slot shared by decorators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContentControl {
    content: Option<ElementId>,
}

impl ContentControl {
    pub fn new(content: Option<ElementId>) -> Self {
        Self { content }
    }

    pub fn content(&self) -> Option<ElementId> {
        self.content
    }

    pub(crate) fn replace(&mut self, content: Option<ElementId>) -> Option<ElementId> {
        std::mem::replace(&mut self.content, content)
    }

    pub(crate) fn children(&self) -> Vec<ElementId> {
        self.content.into_iter().collect()
    }

    pub(crate) fn detach(&mut self, child: ElementId) -> bool {
        if self.content == Some(child) {
            self.content = None;
            return true;
        }
        false
    }

    /// Measures the content, or reports zero when the slot is empty.
    pub(crate) fn measure(tree: &mut UiTree, content: Option<ElementId>, available: Size) -> Size {
        match content {
            Some(child) => {
                tree.measure(child, available);
                tree.desired_size(child)
            }
            None => Size::ZERO,
        }
    }

    pub(crate) fn arrange(tree: &mut UiTree, content: Option<ElementId>, slot: Rect) {
        if let Some(child) = content {
            tree.arrange(child, slot);
        }
    }
}

/// Per-container child record: the element plus whatever layout data the
/// container attaches to it.
pub trait ChildDescriptor {
    fn element(&self) -> ElementId;
}

/// Ordered multi-child fan-out used by the panels.
#[derive(Clone, Debug)]
pub struct ContainerControl<T> {
    children: Vec<T>,
}

impl<T> Default for ContainerControl<T> {
    fn default() -> Self {
        Self {
            children: Vec::new(),
        }
    }
}

impl<T: ChildDescriptor> ContainerControl<T> {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.children.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.children.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.children.get(index)
    }

    pub fn find(&self, element: ElementId) -> Option<&T> {
        self.children.iter().find(|child| child.element() == element)
    }

    pub(crate) fn find_mut(&mut self, element: ElementId) -> Option<&mut T> {
        self.children
            .iter_mut()
            .find(|child| child.element() == element)
    }

    pub fn position_of(&self, element: ElementId) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.element() == element)
    }

    pub(crate) fn push(&mut self, child: T) {
        self.children.push(child);
    }

    pub(crate) fn remove(&mut self, element: ElementId) -> Option<T> {
        let index = self.position_of(element)?;
        Some(self.children.remove(index))
    }

    pub fn element_ids(&self) -> Vec<ElementId> {
        self.children.iter().map(ChildDescriptor::element).collect()
    }
}
