use super::{
    ClickHandler, Control, ControlKind, ControlVariant, ElementBase, ElementId, UpdateHandler,
};
use crate::error::UiError;
use crate::geometry::{Size, Thickness};
use crate::style::{Color, HorizontalAlignment, VerticalAlignment, Visibility};
use crate::view::components::{Border, Panel};
use crate::view::render_backend::TextMeasure;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use std::any::Any;
use std::rc::Rc;
use tracing::trace;

pub(crate) struct Node {
    pub base: ElementBase,
    pub control: Control,
}

/// Arena owning every element. Parent links are plain ids and are only
/// followed upwards for invalidation and click bubbling.
pub struct UiTree {
    pub(crate) nodes: SlotMap<ElementId, Node>,
    pub(crate) click_handlers: FxHashMap<ElementId, Vec<ClickHandler>>,
    pub(crate) update_handlers: FxHashMap<ElementId, Vec<UpdateHandler>>,
    text: Rc<dyn TextMeasure>,
}

impl UiTree {
    pub fn new(text: Rc<dyn TextMeasure>) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            click_handlers: FxHashMap::default(),
            update_handlers: FxHashMap::default(),
            text,
        }
    }

    pub fn text_measure(&self) -> &dyn TextMeasure {
        self.text.as_ref()
    }

    pub fn insert(&mut self, control: impl Into<Control>) -> ElementId {
        self.insert_with(control.into(), ElementBase::default())
    }

    pub(crate) fn insert_with(&mut self, control: Control, base: ElementBase) -> ElementId {
        let kind = control.kind();
        let id = self.nodes.insert(Node { base, control });
        trace!(?id, kind = kind.name(), "inserted element");
        id
    }

    /// Removes the element and everything it owns. The element is detached
    /// from its parent first.
    pub fn remove(&mut self, id: ElementId) -> Result<(), UiError> {
        if !self.nodes.contains_key(id) {
            return Err(UiError::UnknownElement(id));
        }
        self.release_tab_page(id);
        self.detach(id);
        self.remove_subtree(id);
        Ok(())
    }

    fn remove_subtree(&mut self, id: ElementId) {
        let Some(node) = self.nodes.remove(id) else {
            return;
        };
        self.click_handlers.remove(&id);
        self.update_handlers.remove(&id);
        for child in node.control.owned_children() {
            self.remove_subtree(child);
        }
        trace!(?id, "removed element");
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn element(&self, id: ElementId) -> Option<&ElementBase> {
        self.nodes.get(id).map(|node| &node.base)
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> Option<&mut ElementBase> {
        self.nodes.get_mut(id).map(|node| &mut node.base)
    }

    pub fn control_kind(&self, id: ElementId) -> Option<ControlKind> {
        self.nodes.get(id).map(|node| node.control.kind())
    }

    pub fn control<T: ControlVariant>(&self, id: ElementId) -> Option<&T> {
        self.nodes
            .get(id)
            .and_then(|node| T::from_control(&node.control))
    }

    pub(crate) fn control_mut<T: ControlVariant>(&mut self, id: ElementId) -> Option<&mut T> {
        self.nodes
            .get_mut(id)
            .and_then(|node| T::from_control_mut(&mut node.control))
    }

    /// Like [`UiTree::control`] but reports why the lookup failed.
    pub(crate) fn expect_control<T: ControlVariant>(&self, id: ElementId) -> Result<&T, UiError> {
        let node = self.nodes.get(id).ok_or(UiError::UnknownElement(id))?;
        T::from_control(&node.control).ok_or(UiError::WrongControl {
            id,
            expected: T::NAME,
        })
    }

    pub(crate) fn expect_control_mut<T: ControlVariant>(
        &mut self,
        id: ElementId,
    ) -> Result<&mut T, UiError> {
        let node = self.nodes.get_mut(id).ok_or(UiError::UnknownElement(id))?;
        T::from_control_mut(&mut node.control).ok_or(UiError::WrongControl {
            id,
            expected: T::NAME,
        })
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|node| node.base.parent)
    }

    /// The element itself followed by each of its ancestors.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(
            self.nodes.contains_key(id).then_some(id),
            move |&current| self.parent(current),
        )
    }

    pub fn root_of(&self, id: ElementId) -> Option<ElementId> {
        self.ancestors(id).last()
    }

    pub fn desired_size(&self, id: ElementId) -> Size {
        self.element(id)
            .map(ElementBase::desired_size)
            .unwrap_or(Size::ZERO)
    }

    pub fn render_size(&self, id: ElementId) -> Size {
        self.element(id)
            .map(ElementBase::render_size)
            .unwrap_or(Size::ZERO)
    }

    /// Mutates layout inputs and invalidates measure afterwards.
    pub fn edit<R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut ElementBase) -> R,
    ) -> Result<R, UiError> {
        let base = self.element_mut(id).ok_or(UiError::UnknownElement(id))?;
        let result = f(base);
        self.invalidate_measure(id);
        Ok(result)
    }

    pub fn set_margin(&mut self, id: ElementId, margin: Thickness) -> Result<(), UiError> {
        self.edit(id, |base| base.margin = margin)
    }

    pub fn set_width(&mut self, id: ElementId, width: Option<f32>) -> Result<(), UiError> {
        self.edit(id, |base| base.width = width)
    }

    pub fn set_height(&mut self, id: ElementId, height: Option<f32>) -> Result<(), UiError> {
        self.edit(id, |base| base.height = height)
    }

    pub fn set_min_size(&mut self, id: ElementId, min: Size) -> Result<(), UiError> {
        self.edit(id, |base| {
            base.min_width = min.width;
            base.min_height = min.height;
        })
    }

    pub fn set_max_size(&mut self, id: ElementId, max: Size) -> Result<(), UiError> {
        self.edit(id, |base| {
            base.max_width = max.width;
            base.max_height = max.height;
        })
    }

    pub fn set_alignment(
        &mut self,
        id: ElementId,
        horizontal: HorizontalAlignment,
        vertical: VerticalAlignment,
    ) -> Result<(), UiError> {
        self.edit(id, |base| base.set_alignment(horizontal, vertical))
    }

    pub fn set_visibility(&mut self, id: ElementId, visibility: Visibility) -> Result<(), UiError> {
        let base = self.element_mut(id).ok_or(UiError::UnknownElement(id))?;
        if base.visibility == visibility {
            return Ok(());
        }
        base.visibility = visibility;
        self.invalidate_measure(id);
        Ok(())
    }

    /// Background is paint-only and does not touch layout.
    pub fn set_background(&mut self, id: ElementId, color: Color) -> Result<(), UiError> {
        let base = self.element_mut(id).ok_or(UiError::UnknownElement(id))?;
        base.background = color;
        Ok(())
    }

    pub fn set_tag(&mut self, id: ElementId, tag: Option<Box<dyn Any>>) -> Result<(), UiError> {
        let base = self.element_mut(id).ok_or(UiError::UnknownElement(id))?;
        base.tag = tag;
        Ok(())
    }

    /// Pressing and moving `handle` drags `target` (a window or a canvas child).
    pub fn set_drag_target(
        &mut self,
        handle: ElementId,
        target: Option<ElementId>,
    ) -> Result<(), UiError> {
        if let Some(target) = target.filter(|target| !self.contains(*target)) {
            return Err(UiError::UnknownElement(target));
        }
        let base = self.element_mut(handle).ok_or(UiError::UnknownElement(handle))?;
        base.drag_target = target;
        Ok(())
    }

    /// Pressing `handle` near one of `target`'s resize edges resizes it.
    pub fn set_resize_target(
        &mut self,
        handle: ElementId,
        target: Option<ElementId>,
    ) -> Result<(), UiError> {
        if let Some(target) = target.filter(|target| !self.contains(*target)) {
            return Err(UiError::UnknownElement(target));
        }
        let base = self.element_mut(handle).ok_or(UiError::UnknownElement(handle))?;
        base.resize_target = target;
        Ok(())
    }

    /// Installs (or clears) the single child of a [`Panel`] or [`Border`].
    /// A previous child is detached but stays in the arena.
    pub fn set_content(&mut self, id: ElementId, content: Option<ElementId>) -> Result<(), UiError> {
        let node = self.nodes.get(id).ok_or(UiError::UnknownElement(id))?;
        if !matches!(node.control.kind(), ControlKind::Panel | ControlKind::Border) {
            return Err(UiError::WrongControl {
                id,
                expected: "content control",
            });
        }
        if let Some(child) = content {
            self.check_attachable(id, child)?;
        }

        let previous = match &mut self.nodes[id].control {
            Control::Panel(panel) => panel.content.replace(content),
            Control::Border(border) => border.content.replace(content),
            _ => None,
        };
        if let Some(previous) = previous {
            if let Some(old) = self.element_mut(previous) {
                old.parent = None;
            }
        }
        if let Some(child) = content {
            self.link_parent(id, child);
        }
        self.invalidate_measure(id);
        Ok(())
    }

    pub fn content(&self, id: ElementId) -> Option<ElementId> {
        if let Some(panel) = self.control::<Panel>(id) {
            return panel.content.content();
        }
        self.control::<Border>(id)
            .and_then(|border| border.content.content())
    }

    /// Validates that `child` may be placed under `parent`.
    pub(crate) fn check_attachable(&self, parent: ElementId, child: ElementId) -> Result<(), UiError> {
        if !self.contains(parent) {
            return Err(UiError::UnknownElement(parent));
        }
        let node = self.nodes.get(child).ok_or(UiError::UnknownElement(child))?;
        if node.control.kind() == ControlKind::Window {
            return Err(UiError::NestedWindow(child));
        }
        if node.base.parent.is_some() {
            return Err(UiError::AlreadyParented(child));
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(UiError::Cycle { parent, child });
        }
        Ok(())
    }

    /// Installs the back-reference and invalidates the new parent.
    pub(crate) fn link_parent(&mut self, parent: ElementId, child: ElementId) {
        if let Some(base) = self.element_mut(child) {
            base.parent = Some(parent);
        }
        self.invalidate_measure(parent);
        trace!(?parent, ?child, "attached element");
    }

    /// Removes `child` from its parent's control and clears the back-reference.
    pub(crate) fn detach(&mut self, child: ElementId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.control.detach_child(child);
        }
        if let Some(base) = self.element_mut(child) {
            base.parent = None;
        }
        self.invalidate_measure(parent);
        trace!(?parent, ?child, "detached element");
    }
}

#[cfg(test)]
mod tests {
    use crate::error::UiError;
    use crate::view::render_backend::MonospaceText;
    use crate::view::{BoxControl, Panel, UiTree};
    use std::rc::Rc;

    #[test]
    fn content_rejects_cycles_and_second_parents() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::default()));
        let outer = tree.insert(Panel::default());
        let inner = tree.insert(Panel::default());
        tree.set_content(outer, Some(inner)).unwrap();

        assert_eq!(
            tree.set_content(inner, Some(outer)),
            Err(UiError::Cycle {
                parent: inner,
                child: outer
            })
        );
        let other = tree.insert(Panel::default());
        assert_eq!(
            tree.set_content(other, Some(inner)),
            Err(UiError::AlreadyParented(inner))
        );
        let leaf = tree.insert(BoxControl::default());
        assert!(matches!(
            tree.set_content(leaf, Some(other)),
            Err(UiError::WrongControl { .. })
        ));
    }

    #[test]
    fn removing_an_element_drops_its_subtree() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::default()));
        let outer = tree.insert(Panel::default());
        let inner = tree.insert(Panel::default());
        let leaf = tree.insert(BoxControl::default());
        tree.set_content(inner, Some(leaf)).unwrap();
        tree.set_content(outer, Some(inner)).unwrap();

        tree.remove(inner).unwrap();
        assert!(!tree.contains(inner));
        assert!(!tree.contains(leaf));
        assert_eq!(tree.content(outer), None);
        assert_eq!(tree.remove(inner), Err(UiError::UnknownElement(inner)));
    }

    #[test]
    fn replacing_content_releases_previous_child() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::default()));
        let panel = tree.insert(Panel::default());
        let first = tree.insert(BoxControl::default());
        let second = tree.insert(BoxControl::default());
        tree.set_content(panel, Some(first)).unwrap();
        tree.set_content(panel, Some(second)).unwrap();
        assert_eq!(tree.parent(first), None);
        assert_eq!(tree.parent(second), Some(panel));
        assert_eq!(tree.root_of(second), Some(panel));
    }
}
