use crate::error::UiError;
use crate::geometry::{Point, Rect, Size};
use crate::style::Dock;
use crate::view::base_component::{ChildDescriptor, ContainerControl, ControlBehavior};
use crate::view::{ElementId, UiTree};

#[derive(Clone, Copy, Debug)]
pub struct DockChild {
    pub element: ElementId,
    pub dock: Dock,
    pub(crate) position: Point,
}

impl ChildDescriptor for DockChild {
    fn element(&self) -> ElementId {
        self.element
    }
}

/// Anchors children to its edges in insertion order. With `last_child_fill`
/// the final child takes whatever is left in the middle.
#[derive(Clone, Debug)]
pub struct DockPanel {
    pub(crate) children: ContainerControl<DockChild>,
    pub(crate) last_child_fill: bool,
}

impl Default for DockPanel {
    fn default() -> Self {
        Self {
            children: ContainerControl::default(),
            last_child_fill: true,
        }
    }
}

impl DockPanel {
    pub fn last_child_fill(&self) -> bool {
        self.last_child_fill
    }

    pub fn children(&self) -> &ContainerControl<DockChild> {
        &self.children
    }
}

impl ControlBehavior for DockPanel {
    fn visual_children(&self) -> Vec<ElementId> {
        self.children.element_ids()
    }

    fn detach_child(&mut self, child: ElementId) -> bool {
        self.children.remove(child).is_some()
    }

    fn measure(tree: &mut UiTree, id: ElementId, available: Size) -> Size {
        let Some(panel) = tree.control::<DockPanel>(id) else {
            return Size::ZERO;
        };
        let children: Vec<(ElementId, Dock)> = panel
            .children
            .iter()
            .map(|child| (child.element, child.dock))
            .collect();

        let mut used = Size::ZERO;
        let mut extent = Size::ZERO;
        for (child, dock) in children {
            let remaining = Size::new(
                (available.width - used.width).max(0.0),
                (available.height - used.height).max(0.0),
            );
            tree.measure(child, remaining);
            let desired = tree.desired_size(child);
            match dock {
                Dock::Left | Dock::Right => {
                    extent.height = extent.height.max(used.height + desired.height);
                    used.width += desired.width;
                }
                Dock::Top | Dock::Bottom => {
                    extent.width = extent.width.max(used.width + desired.width);
                    used.height += desired.height;
                }
            }
        }
        extent.max(used)
    }

    fn arrange(tree: &mut UiTree, id: ElementId, size: Size) -> Size {
        let Some(panel) = tree.control::<DockPanel>(id) else {
            return size;
        };
        let children: Vec<(ElementId, Dock)> = panel
            .children
            .iter()
            .map(|child| (child.element, child.dock))
            .collect();
        let fill_index = panel
            .last_child_fill
            .then(|| children.len().checked_sub(1))
            .flatten();

        let (mut left, mut top, mut right, mut bottom) = (0.0_f32, 0.0_f32, 0.0_f32, 0.0_f32);
        for (index, (child, dock)) in children.into_iter().enumerate() {
            let desired = tree.desired_size(child);
            let mut rect = Rect::new(
                left,
                top,
                (size.width - (left + right)).max(0.0),
                (size.height - (top + bottom)).max(0.0),
            );
            if fill_index != Some(index) {
                match dock {
                    Dock::Left => {
                        left += desired.width;
                        rect.width = desired.width;
                    }
                    Dock::Right => {
                        right += desired.width;
                        rect.x = (size.width - right).max(0.0);
                        rect.width = desired.width;
                    }
                    Dock::Top => {
                        top += desired.height;
                        rect.height = desired.height;
                    }
                    Dock::Bottom => {
                        bottom += desired.height;
                        rect.y = (size.height - bottom).max(0.0);
                        rect.height = desired.height;
                    }
                }
            }
            tree.arrange(child, rect);
            if let Some(entry) = tree
                .control_mut::<DockPanel>(id)
                .and_then(|panel| panel.children.find_mut(child))
            {
                entry.position = rect.origin();
            }
        }
        size
    }
}

impl UiTree {
    pub fn dock_push(&mut self, panel: ElementId, child: ElementId, dock: Dock) -> Result<(), UiError> {
        self.expect_control::<DockPanel>(panel)?;
        self.check_attachable(panel, child)?;
        self.expect_control_mut::<DockPanel>(panel)?
            .children
            .push(DockChild {
                element: child,
                dock,
                position: Point::ZERO,
            });
        self.link_parent(panel, child);
        Ok(())
    }

    pub fn set_dock(&mut self, panel: ElementId, child: ElementId, dock: Dock) -> Result<(), UiError> {
        let entry = self
            .expect_control_mut::<DockPanel>(panel)?
            .children
            .find_mut(child)
            .ok_or(UiError::UnknownElement(child))?;
        entry.dock = dock;
        self.invalidate_measure(panel);
        Ok(())
    }

    pub fn set_last_child_fill(&mut self, panel: ElementId, fill: bool) -> Result<(), UiError> {
        self.expect_control_mut::<DockPanel>(panel)?.last_child_fill = fill;
        self.invalidate_measure(panel);
        Ok(())
    }
}
