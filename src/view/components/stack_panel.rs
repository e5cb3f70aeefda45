use crate::error::UiError;
use crate::geometry::{Point, Rect, Size};
use crate::style::Orientation;
use crate::view::base_component::{ChildDescriptor, ContainerControl, ControlBehavior};
use crate::view::{DockPanel, ElementId, UiTree};

#[derive(Clone, Copy, Debug)]
pub struct StackChild {
    pub element: ElementId,
    /// Origin assigned by the last arrange, local to the panel.
    pub(crate) position: Point,
}

impl ChildDescriptor for StackChild {
    fn element(&self) -> ElementId {
        self.element
    }
}

/// Lays children out one after another along its orientation.
///
/// Children are placed at their desired length even when the panel runs out
/// of room, so the last ones may overflow the panel.
#[derive(Clone, Debug, Default)]
pub struct StackPanel {
    pub(crate) children: ContainerControl<StackChild>,
    pub(crate) orientation: Orientation,
}

impl StackPanel {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            ..Self::default()
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn children(&self) -> &ContainerControl<StackChild> {
        &self.children
    }
}

fn along(orientation: Orientation, size: Size) -> f32 {
    match orientation {
        Orientation::Vertical => size.height,
        Orientation::Horizontal => size.width,
    }
}

fn across(orientation: Orientation, size: Size) -> f32 {
    match orientation {
        Orientation::Vertical => size.width,
        Orientation::Horizontal => size.height,
    }
}

fn compose(orientation: Orientation, along: f32, across: f32) -> Size {
    match orientation {
        Orientation::Vertical => Size::new(across, along),
        Orientation::Horizontal => Size::new(along, across),
    }
}

impl ControlBehavior for StackPanel {
    fn visual_children(&self) -> Vec<ElementId> {
        self.children.element_ids()
    }

    fn detach_child(&mut self, child: ElementId) -> bool {
        self.children.remove(child).is_some()
    }

    fn measure(tree: &mut UiTree, id: ElementId, available: Size) -> Size {
        let Some(panel) = tree.control::<StackPanel>(id) else {
            return Size::ZERO;
        };
        let orientation = panel.orientation;
        let children = panel.children.element_ids();

        let mut accumulated = 0.0_f32;
        let mut cross = 0.0_f32;
        for child in children {
            let budget = compose(
                orientation,
                (along(orientation, available) - accumulated).max(0.0),
                across(orientation, available),
            );
            tree.measure(child, budget);
            let desired = tree.desired_size(child);
            accumulated += along(orientation, desired);
            cross = cross.max(across(orientation, desired));
        }
        compose(orientation, accumulated, cross)
    }

    fn arrange(tree: &mut UiTree, id: ElementId, size: Size) -> Size {
        let Some(panel) = tree.control::<StackPanel>(id) else {
            return size;
        };
        let orientation = panel.orientation;
        let children = panel.children.element_ids();

        let mut accumulated = 0.0_f32;
        for child in children {
            let desired = tree.desired_size(child);
            let length = along(orientation, desired);
            // wide children keep their desired cross size and overflow
            let cross = across(orientation, size).max(across(orientation, desired));
            let origin = match orientation {
                Orientation::Vertical => Point::new(0.0, accumulated),
                Orientation::Horizontal => Point::new(accumulated, 0.0),
            };
            tree.arrange(
                child,
                Rect::from_origin_size(origin, compose(orientation, length, cross)),
            );
            if let Some(entry) = tree
                .control_mut::<StackPanel>(id)
                .and_then(|panel| panel.children.find_mut(child))
            {
                entry.position = origin;
            }
            accumulated += length;
        }
        size
    }
}

impl UiTree {
    pub fn stack_push(&mut self, panel: ElementId, child: ElementId) -> Result<(), UiError> {
        self.expect_control::<StackPanel>(panel)?;
        self.check_attachable(panel, child)?;
        self.expect_control_mut::<StackPanel>(panel)?
            .children
            .push(StackChild {
                element: child,
                position: Point::ZERO,
            });
        self.link_parent(panel, child);
        Ok(())
    }

    pub fn set_orientation(
        &mut self,
        panel: ElementId,
        orientation: Orientation,
    ) -> Result<(), UiError> {
        self.expect_control_mut::<StackPanel>(panel)?.orientation = orientation;
        self.invalidate_measure(panel);
        Ok(())
    }

    /// Position of `child` inside its stack or dock panel after the last
    /// arrange.
    pub fn container_position(&self, panel: ElementId, child: ElementId) -> Option<Point> {
        if let Some(stack) = self.control::<StackPanel>(panel) {
            return stack.children.find(child).map(|entry| entry.position);
        }
        self.control::<DockPanel>(panel)
            .and_then(|dock| dock.children.find(child))
            .map(|entry| entry.position)
    }
}
