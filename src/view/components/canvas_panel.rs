use crate::error::UiError;
use crate::geometry::{Point, Rect, Size};
use crate::view::base_component::{ChildDescriptor, ContainerControl, ControlBehavior};
use crate::view::{ElementId, UiTree};

#[derive(Clone, Copy, Debug)]
pub struct CanvasChild {
    pub element: ElementId,
    pub position: Point,
}

impl ChildDescriptor for CanvasChild {
    fn element(&self) -> ElementId {
        self.element
    }
}

/// Places every child at its own position with its desired size.
#[derive(Clone, Debug, Default)]
pub struct CanvasPanel {
    pub(crate) children: ContainerControl<CanvasChild>,
}

impl CanvasPanel {
    pub fn children(&self) -> &ContainerControl<CanvasChild> {
        &self.children
    }
}

impl ControlBehavior for CanvasPanel {
    fn visual_children(&self) -> Vec<ElementId> {
        self.children.element_ids()
    }

    fn detach_child(&mut self, child: ElementId) -> bool {
        self.children.remove(child).is_some()
    }

    fn measure(tree: &mut UiTree, id: ElementId, _available: Size) -> Size {
        let Some(canvas) = tree.control::<CanvasPanel>(id) else {
            return Size::ZERO;
        };
        let children: Vec<CanvasChild> = canvas.children.iter().copied().collect();

        let mut extent = Size::ZERO;
        for child in children {
            tree.measure(child.element, Size::INFINITE);
            let desired = tree.desired_size(child.element);
            extent.width = extent.width.max(child.position.x + desired.width);
            extent.height = extent.height.max(child.position.y + desired.height);
        }
        extent
    }

    fn arrange(tree: &mut UiTree, id: ElementId, size: Size) -> Size {
        let Some(canvas) = tree.control::<CanvasPanel>(id) else {
            return size;
        };
        let children: Vec<CanvasChild> = canvas.children.iter().copied().collect();
        for child in children {
            let desired = tree.desired_size(child.element);
            tree.arrange(child.element, Rect::from_origin_size(child.position, desired));
        }
        size
    }
}

impl UiTree {
    pub fn canvas_push(
        &mut self,
        canvas: ElementId,
        child: ElementId,
        position: Point,
    ) -> Result<(), UiError> {
        self.expect_control::<CanvasPanel>(canvas)?;
        self.check_attachable(canvas, child)?;
        self.expect_control_mut::<CanvasPanel>(canvas)?
            .children
            .push(CanvasChild {
                element: child,
                position,
            });
        self.link_parent(canvas, child);
        Ok(())
    }

    pub fn canvas_position(&self, canvas: ElementId, child: ElementId) -> Option<Point> {
        self.control::<CanvasPanel>(canvas)
            .and_then(|canvas| canvas.children.find(child))
            .map(|entry| entry.position)
    }

    pub fn set_canvas_position(
        &mut self,
        canvas: ElementId,
        child: ElementId,
        position: Point,
    ) -> Result<(), UiError> {
        let entry = self
            .expect_control_mut::<CanvasPanel>(canvas)?
            .children
            .find_mut(child)
            .ok_or(UiError::UnknownElement(child))?;
        if entry.position == position {
            return Ok(());
        }
        entry.position = position;
        self.invalidate_measure(canvas);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CanvasPanel;
    use crate::geometry::{Point, Rect, Size};
    use crate::view::render_backend::MonospaceText;
    use crate::view::{BoxControl, UiTree};
    use std::rc::Rc;

    #[test]
    fn canvas_measures_bounding_box_and_keeps_positions() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::default()));
        let canvas = tree.insert(CanvasPanel::default());
        let a = tree.insert(BoxControl::default());
        tree.set_min_size(a, Size::new(10.0, 10.0)).unwrap();
        let b = tree.insert(BoxControl::default());
        tree.set_min_size(b, Size::new(20.0, 5.0)).unwrap();
        tree.canvas_push(canvas, a, Point::new(5.0, 40.0)).unwrap();
        tree.canvas_push(canvas, b, Point::new(30.0, 0.0)).unwrap();

        tree.measure(canvas, Size::new(200.0, 200.0));
        assert_eq!(tree.desired_size(canvas), Size::new(50.0, 50.0));
        tree.arrange(canvas, Rect::new(0.0, 0.0, 200.0, 200.0));
        assert_eq!(tree.element(a).unwrap().offset(), Point::new(5.0, 40.0));
        assert_eq!(tree.render_size(b), Size::new(20.0, 5.0));

        tree.set_canvas_position(canvas, a, Point::new(100.0, 100.0)).unwrap();
        tree.measure(canvas, Size::new(200.0, 200.0));
        tree.arrange(canvas, Rect::new(0.0, 0.0, 200.0, 200.0));
        assert_eq!(tree.element(a).unwrap().offset(), Point::new(100.0, 100.0));
        assert_eq!(tree.desired_size(canvas), Size::new(110.0, 110.0));
    }
}
