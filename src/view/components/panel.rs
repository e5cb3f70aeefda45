use crate::geometry::{Point, Rect, Size};
use crate::view::base_component::{ContentControl, ControlBehavior};
use crate::view::{ElementId, UiTree};

/// Background plus one content element. Install the content with
/// [`UiTree::set_content`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Panel {
    pub(crate) content: ContentControl,
}

impl ControlBehavior for Panel {
    fn visual_children(&self) -> Vec<ElementId> {
        self.content.children()
    }

    fn detach_child(&mut self, child: ElementId) -> bool {
        self.content.detach(child)
    }

    fn measure(tree: &mut UiTree, id: ElementId, available: Size) -> Size {
        let content = tree.control::<Panel>(id).and_then(|panel| panel.content.content());
        ContentControl::measure(tree, content, available)
    }

    fn arrange(tree: &mut UiTree, id: ElementId, size: Size) -> Size {
        let content = tree.control::<Panel>(id).and_then(|panel| panel.content.content());
        ContentControl::arrange(tree, content, Rect::from_origin_size(Point::ZERO, size));
        size
    }
}
