use crate::error::UiError;
use crate::geometry::{Rect, Size};
use crate::style::Color;
use crate::view::base_component::ControlBehavior;
use crate::view::render_backend::RenderSurface;
use crate::view::{ElementId, UiTree};

/// Leaf that fills its render box. Its desired size comes only from the
/// explicit or minimum size of its element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxControl {
    pub fill: Color,
}

impl Default for BoxControl {
    fn default() -> Self {
        Self { fill: Color::WHITE }
    }
}

impl BoxControl {
    pub fn new(fill: Color) -> Self {
        Self { fill }
    }
}

impl ControlBehavior for BoxControl {
    fn visual_children(&self) -> Vec<ElementId> {
        Vec::new()
    }

    fn measure(_tree: &mut UiTree, _id: ElementId, _available: Size) -> Size {
        Size::ZERO
    }

    fn arrange(_tree: &mut UiTree, _id: ElementId, size: Size) -> Size {
        size
    }

    fn paint(&self, tree: &UiTree, id: ElementId, surface: &mut dyn RenderSurface, _clip: Rect) {
        if self.fill.is_transparent() {
            return;
        }
        if let Some(base) = tree.element(id) {
            surface.draw_filled_rect(base.bounds(), self.fill);
        }
    }
}

impl UiTree {
    pub fn set_box_fill(&mut self, id: ElementId, fill: Color) -> Result<(), UiError> {
        self.expect_control_mut::<BoxControl>(id)?.fill = fill;
        Ok(())
    }
}
