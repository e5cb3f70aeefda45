use crate::error::UiError;
use crate::geometry::{Rect, Size};
use crate::style::Color;
use crate::view::base_component::ControlBehavior;
use crate::view::render_backend::RenderSurface;
use crate::view::{ElementId, UiTree};
use smol_str::SmolStr;

/// Single line of text sized by the tree's text measurer.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: SmolStr,
    pub color: Color,
}

impl Default for Label {
    fn default() -> Self {
        Self {
            text: SmolStr::default(),
            color: Color::BLACK,
        }
    }
}

impl Label {
    pub fn new(text: impl Into<SmolStr>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl ControlBehavior for Label {
    fn visual_children(&self) -> Vec<ElementId> {
        Vec::new()
    }

    fn measure(tree: &mut UiTree, id: ElementId, _available: Size) -> Size {
        match tree.control::<Label>(id) {
            Some(label) => tree.text_measure().measure(&label.text),
            None => Size::ZERO,
        }
    }

    fn arrange(_tree: &mut UiTree, _id: ElementId, size: Size) -> Size {
        size
    }

    fn paint(&self, tree: &UiTree, id: ElementId, surface: &mut dyn RenderSurface, _clip: Rect) {
        if self.text.is_empty() || self.color.is_transparent() {
            return;
        }
        if let Some(base) = tree.element(id) {
            surface.draw_text(&self.text, base.draw_position(), self.color);
        }
    }
}

impl UiTree {
    pub fn set_label_text(&mut self, id: ElementId, text: impl Into<SmolStr>) -> Result<(), UiError> {
        let text = text.into();
        let label = self.expect_control_mut::<Label>(id)?;
        if label.text == text {
            return Ok(());
        }
        label.text = text;
        self.invalidate_measure(id);
        Ok(())
    }

    pub fn set_label_color(&mut self, id: ElementId, color: Color) -> Result<(), UiError> {
        self.expect_control_mut::<Label>(id)?.color = color;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Label;
    use crate::geometry::{Point, Rect, Size};
    use crate::style::Color;
    use crate::view::render_backend::{DrawCommand, MonospaceText, RecordingSurface};
    use crate::view::UiTree;
    use std::rc::Rc;

    #[test]
    fn label_measures_through_text_measure() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::new(8.0, 16.0)));
        let label = tree.insert(Label::new("hello"));
        tree.measure(label, Size::new(200.0, 100.0));
        assert_eq!(tree.desired_size(label), Size::new(40.0, 16.0));

        tree.set_label_text(label, "hi").unwrap();
        assert!(!tree.element(label).unwrap().is_measure_valid());
        tree.measure(label, Size::new(200.0, 100.0));
        assert_eq!(tree.desired_size(label), Size::new(16.0, 16.0));
    }

    #[test]
    fn label_paints_text_at_draw_position() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::new(8.0, 16.0)));
        let label = tree.insert(Label::new("ok").with_color(Color::WHITE));
        tree.arrange(label, Rect::new(0.0, 0.0, 16.0, 16.0));

        let screen = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut surface = RecordingSurface::new(screen);
        tree.draw(label, &mut surface, Point::new(4.0, 6.0), screen);
        assert_eq!(
            surface.commands(),
            &[DrawCommand::Text {
                text: "ok".into(),
                position: Point::new(4.0, 6.0),
                color: Color::WHITE,
            }]
        );
    }
}
