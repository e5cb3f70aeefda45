use super::compose_frame;
use crate::error::UiError;
use crate::geometry::{Point, Rect, Size};
use crate::style::Visibility;
use crate::view::base_component::{ContentControl, ControlBehavior};
use crate::view::{ElementId, UiTree};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default)]
pub struct ExpandableParts {
    pub border: Option<ElementId>,
    /// Clicking the title toggles the panel.
    pub title: Option<ElementId>,
    pub content: Option<ElementId>,
    pub expanded: bool,
}

/// Title over collapsible content. Collapsing only changes the content's
/// visibility, so the content keeps its slot in the frame at zero size.
#[derive(Clone, Copy, Debug)]
pub struct ExpandablePanel {
    pub(crate) frame: ContentControl,
    title: Option<ElementId>,
    content: Option<ElementId>,
    expanded: bool,
}

impl ExpandablePanel {
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn title(&self) -> Option<ElementId> {
        self.title
    }

    pub fn content(&self) -> Option<ElementId> {
        self.content
    }
}

impl ControlBehavior for ExpandablePanel {
    fn visual_children(&self) -> Vec<ElementId> {
        self.frame.children()
    }

    fn measure(tree: &mut UiTree, id: ElementId, available: Size) -> Size {
        let frame = tree
            .control::<ExpandablePanel>(id)
            .and_then(|panel| panel.frame.content());
        ContentControl::measure(tree, frame, available)
    }

    fn arrange(tree: &mut UiTree, id: ElementId, size: Size) -> Size {
        let frame = tree
            .control::<ExpandablePanel>(id)
            .and_then(|panel| panel.frame.content());
        ContentControl::arrange(tree, frame, Rect::from_origin_size(Point::ZERO, size));
        size
    }
}

impl UiTree {
    pub fn create_expandable(&mut self, parts: ExpandableParts) -> Result<ElementId, UiError> {
        let frame = compose_frame(self, parts.border, parts.title, parts.content)?;
        let id = self.insert(ExpandablePanel {
            frame: ContentControl::new(Some(frame)),
            title: parts.title,
            content: parts.content,
            expanded: parts.expanded,
        });
        self.link_parent(id, frame);

        if let Some(content) = parts.content {
            let visibility = if parts.expanded {
                Visibility::Visible
            } else {
                Visibility::Collapsed
            };
            self.set_visibility(content, visibility)?;
        }
        if let Some(title) = parts.title {
            self.on_click(title, move |tree, _| {
                if let Err(err) = tree.toggle_expanded(id) {
                    debug!(?id, %err, "expandable toggle failed");
                }
            });
        }
        Ok(id)
    }

    pub fn is_expanded(&self, id: ElementId) -> Option<bool> {
        self.control::<ExpandablePanel>(id)
            .map(ExpandablePanel::is_expanded)
    }

    pub fn set_expanded(&mut self, id: ElementId, expanded: bool) -> Result<(), UiError> {
        let panel = self.expect_control_mut::<ExpandablePanel>(id)?;
        if panel.expanded == expanded {
            return Ok(());
        }
        panel.expanded = expanded;
        let content = panel.content;
        if let Some(content) = content {
            let visibility = if expanded {
                Visibility::Visible
            } else {
                Visibility::Collapsed
            };
            self.set_visibility(content, visibility)?;
        }
        self.invalidate_measure(id);
        debug!(?id, expanded, "expandable toggled");
        Ok(())
    }

    pub fn toggle_expanded(&mut self, id: ElementId) -> Result<bool, UiError> {
        let expanded = !self.expect_control::<ExpandablePanel>(id)?.expanded;
        self.set_expanded(id, expanded)?;
        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::ExpandableParts;
    use crate::geometry::{Point, Rect, Size};
    use crate::view::render_backend::MonospaceText;
    use crate::view::{BoxControl, Label, UiTree};
    use std::rc::Rc;

    #[test]
    fn title_click_toggles_content() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::new(8.0, 16.0)));
        let title = tree.insert(Label::new("more"));
        let content = tree.insert(BoxControl::default());
        tree.set_min_size(content, Size::new(40.0, 60.0)).unwrap();
        let panel = tree
            .create_expandable(ExpandableParts {
                title: Some(title),
                content: Some(content),
                ..ExpandableParts::default()
            })
            .unwrap();

        let slot = Size::new(300.0, 300.0);
        tree.measure(panel, slot);
        assert_eq!(tree.is_expanded(panel), Some(false));
        assert_eq!(tree.desired_size(panel), Size::new(32.0, 16.0));

        assert!(tree.dispatch_click(title, Point::ZERO));
        assert_eq!(tree.is_expanded(panel), Some(true));
        assert!(!tree.element(panel).unwrap().is_measure_valid());
        tree.measure(panel, slot);
        assert_eq!(tree.desired_size(panel), Size::new(40.0, 76.0));

        tree.set_expanded(panel, false).unwrap();
        tree.measure(panel, slot);
        tree.arrange(panel, Rect::from_origin_size(Point::ZERO, slot));
        tree.resolve_positions(panel, Point::ZERO);
        assert_eq!(tree.render_size(content), Size::ZERO);
        assert_ne!(tree.find_element(panel, Point::new(5.0, 50.0)), Some(content));
    }
}
