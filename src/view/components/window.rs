use super::compose_frame;
use crate::error::UiError;
use crate::geometry::{Point, Rect, Size};
use crate::style::{HorizontalAlignment, VerticalAlignment};
use crate::view::base_component::{ContentControl, ControlBehavior, ElementBase};
use crate::view::{CanvasPanel, Control, ElementId, UiTree};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WindowState {
    #[default]
    Normal,
    Maximized,
}

/// Geometry restored when a maximized window returns to normal.
#[derive(Clone, Copy, Debug, PartialEq)]
struct RestoreSnapshot {
    position: Point,
    width: Option<f32>,
    height: Option<f32>,
    horizontal: HorizontalAlignment,
    vertical: VerticalAlignment,
}

/// Parts composed into a window by [`UiTree::create_window`]. Every part is
/// optional.
#[derive(Clone, Copy, Debug)]
pub struct WindowParts {
    /// Frame of the window. Its band doubles as the resize grip.
    pub border: Option<ElementId>,
    /// Docked on top. Doubles as the drag handle and maximize toggle.
    pub title: Option<ElementId>,
    pub content: Option<ElementId>,
    pub position: Point,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub draggable: bool,
    pub resizable: bool,
    pub clickable: bool,
}

impl Default for WindowParts {
    fn default() -> Self {
        Self {
            border: None,
            title: None,
            content: None,
            position: Point::ZERO,
            width: None,
            height: None,
            draggable: true,
            resizable: true,
            clickable: true,
        }
    }
}

/// Top-level element positioned by the engine at its own X/Y.
#[derive(Clone, Debug)]
pub struct Window {
    pub(crate) frame: ContentControl,
    pub(crate) border: Option<ElementId>,
    pub(crate) title: Option<ElementId>,
    pub(crate) content: Option<ElementId>,
    pub(crate) position: Point,
    pub(crate) state: WindowState,
    restore: Option<RestoreSnapshot>,
    pub draggable: bool,
    pub resizable: bool,
    pub clickable: bool,
}

impl Window {
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn title(&self) -> Option<ElementId> {
        self.title
    }

    pub fn border(&self) -> Option<ElementId> {
        self.border
    }

    pub fn content(&self) -> Option<ElementId> {
        self.content
    }
}

impl ControlBehavior for Window {
    fn visual_children(&self) -> Vec<ElementId> {
        self.frame.children()
    }

    fn measure(tree: &mut UiTree, id: ElementId, available: Size) -> Size {
        let frame = tree.control::<Window>(id).and_then(|window| window.frame.content());
        ContentControl::measure(tree, frame, available)
    }

    fn arrange(tree: &mut UiTree, id: ElementId, size: Size) -> Size {
        let frame = tree.control::<Window>(id).and_then(|window| window.frame.content());
        ContentControl::arrange(tree, frame, Rect::from_origin_size(Point::ZERO, size));
        size
    }
}

impl UiTree {
    /// Builds a window around `parts`. The title becomes the drag handle and
    /// the border the resize grip of the new window.
    pub fn create_window(&mut self, parts: WindowParts) -> Result<ElementId, UiError> {
        let frame = compose_frame(self, parts.border, parts.title, parts.content)?;
        let base = ElementBase {
            width: parts.width,
            height: parts.height,
            horizontal_alignment: HorizontalAlignment::Left,
            vertical_alignment: VerticalAlignment::Top,
            ..ElementBase::default()
        };
        let window = Window {
            frame: ContentControl::new(Some(frame)),
            border: parts.border,
            title: parts.title,
            content: parts.content,
            position: parts.position,
            state: WindowState::Normal,
            restore: None,
            draggable: parts.draggable,
            resizable: parts.resizable,
            clickable: parts.clickable,
        };
        let id = self.insert_with(Control::Window(window), base);
        self.link_parent(id, frame);

        if let Some(title) = parts.title {
            self.set_drag_target(title, Some(id))?;
            self.on_click(title, move |tree, _| tree.title_clicked(id));
        }
        if let Some(border) = parts.border {
            self.set_resize_target(border, Some(id))?;
        }
        debug!(?id, position = ?parts.position, "created window");
        Ok(id)
    }

    pub fn window_position(&self, id: ElementId) -> Option<Point> {
        self.control::<Window>(id).map(Window::position)
    }

    pub fn set_window_position(&mut self, id: ElementId, position: Point) -> Result<(), UiError> {
        self.expect_control_mut::<Window>(id)?.position = position;
        self.invalidate_arrange(id);
        Ok(())
    }

    /// Position plus explicit size, falling back to the render size on auto
    /// axes.
    pub fn window_rect(&self, id: ElementId) -> Option<Rect> {
        let window = self.control::<Window>(id)?;
        let base = self.element(id)?;
        let render = base.render_size();
        Some(Rect::new(
            window.position.x,
            window.position.y,
            base.width.unwrap_or(render.width),
            base.height.unwrap_or(render.height),
        ))
    }

    /// Applies `rect` unless it has a non-positive size or a negative origin.
    /// Returns whether the rectangle was applied.
    pub fn set_window_rect(&mut self, id: ElementId, rect: Rect) -> Result<bool, UiError> {
        let window = self.expect_control_mut::<Window>(id)?;
        if rect.width <= 0.0 || rect.height <= 0.0 || rect.x < 0.0 || rect.y < 0.0 {
            debug!(?id, ?rect, "rejected window rect");
            return Ok(false);
        }
        window.position = rect.origin();
        self.edit(id, |base| {
            base.width = Some(rect.width);
            base.height = Some(rect.height);
        })?;
        Ok(true)
    }

    pub fn window_state(&self, id: ElementId) -> Option<WindowState> {
        self.control::<Window>(id).map(Window::state)
    }

    pub fn set_window_state(&mut self, id: ElementId, state: WindowState) -> Result<(), UiError> {
        let current = self.expect_control::<Window>(id)?.state;
        if current == state {
            return Ok(());
        }
        match state {
            WindowState::Maximized => {
                let base = self.element(id).ok_or(UiError::UnknownElement(id))?;
                let window = self.expect_control::<Window>(id)?;
                let snapshot = RestoreSnapshot {
                    position: window.position,
                    width: base.width,
                    height: base.height,
                    horizontal: base.horizontal_alignment,
                    vertical: base.vertical_alignment,
                };
                let window = self.expect_control_mut::<Window>(id)?;
                window.restore = Some(snapshot);
                window.position = Point::ZERO;
                window.state = WindowState::Maximized;
                self.edit(id, |base| {
                    base.width = None;
                    base.height = None;
                    base.set_alignment(HorizontalAlignment::Stretch, VerticalAlignment::Stretch);
                })?;
            }
            WindowState::Normal => {
                let window = self.expect_control_mut::<Window>(id)?;
                window.state = WindowState::Normal;
                if let Some(snapshot) = window.restore.take() {
                    window.position = snapshot.position;
                    self.edit(id, |base| {
                        base.width = snapshot.width;
                        base.height = snapshot.height;
                        base.set_alignment(snapshot.horizontal, snapshot.vertical);
                    })?;
                }
            }
        }
        debug!(?id, ?state, "window state changed");
        Ok(())
    }

    pub fn set_window_flags(
        &mut self,
        id: ElementId,
        draggable: bool,
        resizable: bool,
        clickable: bool,
    ) -> Result<(), UiError> {
        let window = self.expect_control_mut::<Window>(id)?;
        window.draggable = draggable;
        window.resizable = resizable;
        window.clickable = clickable;
        Ok(())
    }

    /// Title click: a maximized window restores, a normal one maximizes only
    /// when both of its dimensions are explicit.
    fn title_clicked(&mut self, id: ElementId) {
        let Some(window) = self.control::<Window>(id) else {
            return;
        };
        if !window.clickable {
            return;
        }
        let next = match window.state {
            WindowState::Maximized => WindowState::Normal,
            WindowState::Normal => {
                let sized = self
                    .element(id)
                    .is_some_and(|base| base.width.is_some() && base.height.is_some());
                if !sized {
                    return;
                }
                WindowState::Maximized
            }
        };
        if let Err(err) = self.set_window_state(id, next) {
            debug!(?id, ?next, %err, "window state change failed");
        }
    }

    /// Element moved by a drag whose capability sits on `target`: a
    /// draggable window or a canvas child.
    pub fn drag_position(&self, target: ElementId) -> Option<Point> {
        if let Some(window) = self.control::<Window>(target) {
            return window.draggable.then_some(window.position);
        }
        let canvas = self.parent(target)?;
        self.canvas_position(canvas, target)
    }

    pub fn set_drag_position(&mut self, target: ElementId, position: Point) -> Result<(), UiError> {
        if self.control::<Window>(target).is_some() {
            return self.set_window_position(target, position);
        }
        let canvas = self.parent(target).ok_or(UiError::UnknownElement(target))?;
        self.expect_control::<CanvasPanel>(canvas)?;
        self.set_canvas_position(canvas, target, position)
    }

    /// Resizable rectangle of `target`. Only normal, resizable windows have
    /// one.
    pub fn resize_rect(&self, target: ElementId) -> Option<Rect> {
        let window = self.control::<Window>(target)?;
        if !window.resizable || window.state == WindowState::Maximized {
            return None;
        }
        self.window_rect(target)
    }

    pub fn set_resize_rect(&mut self, target: ElementId, rect: Rect) -> Result<bool, UiError> {
        self.set_window_rect(target, rect)
    }
}

#[cfg(test)]
mod tests {
    use super::{WindowParts, WindowState};
    use crate::error::UiError;
    use crate::geometry::{Point, Rect, Size, Thickness};
    use crate::style::{Color, HorizontalAlignment};
    use crate::view::render_backend::MonospaceText;
    use crate::view::{Border, BoxControl, ElementId, Label, Panel, ResizeEdges, UiTree};
    use std::rc::Rc;

    fn sized_window(tree: &mut UiTree) -> (ElementId, ElementId) {
        let title = tree.insert(Label::new("title"));
        let border = tree.insert(Border::new(Thickness::uniform(4.0), Color::BLACK));
        let content = tree.insert(BoxControl::default());
        let window = tree
            .create_window(WindowParts {
                border: Some(border),
                title: Some(title),
                content: Some(content),
                position: Point::new(20.0, 30.0),
                width: Some(200.0),
                height: Some(100.0),
                ..WindowParts::default()
            })
            .unwrap();
        (window, title)
    }

    #[test]
    fn window_composes_title_on_top_of_content() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::new(8.0, 16.0)));
        let (window, title) = sized_window(&mut tree);
        tree.measure(window, Size::new(800.0, 600.0));
        tree.arrange(window, Rect::new(20.0, 30.0, 780.0, 570.0));
        tree.resolve_positions(window, Point::ZERO);

        assert_eq!(tree.render_size(window), Size::new(200.0, 100.0));
        assert_eq!(tree.element(title).unwrap().draw_position(), Point::new(24.0, 34.0));
        assert_eq!(tree.find_element(window, Point::new(30.0, 40.0)), Some(title));
        assert_eq!(
            tree.resize_edges(window, Point::new(218.0, 128.0)),
            ResizeEdges::WIDTH | ResizeEdges::HEIGHT
        );
        assert_eq!(tree.element(title).unwrap().drag_target(), Some(window));
    }

    #[test]
    fn maximize_snapshots_and_restores_geometry() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::default()));
        let (window, title) = sized_window(&mut tree);

        assert!(tree.dispatch_click(title, Point::ZERO));
        assert_eq!(tree.window_state(window), Some(WindowState::Maximized));
        let base = tree.element(window).unwrap();
        assert_eq!(base.width, None);
        assert_eq!(base.horizontal_alignment, HorizontalAlignment::Stretch);
        assert_eq!(tree.window_position(window), Some(Point::ZERO));

        assert!(tree.dispatch_click(title, Point::ZERO));
        assert_eq!(tree.window_state(window), Some(WindowState::Normal));
        let base = tree.element(window).unwrap();
        assert_eq!((base.width, base.height), (Some(200.0), Some(100.0)));
        assert_eq!(base.horizontal_alignment, HorizontalAlignment::Left);
        assert_eq!(tree.window_position(window), Some(Point::new(20.0, 30.0)));
    }

    #[test]
    fn auto_sized_window_is_never_click_maximized() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::default()));
        let title = tree.insert(Label::new("auto"));
        let window = tree
            .create_window(WindowParts {
                title: Some(title),
                width: Some(120.0),
                ..WindowParts::default()
            })
            .unwrap();
        tree.dispatch_click(title, Point::ZERO);
        assert_eq!(tree.window_state(window), Some(WindowState::Normal));
    }

    #[test]
    fn window_rect_rejects_degenerate_candidates() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::default()));
        let (window, _) = sized_window(&mut tree);
        let before = tree.window_rect(window);

        assert_eq!(tree.set_window_rect(window, Rect::new(10.0, 10.0, 0.0, 50.0)), Ok(false));
        assert_eq!(tree.set_window_rect(window, Rect::new(-1.0, 10.0, 50.0, 50.0)), Ok(false));
        assert_eq!(tree.window_rect(window), before);

        assert_eq!(tree.set_window_rect(window, Rect::new(5.0, 6.0, 70.0, 80.0)), Ok(true));
        assert_eq!(tree.window_rect(window), Some(Rect::new(5.0, 6.0, 70.0, 80.0)));
    }

    #[test]
    fn windows_cannot_be_nested() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::default()));
        let (window, _) = sized_window(&mut tree);
        let panel = tree.insert(Panel::default());
        assert_eq!(
            tree.set_content(panel, Some(window)),
            Err(UiError::NestedWindow(window))
        );
    }
}
