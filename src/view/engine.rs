use crate::config::{DisplayMode, EngineConfig};
use crate::error::UiError;
use crate::geometry::{Point, Rect, Size};
use crate::ui::{FrameInput, PointerSample, ResizeEvent};
use crate::view::pointer::{capture_snapshot, CaptureSnapshot, PointerHost, PointerMachine, PointerState};
use crate::view::render_backend::{RenderSurface, TextMeasure};
use crate::view::{ElementId, UiTree, Window};
use glam::Vec2;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Maps window coordinates to adapter coordinates:
/// `adapter = (window - offset) * scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerTransform {
    pub offset: Vec2,
    pub scale: Vec2,
}

impl Default for PointerTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }
}

impl PointerTransform {
    pub fn apply(&self, point: Point) -> Point {
        Point::from((point.to_vec2() - self.offset) * self.scale)
    }
}

pub type ResizeObserver = Box<dyn FnMut(&ResizeEvent)>;

/// Owns the element tree and the z-ordered top-level windows, and drives
/// update, layout and draw once per frame.
pub struct Engine {
    tree: UiTree,
    /// Bottom to top.
    windows: Vec<ElementId>,
    pointer: PointerMachine,
    hovered: Option<ElementId>,
    display_mode: DisplayMode,
    window_size: Size,
    resolution: Size,
    display_size: Size,
    adapter_size: Size,
    transform: PointerTransform,
    resize_observers: Vec<ResizeObserver>,
}

impl Engine {
    pub fn new(config: EngineConfig, text: Rc<dyn TextMeasure>) -> Self {
        let display = &config.display;
        let mut engine = Self {
            tree: UiTree::new(text),
            windows: Vec::new(),
            pointer: PointerMachine::new(config.pointer.drag_threshold),
            hovered: None,
            display_mode: display.mode,
            window_size: display.window_size(),
            resolution: display.resolution(),
            display_size: display.display_size(),
            adapter_size: Size::ZERO,
            transform: PointerTransform::default(),
            resize_observers: Vec::new(),
        };
        engine.recompute_display();
        engine
    }

    pub fn tree(&self) -> &UiTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut UiTree {
        &mut self.tree
    }

    /// Window ids from bottom to top.
    pub fn windows(&self) -> &[ElementId] {
        &self.windows
    }

    pub fn topmost(&self) -> Option<ElementId> {
        self.windows.last().copied()
    }

    pub fn hovered_element(&self) -> Option<ElementId> {
        self.hovered
    }

    pub fn pointer_state(&self) -> &PointerState {
        self.pointer.state()
    }

    /// Puts `window` on top of the z-order.
    pub fn add_window(&mut self, window: ElementId) -> Result<(), UiError> {
        self.tree.expect_control::<Window>(window)?;
        if self.windows.contains(&window) {
            return Err(UiError::DuplicateWindow(window));
        }
        self.windows.push(window);
        self.tree.invalidate_measure(window);
        debug!(?window, count = self.windows.len(), "window added");
        Ok(())
    }

    /// Takes `window` out of the z-order, keeping its elements alive. Any
    /// press, drag or resize inside it is dropped.
    pub fn remove_window(&mut self, window: ElementId) -> Result<(), UiError> {
        let index = self
            .windows
            .iter()
            .position(|&id| id == window)
            .ok_or(UiError::UnknownElement(window))?;
        self.windows.remove(index);

        let state = self.pointer.state();
        let involved = [state.captured(), state.pressed_element()]
            .into_iter()
            .flatten()
            .any(|id| self.tree.root_of(id) == Some(window) || id == window);
        if involved {
            self.pointer.release();
            debug!(?window, "pointer capture released");
        }
        if self
            .hovered
            .is_some_and(|id| self.tree.root_of(id) == Some(window))
        {
            self.hovered = None;
        }
        debug!(?window, count = self.windows.len(), "window removed");
        Ok(())
    }

    /// Removes the window from the z-order and drops its whole sub-tree.
    pub fn destroy_window(&mut self, window: ElementId) -> Result<(), UiError> {
        self.remove_window(window)?;
        self.tree.remove(window)
    }

    /// Runs the pointer machine on the sample, then every window's update
    /// callbacks.
    pub fn update(&mut self, input: &FrameInput) {
        let sample = PointerSample {
            position: self.transform.apply(input.pointer.position),
            buttons: input.pointer.buttons,
        };
        let mut host = EngineHost {
            tree: &mut self.tree,
            windows: &mut self.windows,
            hovered: &mut self.hovered,
        };
        self.pointer.step(&mut host, sample);

        for window in self.windows.clone() {
            self.tree.update(window, input.delta);
        }
    }

    /// Measures every window against the adapter and arranges it at its own
    /// position. Draw positions are resolved afterwards so hit-testing works
    /// before the first draw.
    pub fn layout(&mut self) {
        let adapter = self.adapter_size;
        for &window in &self.windows {
            let Some(position) = self.tree.window_position(window) else {
                continue;
            };
            self.tree.measure(window, adapter);
            let slot = Rect::new(
                position.x,
                position.y,
                (adapter.width - position.x).max(0.0),
                (adapter.height - position.y).max(0.0),
            );
            self.tree.arrange(window, slot);
            self.tree.resolve_positions(window, Point::ZERO);
        }
    }

    /// Draws windows bottom to top, clipped to the adapter.
    pub fn draw(&mut self, surface: &mut dyn RenderSurface) {
        let clip = Rect::from_origin_size(Point::ZERO, self.adapter_size);
        for &window in &self.windows {
            self.tree.draw(window, surface, Point::ZERO, clip);
        }
    }

    pub fn frame(&mut self, input: &FrameInput, surface: &mut dyn RenderSurface) {
        self.update(input);
        self.layout();
        self.draw(surface);
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        if self.display_mode == mode {
            return;
        }
        self.display_mode = mode;
        self.display_changed();
    }

    pub fn cycle_display_mode(&mut self) -> DisplayMode {
        self.set_display_mode(self.display_mode.next());
        self.display_mode
    }

    /// Host window resized.
    pub fn set_window_size(&mut self, size: Size) {
        if size == self.window_size {
            return;
        }
        self.window_size = size;
        self.display_changed();
    }

    /// Render resolution used by the keep-aspect and fullscreen modes.
    pub fn set_resolution(&mut self, size: Size) {
        if size == self.resolution {
            return;
        }
        self.resolution = size;
        self.display_changed();
    }

    pub fn adapter_size(&self) -> Size {
        self.adapter_size
    }

    pub fn window_size(&self) -> Size {
        self.window_size
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.adapter_size.height <= 0.0 {
            return 1.0;
        }
        self.adapter_size.width / self.adapter_size.height
    }

    pub fn pointer_transform(&self) -> PointerTransform {
        self.transform
    }

    pub fn on_resize<F>(&mut self, observer: F)
    where
        F: FnMut(&ResizeEvent) + 'static,
    {
        self.resize_observers.push(Box::new(observer));
    }

    fn display_changed(&mut self) {
        self.recompute_display();
        for &window in &self.windows {
            self.tree.invalidate_measure(window);
        }
        info!(
            mode = ?self.display_mode,
            adapter = ?self.adapter_size,
            window = ?self.window_size,
            "display changed"
        );
        let event = ResizeEvent {
            display_mode: self.display_mode,
            window_size: self.window_size,
            adapter_size: self.adapter_size,
        };
        for observer in self.resize_observers.iter_mut() {
            observer(&event);
        }
    }

    fn recompute_display(&mut self) {
        let window = Vec2::new(self.window_size.width, self.window_size.height);
        let resolution = Vec2::new(self.resolution.width, self.resolution.height);
        let display = Vec2::new(self.display_size.width, self.display_size.height);

        let (adapter, transform) = match self.display_mode {
            DisplayMode::Windowed => (window, PointerTransform::default()),
            DisplayMode::WindowedKeepAspect => {
                let fit = (window / resolution).min_element();
                let fitted = resolution * fit;
                let transform = PointerTransform {
                    offset: (window - fitted) * 0.5,
                    scale: resolution / fitted,
                };
                (resolution, transform)
            }
            DisplayMode::Fullscreen => (
                resolution,
                PointerTransform {
                    offset: Vec2::ZERO,
                    scale: resolution / display,
                },
            ),
        };
        if !transform.scale.is_finite() {
            warn!(mode = ?self.display_mode, "degenerate display size, using identity pointer transform");
            self.transform = PointerTransform::default();
        } else {
            self.transform = transform;
        }
        self.adapter_size = Size::new(adapter.x, adapter.y);
    }
}

/// Borrowed view of the engine handed to the pointer machine.
struct EngineHost<'a> {
    tree: &'a mut UiTree,
    windows: &'a mut Vec<ElementId>,
    hovered: &'a mut Option<ElementId>,
}

impl PointerHost for EngineHost<'_> {
    fn hit_topmost(&self, point: Point) -> Option<ElementId> {
        let top = *self.windows.last()?;
        self.tree.find_element(top, point)
    }

    /// Scans top to bottom for the first window whose hit element is
    /// clickable and raises it. Non-clickable hits do not stop the scan.
    fn focus_at(&mut self, point: Point) {
        let Some(index) = self.windows.iter().rposition(|&window| {
            self.tree
                .find_element(window, point)
                .is_some_and(|hit| self.tree.is_clickable(hit))
        }) else {
            return;
        };
        if index + 1 == self.windows.len() {
            return;
        }
        let window = self.windows.remove(index);
        self.windows.push(window);
        debug!(?window, "window focused");
    }

    fn capture(&self, element: ElementId, origin: Point) -> CaptureSnapshot {
        capture_snapshot(&*self.tree, element, origin)
    }

    fn set_hovered(&mut self, element: Option<ElementId>) {
        *self.hovered = element;
    }

    fn set_drag_position(&mut self, target: ElementId, position: Point) {
        if let Err(err) = self.tree.set_drag_position(target, position) {
            debug!(?target, %err, "drag target vanished");
        }
    }

    fn set_resize_rect(&mut self, target: ElementId, rect: Rect) {
        if let Err(err) = self.tree.set_resize_rect(target, rect) {
            debug!(?target, %err, "resize target vanished");
        }
    }

    fn click(&mut self, element: ElementId, position: Point) {
        self.tree.dispatch_click(element, position);
    }
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::config::{DisplayMode, EngineConfig};
    use crate::geometry::{Point, Rect, Size, Thickness};
    use crate::style::Color;
    use crate::ui::{FrameInput, PointerSample, ResizeEvent};
    use crate::view::pointer::PointerState;
    use crate::view::render_backend::{MonospaceText, RecordingSurface};
    use crate::view::{Border, BoxControl, ElementId, Label, WindowParts};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default(), Rc::new(MonospaceText::new(8.0, 16.0)))
    }

    fn input(x: f32, y: f32, down: bool) -> FrameInput {
        FrameInput::new(PointerSample::new(Point::new(x, y), down), Duration::from_millis(16))
    }

    /// Window with a 16px title, a 4px border and a 100x80 box of content.
    fn titled_window(engine: &mut Engine, position: Point) -> (ElementId, ElementId) {
        let tree = engine.tree_mut();
        let title = tree.insert(Label::new("window"));
        let border = tree.insert(Border::new(Thickness::uniform(4.0), Color::BLACK));
        let content = tree.insert(BoxControl::default());
        let window = tree
            .create_window(WindowParts {
                border: Some(border),
                title: Some(title),
                content: Some(content),
                position,
                width: Some(120.0),
                height: Some(100.0),
                ..WindowParts::default()
            })
            .unwrap();
        engine.add_window(window).unwrap();
        (window, title)
    }

    /// Window whose only clickable element is `button`.
    fn plain_window(engine: &mut Engine, position: Point) -> (ElementId, ElementId) {
        let tree = engine.tree_mut();
        let button = tree.insert(BoxControl::default());
        tree.on_click(button, |_, _| {});
        let window = tree
            .create_window(WindowParts {
                content: Some(button),
                position,
                width: Some(50.0),
                height: Some(50.0),
                ..WindowParts::default()
            })
            .unwrap();
        engine.add_window(window).unwrap();
        (window, button)
    }

    fn empty_window(engine: &mut Engine, position: Point) -> ElementId {
        let window = engine
            .tree_mut()
            .create_window(WindowParts {
                position,
                width: Some(80.0),
                height: Some(80.0),
                ..WindowParts::default()
            })
            .unwrap();
        engine.add_window(window).unwrap();
        window
    }

    fn run(engine: &mut Engine, frames: &[FrameInput]) {
        let mut surface = RecordingSurface::new(Rect::new(0.0, 0.0, 1280.0, 720.0));
        for frame in frames {
            engine.frame(frame, &mut surface);
        }
    }

    #[test]
    fn dragging_the_title_moves_the_window() {
        let mut engine = engine();
        let (window, _) = titled_window(&mut engine, Point::new(100.0, 100.0));
        engine.layout();

        run(
            &mut engine,
            &[input(110.0, 110.0, true), input(140.0, 105.0, true)],
        );
        assert!(matches!(engine.pointer_state(), PointerState::Dragging { .. }));
        assert_eq!(engine.tree().window_position(window), Some(Point::new(130.0, 95.0)));

        run(&mut engine, &[input(140.0, 105.0, false), input(300.0, 300.0, false)]);
        assert_eq!(engine.pointer_state(), &PointerState::Idle);
        assert_eq!(engine.tree().window_position(window), Some(Point::new(130.0, 95.0)));
        assert_eq!(
            engine.tree().element(window).unwrap().draw_position(),
            Point::new(130.0, 95.0)
        );
    }

    #[test]
    fn clicking_a_lower_window_brings_it_to_front() {
        let mut engine = engine();
        let (a, _) = plain_window(&mut engine, Point::new(0.0, 0.0));
        let (b, _) = plain_window(&mut engine, Point::new(200.0, 0.0));
        let (c, _) = plain_window(&mut engine, Point::new(400.0, 0.0));
        engine.layout();

        run(&mut engine, &[input(10.0, 10.0, true), input(10.0, 10.0, false)]);
        assert_eq!(engine.windows(), &[b, c, a]);
    }

    #[test]
    fn pressing_non_clickable_space_keeps_the_order() {
        let mut engine = engine();
        let (a, _) = plain_window(&mut engine, Point::new(0.0, 0.0));
        let b = empty_window(&mut engine, Point::new(200.0, 0.0));
        engine.layout();

        run(&mut engine, &[input(210.0, 10.0, true), input(210.0, 10.0, false)]);
        assert_eq!(engine.windows(), &[a, b]);
        let hovered = engine.hovered_element().unwrap();
        assert_eq!(engine.tree().root_of(hovered), Some(b));
        assert!(!engine.tree().is_clickable(hovered));
    }

    #[test]
    fn clickable_window_below_an_empty_one_is_raised() {
        let mut engine = engine();
        let (a, button) = plain_window(&mut engine, Point::new(0.0, 0.0));
        // b is empty and covers a's button
        let b = empty_window(&mut engine, Point::new(0.0, 0.0));
        engine.layout();

        run(&mut engine, &[input(10.0, 10.0, true)]);
        assert_eq!(engine.windows(), &[b, a]);
        assert_eq!(engine.pointer_state().pressed_element(), Some(button));
    }

    #[test]
    fn border_press_resizes_and_rejects_inverted_rects() {
        let mut engine = engine();
        let (window, _) = titled_window(&mut engine, Point::new(100.0, 100.0));
        engine.layout();

        // bottom-right corner of the 4px band
        run(&mut engine, &[input(218.0, 198.0, true), input(238.0, 218.0, true)]);
        assert!(matches!(engine.pointer_state(), PointerState::Resizing { .. }));
        assert_eq!(
            engine.tree().window_rect(window),
            Some(Rect::new(100.0, 100.0, 140.0, 120.0))
        );

        run(&mut engine, &[input(50.0, 50.0, true)]);
        assert_eq!(
            engine.tree().window_rect(window),
            Some(Rect::new(100.0, 100.0, 140.0, 120.0))
        );
        run(&mut engine, &[input(50.0, 50.0, false)]);
        assert_eq!(engine.pointer_state(), &PointerState::Idle);
    }

    #[test]
    fn removing_a_window_releases_capture() {
        let mut engine = engine();
        let (window, _) = titled_window(&mut engine, Point::new(100.0, 100.0));
        engine.layout();
        run(&mut engine, &[input(110.0, 110.0, true), input(140.0, 140.0, true)]);
        assert_eq!(engine.pointer_state().captured(), Some(window));

        engine.remove_window(window).unwrap();
        assert_eq!(engine.pointer_state(), &PointerState::Idle);
        assert!(engine.windows().is_empty());
        assert!(engine.tree().contains(window));
        assert!(engine.add_window(window).is_ok());
        assert!(engine.add_window(window).is_err());

        engine.destroy_window(window).unwrap();
        assert!(!engine.tree().contains(window));
    }

    #[test]
    fn display_modes_scale_the_pointer() {
        let mut config = EngineConfig::default();
        config.display.window_width = 1000.0;
        config.display.window_height = 1000.0;
        config.display.resolution_width = 500.0;
        config.display.resolution_height = 250.0;
        config.display.display_width = 2000.0;
        config.display.display_height = 1000.0;
        let mut engine = Engine::new(config, Rc::new(MonospaceText::default()));

        let events = Rc::new(RefCell::new(Vec::<ResizeEvent>::new()));
        let sink = events.clone();
        engine.on_resize(move |event| sink.borrow_mut().push(*event));

        assert_eq!(engine.adapter_size(), Size::new(1000.0, 1000.0));
        assert_eq!(engine.cycle_display_mode(), DisplayMode::WindowedKeepAspect);
        assert_eq!(engine.adapter_size(), Size::new(500.0, 250.0));
        assert_eq!(engine.aspect_ratio(), 2.0);
        // fitted 1000x500 centered vertically
        assert_eq!(
            engine.pointer_transform().apply(Point::new(500.0, 500.0)),
            Point::new(250.0, 125.0)
        );

        assert_eq!(engine.cycle_display_mode(), DisplayMode::Fullscreen);
        assert_eq!(
            engine.pointer_transform().apply(Point::new(1000.0, 500.0)),
            Point::new(250.0, 125.0)
        );
        assert_eq!(engine.cycle_display_mode(), DisplayMode::Windowed);
        assert_eq!(events.borrow().len(), 3);
        assert_eq!(events.borrow()[0].adapter_size, Size::new(500.0, 250.0));
    }

    #[test]
    fn update_reaches_every_window() {
        let mut engine = engine();
        let (a, _) = plain_window(&mut engine, Point::ZERO);
        let (b, _) = plain_window(&mut engine, Point::new(100.0, 0.0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        for window in [a, b] {
            let seen = seen.clone();
            engine
                .tree_mut()
                .on_update(window, move |_, id, delta| seen.borrow_mut().push((id, delta)));
        }
        engine.update(&input(500.0, 500.0, false));
        assert_eq!(
            *seen.borrow(),
            vec![(a, Duration::from_millis(16)), (b, Duration::from_millis(16))]
        );
        assert_eq!(engine.hovered_element(), None);
    }
}
