//! Pointer interaction state machine: focus on press, click on release, and
//! drag or resize once the press moves far enough.
//!
//! Each state has its own transition function. They only talk to the outside
//! world through [`PointerHost`], so the machine runs without a tree or a
//! render surface.

use crate::geometry::{Point, Rect};
use crate::ui::PointerSample;
use crate::view::{ElementId, ResizeEdges, UiTree};
use glam::Vec2;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSnapshot {
    pub target: ElementId,
    /// Position of the target when the press started.
    pub start: Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeSnapshot {
    pub target: ElementId,
    /// Rectangle of the target when the press started.
    pub start: Rect,
    /// Edges under the press origin.
    pub edges: ResizeEdges,
}

/// Element under the press plus the capabilities found on its ancestor
/// chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureSnapshot {
    pub element: ElementId,
    pub drag: Option<DragSnapshot>,
    pub resize: Option<ResizeSnapshot>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PointerState {
    #[default]
    Idle,
    Pressed {
        origin: Point,
        pressed: Option<CaptureSnapshot>,
    },
    Dragging {
        origin: Point,
        drag: DragSnapshot,
    },
    Resizing {
        origin: Point,
        resize: ResizeSnapshot,
    },
}

impl PointerState {
    /// Target currently holding drag or resize capture.
    pub fn captured(&self) -> Option<ElementId> {
        match self {
            PointerState::Dragging { drag, .. } => Some(drag.target),
            PointerState::Resizing { resize, .. } => Some(resize.target),
            _ => None,
        }
    }

    pub fn pressed_element(&self) -> Option<ElementId> {
        match self {
            PointerState::Pressed { pressed, .. } => pressed.map(|capture| capture.element),
            _ => None,
        }
    }
}

/// What the state machine needs from the engine.
pub trait PointerHost {
    /// Hit-test of the topmost window only.
    fn hit_topmost(&self, point: Point) -> Option<ElementId>;
    /// Brings the window under `point` to the front when the hit element is
    /// clickable.
    fn focus_at(&mut self, point: Point);
    fn capture(&self, element: ElementId, origin: Point) -> CaptureSnapshot;
    fn set_hovered(&mut self, element: Option<ElementId>);
    fn set_drag_position(&mut self, target: ElementId, position: Point);
    fn set_resize_rect(&mut self, target: ElementId, rect: Rect);
    fn click(&mut self, element: ElementId, position: Point);
}

pub fn idle<H: PointerHost>(host: &mut H, sample: PointerSample) -> PointerState {
    if !sample.primary_down() {
        let hovered = host.hit_topmost(sample.position);
        host.set_hovered(hovered);
        return PointerState::Idle;
    }

    let origin = sample.position;
    host.focus_at(origin);
    let pressed = host
        .hit_topmost(origin)
        .map(|element| host.capture(element, origin));
    host.set_hovered(pressed.map(|capture| capture.element));
    debug!(?origin, pressed = ?pressed.map(|capture| capture.element), "pointer pressed");
    PointerState::Pressed { origin, pressed }
}

pub fn pressed<H: PointerHost>(
    host: &mut H,
    origin: Point,
    pressed: Option<CaptureSnapshot>,
    sample: PointerSample,
    threshold: f32,
) -> PointerState {
    if !sample.primary_down() {
        if let Some(capture) = pressed {
            host.click(capture.element, origin);
        }
        return PointerState::Idle;
    }

    let delta = sample.position.to_vec2() - origin.to_vec2();
    let beyond = delta.abs().cmpgt(Vec2::splat(threshold)).any();
    let Some(capture) = pressed.filter(|_| beyond) else {
        return PointerState::Pressed { origin, pressed };
    };

    if let Some(drag) = capture.drag {
        debug!(target = ?drag.target, "drag started");
        return dragging(host, origin, drag, sample);
    }
    if let Some(resize) = capture.resize {
        debug!(target = ?resize.target, edges = ?resize.edges, "resize started");
        return resizing(host, origin, resize, sample);
    }
    PointerState::Pressed { origin, pressed }
}

pub fn dragging<H: PointerHost>(
    host: &mut H,
    origin: Point,
    drag: DragSnapshot,
    sample: PointerSample,
) -> PointerState {
    if !sample.primary_down() {
        debug!(target = ?drag.target, "drag released");
        return PointerState::Idle;
    }
    let delta = sample.position.to_vec2() - origin.to_vec2();
    host.set_drag_position(drag.target, Point::from(drag.start.to_vec2() + delta));
    PointerState::Dragging { origin, drag }
}

pub fn resizing<H: PointerHost>(
    host: &mut H,
    origin: Point,
    resize: ResizeSnapshot,
    sample: PointerSample,
) -> PointerState {
    if !sample.primary_down() {
        debug!(target = ?resize.target, "resize released");
        return PointerState::Idle;
    }
    let delta = sample.position.to_vec2() - origin.to_vec2();
    host.set_resize_rect(resize.target, resize_candidate(resize.start, resize.edges, delta));
    PointerState::Resizing { origin, resize }
}

/// Left/top edges move the origin and shrink the opposite dimension, the
/// right/bottom edges only change their dimension.
pub fn resize_candidate(start: Rect, edges: ResizeEdges, delta: Vec2) -> Rect {
    let mut rect = start;
    if edges.contains(ResizeEdges::LEFT) {
        rect.x += delta.x;
        rect.width -= delta.x;
    }
    if edges.contains(ResizeEdges::TOP) {
        rect.y += delta.y;
        rect.height -= delta.y;
    }
    if edges.contains(ResizeEdges::WIDTH) {
        rect.width += delta.x;
    }
    if edges.contains(ResizeEdges::HEIGHT) {
        rect.height += delta.y;
    }
    rect
}

/// Drag and resize capabilities reachable from `element`, looked up on the
/// element and then on each ancestor.
pub fn capture_snapshot(tree: &UiTree, element: ElementId, origin: Point) -> CaptureSnapshot {
    let drag = tree.ancestors(element).find_map(|id| {
        let target = tree.element(id)?.drag_target()?;
        let start = tree.drag_position(target)?;
        Some(DragSnapshot { target, start })
    });
    let resize = tree.ancestors(element).find_map(|id| {
        let target = tree.element(id)?.resize_target()?;
        let start = tree.resize_rect(target)?;
        let edges = tree.resize_edges(target, origin);
        (!edges.is_empty()).then_some(ResizeSnapshot {
            target,
            start,
            edges,
        })
    });
    CaptureSnapshot {
        element,
        drag,
        resize,
    }
}

/// Current state plus the drag threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerMachine {
    state: PointerState,
    threshold: f32,
}

impl Default for PointerMachine {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl PointerMachine {
    pub fn new(threshold: f32) -> Self {
        Self {
            state: PointerState::Idle,
            threshold,
        }
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn step<H: PointerHost>(&mut self, host: &mut H, sample: PointerSample) {
        let next = match self.state {
            PointerState::Idle => idle(host, sample),
            PointerState::Pressed { origin, pressed: capture } => {
                pressed(host, origin, capture, sample, self.threshold)
            }
            PointerState::Dragging { origin, drag } => dragging(host, origin, drag, sample),
            PointerState::Resizing { origin, resize } => resizing(host, origin, resize, sample),
        };
        if std::mem::discriminant(&next) != std::mem::discriminant(&self.state) {
            debug!(from = ?self.state, to = ?next, "pointer state");
        }
        self.state = next;
    }

    /// Drops any press or capture and returns to idle.
    pub fn release(&mut self) {
        self.state = PointerState::Idle;
    }
}
