use crate::geometry::{Point, Rect, Size, Thickness};
use crate::style::{Color, HorizontalAlignment, VerticalAlignment, Visibility};
use std::any::Any;
use std::fmt;

slotmap::new_key_type! {
    /// Arena handle of an element inside a [`UiTree`](super::UiTree).
    pub struct ElementId;
}

/// Cached results of the measure and arrange passes.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LayoutState {
    pub measure_valid: bool,
    pub arrange_valid: bool,
    pub has_arranged: bool,
    pub desired_size: Size,
    pub unclipped_desired_size: Size,
    pub render_size: Size,
    pub offset: Point,
    pub draw_position: Point,
    pub previous_available: Option<Size>,
    pub previous_final: Option<Rect>,
    /// Client slot in the parent's coordinates, set when the ink box had to
    /// be clipped during arrange.
    pub layout_clip: Option<Rect>,
    pub invalidation_count: u64,
}

/// Layout inputs and outputs shared by every control.
///
/// Inputs are public; mutate them through [`UiTree::edit`](super::UiTree::edit)
/// or the dedicated setters so that measure gets invalidated.
pub struct ElementBase {
    pub(crate) parent: Option<ElementId>,
    pub margin: Thickness,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub min_width: f32,
    pub min_height: f32,
    pub max_width: f32,
    pub max_height: f32,
    pub horizontal_alignment: HorizontalAlignment,
    pub vertical_alignment: VerticalAlignment,
    pub visibility: Visibility,
    pub background: Color,
    pub(crate) tag: Option<Box<dyn Any>>,
    pub(crate) drag_target: Option<ElementId>,
    pub(crate) resize_target: Option<ElementId>,
    pub(crate) layout: LayoutState,
}

impl Default for ElementBase {
    fn default() -> Self {
        Self {
            parent: None,
            margin: Thickness::ZERO,
            width: None,
            height: None,
            min_width: 0.0,
            min_height: 0.0,
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
            horizontal_alignment: HorizontalAlignment::Stretch,
            vertical_alignment: VerticalAlignment::Stretch,
            visibility: Visibility::Visible,
            background: Color::TRANSPARENT,
            tag: None,
            drag_target: None,
            resize_target: None,
            layout: LayoutState::default(),
        }
    }
}

impl fmt::Debug for ElementBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBase")
            .field("parent", &self.parent)
            .field("margin", &self.margin)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("visibility", &self.visibility)
            .field("desired_size", &self.layout.desired_size)
            .field("render_size", &self.layout.render_size)
            .field("offset", &self.layout.offset)
            .finish_non_exhaustive()
    }
}

impl ElementBase {
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn desired_size(&self) -> Size {
        self.layout.desired_size
    }

    pub fn unclipped_desired_size(&self) -> Size {
        self.layout.unclipped_desired_size
    }

    pub fn render_size(&self) -> Size {
        self.layout.render_size
    }

    /// Position relative to the parent's render origin.
    pub fn offset(&self) -> Point {
        self.layout.offset
    }

    /// Absolute position, resolved after arrange or during draw.
    pub fn draw_position(&self) -> Point {
        self.layout.draw_position
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.layout.draw_position, self.layout.render_size)
    }

    pub fn is_measure_valid(&self) -> bool {
        self.layout.measure_valid
    }

    pub fn is_arrange_valid(&self) -> bool {
        self.layout.arrange_valid
    }

    /// Number of times measure invalidation actually ran for this element.
    pub fn invalidation_count(&self) -> u64 {
        self.layout.invalidation_count
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn drag_target(&self) -> Option<ElementId> {
        self.drag_target
    }

    pub fn resize_target(&self) -> Option<ElementId> {
        self.resize_target
    }

    pub fn tag(&self) -> Option<&dyn Any> {
        self.tag.as_deref()
    }

    pub fn set_alignment(
        &mut self,
        horizontal: HorizontalAlignment,
        vertical: VerticalAlignment,
    ) {
        self.horizontal_alignment = horizontal;
        self.vertical_alignment = vertical;
    }
}

/// Effective min/max per axis, with an explicit width/height acting as both
/// bounds on its axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MinMax {
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl MinMax {
    pub fn new(base: &ElementBase) -> Self {
        let (min_width, max_width) = axis_bounds(base.width, base.min_width, base.max_width);
        let (min_height, max_height) =
            axis_bounds(base.height, base.min_height, base.max_height);
        Self {
            min_width,
            max_width,
            min_height,
            max_height,
        }
    }

    pub fn min(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    pub fn max(&self) -> Size {
        Size::new(self.max_width, self.max_height)
    }

    pub fn clamp(&self, size: Size) -> Size {
        Size::new(
            size.width.clamp(self.min_width, self.max_width),
            size.height.clamp(self.min_height, self.max_height),
        )
    }
}

fn axis_bounds(explicit: Option<f32>, min: f32, max: f32) -> (f32, f32) {
    let min = if min.is_nan() { 0.0 } else { min.max(0.0) };
    let max = if max.is_nan() { f32::INFINITY } else { max };
    let upper = explicit.unwrap_or(f32::INFINITY).min(max).max(min);
    let lower = explicit.unwrap_or(0.0).min(upper).max(min);
    (lower, upper)
}
