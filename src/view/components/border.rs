use crate::error::UiError;
use crate::geometry::{Point, Rect, Size, Thickness};
use crate::style::Color;
use crate::view::base_component::{paint_children, ContentControl, ControlBehavior};
use crate::view::render_backend::RenderSurface;
use crate::view::{ElementId, UiTree, Window};
use bitflags::bitflags;

bitflags! {
    /// Edges a resize gesture moves. `WIDTH` is the right edge and `HEIGHT`
    /// the bottom edge.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ResizeEdges: u8 {
        const LEFT = 1 << 0;
        const TOP = 1 << 1;
        const WIDTH = 1 << 2;
        const HEIGHT = 1 << 3;
    }
}

/// Decorator drawing a band around its content.
#[derive(Clone, Copy, Debug, Default)]
pub struct Border {
    pub(crate) content: ContentControl,
    pub thickness: Thickness,
    pub border_color: Color,
    pub interior: Color,
}

impl Border {
    pub fn new(thickness: Thickness, border_color: Color) -> Self {
        Self {
            thickness,
            border_color,
            ..Self::default()
        }
    }

    pub fn with_interior(mut self, interior: Color) -> Self {
        self.interior = interior;
        self
    }

    /// Classifies `point` (absolute) against the border band of `bounds`.
    /// Points outside the element or inside the interior yield no edges.
    pub fn classify(&self, bounds: Rect, point: Point) -> ResizeEdges {
        let mut edges = ResizeEdges::empty();
        if !bounds.contains(point) {
            return edges;
        }
        let thickness = self.thickness;
        if thickness.left > 0.0 && point.x < bounds.x + thickness.left {
            edges |= ResizeEdges::LEFT;
        }
        if thickness.top > 0.0 && point.y < bounds.y + thickness.top {
            edges |= ResizeEdges::TOP;
        }
        if thickness.right > 0.0 && point.x >= bounds.right() - thickness.right {
            edges |= ResizeEdges::WIDTH;
        }
        if thickness.bottom > 0.0 && point.y >= bounds.bottom() - thickness.bottom {
            edges |= ResizeEdges::HEIGHT;
        }
        edges
    }

    fn sides(&self, bounds: Rect) -> [(f32, Rect); 4] {
        let t = self.thickness;
        let inner_height = (bounds.height - t.height()).max(0.0);
        [
            (t.top, Rect::new(bounds.x, bounds.y, bounds.width, t.top)),
            (
                t.bottom,
                Rect::new(bounds.x, bounds.bottom() - t.bottom, bounds.width, t.bottom),
            ),
            (
                t.left,
                Rect::new(bounds.x, bounds.y + t.top, t.left, inner_height),
            ),
            (
                t.right,
                Rect::new(bounds.right() - t.right, bounds.y + t.top, t.right, inner_height),
            ),
        ]
    }
}

impl ControlBehavior for Border {
    fn visual_children(&self) -> Vec<ElementId> {
        self.content.children()
    }

    fn detach_child(&mut self, child: ElementId) -> bool {
        self.content.detach(child)
    }

    fn measure(tree: &mut UiTree, id: ElementId, available: Size) -> Size {
        let Some(border) = tree.control::<Border>(id) else {
            return Size::ZERO;
        };
        let thickness = border.thickness;
        let content = border.content.content();
        ContentControl::measure(tree, content, available.deflate(thickness)).inflate(thickness)
    }

    fn arrange(tree: &mut UiTree, id: ElementId, size: Size) -> Size {
        let Some(border) = tree.control::<Border>(id) else {
            return size;
        };
        let thickness = border.thickness;
        let content = border.content.content();
        let interior = Rect::from_origin_size(Point::ZERO, size).deflate(thickness);
        ContentControl::arrange(tree, content, interior);
        size
    }

    fn paint(&self, tree: &UiTree, id: ElementId, surface: &mut dyn RenderSurface, clip: Rect) {
        let Some(base) = tree.element(id) else {
            return;
        };
        let bounds = base.bounds();
        if !self.border_color.is_transparent() {
            for (width, rect) in self.sides(bounds) {
                if width > 0.0 {
                    surface.draw_filled_rect(rect, self.border_color);
                }
            }
        }

        let interior = bounds.deflate(self.thickness);
        if !self.interior.is_transparent() {
            surface.draw_filled_rect(interior, self.interior);
        }
        let inner_clip = clip.intersection(&interior);
        if inner_clip.is_empty() {
            return;
        }
        let saved = surface.clip_rect();
        surface.set_clip_rect(inner_clip);
        paint_children(tree, &self.visual_children(), surface, inner_clip);
        surface.set_clip_rect(saved);
    }
}

impl UiTree {
    pub fn set_thickness(&mut self, id: ElementId, thickness: Thickness) -> Result<(), UiError> {
        self.expect_control_mut::<Border>(id)?.thickness = thickness;
        self.invalidate_measure(id);
        Ok(())
    }

    pub fn set_border_color(&mut self, id: ElementId, color: Color) -> Result<(), UiError> {
        self.expect_control_mut::<Border>(id)?.border_color = color;
        Ok(())
    }

    pub fn set_interior(&mut self, id: ElementId, color: Color) -> Result<(), UiError> {
        self.expect_control_mut::<Border>(id)?.interior = color;
        Ok(())
    }

    /// Resize edges of a border (or of the border composed into a window)
    /// under `point`. Anything else reports no edges.
    pub fn resize_edges(&self, id: ElementId, point: Point) -> ResizeEdges {
        let border_id = match self.control::<Window>(id) {
            Some(window) => window.border,
            None => Some(id),
        };
        let Some(border_id) = border_id else {
            return ResizeEdges::empty();
        };
        match (self.control::<Border>(border_id), self.element(border_id)) {
            (Some(border), Some(base)) if base.is_visible() => border.classify(base.bounds(), point),
            _ => ResizeEdges::empty(),
        }
    }
}
