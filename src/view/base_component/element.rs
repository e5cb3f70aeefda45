use super::{ElementId, MinMax, UiTree};
use crate::geometry::{Point, Rect, Size};
use crate::style::{HorizontalAlignment, VerticalAlignment, Visibility};
use crate::view::components::{
    BoxControl, Border, CanvasPanel, DockPanel, ExpandablePanel, Label, Panel, StackPanel,
    TabControl, Window,
};
use crate::view::render_backend::RenderSurface;
use tracing::trace;

/// Downcast from the tagged [`Control`] to one concrete control type.
pub trait ControlVariant: Sized {
    const NAME: &'static str;
    fn from_control(control: &Control) -> Option<&Self>;
    fn from_control_mut(control: &mut Control) -> Option<&mut Self>;
}

/// Per-control hooks of the layout protocol. The shared clamp/alignment
/// steps live in [`UiTree::measure`] and [`UiTree::arrange`]; these only
/// compute the control-specific part.
pub(crate) trait ControlBehavior: ControlVariant {
    /// Children that take part in layout, drawing and hit-testing, in draw order.
    fn visual_children(&self) -> Vec<ElementId>;

    /// Children kept alive by this control. Receives per-frame updates.
    fn owned_children(&self) -> Vec<ElementId> {
        self.visual_children()
    }

    fn detach_child(&mut self, _child: ElementId) -> bool {
        false
    }

    /// Desired size of the content for a margin-free, min/max-clamped budget.
    fn measure(tree: &mut UiTree, id: ElementId, available: Size) -> Size;

    /// Arranges the content into `size` and returns the ink size.
    fn arrange(tree: &mut UiTree, id: ElementId, size: Size) -> Size;

    fn paint(&self, tree: &UiTree, _id: ElementId, surface: &mut dyn RenderSurface, clip: Rect) {
        paint_children(tree, &self.visual_children(), surface, clip);
    }

    fn hit_test(&self, tree: &UiTree, _id: ElementId, point: Point) -> Option<ElementId> {
        hit_test_children(tree, &self.visual_children(), point)
    }

    /// Runs once per effective measure invalidation, before the walk moves
    /// on to the parent.
    fn invalidate(_tree: &mut UiTree, _id: ElementId) {}
}

macro_rules! controls {
    ($($variant:ident($ty:ty) => $name:literal),* $(,)?) => {
        /// Tagged control stored next to every element's [`ElementBase`](super::ElementBase).
        pub enum Control {
            $($variant($ty),)*
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ControlKind {
            $($variant,)*
        }

        impl Control {
            pub fn kind(&self) -> ControlKind {
                match self {
                    $(Control::$variant(_) => ControlKind::$variant,)*
                }
            }

            pub(crate) fn visual_children(&self) -> Vec<ElementId> {
                match self {
                    $(Control::$variant(control) => control.visual_children(),)*
                }
            }

            pub(crate) fn owned_children(&self) -> Vec<ElementId> {
                match self {
                    $(Control::$variant(control) => control.owned_children(),)*
                }
            }

            pub(crate) fn detach_child(&mut self, child: ElementId) -> bool {
                match self {
                    $(Control::$variant(control) => control.detach_child(child),)*
                }
            }

            pub(crate) fn paint(
                &self,
                tree: &UiTree,
                id: ElementId,
                surface: &mut dyn RenderSurface,
                clip: Rect,
            ) {
                match self {
                    $(Control::$variant(control) => control.paint(tree, id, surface, clip),)*
                }
            }

            pub(crate) fn hit_test(&self, tree: &UiTree, id: ElementId, point: Point) -> Option<ElementId> {
                match self {
                    $(Control::$variant(control) => control.hit_test(tree, id, point),)*
                }
            }
        }

        impl ControlKind {
            pub fn name(self) -> &'static str {
                match self {
                    $(ControlKind::$variant => $name,)*
                }
            }

            pub(crate) fn measure(self, tree: &mut UiTree, id: ElementId, available: Size) -> Size {
                match self {
                    $(ControlKind::$variant => <$ty as ControlBehavior>::measure(tree, id, available),)*
                }
            }

            pub(crate) fn arrange(self, tree: &mut UiTree, id: ElementId, size: Size) -> Size {
                match self {
                    $(ControlKind::$variant => <$ty as ControlBehavior>::arrange(tree, id, size),)*
                }
            }

            pub(crate) fn invalidate(self, tree: &mut UiTree, id: ElementId) {
                match self {
                    $(ControlKind::$variant => <$ty as ControlBehavior>::invalidate(tree, id),)*
                }
            }
        }

        $(
            impl From<$ty> for Control {
                fn from(control: $ty) -> Self {
                    Control::$variant(control)
                }
            }

            impl ControlVariant for $ty {
                const NAME: &'static str = $name;

                fn from_control(control: &Control) -> Option<&Self> {
                    match control {
                        Control::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn from_control_mut(control: &mut Control) -> Option<&mut Self> {
                    match control {
                        Control::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

controls! {
    Panel(Panel) => "Panel",
    Border(Border) => "Border",
    Label(Label) => "Label",
    Box(BoxControl) => "Box",
    Stack(StackPanel) => "StackPanel",
    Dock(DockPanel) => "DockPanel",
    Canvas(CanvasPanel) => "CanvasPanel",
    Tab(TabControl) => "TabControl",
    Expandable(ExpandablePanel) => "ExpandablePanel",
    Window(Window) => "Window",
}

/// Offset of the ink box inside the client box. Stretch behaves like Center
/// unless the ink overflows, where it degrades to Left/Top.
pub(crate) fn alignment_offset(
    client: Size,
    ink: Size,
    horizontal: HorizontalAlignment,
    vertical: VerticalAlignment,
) -> Point {
    let horizontal = if horizontal == HorizontalAlignment::Stretch && ink.width > client.width {
        HorizontalAlignment::Left
    } else {
        horizontal
    };
    let vertical = if vertical == VerticalAlignment::Stretch && ink.height > client.height {
        VerticalAlignment::Top
    } else {
        vertical
    };

    let x = match horizontal {
        HorizontalAlignment::Left => 0.0,
        HorizontalAlignment::Right => client.width - ink.width,
        HorizontalAlignment::Center | HorizontalAlignment::Stretch => {
            (client.width - ink.width) * 0.5
        }
    };
    let y = match vertical {
        VerticalAlignment::Top => 0.0,
        VerticalAlignment::Bottom => client.height - ink.height,
        VerticalAlignment::Center | VerticalAlignment::Stretch => {
            (client.height - ink.height) * 0.5
        }
    };
    Point::new(x, y)
}

pub(crate) fn paint_children(
    tree: &UiTree,
    children: &[ElementId],
    surface: &mut dyn RenderSurface,
    clip: Rect,
) {
    for &child in children {
        tree.render(child, surface, clip);
    }
}

pub(crate) fn hit_test_children(tree: &UiTree, children: &[ElementId], point: Point) -> Option<ElementId> {
    children
        .iter()
        .rev()
        .find_map(|&child| tree.find_element(child, point))
}

impl UiTree {
    /// First layout pass: computes and caches the element's desired size for
    /// `available` (margin included).
    pub fn measure(&mut self, id: ElementId, available: Size) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let layout = &mut node.base.layout;
        if node.base.visibility == Visibility::Collapsed {
            layout.desired_size = Size::ZERO;
            layout.unclipped_desired_size = Size::ZERO;
            layout.previous_available = Some(available);
            layout.measure_valid = true;
            return;
        }
        if layout.measure_valid && layout.previous_available == Some(available) {
            return;
        }

        let kind = node.control.kind();
        let margin = node.base.margin;
        let bounds = MinMax::new(&node.base);

        let frame = bounds.clamp(available.deflate(margin));
        let mut desired = kind.measure(self, id, frame).max(bounds.min());
        let unclipped = desired;
        desired = desired.min(bounds.max());
        desired = desired
            .inflate(margin)
            .min(available)
            .max(Size::ZERO);

        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let layout = &mut node.base.layout;
        if layout.desired_size != desired || layout.unclipped_desired_size != unclipped {
            // the last arrange was computed from the old desired size
            layout.arrange_valid = false;
        }
        layout.desired_size = desired;
        layout.unclipped_desired_size = unclipped;
        layout.previous_available = Some(available);
        layout.measure_valid = true;
        trace!(?id, kind = kind.name(), ?available, ?desired, "measured");
    }

    /// Second layout pass: assigns the render size and the offset inside
    /// `final_rect`, which is expressed in the parent's coordinates.
    ///
    /// Arranging an element whose measure is invalid measures it first with
    /// the final size as the budget.
    pub fn arrange(&mut self, id: ElementId, final_rect: Rect) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.base.visibility == Visibility::Collapsed {
            let layout = &mut node.base.layout;
            layout.render_size = Size::ZERO;
            layout.offset = final_rect.origin();
            layout.layout_clip = None;
            layout.previous_final = Some(final_rect);
            layout.has_arranged = true;
            layout.arrange_valid = true;
            return;
        }
        if !node.base.layout.measure_valid {
            self.measure(id, final_rect.size().max(Size::ZERO));
        }

        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let layout = &node.base.layout;
        if layout.arrange_valid && layout.previous_final == Some(final_rect) {
            return;
        }

        let kind = node.control.kind();
        let margin = node.base.margin;
        let bounds = MinMax::new(&node.base);
        let horizontal = node.base.horizontal_alignment;
        let vertical = node.base.vertical_alignment;
        let unclipped = layout.unclipped_desired_size;

        let client = final_rect.size().max(Size::ZERO).deflate(margin);
        let mut arrange_size = client;
        let mut needs_clip = false;

        if arrange_size.width < unclipped.width {
            needs_clip = true;
            arrange_size.width = unclipped.width;
        }
        if arrange_size.height < unclipped.height {
            needs_clip = true;
            arrange_size.height = unclipped.height;
        }
        if horizontal != HorizontalAlignment::Stretch {
            arrange_size.width = unclipped.width;
        }
        if vertical != VerticalAlignment::Stretch {
            arrange_size.height = unclipped.height;
        }

        let effective_max = unclipped.max(bounds.max());
        arrange_size = arrange_size.min(effective_max);

        let ink = kind.arrange(self, id, arrange_size);

        let clipped_ink = ink.min(bounds.max());
        needs_clip |= clipped_ink.width < ink.width || clipped_ink.height < ink.height;
        needs_clip |= clipped_ink.width > client.width || clipped_ink.height > client.height;

        let align = alignment_offset(client, clipped_ink, horizontal, vertical);
        let offset = Point::new(
            final_rect.x + margin.left + align.x,
            final_rect.y + margin.top + align.y,
        );
        let layout_clip = needs_clip.then(|| {
            Rect::new(
                final_rect.x + margin.left,
                final_rect.y + margin.top,
                client.width,
                client.height,
            )
        });

        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let layout = &mut node.base.layout;
        layout.render_size = ink;
        layout.offset = offset;
        layout.layout_clip = layout_clip;
        layout.previous_final = Some(final_rect);
        layout.has_arranged = true;
        layout.arrange_valid = true;
        trace!(?id, kind = kind.name(), ?final_rect, ?ink, ?offset, "arranged");
    }

    /// Clears both validity flags and walks up to the root. Stops at the
    /// first element whose measure is already invalid.
    pub fn invalidate_measure(&mut self, id: ElementId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let layout = &mut node.base.layout;
        if !layout.measure_valid {
            return;
        }
        layout.measure_valid = false;
        layout.arrange_valid = false;
        layout.invalidation_count += 1;
        let parent = node.base.parent;
        let kind = node.control.kind();
        trace!(?id, kind = kind.name(), "invalidate measure");

        kind.invalidate(self, id);
        if let Some(parent) = parent {
            self.invalidate_measure(parent);
        }
    }

    /// Forces the next arrange of this element and its ancestors without
    /// discarding measured sizes.
    pub fn invalidate_arrange(&mut self, id: ElementId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.base.layout.arrange_valid {
            return;
        }
        node.base.layout.arrange_valid = false;
        if let Some(parent) = node.base.parent {
            self.invalidate_arrange(parent);
        }
    }

    /// Resolves absolute draw positions of the sub-tree from the arranged
    /// offsets.
    pub fn resolve_positions(&mut self, id: ElementId, origin: Point) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let position = origin + node.base.layout.offset;
        node.base.layout.draw_position = position;
        for child in node.control.visual_children() {
            self.resolve_positions(child, position);
        }
    }

    /// Draws the sub-tree at `origin`, clipped to `clip`. The surface clip is
    /// restored before returning.
    pub fn draw(&mut self, id: ElementId, surface: &mut dyn RenderSurface, origin: Point, clip: Rect) {
        self.resolve_positions(id, origin);
        self.render(id, surface, clip);
    }

    pub(crate) fn render(&self, id: ElementId, surface: &mut dyn RenderSurface, clip: Rect) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.base.visibility != Visibility::Visible || !node.base.layout.has_arranged {
            return;
        }

        let layout = &node.base.layout;
        let mut own_clip = clip;
        if let Some(slot) = layout.layout_clip {
            let parent_origin = layout.draw_position - layout.offset;
            own_clip.intersect(&slot.translate(parent_origin));
        }
        if own_clip.is_empty() {
            return;
        }

        let saved = surface.clip_rect();
        surface.set_clip_rect(own_clip);
        if !node.base.background.is_transparent() {
            surface.draw_filled_rect(node.base.bounds(), node.base.background);
        }
        node.control.paint(self, id, surface, own_clip);
        surface.set_clip_rect(saved);
    }

    /// Most specific visible element under `point` inside this sub-tree.
    pub fn find_element(&self, id: ElementId, point: Point) -> Option<ElementId> {
        let node = self.nodes.get(id)?;
        if node.base.visibility != Visibility::Visible || !node.base.layout.has_arranged {
            return None;
        }
        if !node.base.bounds().contains(point) {
            return None;
        }
        node.control.hit_test(self, id, point).or(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::alignment_offset;
    use crate::geometry::{Point, Rect, Size, Thickness};
    use crate::style::{HorizontalAlignment, VerticalAlignment, Visibility};
    use crate::view::render_backend::MonospaceText;
    use crate::style::Dock;
    use crate::view::{BoxControl, DockPanel, Panel, UiTree};
    use std::rc::Rc;

    fn tree() -> UiTree {
        UiTree::new(Rc::new(MonospaceText::default()))
    }

    #[test]
    fn stretch_degrades_to_left_on_overflow() {
        let offset = alignment_offset(
            Size::new(100.0, 100.0),
            Size::new(150.0, 40.0),
            HorizontalAlignment::Stretch,
            VerticalAlignment::Bottom,
        );
        assert_eq!(offset, Point::new(0.0, 60.0));

        let centered = alignment_offset(
            Size::new(100.0, 100.0),
            Size::new(150.0, 40.0),
            HorizontalAlignment::Center,
            VerticalAlignment::Stretch,
        );
        assert_eq!(centered, Point::new(-25.0, 30.0));
    }

    #[test]
    fn desired_size_never_exceeds_finite_budget() {
        let mut tree = tree();
        let big = tree.insert(BoxControl::default());
        tree.set_min_size(big, Size::new(500.0, 20.0)).unwrap();
        tree.measure(big, Size::new(120.0, 80.0));
        let desired = tree.desired_size(big);
        assert!(desired.width <= 120.0 && desired.height <= 80.0);
        assert_eq!(tree.element(big).unwrap().unclipped_desired_size().width, 500.0);
    }

    #[test]
    fn margin_and_max_are_applied_in_measure() {
        let mut tree = tree();
        let leaf = tree.insert(BoxControl::default());
        tree.set_min_size(leaf, Size::new(60.0, 60.0)).unwrap();
        tree.set_max_size(leaf, Size::new(40.0, 100.0)).unwrap();
        tree.set_margin(leaf, Thickness::uniform(5.0)).unwrap();
        tree.measure(leaf, Size::new(200.0, 200.0));
        // min wins over a smaller max
        assert_eq!(tree.desired_size(leaf), Size::new(70.0, 70.0));
    }

    #[test]
    fn repeated_layout_is_idempotent() {
        let mut tree = tree();
        let panel = tree.insert(Panel::default());
        let leaf = tree.insert(BoxControl::default());
        tree.set_width(leaf, Some(30.0)).unwrap();
        tree.set_height(leaf, Some(20.0)).unwrap();
        tree.set_alignment(leaf, HorizontalAlignment::Right, VerticalAlignment::Center)
            .unwrap();
        tree.set_content(panel, Some(leaf)).unwrap();

        let slot = Rect::new(0.0, 0.0, 100.0, 50.0);
        tree.measure(panel, slot.size());
        tree.arrange(panel, slot);
        let first = (
            tree.desired_size(leaf),
            tree.render_size(leaf),
            tree.element(leaf).unwrap().offset(),
        );
        tree.measure(panel, slot.size());
        tree.arrange(panel, slot);
        let second = (
            tree.desired_size(leaf),
            tree.render_size(leaf),
            tree.element(leaf).unwrap().offset(),
        );
        assert_eq!(first, second);
        assert_eq!(first.2, Point::new(70.0, 15.0));
    }

    #[test]
    fn arrange_without_measure_measures_against_final_size() {
        let mut tree = tree();
        let leaf = tree.insert(BoxControl::default());
        tree.set_min_size(leaf, Size::new(10.0, 10.0)).unwrap();
        tree.arrange(leaf, Rect::new(5.0, 5.0, 40.0, 30.0));
        let base = tree.element(leaf).unwrap();
        assert!(base.is_measure_valid());
        assert!(base.is_arrange_valid());
        assert_eq!(base.render_size(), Size::new(40.0, 30.0));
        assert_eq!(base.offset(), Point::new(5.0, 5.0));
    }

    #[test]
    fn collapsed_element_reports_zero_and_is_not_hit() {
        let mut tree = tree();
        let leaf = tree.insert(BoxControl::default());
        tree.set_width(leaf, Some(50.0)).unwrap();
        tree.set_height(leaf, Some(50.0)).unwrap();
        tree.set_visibility(leaf, Visibility::Collapsed).unwrap();
        tree.measure(leaf, Size::new(100.0, 100.0));
        tree.arrange(leaf, Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.resolve_positions(leaf, Point::ZERO);
        assert_eq!(tree.desired_size(leaf), Size::ZERO);
        assert_eq!(tree.render_size(leaf), Size::ZERO);
        assert_eq!(tree.find_element(leaf, Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn invalidation_walks_each_ancestor_once() {
        let mut tree = tree();
        let outer = tree.insert(Panel::default());
        let inner = tree.insert(Panel::default());
        let leaf = tree.insert(BoxControl::default());
        tree.set_content(inner, Some(leaf)).unwrap();
        tree.set_content(outer, Some(inner)).unwrap();
        tree.measure(outer, Size::new(100.0, 100.0));
        tree.arrange(outer, Rect::new(0.0, 0.0, 100.0, 100.0));

        let before: Vec<u64> = [leaf, inner, outer]
            .iter()
            .map(|&id| tree.element(id).unwrap().invalidation_count())
            .collect();
        tree.invalidate_measure(leaf);
        tree.invalidate_measure(leaf);
        for (index, &id) in [leaf, inner, outer].iter().enumerate() {
            let base = tree.element(id).unwrap();
            assert!(!base.is_measure_valid());
            assert!(!base.is_arrange_valid());
            assert_eq!(base.invalidation_count(), before[index] + 1);
        }
    }

    #[test]
    fn smaller_measure_budget_refreshes_the_arrange() {
        let mut tree = tree();
        let dock = tree.insert(DockPanel::default());
        tree.set_alignment(dock, HorizontalAlignment::Left, VerticalAlignment::Top)
            .unwrap();
        for _ in 0..2 {
            let child = tree.insert(BoxControl::default());
            tree.set_min_size(child, Size::new(60.0, 10.0)).unwrap();
            tree.dock_push(dock, child, Dock::Left).unwrap();
        }
        let slot = Rect::new(0.0, 0.0, 200.0, 50.0);
        tree.measure(dock, slot.size());
        tree.arrange(dock, slot);
        assert_eq!(tree.render_size(dock).width, 120.0);

        tree.measure(dock, Size::new(80.0, 50.0));
        assert_eq!(tree.element(dock).unwrap().unclipped_desired_size().width, 80.0);
        assert!(!tree.element(dock).unwrap().is_arrange_valid());
        tree.arrange(dock, slot);
        assert_eq!(tree.render_size(dock).width, 80.0);
    }
}
