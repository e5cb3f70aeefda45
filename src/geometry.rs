//! Leaf value types shared by layout, hit-testing and drawing.

use glam::Vec2;
use std::ops;

/// A width/height pair. Negative dimensions mark [`Size::EMPTY`].
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size::new(0.0, 0.0);
    pub const EMPTY: Size = Size::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
    pub const INFINITE: Size = Size::new(f32::INFINITY, f32::INFINITY);

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width < 0.0
    }

    /// Subtracts the thickness and floors each axis at zero.
    pub fn deflate(self, thickness: Thickness) -> Size {
        Size::new(
            (self.width - thickness.width()).max(0.0),
            (self.height - thickness.height()).max(0.0),
        )
    }

    pub fn inflate(self, thickness: Thickness) -> Size {
        Size::new(
            self.width + thickness.width(),
            self.height + thickness.height(),
        )
    }

    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }

    pub fn min(self, other: Size) -> Size {
        Size::new(self.width.min(other.width), self.height.min(other.height))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for Point {
    fn from(value: Vec2) -> Self {
        Point::new(value.x, value.y)
    }
}

impl From<Point> for Vec2 {
    fn from(value: Point) -> Self {
        value.to_vec2()
    }
}

impl ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An axis-aligned rectangle. [`Rect::EMPTY`] has negative dimensions and
/// contains nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Rect {
    fn default() -> Self {
        Rect::ZERO
    }
}

impl Rect {
    pub const ZERO: Rect = Rect::new(0.0, 0.0, 0.0, 0.0);
    pub const EMPTY: Rect = Rect::new(
        f32::INFINITY,
        f32::INFINITY,
        f32::NEG_INFINITY,
        f32::NEG_INFINITY,
    );

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Rect::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width < 0.0 || self.height < 0.0
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        if self.is_empty() {
            return Size::EMPTY;
        }
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, point: Point) -> bool {
        if self.is_empty() {
            return false;
        }
        point.x >= self.x && point.y >= self.y && point.x < self.right() && point.y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Clips `self` to `other` in place. Collapses to [`Rect::EMPTY`] when the
    /// two do not overlap.
    pub fn intersect(&mut self, other: &Rect) {
        if !self.intersects(other) {
            *self = Rect::EMPTY;
            return;
        }
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        *self = Rect::new(left, top, (right - left).max(0.0), (bottom - top).max(0.0));
    }

    pub fn intersection(&self, other: &Rect) -> Rect {
        let mut out = *self;
        out.intersect(other);
        out
    }

    pub fn translate(&self, offset: Point) -> Rect {
        if self.is_empty() {
            return *self;
        }
        Rect::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Shrinks the rectangle by the thickness on each side, flooring the
    /// size at zero.
    pub fn deflate(&self, thickness: Thickness) -> Rect {
        Rect::new(
            self.x + thickness.left,
            self.y + thickness.top,
            (self.width - thickness.width()).max(0.0),
            (self.height - thickness.height()).max(0.0),
        )
    }
}

/// Four-sided band (margins, border widths).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Thickness {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Thickness {
    pub const ZERO: Thickness = Thickness::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub const fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }

    pub fn width(&self) -> f32 {
        self.left + self.right
    }

    pub fn height(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0
    }
}
