//! Collaborators the engine draws and measures through. The engine never
//! rasterizes anything itself.

use crate::geometry::{Point, Rect, Size};
use crate::style::Color;

/// Font metrics capability used by text-bearing controls.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> Size;
}

/// Immediate-mode drawing target with a single scoped clip rectangle.
///
/// Callers that change the clip restore the previous one before returning,
/// so sibling draws never observe each other's clip.
pub trait RenderSurface {
    fn clip_rect(&self) -> Rect;
    fn set_clip_rect(&mut self, clip: Rect);
    fn draw_filled_rect(&mut self, rect: Rect, color: Color);
    fn draw_text(&mut self, text: &str, position: Point, color: Color);
}

/// Fixed advance per character and fixed line height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceText {
    pub advance: f32,
    pub line_height: f32,
}

impl Default for MonospaceText {
    fn default() -> Self {
        Self::new(8.0, 16.0)
    }
}

impl MonospaceText {
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance,
            line_height,
        }
    }
}

impl TextMeasure for MonospaceText {
    fn measure(&self, text: &str) -> Size {
        if text.is_empty() {
            return Size::ZERO;
        }
        let (lines, widest) = text.lines().fold((0usize, 0usize), |(lines, widest), line| {
            (lines + 1, widest.max(line.chars().count()))
        });
        Size::new(
            widest as f32 * self.advance,
            lines.max(1) as f32 * self.line_height,
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FilledRect { rect: Rect, color: Color },
    Text {
        text: String,
        position: Point,
        color: Color,
    },
}

/// Surface that records draw calls, with filled rectangles already cut to
/// the active clip. Used by tests and headless hosts.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    bounds: Rect,
    clip: Rect,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            clip: bounds,
            commands: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.clip = self.bounds;
    }
}

impl RenderSurface for RecordingSurface {
    fn clip_rect(&self) -> Rect {
        self.clip
    }

    fn set_clip_rect(&mut self, clip: Rect) {
        self.clip = clip;
    }

    fn draw_filled_rect(&mut self, rect: Rect, color: Color) {
        let visible = rect.intersection(&self.clip);
        if visible.is_empty() || visible.width == 0.0 || visible.height == 0.0 {
            return;
        }
        self.commands.push(DrawCommand::FilledRect {
            rect: visible,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, position: Point, color: Color) {
        if !self.clip.contains(position) {
            return;
        }
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            position,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{DrawCommand, MonospaceText, RecordingSurface, RenderSurface, TextMeasure};
    use crate::geometry::{Rect, Size};
    use crate::style::Color;

    #[test]
    fn monospace_uses_widest_line() {
        let text = MonospaceText::new(10.0, 20.0);
        assert_eq!(text.measure("ab\nabcd"), Size::new(40.0, 40.0));
        assert_eq!(text.measure(""), Size::ZERO);
    }

    #[test]
    fn recording_surface_cuts_rects_to_clip() {
        let mut surface = RecordingSurface::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        surface.set_clip_rect(Rect::new(0.0, 0.0, 50.0, 50.0));
        surface.draw_filled_rect(Rect::new(40.0, 40.0, 20.0, 20.0), Color::BLACK);
        surface.draw_filled_rect(Rect::new(60.0, 60.0, 5.0, 5.0), Color::BLACK);
        assert_eq!(
            surface.commands(),
            &[DrawCommand::FilledRect {
                rect: Rect::new(40.0, 40.0, 10.0, 10.0),
                color: Color::BLACK,
            }]
        );
    }
}
