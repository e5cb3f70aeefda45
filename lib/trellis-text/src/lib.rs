//! [`TextMeasure`] backed by cosmic-text shaping.

use cosmic_text::{Align, Attrs, Buffer, FontSystem, Metrics, Shaping};
use std::cell::RefCell;
use trellis::geometry::Size;
use trellis::view::render_backend::TextMeasure;

/// Shapes each string with a shared font system and reports the extent of
/// its layout runs. Text is never wrapped.
pub struct CosmicTextMeasure {
    font_system: RefCell<FontSystem>,
    font_size: f32,
    line_height: f32,
}

impl CosmicTextMeasure {
    /// Loads the system fonts.
    pub fn new(font_size: f32, line_height: f32) -> Self {
        Self::with_font_system(FontSystem::new(), font_size, line_height)
    }

    pub fn with_font_system(font_system: FontSystem, font_size: f32, line_height: f32) -> Self {
        Self {
            font_system: RefCell::new(font_system),
            font_size: font_size.max(1.0),
            line_height: line_height.max(1.0),
        }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new(16.0, 20.0)
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure(&self, text: &str) -> Size {
        if text.is_empty() {
            return Size::ZERO;
        }
        let mut font_system = self.font_system.borrow_mut();
        let font_system = &mut *font_system;
        let mut buffer = Buffer::new(font_system, Metrics::new(self.font_size, self.line_height));
        buffer.set_size(font_system, None, None);
        buffer.set_text(
            font_system,
            text,
            &Attrs::new(),
            Shaping::Advanced,
            Some(Align::Left),
        );
        buffer.shape_until_scroll(font_system, false);

        let (width, height) = buffer.layout_runs().fold((0.0f32, 0.0f32), |(w, h), run| {
            (w.max(run.line_w), h.max(run.line_top + run.line_height))
        });
        Size::new(width.ceil(), height.ceil())
    }
}
