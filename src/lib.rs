//! Retained-mode layout and pointer interaction engine.
//!
//! Elements live in a [`UiTree`] arena and are laid out with a measure pass
//! followed by an arrange pass. An [`Engine`] keeps the z-ordered top-level
//! windows, feeds pointer samples through a drag/resize state machine and
//! draws onto any [`RenderSurface`](view::render_backend::RenderSurface).

pub mod config;
pub mod error;
pub mod geometry;
pub mod style;
pub mod ui;
pub mod view;

pub use config::{DisplayConfig, DisplayMode, EngineConfig, PointerConfig};
pub use error::{ColorParseError, ConfigError, UiError};
pub use geometry::{Point, Rect, Size, Thickness};
pub use style::Color;
pub use ui::{ClickEvent, FrameInput, MouseButtons, PointerSample, ResizeEvent};
pub use view::{ElementBase, ElementId, Engine, UiTree};
