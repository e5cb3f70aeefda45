mod color;

pub use color::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
    #[default]
    Stretch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
    #[default]
    Stretch,
}

/// `Hidden` keeps the layout slot but is neither drawn nor hit.
/// `Collapsed` reports a zero size and takes no space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapsed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

/// Edge a [`DockPanel`](crate::view::DockPanel) child anchors to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Dock {
    #[default]
    Left,
    Top,
    Right,
    Bottom,
}
