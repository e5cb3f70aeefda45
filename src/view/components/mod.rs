mod border;
mod box_control;
mod canvas_panel;
mod dock_panel;
mod expandable_panel;
mod label;
mod panel;
mod stack_panel;
mod tab_control;
mod window;

pub use border::*;
pub use box_control::*;
pub use canvas_panel::*;
pub use dock_panel::*;
pub use expandable_panel::*;
pub use label::*;
pub use panel::*;
pub use stack_panel::*;
pub use tab_control::*;
pub use window::*;

use crate::error::UiError;
use crate::style::Dock;
use crate::view::{ElementId, UiTree};

/// Builds the shared frame of windows and expandable panels: the title
/// docked to the top, the content filling the rest, optionally wrapped in a
/// border. Returns the element to install as the composite's only child.
pub(crate) fn compose_frame(
    tree: &mut UiTree,
    border: Option<ElementId>,
    title: Option<ElementId>,
    content: Option<ElementId>,
) -> Result<ElementId, UiError> {
    if let Some(border) = border {
        tree.expect_control::<Border>(border)?;
    }

    let dock = tree.insert(DockPanel::default());
    tree.set_last_child_fill(dock, content.is_some())?;
    if let Some(title) = title {
        tree.dock_push(dock, title, Dock::Top)?;
    }
    if let Some(content) = content {
        tree.dock_push(dock, content, Dock::Left)?;
    }

    match border {
        Some(border) => {
            tree.set_content(border, Some(dock))?;
            Ok(border)
        }
        None => Ok(dock),
    }
}
