pub(crate) mod base_component;
pub mod components;
pub mod engine;
pub mod pointer;
pub mod render_backend;

pub use base_component::{
    ChildDescriptor, ClickHandler, ContainerControl, ContentControl, Control, ControlKind,
    ControlVariant, ElementBase, ElementId, UiTree, UpdateHandler,
};
pub use components::*;
pub use engine::*;
