use crate::geometry::Point;
use crate::ui::ClickEvent;
use std::time::Duration;
use tracing::trace;

mod content;
mod core;
mod element;
mod tree;

pub use content::*;
pub(crate) use core::MinMax;
pub use core::{ElementBase, ElementId};
pub use element::*;
pub use tree::UiTree;

pub type ClickHandler = Box<dyn FnMut(&mut UiTree, &ClickEvent)>;
pub type UpdateHandler = Box<dyn FnMut(&mut UiTree, ElementId, Duration)>;

impl UiTree {
    /// Appends a click callback. Callbacks of one element run in
    /// registration order.
    pub fn on_click<F>(&mut self, id: ElementId, handler: F)
    where
        F: FnMut(&mut UiTree, &ClickEvent) + 'static,
    {
        self.click_handlers
            .entry(id)
            .or_default()
            .push(Box::new(handler));
    }

    pub fn on_update<F>(&mut self, id: ElementId, handler: F)
    where
        F: FnMut(&mut UiTree, ElementId, Duration) + 'static,
    {
        self.update_handlers
            .entry(id)
            .or_default()
            .push(Box::new(handler));
    }

    /// Element that would receive a click on `id`: the nearest element of
    /// the ancestor chain with at least one callback.
    pub fn click_receiver(&self, id: ElementId) -> Option<ElementId> {
        self.ancestors(id).find(|ancestor| {
            self.click_handlers
                .get(ancestor)
                .is_some_and(|handlers| !handlers.is_empty())
        })
    }

    pub fn is_clickable(&self, id: ElementId) -> bool {
        self.click_receiver(id).is_some()
    }

    /// Bubbles a click from `target` to the first ancestor with callbacks and
    /// runs them. Returns whether anything handled it.
    pub fn dispatch_click(&mut self, target: ElementId, position: Point) -> bool {
        let Some(receiver) = self.click_receiver(target) else {
            return false;
        };
        let event = ClickEvent {
            target,
            current_target: receiver,
            position,
        };
        trace!(?target, ?receiver, "dispatch click");

        let mut handlers = self.click_handlers.remove(&receiver).unwrap_or_default();
        for handler in handlers.iter_mut() {
            handler(self, &event);
        }
        if self.contains(receiver) {
            // callbacks may have registered more handlers on the receiver
            let added = self.click_handlers.remove(&receiver).unwrap_or_default();
            handlers.extend(added);
            self.click_handlers.insert(receiver, handlers);
        }
        true
    }

    /// Runs update callbacks for `id` and every element it owns, including
    /// children that are currently not part of layout.
    pub fn update(&mut self, id: ElementId, delta: Duration) {
        if !self.contains(id) {
            return;
        }
        if let Some(mut handlers) = self.update_handlers.remove(&id) {
            for handler in handlers.iter_mut() {
                handler(self, id, delta);
            }
            if self.contains(id) {
                let added = self.update_handlers.remove(&id).unwrap_or_default();
                handlers.extend(added);
                self.update_handlers.insert(id, handlers);
            }
        }
        let children = match self.nodes.get(id) {
            Some(node) => node.control.owned_children(),
            None => return,
        };
        for child in children {
            self.update(child, delta);
        }
    }
}
