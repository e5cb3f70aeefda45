use crate::error::UiError;
use crate::geometry::{Point, Rect, Size};
use crate::style::{Dock, Orientation};
use crate::view::base_component::{
    ChildDescriptor, ContainerControl, ContentControl, ControlBehavior,
};
use crate::view::{DockPanel, ElementId, StackPanel, UiTree};
use tracing::debug;

#[derive(Clone, Copy, Debug)]
pub struct TabItem {
    pub header: ElementId,
    pub page: ElementId,
}

impl ChildDescriptor for TabItem {
    fn element(&self) -> ElementId {
        self.page
    }
}

/// Header strip docked to one side with the selected page filling the rest.
/// Pages that are not selected stay owned by the control and keep receiving
/// updates.
#[derive(Clone, Debug)]
pub struct TabControl {
    pub(crate) frame: ContentControl,
    headers: ElementId,
    items: ContainerControl<TabItem>,
    selected: Option<usize>,
}

impl TabControl {
    pub fn items(&self) -> &ContainerControl<TabItem> {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn headers(&self) -> ElementId {
        self.headers
    }

    fn selected_page(&self) -> Option<ElementId> {
        self.selected
            .and_then(|index| self.items.get(index))
            .map(|item| item.page)
    }
}

impl ControlBehavior for TabControl {
    fn visual_children(&self) -> Vec<ElementId> {
        self.frame.children()
    }

    fn owned_children(&self) -> Vec<ElementId> {
        let selected = self.selected_page();
        self.frame
            .children()
            .into_iter()
            .chain(
                self.items
                    .iter()
                    .map(|item| item.page)
                    .filter(|page| Some(*page) != selected),
            )
            .collect()
    }

    fn detach_child(&mut self, child: ElementId) -> bool {
        let Some(index) = self.items.position_of(child) else {
            return false;
        };
        self.items.remove(child);
        self.selected = match self.selected {
            Some(selected) if selected == index => None,
            Some(selected) if selected > index => Some(selected - 1),
            other => other,
        };
        true
    }

    fn measure(tree: &mut UiTree, id: ElementId, available: Size) -> Size {
        let frame = tree
            .control::<TabControl>(id)
            .and_then(|tabs| tabs.frame.content());
        ContentControl::measure(tree, frame, available)
    }

    fn arrange(tree: &mut UiTree, id: ElementId, size: Size) -> Size {
        let frame = tree
            .control::<TabControl>(id)
            .and_then(|tabs| tabs.frame.content());
        ContentControl::arrange(tree, frame, Rect::from_origin_size(Point::ZERO, size));
        size
    }
}

impl UiTree {
    /// Creates an empty tab control with its header strip docked to
    /// `header_dock`.
    pub fn create_tab_control(&mut self, header_dock: Dock) -> Result<ElementId, UiError> {
        let orientation = match header_dock {
            Dock::Top | Dock::Bottom => Orientation::Horizontal,
            Dock::Left | Dock::Right => Orientation::Vertical,
        };
        let headers = self.insert(StackPanel::new(orientation));
        let dock = self.insert(DockPanel::default());
        self.dock_push(dock, headers, header_dock)?;

        let id = self.insert(TabControl {
            frame: ContentControl::new(Some(dock)),
            headers,
            items: ContainerControl::default(),
            selected: None,
        });
        self.link_parent(id, dock);
        Ok(id)
    }

    /// Appends a tab. The first tab becomes selected. Returns the tab index.
    pub fn tab_push(
        &mut self,
        tabs: ElementId,
        header: ElementId,
        page: ElementId,
    ) -> Result<usize, UiError> {
        let headers = self.expect_control::<TabControl>(tabs)?.headers;
        self.check_attachable(tabs, page)?;
        self.stack_push(headers, header)?;

        let control = self.expect_control_mut::<TabControl>(tabs)?;
        control.items.push(TabItem { header, page });
        let index = control.items.len() - 1;
        let first = control.selected.is_none();
        self.link_parent(tabs, page);

        self.on_click(header, move |tree, event| {
            tree.header_clicked(tabs, event.current_target);
        });
        if first {
            self.select_tab(tabs, index)?;
        }
        Ok(index)
    }

    pub fn selected_tab(&self, tabs: ElementId) -> Option<usize> {
        self.control::<TabControl>(tabs).and_then(TabControl::selected)
    }

    /// Installs the page of tab `index` in the fill slot. The previous page
    /// goes back to being owned by the tab control itself.
    pub fn select_tab(&mut self, tabs: ElementId, index: usize) -> Result<(), UiError> {
        let control = self.expect_control::<TabControl>(tabs)?;
        let len = control.items.len();
        let Some(item) = control.items.get(index).copied() else {
            return Err(UiError::TabOutOfRange { index, len });
        };
        if control.selected == Some(index) {
            return Ok(());
        }
        let previous = control.selected_page();
        let dock = control
            .frame
            .content()
            .ok_or(UiError::UnknownElement(tabs))?;

        if let Some(previous) = previous {
            self.detach(previous);
            self.link_parent(tabs, previous);
        }
        // the page stays listed in `items`, only its parent link moves
        if let Some(base) = self.element_mut(item.page) {
            base.parent = None;
        }
        self.dock_push(dock, item.page, Dock::Left)?;
        self.expect_control_mut::<TabControl>(tabs)?.selected = Some(index);
        debug!(?tabs, index, "tab selected");
        Ok(())
    }

    fn header_clicked(&mut self, tabs: ElementId, header: ElementId) {
        let index = self.control::<TabControl>(tabs).and_then(|control| {
            control
                .items
                .iter()
                .position(|item| item.header == header)
        });
        if let Some(index) = index {
            if let Err(err) = self.select_tab(tabs, index) {
                debug!(?tabs, index, %err, "tab selection failed");
            }
        }
    }

    /// Drops the tab whose page is `page`, header included. The page is
    /// either owned by the tab control or installed in its dock.
    pub(crate) fn release_tab_page(&mut self, page: ElementId) {
        let owner = self.ancestors(page).skip(1).take(2).find(|&id| {
            self.control::<TabControl>(id)
                .is_some_and(|tabs| tabs.items.position_of(page).is_some())
        });
        let Some(tabs) = owner else {
            return;
        };
        let Some(control) = self.control_mut::<TabControl>(tabs) else {
            return;
        };
        let Some(item) = control.items.find(page).copied() else {
            return;
        };
        control.detach_child(page);
        if let Err(err) = self.remove(item.header) {
            debug!(?tabs, header = ?item.header, %err, "tab header already removed");
        }
        debug!(?tabs, ?page, "tab removed");
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::{Point, Rect, Size};
    use crate::style::Dock;
    use crate::view::render_backend::MonospaceText;
    use crate::view::{BoxControl, Label, UiTree};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn selecting_a_header_swaps_the_page() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::new(8.0, 16.0)));
        let tabs = tree.create_tab_control(Dock::Top).unwrap();
        let first_header = tree.insert(Label::new("one"));
        let first_page = tree.insert(BoxControl::default());
        let second_header = tree.insert(Label::new("two"));
        let second_page = tree.insert(BoxControl::default());
        tree.tab_push(tabs, first_header, first_page).unwrap();
        tree.tab_push(tabs, second_header, second_page).unwrap();
        assert_eq!(tree.selected_tab(tabs), Some(0));

        let slot = Rect::new(0.0, 0.0, 200.0, 100.0);
        tree.measure(tabs, slot.size());
        tree.arrange(tabs, slot);
        tree.resolve_positions(tabs, Point::ZERO);
        assert_eq!(tree.render_size(first_page), Size::new(200.0, 84.0));
        assert_eq!(tree.element(second_header).unwrap().draw_position(), Point::new(24.0, 0.0));

        assert!(tree.dispatch_click(second_header, Point::new(30.0, 5.0)));
        assert_eq!(tree.selected_tab(tabs), Some(1));
        assert_eq!(tree.parent(first_page), Some(tabs));
        tree.measure(tabs, slot.size());
        tree.arrange(tabs, slot);
        tree.resolve_positions(tabs, Point::ZERO);
        assert_eq!(tree.find_element(tabs, Point::new(50.0, 50.0)), Some(second_page));
    }

    #[test]
    fn unselected_pages_keep_updating() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::default()));
        let tabs = tree.create_tab_control(Dock::Left).unwrap();
        let pages: Vec<_> = (0..2)
            .map(|index| {
                let header = tree.insert(Label::new(format!("tab {index}")));
                let page = tree.insert(BoxControl::default());
                tree.tab_push(tabs, header, page).unwrap();
                page
            })
            .collect();

        let ticks = Rc::new(Cell::new(0));
        for page in &pages {
            let ticks = ticks.clone();
            tree.on_update(*page, move |_, _, _| ticks.set(ticks.get() + 1));
        }
        tree.update(tabs, Duration::from_millis(16));
        assert_eq!(ticks.get(), 2);
        assert!(tree.select_tab(tabs, 5).is_err());
    }

    #[test]
    fn removing_the_selected_page_drops_its_tab() {
        let mut tree = UiTree::new(Rc::new(MonospaceText::default()));
        let tabs = tree.create_tab_control(Dock::Top).unwrap();
        let mut headers = Vec::new();
        let mut pages = Vec::new();
        for index in 0..3 {
            let header = tree.insert(Label::new(format!("tab {index}")));
            let page = tree.insert(BoxControl::default());
            tree.tab_push(tabs, header, page).unwrap();
            headers.push(header);
            pages.push(page);
        }
        tree.select_tab(tabs, 1).unwrap();

        tree.remove(pages[1]).unwrap();
        assert!(!tree.contains(headers[1]));
        assert_eq!(tree.selected_tab(tabs), None);
        let control = tree.control::<super::TabControl>(tabs).unwrap();
        assert_eq!(control.items().element_ids(), vec![pages[0], pages[2]]);

        tree.remove(pages[0]).unwrap();
        assert!(!tree.contains(headers[0]));
        assert_eq!(tree.selected_tab(tabs), None);
        assert!(tree.select_tab(tabs, 0).is_ok());
        assert_eq!(tree.parent(pages[2]).and_then(|dock| tree.parent(dock)), Some(tabs));
    }
}
