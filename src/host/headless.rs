//! In-memory host
//!
//! `HeadlessHost` keeps a flat element tree in document order and mimics the
//! focus behaviour of a browser closely enough to drive the engine without a
//! real visual host: moving focus away from a subscribed element, or hiding
//! or removing the element that holds focus, queues a `FocusLost` signal.

use super::{Host, HostEvent, HostSignal, Point, Rect, Size, Viewport};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// State of a single element
#[derive(Debug, Clone, Default)]
pub struct HeadlessElement {
    pub markup: String,
    pub parent: Option<String>,
    pub class: String,
    pub title: Option<String>,
    pub visible: bool,
    pub position: Point,
    pub bounds: Option<Rect>,
    pub z_index: Option<i32>,
    pub size: Size,
    pub legacy_patched: bool,
    signals: HashSet<HostSignal>,
}

impl HeadlessElement {
    pub fn is_subscribed(&self, signal: HostSignal) -> bool {
        self.signals.contains(&signal)
    }
}

/// Host implementation backed by plain data structures
#[derive(Debug, Default)]
pub struct HeadlessHost {
    /// Document order, first = earliest
    order: Vec<String>,
    elements: HashMap<String, HeadlessElement>,
    focused: Option<String>,
    viewport: Viewport,
    legacy: bool,
    focus_calls: HashMap<String, usize>,
    pending: Vec<HostEvent>,
}

impl HeadlessHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Host that reports itself as lacking native overlay stacking
    pub fn legacy(viewport: Viewport) -> Self {
        Self {
            legacy: true,
            ..Self::new(viewport)
        }
    }

    /// Add a plain element, optionally nested inside another one
    pub fn add_element(&mut self, id: &str, parent: Option<&str>) {
        self.order.push(id.to_string());
        self.elements.insert(
            id.to_string(),
            HeadlessElement {
                parent: parent.map(str::to_string),
                visible: true,
                ..HeadlessElement::default()
            },
        );
    }

    pub fn element(&self, id: &str) -> Option<&HeadlessElement> {
        self.elements.get(id)
    }

    /// Element ids in document order
    pub fn document_order(&self) -> &[String] {
        &self.order
    }

    pub fn set_element_size(&mut self, id: &str, size: Size) {
        if let Some(element) = self.elements.get_mut(id) {
            element.size = size;
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Number of times focus was moved to `id`
    pub fn focus_count(&self, id: &str) -> usize {
        self.focus_calls.get(id).copied().unwrap_or(0)
    }

    /// Simulate the user clicking the titlebar close link
    pub fn click_titlebar_close(&mut self, id: &str) {
        let subscribed = self
            .elements
            .get(id)
            .is_some_and(|element| element.title.is_some() && element.is_subscribed(HostSignal::TitlebarClose));
        if subscribed {
            self.pending.push(HostEvent::TitlebarCloseClicked {
                element: id.to_string(),
            });
        }
    }

    /// Simulate a resize or scroll of the viewport
    pub fn scroll_to(&mut self, scroll_left: i32, scroll_top: i32) {
        self.viewport.scroll_left = scroll_left;
        self.viewport.scroll_top = scroll_top;
        let subscribed = self
            .elements
            .values()
            .any(|element| element.is_subscribed(HostSignal::Viewport));
        if subscribed {
            self.pending.push(HostEvent::ViewportChanged);
        }
    }

    fn blur(&mut self) {
        if let Some(previous) = self.focused.take() {
            let subscribed = self
                .elements
                .get(&previous)
                .is_some_and(|element| element.is_subscribed(HostSignal::FocusOut));
            if subscribed {
                debug!(element = %previous, "focus lost");
                self.pending.push(HostEvent::FocusLost { element: previous });
            }
        }
    }

    fn focused_inside(&self, id: &str) -> bool {
        self.focused
            .as_deref()
            .is_some_and(|focused| self.contains(id, focused))
    }
}

impl Host for HeadlessHost {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn append_element(&mut self, id: &str, markup: &str) {
        self.order.retain(|existing| existing != id);
        self.order.push(id.to_string());
        self.elements.insert(
            id.to_string(),
            HeadlessElement {
                markup: markup.to_string(),
                visible: true,
                ..HeadlessElement::default()
            },
        );
    }

    fn move_to_end(&mut self, id: &str) {
        if let Some(index) = self.order.iter().position(|existing| existing == id) {
            let moved = self.order.remove(index);
            self.order.push(moved);
        }
        if let Some(element) = self.elements.get_mut(id) {
            element.parent = None;
        }
    }

    fn remove_element(&mut self, id: &str) {
        if self.focused_inside(id) {
            self.blur();
        }
        let doomed: Vec<String> = self
            .order
            .iter()
            .filter(|existing| self.contains(id, existing))
            .cloned()
            .collect();
        for element in &doomed {
            self.elements.remove(element);
        }
        self.order.retain(|existing| !doomed.contains(existing));
    }

    fn rename_element(&mut self, old_id: &str, new_id: &str) {
        if let Some(element) = self.elements.remove(old_id) {
            self.elements.insert(new_id.to_string(), element);
        }
        for existing in &mut self.order {
            if existing == old_id {
                *existing = new_id.to_string();
            }
        }
        for element in self.elements.values_mut() {
            if element.parent.as_deref() == Some(old_id) {
                element.parent = Some(new_id.to_string());
            }
        }
        if self.focused.as_deref() == Some(old_id) {
            self.focused = Some(new_id.to_string());
        }
    }

    fn set_class(&mut self, id: &str, class: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            element.class = class.to_string();
        }
    }

    fn set_titlebar(&mut self, id: &str, title: Option<&str>) {
        if let Some(element) = self.elements.get_mut(id) {
            element.title = title.map(str::to_string);
        }
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        if !visible && self.focused_inside(id) {
            self.blur();
        }
        if let Some(element) = self.elements.get_mut(id) {
            element.visible = visible;
        }
    }

    fn is_visible(&self, id: &str) -> bool {
        self.elements.get(id).is_some_and(|element| element.visible)
    }

    fn set_position(&mut self, id: &str, at: Point) {
        if let Some(element) = self.elements.get_mut(id) {
            element.position = at;
        }
    }

    fn set_bounds(&mut self, id: &str, bounds: Rect) {
        if let Some(element) = self.elements.get_mut(id) {
            element.bounds = Some(bounds);
        }
    }

    fn set_z_index(&mut self, id: &str, z_index: i32) {
        if let Some(element) = self.elements.get_mut(id) {
            element.z_index = Some(z_index);
        }
    }

    fn measure(&self, id: &str) -> Size {
        match self.elements.get(id) {
            Some(element) if element.visible => element.size,
            _ => Size::default(),
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn focus(&mut self, id: &str) {
        *self.focus_calls.entry(id.to_string()).or_default() += 1;
        if self.focused.as_deref() == Some(id) {
            return;
        }
        self.blur();
        self.focused = Some(id.to_string());
    }

    fn focused_element(&self) -> Option<String> {
        self.focused.clone()
    }

    fn contains(&self, ancestor: &str, node: &str) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self
                .elements
                .get(id)
                .and_then(|element| element.parent.as_deref());
        }
        false
    }

    fn subscribe(&mut self, id: &str, signal: HostSignal) {
        if let Some(element) = self.elements.get_mut(id) {
            element.signals.insert(signal);
        }
    }

    fn is_legacy(&self) -> bool {
        self.legacy
    }

    fn apply_legacy_patch(&mut self, id: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            element.legacy_patched = true;
        }
    }

    fn poll_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.pending)
    }
}
