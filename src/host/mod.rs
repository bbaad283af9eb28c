//! Host visual and focus services
//!
//! The engine never touches a real document. Everything it needs from the
//! surrounding UI (element placement, visibility, measurement, input focus
//! and signal subscription) goes through the [`Host`] trait. Elements are
//! addressed by their string id.
//!
//! Signals flow back the other way: the host reports them as [`HostEvent`]s,
//! either by calling [`DialogContext::dispatch`](crate::runtime::DialogContext::dispatch)
//! directly or by returning them from [`Host::poll_events`].

pub mod headless;

pub use headless::HeadlessHost;

/// A point in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub left: i32,
    pub top: i32,
}

impl Point {
    pub fn new(left: i32, top: i32) -> Self {
        Self { left, top }
    }
}

/// Measured size of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Position plus size, used to stretch the overlay on legacy hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// Viewport metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
    pub scroll_left: i32,
    pub scroll_top: i32,
}

impl Viewport {
    /// Top-left coordinates that center an element of `size` in the visible area
    pub fn center(&self, size: Size) -> Point {
        Point {
            left: round_half_up(self.scroll_left as f64 + (self.width - size.width) as f64 / 2.0),
            top: round_half_up(self.scroll_top as f64 + (self.height - size.height) as f64 / 2.0),
        }
    }

    /// Area covered by the viewport in document coordinates
    pub fn visible_rect(&self) -> Rect {
        Rect {
            left: self.scroll_left,
            top: self.scroll_top,
            width: self.width,
            height: self.height,
        }
    }
}

fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Signals an element can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostSignal {
    /// The element lost input focus
    FocusOut,
    /// The close link in the element's titlebar was clicked
    TitlebarClose,
    /// The viewport was resized or scrolled
    Viewport,
}

/// Signal delivered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    FocusLost { element: String },
    TitlebarCloseClicked { element: String },
    ViewportChanged,
}

/// Services the engine needs from the visual host.
///
/// The trait is object safe so nested controls can receive `&mut dyn Host`.
pub trait Host {
    /// Whether an element with this id exists
    fn has_element(&self, id: &str) -> bool;

    /// Create an element from markup at the end of the document
    fn append_element(&mut self, id: &str, markup: &str);

    /// Move an existing element to the end of the document
    fn move_to_end(&mut self, id: &str);

    /// Remove an element and everything inside it
    fn remove_element(&mut self, id: &str);

    /// Change the identity of a live element
    fn rename_element(&mut self, old_id: &str, new_id: &str);

    fn set_class(&mut self, id: &str, class: &str);

    /// Add, replace or (with `None`) remove the element's titlebar
    fn set_titlebar(&mut self, id: &str, title: Option<&str>);

    fn set_visible(&mut self, id: &str, visible: bool);

    fn is_visible(&self, id: &str) -> bool;

    fn set_position(&mut self, id: &str, at: Point);

    fn set_bounds(&mut self, id: &str, bounds: Rect);

    fn set_z_index(&mut self, id: &str, z_index: i32);

    /// Measured size; only meaningful while the element is visible
    fn measure(&self, id: &str) -> Size;

    fn viewport(&self) -> Viewport;

    /// Move input focus to the element
    fn focus(&mut self, id: &str);

    /// Id of the element that currently holds input focus
    fn focused_element(&self) -> Option<String>;

    /// Whether `node` is `ancestor` or lies inside it
    fn contains(&self, ancestor: &str, node: &str) -> bool;

    fn subscribe(&mut self, id: &str, signal: HostSignal);

    /// Whether the host lacks native stacking support for fixed overlays
    fn is_legacy(&self) -> bool {
        false
    }

    /// Compatibility shim applied once per element on legacy hosts
    fn apply_legacy_patch(&mut self, id: &str) {
        let _ = id;
    }

    /// Signals queued by the host since the last poll
    fn poll_events(&mut self) -> Vec<HostEvent> {
        Vec::new()
    }
}
