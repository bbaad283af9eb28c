//! Shared modal overlay
//!
//! One blocking surface per context, created on first use and placed one
//! z-slot below the topmost modal dialog. Legacy hosts cannot pin a fixed
//! overlay to the viewport, so there it follows resize and scroll signals.

use crate::host::{Host, HostSignal};
use tracing::debug;

/// The modal overlay element and its last applied state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalOverlay {
    element_id: String,
    visible: bool,
    z_index: i32,
    tracks_viewport: bool,
}

impl ModalOverlay {
    /// Create the overlay element in `host`, hidden
    pub(crate) fn create(host: &mut dyn Host, element_id: &str) -> Self {
        debug!(element = element_id, "creating modal overlay");
        host.append_element(
            element_id,
            &format!(
                "<div id=\"{}\" class=\"ui-widget-overlay\" style=\"display: none\">&nbsp;</div>",
                element_id
            ),
        );
        host.set_visible(element_id, false);

        let tracks_viewport = host.is_legacy();
        if tracks_viewport {
            host.apply_legacy_patch(element_id);
            host.subscribe(element_id, HostSignal::Viewport);
            let bounds = host.viewport().visible_rect();
            host.set_bounds(element_id, bounds);
        }

        Self {
            element_id: element_id.to_string(),
            visible: false,
            z_index: 0,
            tracks_viewport,
        }
    }

    /// Show the overlay directly below a dialog at `dialog_z`
    pub(crate) fn show_below(&mut self, host: &mut dyn Host, dialog_z: i32) {
        self.z_index = dialog_z - 1;
        host.set_z_index(&self.element_id, self.z_index);
        if !self.visible {
            host.set_visible(&self.element_id, true);
            self.visible = true;
        }
    }

    pub(crate) fn hide(&mut self, host: &mut dyn Host) {
        if self.visible {
            debug!("hiding modal overlay");
            host.set_visible(&self.element_id, false);
            self.visible = false;
        }
    }

    /// Stretch the overlay over the current viewport (legacy hosts only)
    pub(crate) fn reposition(&self, host: &mut dyn Host) {
        if self.tracks_viewport {
            let bounds = host.viewport().visible_rect();
            host.set_bounds(&self.element_id, bounds);
        }
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Whether the overlay follows viewport signals
    pub fn tracks_viewport(&self) -> bool {
        self.tracks_viewport
    }
}
