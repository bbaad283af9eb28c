//! Attach, open and close
//!
//! The only code that mutates the dialog stack and the modal overlay. Each
//! operation runs to completion before returning; the Opening and Closing
//! hooks are the only points where a transition can be cancelled.

use super::overlay::ModalOverlay;
use super::DialogContext;
use crate::dialog::hooks::HookPhase;
use crate::dialog::types::Attachment;
use crate::dialog::{Decision, DialogBody, DialogEvent, DialogHandle, Modality, Position, Transition};
use crate::error::{DialogError, DialogResult};
use crate::host::{Host, HostSignal, Point};
use tracing::{debug, info};

/// Gap between stacked dialogs; the slot in between is reserved for the overlay
pub const Z_INDEX_GAP: i32 = 2;

impl<H: Host> DialogContext<H> {
    /// Bind a dialog to the host: move its element to the end of the
    /// document and hide it. Control-hosting dialogs attach their control
    /// first.
    pub fn attach(&mut self, handle: DialogHandle) -> DialogResult<()> {
        let dialog = self.dialog(handle)?;
        let id = match dialog.id() {
            Some(id) if !id.is_empty() && dialog.attachment == Attachment::Unattached => id.to_string(),
            _ => {
                return Err(DialogError::invalid_state(
                    "Must set ID and can only attach once",
                ))
            }
        };
        if self.find(&id).is_some() {
            return Err(DialogError::invalid_state(format!(
                "Another attached dialog already uses ID '{}'",
                id
            )));
        }

        let markup = if self.host.has_element(&id) {
            None
        } else {
            Some(dialog.render()?)
        };

        let dialog = self
            .dialogs
            .get_mut(&handle)
            .ok_or(DialogError::NotFound(handle))?;
        if let DialogBody::Control(control) = dialog.body_mut() {
            control.attach(&mut self.host)?;
        }

        match markup {
            Some(markup) => self.host.append_element(&id, &markup),
            None => self.host.move_to_end(&id),
        }
        self.host.set_titlebar(&id, dialog.titlebar());
        self.host.set_visible(&id, false);
        dialog.attachment = Attachment::Attached;

        debug!(dialog = %id, "dialog attached");
        Ok(())
    }

    /// Show a dialog on top of the stack and give it focus.
    ///
    /// Opening an open dialog closes it first and reopens it on top; if that
    /// close is vetoed the open is abandoned.
    pub fn open(&mut self, handle: DialogHandle) -> DialogResult<Transition> {
        if self.is_open(handle)? {
            self.close(handle)?;
            if self.is_open(handle)? {
                debug!(dialog = %handle, "reopen abandoned: close was vetoed");
                return Ok(Transition::Vetoed);
            }
        }

        let dialog = self.dialog(handle)?;
        if !dialog.is_attached() {
            return Err(DialogError::invalid_state("Cannot open dialog before attach"));
        }
        let id = self.element_id(handle)?;
        let modality = dialog.modality();
        let position = dialog.position();

        if self.run_hooks(handle, HookPhase::Opening)? == Decision::Cancel {
            debug!(dialog = %id, "opening vetoed");
            return Ok(Transition::Vetoed);
        }

        self.bind_events(handle, &id)?;
        self.patch_for_legacy_host(handle, &id)?;

        let z_index = match self.stack.topmost() {
            Some(top) => {
                self.dialog(top)?.z_index.unwrap_or(self.config.first_z_index) + Z_INDEX_GAP
            }
            None => self.config.first_z_index,
        };

        // Centered dialogs start at the origin; they can only be measured once visible.
        let anchor = match position {
            Position::TopLeft { left, top } => Point::new(left, top),
            Position::Center => Point::default(),
        };
        self.host.set_position(&id, anchor);
        self.host.set_z_index(&id, z_index);
        self.host.set_visible(&id, true);
        if position == Position::Center {
            let size = self.host.measure(&id);
            let centered = self.host.viewport().center(size);
            self.host.set_position(&id, centered);
        }
        self.dialog_mut(handle)?.z_index = Some(z_index);

        if modality == Modality::Modal {
            self.show_overlay_below(z_index);
        }

        self.stack.push(handle);
        self.host.focus(&id);

        info!(dialog = %id, z_index, depth = self.stack.len(), "dialog opened");
        self.run_hooks(handle, HookPhase::Opened)?;
        self.send_event(DialogEvent::Opened {
            handle,
            id,
            z_index,
        });
        Ok(Transition::Completed)
    }

    /// Hide a dialog and hand focus to the new topmost one
    pub fn close(&mut self, handle: DialogHandle) -> DialogResult<Transition> {
        if !self.is_open(handle)? {
            return Ok(Transition::Skipped);
        }

        if self.run_hooks(handle, HookPhase::Closing)? == Decision::Cancel {
            debug!(dialog = %handle, "closing vetoed");
            return Ok(Transition::Vetoed);
        }

        self.stack.remove(handle);
        self.sync_overlay();

        let id = self.element_id(handle)?;
        self.host.set_visible(&id, false);
        if let Some(top) = self.stack.topmost() {
            let top_id = self.element_id(top)?;
            self.host.focus(&top_id);
        }

        info!(dialog = %id, depth = self.stack.len(), "dialog closed");
        self.run_hooks(handle, HookPhase::Closed)?;
        self.send_event(DialogEvent::Closed {
            handle,
            id: id.clone(),
        });

        if self.dialog(handle)?.removes_on_close() {
            self.host.remove_element(&id);
            self.dialog_mut(handle)?.attachment = Attachment::Detached;
            debug!(dialog = %id, "dialog detached");
            self.send_event(DialogEvent::Detached { handle, id });
        }

        Ok(Transition::Completed)
    }

    /// Change the id, renaming the live element when attached
    pub fn set_id(&mut self, handle: DialogHandle, id: impl Into<String>) -> DialogResult<()> {
        let id = id.into();
        let dialog = self.dialog(handle)?;
        if dialog.is_attached() {
            if id.is_empty() {
                return Err(DialogError::invalid_state("An attached dialog needs an ID"));
            }
            if self.find(&id).is_some_and(|other| other != handle) {
                return Err(DialogError::invalid_state(format!(
                    "Another attached dialog already uses ID '{}'",
                    id
                )));
            }
            let old = self.element_id(handle)?;
            self.host.rename_element(&old, &id);
        }
        self.dialog_mut(handle)?.set_id(id);
        Ok(())
    }

    /// Change the title, adding or removing the live titlebar as needed
    pub fn set_title(&mut self, handle: DialogHandle, title: impl AsRef<str>) -> DialogResult<()> {
        let dialog = self.dialog_mut(handle)?;
        let had_titlebar = dialog.titlebar().is_some();
        dialog.set_title(title);
        if !dialog.is_attached() {
            return Ok(());
        }

        let titlebar = dialog.titlebar().map(str::to_string);
        let events_bound = dialog.events_bound;
        let id = self.element_id(handle)?;
        self.host.set_titlebar(&id, titlebar.as_deref());
        if !had_titlebar && titlebar.is_some() && events_bound {
            self.host.subscribe(&id, HostSignal::TitlebarClose);
        }
        Ok(())
    }

    pub fn set_class_name(&mut self, handle: DialogHandle, class_name: impl AsRef<str>) -> DialogResult<()> {
        self.dialog_mut(handle)?.set_class_name(class_name);
        self.refresh_class(handle)
    }

    pub fn set_has_padding(&mut self, handle: DialogHandle, has_padding: bool) -> DialogResult<()> {
        self.dialog_mut(handle)?.set_has_padding(has_padding);
        self.refresh_class(handle)
    }

    /// Takes effect on the next focus loss or open
    pub fn set_modality(&mut self, handle: DialogHandle, modality: Modality) -> DialogResult<()> {
        self.dialog_mut(handle)?.set_modality(modality);
        Ok(())
    }

    /// Takes effect on the next open
    pub fn set_position(&mut self, handle: DialogHandle, position: Position) -> DialogResult<()> {
        self.dialog_mut(handle)?.set_position(position);
        Ok(())
    }

    pub fn set_remove_on_close(&mut self, handle: DialogHandle, remove: bool) -> DialogResult<()> {
        self.dialog_mut(handle)?.set_remove_on_close(remove);
        Ok(())
    }

    fn refresh_class(&mut self, handle: DialogHandle) -> DialogResult<()> {
        let dialog = self.dialog(handle)?;
        if dialog.is_attached() {
            let class = dialog.effective_class();
            let id = self.element_id(handle)?;
            self.host.set_class(&id, &class);
        }
        Ok(())
    }

    /// Subscribe to focus-loss and titlebar-close once per dialog
    fn bind_events(&mut self, handle: DialogHandle, id: &str) -> DialogResult<()> {
        let dialog = self.dialog_mut(handle)?;
        if dialog.events_bound {
            return Ok(());
        }
        dialog.events_bound = true;
        let has_titlebar = dialog.titlebar().is_some();

        self.host.subscribe(id, HostSignal::FocusOut);
        if has_titlebar {
            self.host.subscribe(id, HostSignal::TitlebarClose);
        }
        Ok(())
    }

    fn patch_for_legacy_host(&mut self, handle: DialogHandle, id: &str) -> DialogResult<()> {
        if !self.host.is_legacy() {
            return Ok(());
        }
        let dialog = self.dialog_mut(handle)?;
        if !dialog.legacy_patched {
            dialog.legacy_patched = true;
            self.host.apply_legacy_patch(id);
        }
        Ok(())
    }

    fn show_overlay_below(&mut self, dialog_z: i32) {
        let overlay = self
            .overlay
            .get_or_insert_with(|| ModalOverlay::create(&mut self.host, &self.config.overlay_element_id));
        overlay.show_below(&mut self.host, dialog_z);
    }

    /// Place the overlay under the topmost remaining modal, or hide it
    fn sync_overlay(&mut self) {
        let dialogs = &self.dialogs;
        let modal_z = self
            .stack
            .topmost_where(|entry| {
                dialogs
                    .get(&entry)
                    .is_some_and(|dialog| dialog.modality() == Modality::Modal)
            })
            .and_then(|entry| dialogs.get(&entry))
            .and_then(|dialog| dialog.z_index);

        match modal_z {
            Some(z_index) => self.show_overlay_below(z_index),
            None => {
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.hide(&mut self.host);
                }
            }
        }
    }
}
