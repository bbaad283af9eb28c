//! The dialog entity
//!
//! A `Dialog` carries the per-instance configuration plus the runtime flags
//! the lifecycle needs. Before it is inserted into a context its properties
//! are plain setters; afterwards, changes that affect the live element go
//! through the context so the host stays in sync.

use super::control::NestedControl;
use super::hooks::DialogHook;
use super::types::{Attachment, Modality, Position};
use crate::error::{DialogError, DialogResult};
use v_htmlescape::escape;

/// Classes every dialog element carries
pub const BASE_CLASS: &str = "ui-dialog ui-widget ui-widget-content ui-corner-all";

/// Class added when a dialog has no content padding
pub const NO_PADDING_CLASS: &str = "NoPaddingDialog";

/// Appended to the dialog id to form the nested control id
pub const CONTROL_ID_SUFFIX: &str = "_control";

/// Content of a dialog
pub enum DialogBody {
    /// Pre-rendered opaque fragment
    Frame { html: String },
    /// Sub-control that renders itself
    Control(Box<dyn NestedControl>),
}

impl DialogBody {
    pub fn is_control(&self) -> bool {
        matches!(self, Self::Control(_))
    }
}

impl std::fmt::Debug for DialogBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frame { html } => f.debug_struct("Frame").field("html", html).finish(),
            Self::Control(control) => f
                .debug_struct("Control")
                .field("type_name", &control.type_name())
                .field("id", &control.id())
                .finish(),
        }
    }
}

/// A stacked overlay dialog
pub struct Dialog {
    id: Option<String>,
    title: String,
    modality: Modality,
    position: Position,
    class_name: String,
    has_padding: bool,
    remove_on_close: bool,
    body: DialogBody,
    pub(crate) hooks: Vec<Box<dyn DialogHook>>,

    pub(crate) attachment: Attachment,
    pub(crate) z_index: Option<i32>,
    pub(crate) events_bound: bool,
    pub(crate) legacy_patched: bool,
}

impl Dialog {
    /// Create a frame dialog with an empty body
    pub fn frame() -> Self {
        Self::with_body(DialogBody::Frame { html: String::new() })
    }

    /// Create a dialog hosting `control`
    pub fn control(control: Box<dyn NestedControl>) -> DialogResult<Self> {
        let mut dialog = Self::with_body(DialogBody::Frame { html: String::new() });
        dialog.set_contained_control(control)?;
        Ok(dialog)
    }

    fn with_body(body: DialogBody) -> Self {
        Self {
            id: None,
            title: String::new(),
            modality: Modality::Modeless,
            position: Position::Center,
            class_name: String::new(),
            has_padding: true,
            remove_on_close: false,
            body,
            hooks: Vec::new(),
            attachment: Attachment::Unattached,
            z_index: None,
            events_bound: false,
            legacy_patched: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.set_id(id);
        self
    }

    pub fn with_title(mut self, title: impl AsRef<str>) -> Self {
        self.set_title(title);
        self
    }

    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_class_name(mut self, class_name: impl AsRef<str>) -> Self {
        self.set_class_name(class_name);
        self
    }

    pub fn with_padding(mut self, has_padding: bool) -> Self {
        self.has_padding = has_padding;
        self
    }

    pub fn remove_on_close(mut self, remove: bool) -> Self {
        self.remove_on_close = remove;
        self
    }

    pub fn with_hook(mut self, hook: impl DialogHook + 'static) -> Self {
        self.add_hook(hook);
        self
    }

    pub fn add_hook(&mut self, hook: impl DialogHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Set the id, propagating it to the nested control
    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        if let DialogBody::Control(control) = &mut self.body {
            control.set_id(format!("{}{}", id, CONTROL_ID_SUFFIX));
        }
        self.id = Some(id);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl AsRef<str>) {
        self.title = title.as_ref().trim().to_string();
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn set_modality(&mut self, modality: Modality) {
        self.modality = modality;
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn set_class_name(&mut self, class_name: impl AsRef<str>) {
        self.class_name = class_name.as_ref().trim().to_string();
    }

    pub fn has_padding(&self) -> bool {
        self.has_padding
    }

    pub fn set_has_padding(&mut self, has_padding: bool) {
        self.has_padding = has_padding;
    }

    pub fn removes_on_close(&self) -> bool {
        self.remove_on_close
    }

    pub fn set_remove_on_close(&mut self, remove: bool) {
        self.remove_on_close = remove;
    }

    pub fn body(&self) -> &DialogBody {
        &self.body
    }

    pub(crate) fn body_mut(&mut self) -> &mut DialogBody {
        &mut self.body
    }

    /// The hosted control, if this is a control-hosting dialog
    pub fn contained_control(&self) -> Option<&dyn NestedControl> {
        match &self.body {
            DialogBody::Control(control) => Some(control.as_ref()),
            DialogBody::Frame { .. } => None,
        }
    }

    /// Install the control this dialog hosts.
    ///
    /// The control must not have been attached yet.
    pub fn set_contained_control(&mut self, mut control: Box<dyn NestedControl>) -> DialogResult<()> {
        if control.is_attached() {
            return Err(DialogError::invalid_state("The control must not be rendered"));
        }
        if let Some(id) = &self.id {
            control.set_id(format!("{}{}", id, CONTROL_ID_SUFFIX));
        }
        self.body = DialogBody::Control(control);
        Ok(())
    }

    /// Replace the frame body with the concatenation of `fragments`
    pub fn set_inner_fragments<I>(&mut self, fragments: I) -> DialogResult<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if self.attachment != Attachment::Unattached {
            return Err(DialogError::invalid_state("Can't change inner HTML after render"));
        }
        match &mut self.body {
            DialogBody::Frame { html } => {
                *html = fragments
                    .into_iter()
                    .fold(String::new(), |mut acc, fragment| {
                        acc.push_str(fragment.as_ref());
                        acc
                    });
                Ok(())
            }
            DialogBody::Control(_) => Err(DialogError::invalid_state(
                "Control-hosting dialogs render their control, not fragments",
            )),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment == Attachment::Attached
    }

    pub fn is_detached(&self) -> bool {
        self.attachment == Attachment::Detached
    }

    /// Z-index assigned the last time the dialog opened
    pub fn z_index(&self) -> Option<i32> {
        self.z_index
    }

    /// Class attribute of the dialog element
    pub fn effective_class(&self) -> String {
        let mut class = BASE_CLASS.to_string();
        if !self.has_padding {
            class.push(' ');
            class.push_str(NO_PADDING_CLASS);
        }
        if !self.class_name.is_empty() {
            class.push(' ');
            class.push_str(&self.class_name);
        }
        class
    }

    /// Titlebar text, `None` when the dialog has no titlebar
    pub fn titlebar(&self) -> Option<&str> {
        (!self.title.is_empty()).then_some(self.title.as_str())
    }

    /// Markup for the dialog element
    pub fn render(&self) -> DialogResult<String> {
        let id = self
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DialogError::invalid_state("Must set ID before render"))?;

        let body = match &self.body {
            DialogBody::Frame { html } => html.clone(),
            DialogBody::Control(control) => control.render()?,
        };

        let titlebar = self
            .titlebar()
            .map(|title| {
                format!(
                    "<div class=\"ui-dialog-titlebar ui-widget-header ui-corner-all ui-helper-clearfix\">\
                     <span class=\"ui-dialog-title\">{}</span>\
                     <a class=\"ui-dialog-titlebar-close ui-corner-all\" href=\"#\">close</a>\
                     </div>",
                    escape(title)
                )
            })
            .unwrap_or_default();

        Ok(format!(
            "<div id=\"{}\" style=\"position: absolute; width: auto\" class=\"{}\" tabindex=\"-1\">\
             {}<div class=\"ui-dialog-content ui-widget-content\">{}</div></div>",
            escape(id),
            escape(&self.effective_class()),
            titlebar,
            body
        ))
    }
}

impl std::fmt::Debug for Dialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dialog")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("modality", &self.modality)
            .field("position", &self.position)
            .field("attachment", &self.attachment)
            .field("z_index", &self.z_index)
            .field("body", &self.body)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
