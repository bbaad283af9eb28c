//! Dialog context
//!
//! The `DialogContext` owns everything dialogs share: the host, the stack of
//! open dialogs, the modal overlay and the deferred task queue. The host
//! application creates one context per visual host and performs every
//! lifecycle operation through it, so there is exactly one active stack
//! without any global state.
//!
//! All mutation happens on the caller's thread. Focus-loss signals are never
//! handled inline: they are queued and run by [`DialogContext::run_deferred`]
//! (or [`DialogContext::next_deferred`]) once the host has settled the new
//! focus target.

pub mod focus;
pub mod lifecycle;
pub mod overlay;
pub mod stack;

pub use focus::{FocusArbiter, FocusVerdict};
pub use overlay::ModalOverlay;
pub use stack::DialogStack;

use crate::config::RuntimeConfig;
use crate::dialog::hooks::{self, HookPhase};
use crate::dialog::{
    ControlRegistry, Decision, Dialog, DialogConfig, DialogEvent, DialogHandle, LifecycleEvent,
    LifecycleState, Modality,
};
use crate::error::{DialogError, DialogResult};
use crate::host::{Host, HostEvent};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Rounds of poll/dispatch/drain before `pump` gives up
const MAX_PUMP_ROUNDS: usize = 16;

/// Work scheduled to run after the current host event settles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeferredTask {
    FocusOut {
        handle: DialogHandle,
        modality: Modality,
    },
}

/// Shared state for all dialogs of one host
pub struct DialogContext<H: Host> {
    host: H,
    config: RuntimeConfig,
    registry: ControlRegistry,

    dialogs: HashMap<DialogHandle, Dialog>,
    next_handle: u64,

    /// Open dialogs, last = topmost
    stack: DialogStack,

    /// Created on first modal open
    overlay: Option<ModalOverlay>,

    deferred_tx: mpsc::UnboundedSender<DeferredTask>,
    deferred_rx: mpsc::UnboundedReceiver<DeferredTask>,

    event_sender: Option<mpsc::UnboundedSender<DialogEvent>>,
}

impl<H: Host> DialogContext<H> {
    /// Create a context with the default configuration
    pub fn new(host: H) -> Self {
        Self::with_config(host, RuntimeConfig::default())
    }

    pub fn with_config(host: H, config: RuntimeConfig) -> Self {
        let (deferred_tx, deferred_rx) = mpsc::unbounded_channel();
        Self {
            host,
            config,
            registry: ControlRegistry::default(),
            dialogs: HashMap::new(),
            next_handle: 1,
            stack: DialogStack::new(),
            overlay: None,
            deferred_tx,
            deferred_rx,
            event_sender: None,
        }
    }

    /// Set the event sender for dialog events
    pub fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<DialogEvent>) {
        self.event_sender = Some(sender);
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Registry used by [`restore`](Self::restore) to rebuild nested controls
    pub fn registry_mut(&mut self) -> &mut ControlRegistry {
        &mut self.registry
    }

    pub fn stack(&self) -> &DialogStack {
        &self.stack
    }

    /// The modal overlay, once it has been created
    pub fn overlay(&self) -> Option<&ModalOverlay> {
        self.overlay.as_ref()
    }

    /// Take ownership of a dialog. It stays unattached until [`attach`](Self::attach).
    pub fn insert(&mut self, dialog: Dialog) -> DialogHandle {
        let handle = DialogHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        debug!(dialog = %handle, id = ?dialog.id(), "dialog inserted");
        self.dialogs.insert(handle, dialog);
        handle
    }

    /// Rebuild a dialog from its JSON snapshot and attach it
    pub fn restore(&mut self, json: &str) -> DialogResult<DialogHandle> {
        let dialog = DialogConfig::from_json(json)?.into_dialog(&self.registry)?;
        let handle = self.insert(dialog);
        if let Err(e) = self.attach(handle) {
            self.dialogs.remove(&handle);
            return Err(e);
        }
        Ok(handle)
    }

    /// Give a dialog back to the caller, removing its element if attached.
    ///
    /// Open dialogs must be closed first.
    pub fn release(&mut self, handle: DialogHandle) -> DialogResult<Dialog> {
        if self.is_open(handle)? {
            return Err(DialogError::invalid_state("Cannot release an open dialog"));
        }
        let dialog = self
            .dialogs
            .remove(&handle)
            .ok_or(DialogError::NotFound(handle))?;
        if dialog.is_attached() {
            if let Some(id) = dialog.id() {
                self.host.remove_element(id);
            }
        }
        Ok(dialog)
    }

    pub fn dialog(&self, handle: DialogHandle) -> DialogResult<&Dialog> {
        self.dialogs.get(&handle).ok_or(DialogError::NotFound(handle))
    }

    pub(crate) fn dialog_mut(&mut self, handle: DialogHandle) -> DialogResult<&mut Dialog> {
        self.dialogs
            .get_mut(&handle)
            .ok_or(DialogError::NotFound(handle))
    }

    /// Attached dialog whose element has `id`
    pub fn find(&self, id: &str) -> Option<DialogHandle> {
        self.dialogs
            .iter()
            .find(|(_, dialog)| dialog.is_attached() && dialog.id() == Some(id))
            .map(|(&handle, _)| handle)
    }

    /// Whether the dialog's element is attached and visible
    pub fn is_open(&self, handle: DialogHandle) -> DialogResult<bool> {
        let dialog = self.dialog(handle)?;
        Ok(dialog.is_attached()
            && dialog
                .id()
                .is_some_and(|id| self.host.is_visible(id)))
    }

    pub fn state(&self, handle: DialogHandle) -> DialogResult<LifecycleState> {
        let dialog = self.dialog(handle)?;
        Ok(if dialog.is_detached() {
            LifecycleState::Detached
        } else if !dialog.is_attached() {
            LifecycleState::Unattached
        } else if self.is_open(handle)? {
            LifecycleState::Open
        } else {
            LifecycleState::Closed
        })
    }

    /// Handle a signal reported by the host
    pub fn dispatch(&mut self, event: HostEvent) -> DialogResult<()> {
        match event {
            HostEvent::FocusLost { element } => {
                let Some(handle) = self.find(&element) else {
                    return Ok(());
                };
                let dialog = self.dialog(handle)?;
                if dialog.events_bound && dialog.modality() != Modality::Modeless {
                    let modality = dialog.modality();
                    debug!(dialog = %element, ?modality, "deferring focus-out handling");
                    self.defer(DeferredTask::FocusOut { handle, modality });
                }
            }
            HostEvent::TitlebarCloseClicked { element } => {
                if let Some(handle) = self.find(&element) {
                    self.close(handle)?;
                }
            }
            HostEvent::ViewportChanged => {
                if let Some(overlay) = &self.overlay {
                    overlay.reposition(&mut self.host);
                }
            }
        }
        Ok(())
    }

    fn defer(&self, task: DeferredTask) {
        // The receiver lives in `self`, so the channel cannot be closed here.
        let _ = self.deferred_tx.send(task);
    }

    /// Run every queued task in FIFO order, returning how many ran
    pub fn run_deferred(&mut self) -> DialogResult<usize> {
        let mut ran = 0;
        while let Ok(task) = self.deferred_rx.try_recv() {
            self.run_task(task)?;
            ran += 1;
        }
        Ok(ran)
    }

    /// Wait for the next queued task and run it
    pub async fn next_deferred(&mut self) -> DialogResult<()> {
        if let Some(task) = self.deferred_rx.recv().await {
            self.run_task(task)?;
        }
        Ok(())
    }

    /// Poll the host, dispatch its signals and drain deferred tasks until
    /// nothing is left. Returns the number of signals and tasks handled.
    ///
    /// Every polled signal is dispatched even if an earlier one fails; the
    /// first failure is returned once the whole batch has been delivered.
    pub fn pump(&mut self) -> DialogResult<usize> {
        let mut handled = 0;
        for _ in 0..MAX_PUMP_ROUNDS {
            let events = self.host.poll_events();
            let mut progressed = !events.is_empty();
            let mut first_error = None;
            for event in events {
                if let Err(e) = self.dispatch(event) {
                    warn!("Failed to dispatch host event: {}", e);
                    first_error.get_or_insert(e);
                }
                handled += 1;
            }
            if let Some(e) = first_error {
                return Err(e);
            }

            let ran = self.run_deferred()?;
            progressed |= ran > 0;
            handled += ran;

            if !progressed {
                return Ok(handled);
            }
        }
        warn!("Host kept producing events; stopped after {} rounds", MAX_PUMP_ROUNDS);
        Ok(handled)
    }

    fn run_task(&mut self, task: DeferredTask) -> DialogResult<()> {
        match task {
            DeferredTask::FocusOut { handle, modality } => self.handle_focus_out(handle, modality),
        }
    }

    pub(crate) fn element_id(&self, handle: DialogHandle) -> DialogResult<String> {
        self.dialog(handle)?
            .id()
            .map(str::to_string)
            .ok_or_else(|| DialogError::invalid_state(format!("dialog {} has no ID", handle)))
    }

    pub(crate) fn run_hooks(&mut self, handle: DialogHandle, phase: HookPhase) -> DialogResult<Decision> {
        let dialog = self.dialog_mut(handle)?;
        let event = LifecycleEvent {
            handle,
            id: dialog.id().unwrap_or_default().to_string(),
            modality: dialog.modality(),
        };
        Ok(hooks::run_hooks(&mut dialog.hooks, phase, &event))
    }

    pub(crate) fn send_event(&self, event: DialogEvent) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(event);
        }
    }
}

impl<H: Host + std::fmt::Debug> std::fmt::Debug for DialogContext<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogContext")
            .field("host", &self.host)
            .field("config", &self.config)
            .field("dialogs", &self.dialogs.len())
            .field("stack", &self.stack)
            .field("overlay", &self.overlay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{Modality, Position};
    use crate::host::{HeadlessHost, HostSignal, Size, Viewport};

    fn context() -> DialogContext<HeadlessHost> {
        DialogContext::new(HeadlessHost::new(Viewport {
            width: 1024,
            height: 768,
            scroll_left: 0,
            scroll_top: 0,
        }))
    }

    #[test]
    fn test_insert_assigns_distinct_handles() {
        let mut ctx = context();
        let a = ctx.insert(Dialog::frame().with_id("a"));
        let b = ctx.insert(Dialog::frame().with_id("b"));
        assert_ne!(a, b);
        assert_eq!(ctx.state(a).unwrap(), LifecycleState::Unattached);
        assert_eq!(ctx.find("a"), None);
    }

    #[test]
    fn test_restore_attaches() {
        let mut ctx = context();
        let json = serde_json::json!({
            "id": "restored",
            "modality": 2,
            "title": null,
            "position": {"anchor": "center"},
            "hasPadding": true,
            "className": "",
            "removeOnClose": false
        })
        .to_string();

        let handle = ctx.restore(&json).unwrap();
        assert_eq!(ctx.state(handle).unwrap(), LifecycleState::Closed);
        assert_eq!(ctx.find("restored"), Some(handle));
        assert_eq!(ctx.dialog(handle).unwrap().modality(), Modality::HideOnFocusOut);
    }

    #[test]
    fn test_restore_rejects_incomplete_snapshot() {
        let mut ctx = context();
        let err = ctx.restore(r#"{"id": "x"}"#).unwrap_err();
        assert!(matches!(err, DialogError::ConfigurationMismatch(_)));
        assert!(ctx.host().document_order().is_empty());
    }

    #[test]
    fn test_restore_duplicate_id_leaves_no_partial_dialog() {
        let mut ctx = context();
        let first = ctx.insert(Dialog::frame().with_id("dup"));
        ctx.attach(first).unwrap();

        let json = serde_json::to_string(&ctx.dialog(first).unwrap().to_config().unwrap()).unwrap();
        assert!(ctx.restore(&json).unwrap_err().is_invalid_state());
        assert_eq!(ctx.find("dup"), Some(first));
    }

    #[test]
    fn test_release_rules() {
        let mut ctx = context();
        let handle = ctx.insert(Dialog::frame().with_id("gone"));
        ctx.attach(handle).unwrap();
        ctx.open(handle).unwrap();
        assert!(ctx.release(handle).unwrap_err().is_invalid_state());

        ctx.close(handle).unwrap();
        let dialog = ctx.release(handle).unwrap();
        assert_eq!(dialog.id(), Some("gone"));
        assert!(!ctx.host().has_element("gone"));
        assert!(matches!(ctx.dialog(handle), Err(DialogError::NotFound(_))));
    }

    #[test]
    fn test_focus_loss_of_modeless_dialog_is_not_deferred() {
        let mut ctx = context();
        let handle = ctx.insert(Dialog::frame().with_id("m"));
        ctx.attach(handle).unwrap();
        ctx.open(handle).unwrap();

        ctx.dispatch(HostEvent::FocusLost {
            element: "m".to_string(),
        })
        .unwrap();
        assert_eq!(ctx.run_deferred().unwrap(), 0);
    }

    #[test]
    fn test_focus_loss_before_first_open_is_ignored() {
        let mut ctx = context();
        let handle = ctx.insert(
            Dialog::frame()
                .with_id("never")
                .with_modality(Modality::Modal),
        );
        ctx.attach(handle).unwrap();

        ctx.dispatch(HostEvent::FocusLost {
            element: "never".to_string(),
        })
        .unwrap();
        assert_eq!(ctx.run_deferred().unwrap(), 0);
    }

    #[test]
    fn test_viewport_signal_repositions_legacy_overlay() {
        let mut ctx = DialogContext::new(HeadlessHost::legacy(Viewport {
            width: 300,
            height: 200,
            scroll_left: 0,
            scroll_top: 0,
        }));
        let handle = ctx.insert(
            Dialog::frame()
                .with_id("modal")
                .with_modality(Modality::Modal)
                .with_position(Position::at(5, 5)),
        );
        ctx.attach(handle).unwrap();
        ctx.open(handle).unwrap();

        let overlay_id = ctx.config().overlay_element_id.clone();
        assert!(ctx
            .host()
            .element(&overlay_id)
            .unwrap()
            .is_subscribed(HostSignal::Viewport));

        ctx.host_mut().scroll_to(40, 90);
        ctx.pump().unwrap();

        let bounds = ctx.host().element(&overlay_id).unwrap().bounds.unwrap();
        assert_eq!((bounds.left, bounds.top, bounds.width, bounds.height), (40, 90, 300, 200));
    }

    #[test]
    fn test_pump_delivers_every_signal_in_a_batch() {
        let mut ctx = context();
        let mut handles = Vec::new();
        for id in ["first", "second", "third"] {
            let handle = ctx.insert(
                Dialog::frame()
                    .with_id(id)
                    .with_title(id)
                    .with_position(Position::at(0, 0)),
            );
            ctx.attach(handle).unwrap();
            ctx.open(handle).unwrap();
            handles.push(handle);
        }
        ctx.pump().unwrap();

        for id in ["first", "second", "third"] {
            ctx.host_mut().click_titlebar_close(id);
        }
        assert!(ctx.pump().unwrap() >= 3);

        for handle in handles {
            assert!(!ctx.is_open(handle).unwrap());
        }
        assert!(ctx.stack().is_empty());
    }

    #[tokio::test]
    async fn test_next_deferred_runs_queued_focus_out() {
        let mut ctx = context();
        let handle = ctx.insert(
            Dialog::frame()
                .with_id("trap")
                .with_modality(Modality::Modal),
        );
        ctx.attach(handle).unwrap();
        ctx.host_mut().add_element("outside", None);
        ctx.host_mut().set_element_size("trap", Size::new(100, 50));
        ctx.open(handle).unwrap();
        assert_eq!(ctx.host().focus_count("trap"), 1);

        ctx.host_mut().focus("outside");
        for event in ctx.host_mut().poll_events() {
            ctx.dispatch(event).unwrap();
        }
        ctx.next_deferred().await.unwrap();

        assert_eq!(ctx.host().focus_count("trap"), 2);
        assert_eq!(ctx.host().focused_element().as_deref(), Some("trap"));
    }

    #[test]
    fn test_events_are_published() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ctx = context();
        ctx.set_event_sender(tx);

        let handle = ctx.insert(Dialog::frame().with_id("pub").remove_on_close(true));
        ctx.attach(handle).unwrap();
        ctx.open(handle).unwrap();
        ctx.close(handle).unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            DialogEvent::Opened {
                handle,
                id: "pub".to_string(),
                z_index: 10000
            }
        );
        assert!(matches!(rx.try_recv().unwrap(), DialogEvent::Closed { .. }));
        assert!(matches!(rx.try_recv().unwrap(), DialogEvent::Detached { .. }));
    }
}
