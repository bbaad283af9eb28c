//! Focus arbitration
//!
//! When a non-modeless dialog loses focus, the arbiter decides what happens
//! based on where focus went. Focus moving into a dialog opened later is
//! always allowed; otherwise a modal dialog takes focus back and a
//! hide-on-focus-out dialog asks to be closed.

use super::stack::DialogStack;
use super::DialogContext;
use crate::dialog::{DialogHandle, Modality, Transition};
use crate::error::DialogResult;
use crate::host::Host;
use tracing::debug;

/// Outcome of a focus-loss check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusVerdict {
    /// The dialog does not police focus, or is no longer open
    Ignore,
    /// Focus went somewhere the dialog tolerates
    Allow,
    /// Give focus back to the dialog
    Refocus,
    /// Close the dialog
    Dismiss,
}

/// Stateless focus policy
pub struct FocusArbiter;

impl FocusArbiter {
    /// Decide how `handle` reacts to losing focus.
    ///
    /// `covers(entry)` reports whether the new focus target lies inside the
    /// element of `entry`. Modal dialogs only consult dialogs opened after
    /// them; hide-on-focus-out dialogs also count focus that stayed inside
    /// themselves.
    pub fn decide<F>(
        modality: Modality,
        stack: &DialogStack,
        handle: DialogHandle,
        mut covers: F,
    ) -> FocusVerdict
    where
        F: FnMut(DialogHandle) -> bool,
    {
        let Some(index) = stack.position(handle) else {
            return FocusVerdict::Ignore;
        };
        let entries = stack.entries();
        let candidates = match modality {
            Modality::Modeless => return FocusVerdict::Ignore,
            Modality::Modal => &entries[index + 1..],
            Modality::HideOnFocusOut => &entries[index..],
        };

        if candidates.iter().any(|&entry| covers(entry)) {
            return FocusVerdict::Allow;
        }
        match modality {
            Modality::Modal => FocusVerdict::Refocus,
            _ => FocusVerdict::Dismiss,
        }
    }
}

impl<H: Host> DialogContext<H> {
    /// Deferred focus-out handling, run once the host has settled the new
    /// focus target. `modality` is the one in effect when focus was lost.
    pub(crate) fn handle_focus_out(&mut self, handle: DialogHandle, modality: Modality) -> DialogResult<()> {
        let Ok(dialog) = self.dialog(handle) else {
            return Ok(());
        };
        let Some(id) = dialog.id().map(str::to_string) else {
            return Ok(());
        };

        let target = self.host.focused_element();
        let verdict = FocusArbiter::decide(modality, &self.stack, handle, |entry| {
            let Some(target) = target.as_deref() else {
                return false;
            };
            self.dialogs
                .get(&entry)
                .and_then(|dialog| dialog.id())
                .is_some_and(|entry_id| self.host.contains(entry_id, target))
        });
        debug!(dialog = %id, ?verdict, target = ?target, "focus left dialog");

        match verdict {
            FocusVerdict::Ignore | FocusVerdict::Allow => {}
            FocusVerdict::Refocus => self.host.focus(&id),
            FocusVerdict::Dismiss => {
                if self.close(handle)? == Transition::Vetoed {
                    self.host.focus(&id);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::hooks::{ClosingGuard, DialogHook, LifecycleEvent};
    use crate::dialog::{Decision, Dialog, Position};
    use crate::host::{HeadlessHost, Viewport};
    use std::cell::Cell;
    use std::rc::Rc;

    fn h(raw: u64) -> DialogHandle {
        DialogHandle::from_raw(raw)
    }

    fn stack_of(raws: &[u64]) -> DialogStack {
        let mut stack = DialogStack::new();
        for &raw in raws {
            stack.push(h(raw));
        }
        stack
    }

    #[test]
    fn test_decide_modeless_and_unknown_ignored() {
        let stack = stack_of(&[1, 2]);
        assert_eq!(
            FocusArbiter::decide(Modality::Modeless, &stack, h(1), |_| false),
            FocusVerdict::Ignore
        );
        assert_eq!(
            FocusArbiter::decide(Modality::Modal, &stack, h(9), |_| false),
            FocusVerdict::Ignore
        );
    }

    #[test]
    fn test_decide_modal_checks_only_later_dialogs() {
        let stack = stack_of(&[1, 2, 3]);
        assert_eq!(
            FocusArbiter::decide(Modality::Modal, &stack, h(2), |entry| entry == h(3)),
            FocusVerdict::Allow
        );
        assert_eq!(
            FocusArbiter::decide(Modality::Modal, &stack, h(2), |entry| entry == h(2)),
            FocusVerdict::Refocus
        );
        assert_eq!(
            FocusArbiter::decide(Modality::Modal, &stack, h(2), |entry| entry == h(1)),
            FocusVerdict::Refocus
        );
    }

    #[test]
    fn test_decide_hide_on_focus_out_includes_self() {
        let stack = stack_of(&[1, 2]);
        assert_eq!(
            FocusArbiter::decide(Modality::HideOnFocusOut, &stack, h(1), |entry| entry == h(1)),
            FocusVerdict::Allow
        );
        assert_eq!(
            FocusArbiter::decide(Modality::HideOnFocusOut, &stack, h(2), |entry| entry == h(1)),
            FocusVerdict::Dismiss
        );
    }

    fn context() -> DialogContext<HeadlessHost> {
        let mut host = HeadlessHost::new(Viewport {
            width: 800,
            height: 600,
            scroll_left: 0,
            scroll_top: 0,
        });
        host.add_element("page", None);
        DialogContext::new(host)
    }

    fn open(ctx: &mut DialogContext<HeadlessHost>, dialog: Dialog) -> DialogHandle {
        let handle = ctx.insert(dialog.with_position(Position::at(0, 0)));
        ctx.attach(handle).unwrap();
        ctx.open(handle).unwrap();
        handle
    }

    struct CloseCounter(Rc<Cell<usize>>);

    impl DialogHook for CloseCounter {
        fn on_closing(&mut self, _event: &LifecycleEvent) -> Decision {
            self.0.set(self.0.get() + 1);
            Decision::Proceed
        }
    }

    #[test]
    fn test_hide_on_focus_out_closes_once() {
        let mut ctx = context();
        let closes = Rc::new(Cell::new(0));
        let popup = open(
            &mut ctx,
            Dialog::frame()
                .with_id("popup")
                .with_modality(Modality::HideOnFocusOut)
                .with_hook(CloseCounter(closes.clone())),
        );

        ctx.host_mut().focus("page");
        ctx.pump().unwrap();

        assert!(!ctx.is_open(popup).unwrap());
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_hide_on_focus_out_keeps_focus_inside_itself() {
        let mut ctx = context();
        let popup = open(
            &mut ctx,
            Dialog::frame()
                .with_id("popup")
                .with_modality(Modality::HideOnFocusOut),
        );
        ctx.host_mut().add_element("popup-field", Some("popup"));

        ctx.host_mut().focus("popup-field");
        ctx.pump().unwrap();

        assert!(ctx.is_open(popup).unwrap());
    }

    #[test]
    fn test_vetoed_dismiss_takes_focus_back() {
        let mut ctx = context();
        let popup = open(
            &mut ctx,
            Dialog::frame()
                .with_id("popup")
                .with_modality(Modality::HideOnFocusOut)
                .with_hook(ClosingGuard(|_: &LifecycleEvent| Decision::Cancel)),
        );

        ctx.host_mut().focus("page");
        ctx.pump().unwrap();

        assert!(ctx.is_open(popup).unwrap());
        assert_eq!(ctx.host().focused_element().as_deref(), Some("popup"));
    }

    #[test]
    fn test_modal_refocuses_exactly_once() {
        let mut ctx = context();
        open(
            &mut ctx,
            Dialog::frame().with_id("modal").with_modality(Modality::Modal),
        );
        assert_eq!(ctx.host().focus_count("modal"), 1);

        ctx.host_mut().focus("page");
        ctx.pump().unwrap();

        assert_eq!(ctx.host().focus_count("modal"), 2);
        assert_eq!(ctx.host().focused_element().as_deref(), Some("modal"));
    }

    #[test]
    fn test_modal_allows_focus_into_later_dialog() {
        let mut ctx = context();
        open(
            &mut ctx,
            Dialog::frame().with_id("modal").with_modality(Modality::Modal),
        );
        open(&mut ctx, Dialog::frame().with_id("child"));
        ctx.pump().unwrap();

        assert_eq!(ctx.host().focus_count("modal"), 1);
        assert_eq!(ctx.host().focused_element().as_deref(), Some("child"));
    }

    fn dispatch_pending(ctx: &mut DialogContext<HeadlessHost>) {
        for event in ctx.host_mut().poll_events() {
            ctx.dispatch(event).unwrap();
        }
    }

    #[test]
    fn test_modality_captured_when_focus_is_lost() {
        let mut ctx = context();
        let handle = open(
            &mut ctx,
            Dialog::frame().with_id("modal").with_modality(Modality::Modal),
        );

        ctx.host_mut().focus("page");
        dispatch_pending(&mut ctx);
        ctx.set_modality(handle, Modality::Modeless).unwrap();
        ctx.run_deferred().unwrap();

        assert_eq!(ctx.host().focused_element().as_deref(), Some("modal"));
    }

    #[test]
    fn test_task_for_released_dialog_is_dropped() {
        let mut ctx = context();
        let handle = open(
            &mut ctx,
            Dialog::frame().with_id("modal").with_modality(Modality::Modal),
        );
        ctx.host_mut().focus("page");
        dispatch_pending(&mut ctx);

        ctx.close(handle).unwrap();
        ctx.release(handle).unwrap();

        assert_eq!(ctx.run_deferred().unwrap(), 1);
        assert_eq!(ctx.host().focused_element().as_deref(), Some("page"));
    }
}
