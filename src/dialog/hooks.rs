//! Lifecycle hooks and published events
//!
//! Hooks are registered per dialog and invoked synchronously in registration
//! order. `on_opening` and `on_closing` may return [`Decision::Cancel`]; the
//! first cancel stops the remaining hooks and vetoes the transition.

use super::types::{Decision, DialogHandle, Modality};
use serde::Serialize;

/// Data passed to every hook invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub handle: DialogHandle,
    pub id: String,
    pub modality: Modality,
}

/// Callback trait for dialog lifecycle transitions
pub trait DialogHook {
    /// Called before a dialog opens
    fn on_opening(&mut self, event: &LifecycleEvent) -> Decision {
        let _ = event;
        Decision::Proceed
    }

    /// Called after a dialog has opened and received focus
    fn on_opened(&mut self, event: &LifecycleEvent) {
        let _ = event;
    }

    /// Called before a dialog closes
    fn on_closing(&mut self, event: &LifecycleEvent) -> Decision {
        let _ = event;
        Decision::Proceed
    }

    /// Called after a dialog has closed
    fn on_closed(&mut self, event: &LifecycleEvent) {
        let _ = event;
    }
}

/// Hook built from a closure that can veto closing
pub struct ClosingGuard<F>(pub F);

impl<F> DialogHook for ClosingGuard<F>
where
    F: FnMut(&LifecycleEvent) -> Decision,
{
    fn on_closing(&mut self, event: &LifecycleEvent) -> Decision {
        (self.0)(event)
    }
}

/// Hook built from a closure that can veto opening
pub struct OpeningGuard<F>(pub F);

impl<F> DialogHook for OpeningGuard<F>
where
    F: FnMut(&LifecycleEvent) -> Decision,
{
    fn on_opening(&mut self, event: &LifecycleEvent) -> Decision {
        (self.0)(event)
    }
}

/// Events published by a [`DialogContext`](crate::runtime::DialogContext)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum DialogEvent {
    Opened {
        handle: DialogHandle,
        id: String,
        #[serde(rename = "zIndex")]
        z_index: i32,
    },
    Closed { handle: DialogHandle, id: String },
    /// The dialog's element was removed after closing
    Detached { handle: DialogHandle, id: String },
}

/// Which hook to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HookPhase {
    Opening,
    Opened,
    Closing,
    Closed,
}

/// Run `hooks` for `phase`, stopping at the first cancel
pub(crate) fn run_hooks(
    hooks: &mut [Box<dyn DialogHook>],
    phase: HookPhase,
    event: &LifecycleEvent,
) -> Decision {
    for hook in hooks.iter_mut() {
        let decision = match phase {
            HookPhase::Opening => hook.on_opening(event),
            HookPhase::Closing => hook.on_closing(event),
            HookPhase::Opened => {
                hook.on_opened(event);
                Decision::Proceed
            }
            HookPhase::Closed => {
                hook.on_closed(event);
                Decision::Proceed
            }
        };
        if decision == Decision::Cancel {
            return Decision::Cancel;
        }
    }
    Decision::Proceed
}
