//! Stacked dialog lifecycle and focus arbitration.
//!
//! Dialogs are created detached, attached to a [`Host`], then opened and
//! closed any number of times. Open dialogs form a stack ordered by opening
//! time: later dialogs sit above earlier ones, a single shared overlay blocks
//! everything below the topmost modal dialog, and focus that leaves a modal
//! or hide-on-focus-out dialog is arbitrated against the rest of the stack.
//!
//! ```no_run
//! use dialog_stack::{Dialog, DialogContext, HeadlessHost, Modality};
//!
//! # fn main() -> dialog_stack::DialogResult<()> {
//! let mut ctx = DialogContext::new(HeadlessHost::default());
//! let confirm = ctx.insert(
//!     Dialog::frame()
//!         .with_id("confirm")
//!         .with_title("Discard changes?")
//!         .with_modality(Modality::Modal),
//! );
//! ctx.attach(confirm)?;
//! ctx.open(confirm)?;
//! ctx.pump()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dialog;
pub mod error;
pub mod host;
pub mod logging;
pub mod runtime;

pub use config::RuntimeConfig;
pub use dialog::{
    ClosingGuard, ControlRegistry, Decision, Dialog, DialogBody, DialogConfig, DialogEvent,
    DialogHandle, DialogHook, LifecycleEvent, LifecycleState, Modality, NestedControl,
    OpeningGuard, Position, StaticControl, Transition,
};
pub use error::{DialogError, DialogResult};
pub use host::{HeadlessHost, Host, HostEvent, HostSignal};
pub use runtime::{DialogContext, DialogStack, FocusArbiter, FocusVerdict, ModalOverlay};
