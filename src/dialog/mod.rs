//! Dialog entity, hooks and snapshots

pub mod control;
pub mod entity;
pub mod hooks;
pub mod snapshot;
pub mod types;

pub use control::{ControlRegistry, NestedControl, StaticControl};
pub use entity::{Dialog, DialogBody};
pub use hooks::{ClosingGuard, DialogEvent, DialogHook, LifecycleEvent, OpeningGuard};
pub use snapshot::{ContainedControl, DialogConfig};
pub use types::{Decision, DialogHandle, LifecycleState, Modality, Position, Transition};
