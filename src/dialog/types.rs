//! Core dialog value types
//!
//! Handles, modality, positioning and the tagged outcomes returned by
//! lifecycle operations and hooks.

use serde::{Deserialize, Serialize};

/// Identity of a dialog inside a [`DialogContext`](crate::runtime::DialogContext).
///
/// The stack stores handles, so "match by reference" is handle equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DialogHandle(u64);

impl DialogHandle {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw handle value
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DialogHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a dialog reacts when its element loses input focus.
///
/// Serialized as its ordinal (`0`, `1`, `2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Modality {
    /// No reaction
    #[default]
    Modeless,
    /// Focus is trapped inside the dialog and later dialogs
    Modal,
    /// The dialog closes itself
    HideOnFocusOut,
}

impl Modality {
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Modeless => 0,
            Self::Modal => 1,
            Self::HideOnFocusOut => 2,
        }
    }
}

impl From<Modality> for u8 {
    fn from(modality: Modality) -> Self {
        modality.ordinal()
    }
}

impl TryFrom<u8> for Modality {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Modeless),
            1 => Ok(Self::Modal),
            2 => Ok(Self::HideOnFocusOut),
            other => Err(format!("unknown modality ordinal {}", other)),
        }
    }
}

/// Dialog placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "anchor", rename_all = "camelCase")]
pub enum Position {
    /// Fixed placement at the given coordinates
    TopLeft { left: i32, top: i32 },
    /// Centered in the viewport each time the dialog opens
    #[default]
    Center,
}

impl Position {
    pub fn at(left: i32, top: i32) -> Self {
        Self::TopLeft { left, top }
    }

    pub fn is_anchored(&self) -> bool {
        matches!(self, Self::TopLeft { .. })
    }
}

/// Outcome of an open or close request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The transition ran to completion
    Completed,
    /// A hook cancelled the transition; state is unchanged
    Vetoed,
    /// Nothing to do (e.g. closing a dialog that is not open)
    Skipped,
}

impl Transition {
    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

/// Decision returned by a cancelable hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decision {
    #[default]
    Proceed,
    Cancel,
}

/// Lifecycle state of a dialog as observed from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Not yet attached to the host
    Unattached,
    /// Attached and hidden
    Closed,
    /// Attached and visible
    Open,
    /// Removed from the host after closing; cannot be attached again
    Detached,
}

/// Attachment bookkeeping kept by the dialog itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Attachment {
    #[default]
    Unattached,
    Attached,
    Detached,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modality_serializes_as_ordinal() {
        assert_eq!(serde_json::to_string(&Modality::Modal).unwrap(), "1");
        let parsed: Modality = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, Modality::HideOnFocusOut);
        assert!(serde_json::from_str::<Modality>("3").is_err());
    }

    #[test]
    fn test_position_json_shape() {
        let json = serde_json::to_value(Position::at(10, 20)).unwrap();
        assert_eq!(json, serde_json::json!({"anchor": "topLeft", "left": 10, "top": 20}));

        let center: Position = serde_json::from_str(r#"{"anchor":"center"}"#).unwrap();
        assert_eq!(center, Position::Center);
        assert!(!center.is_anchored());
    }
}
