//! Nested controls hosted inside a dialog
//!
//! A control-hosting dialog delegates attach and rendering to the control it
//! wraps. On the deserialization side, controls are rebuilt from their type
//! name and snapshot through a [`ControlRegistry`].

use crate::error::{DialogError, DialogResult};
use crate::host::Host;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A sub-control whose lifecycle is driven by its hosting dialog
pub trait NestedControl {
    /// Type identifier used by the serialization boundary
    fn type_name(&self) -> &str;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    fn is_attached(&self) -> bool;

    /// Bind the control to its rendered markup
    fn attach(&mut self, host: &mut dyn Host) -> DialogResult<()>;

    /// Markup used as the dialog body
    fn render(&self) -> DialogResult<String>;

    /// The control's own configuration snapshot
    fn config_object(&self) -> serde_json::Value;
}

/// Control that renders a fixed markup fragment
#[derive(Debug, Clone, Default)]
pub struct StaticControl {
    id: Option<String>,
    html: String,
    attached: bool,
}

#[derive(Serialize, Deserialize)]
struct StaticControlData {
    html: String,
}

impl StaticControl {
    pub const TYPE_NAME: &'static str = "StaticControl";

    pub fn new(html: impl Into<String>) -> Self {
        Self {
            id: None,
            html: html.into(),
            attached: false,
        }
    }

    pub fn from_config(data: serde_json::Value) -> DialogResult<Self> {
        let data: StaticControlData = serde_json::from_value(data)?;
        Ok(Self::new(data.html))
    }
}

impl NestedControl for StaticControl {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn attach(&mut self, _host: &mut dyn Host) -> DialogResult<()> {
        if self.id.is_none() || self.attached {
            return Err(DialogError::invalid_state(
                "Control must have an ID and can only attach once",
            ));
        }
        self.attached = true;
        Ok(())
    }

    fn render(&self) -> DialogResult<String> {
        Ok(self.html.clone())
    }

    fn config_object(&self) -> serde_json::Value {
        serde_json::json!({ "html": self.html })
    }
}

type ControlFactory = Box<dyn Fn(serde_json::Value) -> DialogResult<Box<dyn NestedControl>>>;

/// Factories for rebuilding nested controls from their snapshot
pub struct ControlRegistry {
    factories: HashMap<String, ControlFactory>,
}

impl ControlRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory for `type_name`, replacing any previous one
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(serde_json::Value) -> DialogResult<Box<dyn NestedControl>> + 'static,
    {
        self.factories.insert(type_name.into(), Box::new(factory));
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Build a control of `type_name` from its snapshot
    pub fn create(
        &self,
        type_name: &str,
        data: serde_json::Value,
    ) -> DialogResult<Box<dyn NestedControl>> {
        let factory = self.factories.get(type_name).ok_or_else(|| {
            DialogError::mismatch(format!("unknown control type '{}'", type_name))
        })?;
        debug!(control_type = type_name, "creating nested control");
        factory(data)
    }
}

impl Default for ControlRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(StaticControl::TYPE_NAME, |data| {
            Ok(Box::new(StaticControl::from_config(data)?) as Box<dyn NestedControl>)
        });
        registry
    }
}

impl std::fmt::Debug for ControlRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
