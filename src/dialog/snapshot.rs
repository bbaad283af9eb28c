//! Configuration snapshot of a dialog
//!
//! `DialogConfig` is the definition side of a dialog: a plain value that
//! crosses the serialization boundary and is turned back into a live
//! [`Dialog`] on the other side. Every field except the frame body and the
//! nested control is required; a missing field is a
//! [`DialogError::ConfigurationMismatch`]. The nested control type and data
//! come as a pair: one without the other is a mismatch too.

use super::control::ControlRegistry;
use super::entity::{Dialog, DialogBody};
use super::types::{Modality, Position};
use crate::error::{DialogError, DialogResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Serializable dialog definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogConfig {
    pub id: String,
    pub modality: Modality,
    #[serde(deserialize_with = "nullable_string")]
    pub title: String,
    pub position: Position,
    pub has_padding: bool,
    #[serde(deserialize_with = "nullable_string")]
    pub class_name: String,
    pub remove_on_close: bool,
    /// Body of a frame dialog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_html: Option<String>,
    /// Type name of the hosted control; present together with its data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contained_control_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contained_control_data: Option<serde_json::Value>,
}

/// Nested control type and its own snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ContainedControl {
    pub contained_control_type: String,
    pub contained_control_data: serde_json::Value,
}

/// Present-but-null strings coalesce to empty; absent ones are still an error
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl DialogConfig {
    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> DialogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> DialogResult<String> {
        serde_json::to_string(self).map_err(|e| DialogError::mismatch(e.to_string()))
    }

    /// The nested control pair, if the snapshot describes one
    pub fn contained_control(&self) -> DialogResult<Option<ContainedControl>> {
        match (&self.contained_control_type, &self.contained_control_data) {
            (Some(contained_control_type), Some(contained_control_data)) => Ok(Some(ContainedControl {
                contained_control_type: contained_control_type.clone(),
                contained_control_data: contained_control_data.clone(),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(DialogError::mismatch(
                "containedControlType given without containedControlData",
            )),
            (None, Some(_)) => Err(DialogError::mismatch(
                "containedControlData given without containedControlType",
            )),
        }
    }

    /// Build the runtime dialog this snapshot describes
    pub fn into_dialog(self, registry: &ControlRegistry) -> DialogResult<Dialog> {
        if self.id.is_empty() {
            return Err(DialogError::mismatch("snapshot has an empty id"));
        }

        let mut dialog = match self.contained_control()? {
            Some(control) => Dialog::control(
                registry.create(&control.contained_control_type, control.contained_control_data)?,
            )?,
            None => {
                let mut dialog = Dialog::frame();
                if let Some(html) = &self.inner_html {
                    dialog.set_inner_fragments([html])?;
                }
                dialog
            }
        };

        dialog.set_id(self.id);
        dialog.set_title(&self.title);
        dialog.set_modality(self.modality);
        dialog.set_position(self.position);
        dialog.set_has_padding(self.has_padding);
        dialog.set_class_name(&self.class_name);
        dialog.set_remove_on_close(self.remove_on_close);
        Ok(dialog)
    }
}

impl Dialog {
    /// Snapshot of this dialog's configuration
    pub fn to_config(&self) -> DialogResult<DialogConfig> {
        let id = self
            .id()
            .ok_or_else(|| DialogError::invalid_state("Must set ID before taking a snapshot"))?;

        let (inner_html, contained_control_type, contained_control_data) = match self.body() {
            DialogBody::Frame { html } => ((!html.is_empty()).then(|| html.clone()), None, None),
            DialogBody::Control(control) => (
                None,
                Some(control.type_name().to_string()),
                Some(control.config_object()),
            ),
        };

        Ok(DialogConfig {
            id: id.to_string(),
            modality: self.modality(),
            title: self.title().to_string(),
            position: self.position(),
            has_padding: self.has_padding(),
            class_name: self.class_name().to_string(),
            remove_on_close: self.removes_on_close(),
            inner_html,
            contained_control_type,
            contained_control_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::control::StaticControl;

    fn full_json() -> serde_json::Value {
        serde_json::json!({
            "id": "confirm",
            "modality": 1,
            "title": "Confirm",
            "position": {"anchor": "topLeft", "left": 40, "top": 60},
            "hasPadding": false,
            "className": "narrow",
            "removeOnClose": true
        })
    }

    #[test]
    fn test_snapshot_keys() {
        let dialog = Dialog::frame()
            .with_id("confirm")
            .with_title("Confirm")
            .with_modality(Modality::Modal)
            .with_position(Position::at(40, 60))
            .with_padding(false)
            .with_class_name("narrow")
            .remove_on_close(true);

        let value = serde_json::to_value(dialog.to_config().unwrap()).unwrap();
        assert_eq!(value, full_json());
    }

    #[test]
    fn test_control_dialog_survives_boundary() {
        let dialog = Dialog::control(Box::new(StaticControl::new("<i>inside</i>")))
            .unwrap()
            .with_id("prefs")
            .with_modality(Modality::HideOnFocusOut);

        let json = dialog.to_config().unwrap().to_json().unwrap();
        assert!(json.contains("\"containedControlType\":\"StaticControl\""));

        let restored = DialogConfig::from_json(&json)
            .unwrap()
            .into_dialog(&ControlRegistry::default())
            .unwrap();

        assert_eq!(restored.modality(), Modality::HideOnFocusOut);
        assert_eq!(restored.contained_control().unwrap().id(), Some("prefs_control"));
        assert_eq!(restored.render().unwrap(), dialog.render().unwrap());
        assert_eq!(restored.to_config().unwrap(), dialog.to_config().unwrap());
    }

    #[test]
    fn test_missing_field_is_mismatch() {
        let mut value = full_json();
        value.as_object_mut().unwrap().remove("removeOnClose");

        let err = DialogConfig::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, DialogError::ConfigurationMismatch(_)));
    }

    #[test]
    fn test_null_title_coalesces_but_absent_title_fails() {
        let mut value = full_json();
        value["title"] = serde_json::Value::Null;
        let config = DialogConfig::from_json(&value.to_string()).unwrap();
        assert_eq!(config.title, "");

        value.as_object_mut().unwrap().remove("title");
        assert!(DialogConfig::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn test_frame_body_round_trips() {
        let mut dialog = Dialog::frame().with_id("about");
        dialog.set_inner_fragments(["<p>v1</p>"]).unwrap();

        let config = dialog.to_config().unwrap();
        assert_eq!(config.inner_html.as_deref(), Some("<p>v1</p>"));

        let restored = config.into_dialog(&ControlRegistry::default()).unwrap();
        assert_eq!(restored.render().unwrap(), dialog.render().unwrap());
    }

    #[test]
    fn test_unknown_control_type() {
        let mut value = full_json();
        value["containedControlType"] = "Missing".into();
        value["containedControlData"] = serde_json::json!({});

        let config = DialogConfig::from_json(&value.to_string()).unwrap();
        let err = config.into_dialog(&ControlRegistry::default()).unwrap_err();
        assert!(matches!(err, DialogError::ConfigurationMismatch(_)));
    }

    #[test]
    fn test_control_type_without_data_is_mismatch() {
        let mut value = full_json();
        value["containedControlType"] = StaticControl::TYPE_NAME.into();

        let config = DialogConfig::from_json(&value.to_string()).unwrap();
        let err = config.into_dialog(&ControlRegistry::default()).unwrap_err();
        assert!(matches!(err, DialogError::ConfigurationMismatch(_)));
    }

    #[test]
    fn test_control_data_without_type_is_mismatch() {
        let mut value = full_json();
        value["containedControlData"] = serde_json::json!({"html": "<p>x</p>"});

        let config = DialogConfig::from_json(&value.to_string()).unwrap();
        assert!(matches!(
            config.contained_control(),
            Err(DialogError::ConfigurationMismatch(_))
        ));
    }

    #[test]
    fn test_malformed_control_data_is_mismatch() {
        let mut value = full_json();
        value["containedControlType"] = StaticControl::TYPE_NAME.into();
        value["containedControlData"] = serde_json::json!({"html": 42});

        let config = DialogConfig::from_json(&value.to_string()).unwrap();
        let err = config.into_dialog(&ControlRegistry::default()).unwrap_err();
        assert!(matches!(err, DialogError::ConfigurationMismatch(_)));
    }
}
