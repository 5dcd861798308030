use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DialogError, DialogResult};

/// One frame of the dialog stack: the dialog id plus its private state slots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DialogInstance {
    pub id: String,
    #[serde(default)]
    pub state: Map<String, Value>,
}

impl DialogInstance {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Map::new(),
        }
    }

    /// Decodes the slot `key`; `Ok(None)` when the slot is absent or null.
    pub fn slot<T: DeserializeOwned>(&self, key: &str) -> DialogResult<Option<T>> {
        match self.state.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        }
    }

    pub fn required_slot<T: DeserializeOwned>(&self, key: &str) -> DialogResult<T> {
        self.slot(key)?.ok_or_else(|| {
            DialogError::State(format!("dialog '{}' has no '{key}' state slot", self.id))
        })
    }

    pub fn set_slot<T: Serialize>(&mut self, key: &str, value: &T) -> DialogResult<()> {
        self.state.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }
}

/// Persistable dialog stack for one conversation. The last entry is the active dialog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DialogState {
    #[serde(default)]
    pub dialog_stack: Vec<DialogInstance>,
}

impl DialogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.dialog_stack.is_empty()
    }
}
