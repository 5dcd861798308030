use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DialogTurnStatus {
    /// The stack was empty.
    Empty,
    /// The active dialog is waiting for the next turn.
    Waiting,
    /// The last dialog on the stack completed.
    Complete,
    Cancelled,
}

/// Why a dialog is being ended or resumed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DialogReason {
    BeginCalled,
    ContinueCalled,
    EndCalled,
    ReplaceCalled,
    CancelCalled,
    NextCalled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogTurnResult {
    pub status: DialogTurnStatus,
    pub result: Option<Value>,
}

impl DialogTurnResult {
    pub fn new(status: DialogTurnStatus) -> Self {
        Self {
            status,
            result: None,
        }
    }

    pub fn with_result(status: DialogTurnStatus, result: Option<Value>) -> Self {
        Self { status, result }
    }

    /// The active dialog yielded the turn and waits for more input.
    pub fn end_of_turn() -> Self {
        Self::new(DialogTurnStatus::Waiting)
    }

    pub fn is_waiting(&self) -> bool {
        self.status == DialogTurnStatus::Waiting
    }

    pub fn is_complete(&self) -> bool {
        self.status == DialogTurnStatus::Complete
    }

    /// Typed view of the returned value; `None` when absent or of another shape.
    pub fn result_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.result
            .as_ref()
            .filter(|value| !value.is_null())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}
