use dlg_schema::CardAction;
use serde::{Deserialize, Serialize};

/// An option offered to the user by choice-style prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub value: String,
    /// Overrides the `imBack` button rendered for this choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<CardAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
}

impl Choice {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_action(mut self, action: CardAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Text shown for the choice: the action title when set, else the value.
    pub fn title(&self) -> &str {
        self.action
            .as_ref()
            .and_then(|a| a.title.as_deref())
            .filter(|t| !t.is_empty())
            .unwrap_or(self.value.as_str())
    }
}

impl From<&str> for Choice {
    fn from(value: &str) -> Self {
        Choice::new(value)
    }
}

impl From<String> for Choice {
    fn from(value: String) -> Self {
        Choice::new(value)
    }
}

/// The choice a user's utterance resolved to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoundChoice {
    pub value: String,
    pub index: usize,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonym: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoundValue {
    pub value: String,
    pub index: usize,
    pub score: f32,
}

/// A value to search for, tagged with the index of the choice it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedValue {
    pub value: String,
    pub index: usize,
}

impl SortedValue {
    pub fn new(value: impl Into<String>, index: usize) -> Self {
        Self {
            value: value.into(),
            index,
        }
    }
}

/// A span of the utterance recognized as `resolution`.
///
/// `start` and `end` are inclusive char offsets into the utterance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelResult<T> {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub type_name: String,
    pub resolution: T,
}
