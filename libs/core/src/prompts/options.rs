use dlg_schema::{Activity, InputHint};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::choices::{Choice, ListStyle};

/// What a prompt asks and how.
///
/// Persisted in the prompt's dialog state when it begins and reused for every
/// retry and re-prompt of that instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Activity>,
    /// Sent instead of `prompt` after input failed to recognize or validate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_prompt: Option<Activity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ListStyle>,
    /// Opaque data handed to validators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<Value>,
}

impl PromptOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(mut self, prompt: Activity) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn with_prompt_text(self, text: impl Into<String>) -> Self {
        self.with_prompt(Activity::text(text))
    }

    pub fn with_retry_prompt(mut self, retry_prompt: Activity) -> Self {
        self.retry_prompt = Some(retry_prompt);
        self
    }

    pub fn with_retry_prompt_text(self, text: impl Into<String>) -> Self {
        self.with_retry_prompt(Activity::text(text))
    }

    pub fn with_choices<I, C>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Choice>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_style(mut self, style: ListStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_validations(mut self, validations: Value) -> Self {
        self.validations = Some(validations);
        self
    }

    /// Fills in `hint` on the prompt and retry prompt where none was set.
    pub fn ensure_input_hints(&mut self, hint: InputHint) {
        for activity in [self.prompt.as_mut(), self.retry_prompt.as_mut()]
            .into_iter()
            .flatten()
        {
            if activity.input_hint.is_none() {
                activity.input_hint = Some(hint);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_hints_are_filled_but_explicit_ones_kept() {
        let mut retry = Activity::text("again?");
        retry.input_hint = Some(InputHint::IgnoringInput);
        let mut options = PromptOptions::new()
            .with_prompt_text("name?")
            .with_retry_prompt(retry);

        options.ensure_input_hints(InputHint::ExpectingInput);
        assert_eq!(
            options.prompt.as_ref().unwrap().input_hint,
            Some(InputHint::ExpectingInput)
        );
        assert_eq!(
            options.retry_prompt.as_ref().unwrap().input_hint,
            Some(InputHint::IgnoringInput)
        );
    }

    #[test]
    fn serializes_sparsely() {
        let options = PromptOptions::new()
            .with_choices(["red", "blue"])
            .with_style(ListStyle::List);
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "choices": [{ "value": "red" }, { "value": "blue" }],
                "style": "list"
            })
        );
    }
}
