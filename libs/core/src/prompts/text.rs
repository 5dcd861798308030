use async_trait::async_trait;
use dlg_schema::ActivityType;
use serde_json::{Map, Value};

use crate::error::DialogResult;
use crate::prompts::prompt::send_prompt;
use crate::prompts::{Prompt, PromptKind, PromptOptions, PromptRecognizerResult};
use crate::turn::TurnContext;

/// Accepts any message that carries text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextKind;

pub type TextPrompt = Prompt<TextKind>;

impl Prompt<TextKind> {
    pub fn new(id: impl Into<String>) -> DialogResult<Self> {
        Prompt::with_kind(id, TextKind)
    }
}

#[async_trait]
impl PromptKind for TextKind {
    type Output = String;
    const KIND: &'static str = "text";

    async fn on_prompt(
        &self,
        turn: &TurnContext,
        _state: &Map<String, Value>,
        options: &PromptOptions,
        is_retry: bool,
    ) -> DialogResult<()> {
        send_prompt(turn, options, is_retry).await
    }

    async fn on_recognize(
        &self,
        turn: &TurnContext,
        _state: &Map<String, Value>,
        _options: &PromptOptions,
    ) -> DialogResult<PromptRecognizerResult<String>> {
        let text = turn.with_activity(|activity| {
            activity
                .is_type(ActivityType::Message)
                .then(|| activity.text.clone())
                .flatten()
        });
        Ok(text
            .map(PromptRecognizerResult::success)
            .unwrap_or_default())
    }
}
