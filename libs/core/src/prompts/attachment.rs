use async_trait::async_trait;
use dlg_schema::{ActivityType, Attachment};
use serde_json::{Map, Value};

use crate::error::DialogResult;
use crate::prompts::prompt::send_prompt;
use crate::prompts::{Prompt, PromptKind, PromptOptions, PromptRecognizerResult};
use crate::turn::TurnContext;

/// Accepts a message with at least one attachment and returns all of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentKind;

pub type AttachmentPrompt = Prompt<AttachmentKind>;

impl Prompt<AttachmentKind> {
    pub fn new(id: impl Into<String>) -> DialogResult<Self> {
        Prompt::with_kind(id, AttachmentKind)
    }
}

#[async_trait]
impl PromptKind for AttachmentKind {
    type Output = Vec<Attachment>;
    const KIND: &'static str = "attachment";

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
    ) -> DialogResult<PromptRecognizerResult<Vec<Attachment>>> {
        let attachments = turn.with_activity(|activity| {
            (activity.is_type(ActivityType::Message) && !activity.attachments.is_empty())
                .then(|| activity.attachments.clone())
        });
        Ok(attachments
            .map(PromptRecognizerResult::success)
            .unwrap_or_default())
    }
}
