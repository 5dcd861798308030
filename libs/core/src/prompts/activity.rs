use std::sync::Arc;

use async_trait::async_trait;
use dlg_schema::{Activity, InputHint};
use serde_json::Value;
use tracing::{debug, info};

use crate::dialogs::{Dialog, DialogContext, DialogInstance, DialogReason, DialogTurnResult};
use crate::error::{DialogError, DialogResult};
use crate::prompts::prompt::{init_state, load_state, parse_options, record_attempt, send_prompt};
use crate::prompts::{PromptRecognizerResult, PromptValidator, PromptValidatorContext};
use crate::telemetry;
use crate::turn::TurnContext;

const KIND: &str = "activity";

/// Waits for any activity (events included) and hands it to a mandatory validator.
///
/// Unlike [`Prompt`](crate::prompts::Prompt) there is no message-type gate,
/// and a rejected activity always triggers the retry prompt.
pub struct ActivityPrompt {
    id: String,
    validator: Arc<dyn PromptValidator<Activity>>,
}

impl ActivityPrompt {
    pub fn new(
        id: impl Into<String>,
        validator: impl PromptValidator<Activity> + 'static,
    ) -> DialogResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DialogError::invalid_argument("dialog id cannot be blank"));
        }
        Ok(Self {
            id,
            validator: Arc::new(validator),
        })
    }
}

impl std::fmt::Debug for ActivityPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityPrompt").field("id", &self.id).finish_non_exhaustive()
    }
}

#[async_trait]
impl Dialog for ActivityPrompt {
    fn id(&self) -> &str {
        &self.id
    }

    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        let mut options = parse_options(options)?
            .ok_or_else(|| DialogError::invalid_argument("Prompt options are required"))?;
        options.ensure_input_hints(InputHint::ExpectingInput);

        init_state(dc.require_active_mut()?, &options)?;
        telemetry::record_prompt_started(KIND);
        debug!(dialog_id = %self.id, kind = KIND, "prompt started");

        send_prompt(dc.turn(), &options, false).await?;
        Ok(DialogTurnResult::end_of_turn())
    }

    async fn continue_dialog(&self, dc: &mut DialogContext<'_>) -> DialogResult<DialogTurnResult> {
        let turn = dc.turn();
        let (options, mut state) = load_state(dc.require_active_mut()?)?;
        let recognized = PromptRecognizerResult::success(turn.activity());
        let attempt = record_attempt(dc.require_active_mut()?, &mut state)?;

        let ctx = PromptValidatorContext {
            turn,
            recognized: &recognized,
            state: &state,
            options: &options,
        };
        let is_valid = self
            .validator
            .validate(&ctx)
            .await
            .map_err(DialogError::Validator)?;

        if is_valid {
            telemetry::record_prompt_completed(KIND, "recognized");
            info!(dialog_id = %self.id, attempt, "activity accepted");
            let value = recognized
                .into_value()
                .map(serde_json::to_value)
                .transpose()?;
            return dc.end_dialog(value).await;
        }

        telemetry::record_prompt_retry(KIND);
        send_prompt(turn, &options, true).await?;
        Ok(DialogTurnResult::end_of_turn())
    }

    async fn resume_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        _reason: DialogReason,
        _result: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        let instance = dc.require_active_mut()?.clone();
        self.reprompt_dialog(dc.turn(), &instance).await?;
        Ok(DialogTurnResult::end_of_turn())
    }

    async fn reprompt_dialog(
        &self,
        turn: &TurnContext,
        instance: &DialogInstance,
    ) -> DialogResult<()> {
        let (options, _) = load_state(instance)?;
        send_prompt(turn, &options, false).await
    }
}
