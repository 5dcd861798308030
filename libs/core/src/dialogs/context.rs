use std::sync::Arc;

use dlg_telemetry::with_turn_fields;
use serde_json::Value;
use tracing::field::Empty;
use tracing::{Instrument, debug, info_span};

use crate::dialogs::{
    Dialog, DialogInstance, DialogReason, DialogSet, DialogState, DialogTurnResult,
    DialogTurnStatus,
};
use crate::error::{DialogError, DialogResult};
use crate::prompts::PromptOptions;
use crate::turn::TurnContext;

/// Binds a [`DialogSet`] and a conversation's [`DialogState`] to the current turn.
pub struct DialogContext<'a> {
    dialogs: &'a DialogSet,
    turn: &'a TurnContext,
    state: &'a mut DialogState,
}

impl<'a> DialogContext<'a> {
    pub fn new(dialogs: &'a DialogSet, turn: &'a TurnContext, state: &'a mut DialogState) -> Self {
        Self {
            dialogs,
            turn,
            state,
        }
    }

    pub fn turn(&self) -> &'a TurnContext {
        self.turn
    }

    pub fn dialogs(&self) -> &'a DialogSet {
        self.dialogs
    }

    pub fn stack(&self) -> &[DialogInstance] {
        &self.state.dialog_stack
    }

    pub fn active_dialog(&self) -> Option<&DialogInstance> {
        self.state.dialog_stack.last()
    }

    pub fn active_dialog_mut(&mut self) -> Option<&mut DialogInstance> {
        self.state.dialog_stack.last_mut()
    }

    /// Active instance for dialogs that can only run while on top of the stack.
    pub(crate) fn require_active_mut(&mut self) -> DialogResult<&mut DialogInstance> {
        self.state
            .dialog_stack
            .last_mut()
            .ok_or_else(|| DialogError::State("no active dialog on the stack".into()))
    }

    fn find_dialog(&self, dialog_id: &str) -> DialogResult<Arc<dyn Dialog>> {
        self.dialogs
            .find(dialog_id)
            .ok_or_else(|| DialogError::DialogNotFound(dialog_id.to_string()))
    }

    /// Pushes `dialog_id` onto the stack and starts it.
    pub async fn begin_dialog(
        &mut self,
        dialog_id: &str,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        if dialog_id.trim().is_empty() {
            return Err(DialogError::invalid_argument("dialog id cannot be blank"));
        }
        let dialog = self.find_dialog(dialog_id)?;
        self.state.dialog_stack.push(DialogInstance::new(dialog_id));
        debug!(
            dialog_id,
            depth = self.state.dialog_stack.len(),
            "begin dialog"
        );
        dialog.begin_dialog(self, options).await
    }

    /// Starts a prompt dialog with typed options.
    pub async fn prompt(
        &mut self,
        dialog_id: &str,
        options: PromptOptions,
    ) -> DialogResult<DialogTurnResult> {
        let options = serde_json::to_value(options)?;
        self.begin_dialog(dialog_id, Some(options)).await
    }

    /// Routes the current turn to the active dialog, if any.
    pub async fn continue_dialog(&mut self) -> DialogResult<DialogTurnResult> {
        let Some(active_id) = self.active_dialog().map(|i| i.id.clone()) else {
            return Ok(DialogTurnResult::new(DialogTurnStatus::Empty));
        };
        let dialog = self.find_dialog(&active_id)?;

        let span = info_span!(
            "continue_dialog",
            dialog_id = %active_id,
            channel_id = Empty,
            conversation_id = Empty,
            activity_id = Empty
        );
        self.turn.with_activity(|activity| {
            with_turn_fields(
                &span,
                activity.channel_id.as_deref().unwrap_or_default(),
                activity.conversation.as_ref().map(|c| c.id.as_str()),
                activity.id.as_deref(),
            )
        });
        dialog.continue_dialog(self).instrument(span).await
    }

    /// Pops the active dialog and resumes its parent with `result`.
    pub async fn end_dialog(&mut self, result: Option<Value>) -> DialogResult<DialogTurnResult> {
        self.end_active_dialog(DialogReason::EndCalled).await?;

        match self.active_dialog().map(|i| i.id.clone()) {
            Some(parent_id) => {
                let parent = self.find_dialog(&parent_id)?;
                debug!(dialog_id = %parent_id, "resume dialog");
                parent
                    .resume_dialog(self, DialogReason::EndCalled, result)
                    .await
            }
            None => Ok(DialogTurnResult::with_result(
                DialogTurnStatus::Complete,
                result,
            )),
        }
    }

    pub async fn cancel_all_dialogs(&mut self) -> DialogResult<DialogTurnResult> {
        if self.state.dialog_stack.is_empty() {
            return Ok(DialogTurnResult::new(DialogTurnStatus::Empty));
        }
        while !self.state.dialog_stack.is_empty() {
            self.end_active_dialog(DialogReason::CancelCalled).await?;
        }
        Ok(DialogTurnResult::new(DialogTurnStatus::Cancelled))
    }

    /// Asks the active dialog to render its question again.
    pub async fn reprompt_dialog(&mut self) -> DialogResult<()> {
        let Some(instance) = self.active_dialog().cloned() else {
            return Ok(());
        };
        let dialog = self.find_dialog(&instance.id)?;
        dialog.reprompt_dialog(self.turn, &instance).await
    }

    async fn end_active_dialog(&mut self, reason: DialogReason) -> DialogResult<()> {
        let Some(instance) = self.state.dialog_stack.last().cloned() else {
            return Ok(());
        };
        if let Some(dialog) = self.dialogs.find(&instance.id) {
            dialog.end_dialog(self.turn, &instance, reason).await?;
        }
        self.state.dialog_stack.pop();
        debug!(dialog_id = %instance.id, ?reason, "end dialog");
        Ok(())
    }
}
