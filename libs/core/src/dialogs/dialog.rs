use async_trait::async_trait;
use serde_json::Value;

use crate::dialogs::{DialogContext, DialogInstance, DialogReason, DialogTurnResult};
use crate::error::DialogResult;
use crate::turn::TurnContext;

/// A unit of conversation that can sit on the dialog stack.
///
/// `begin_dialog` is called once when the dialog is pushed; every later turn
/// goes to `continue_dialog` while it is the active dialog. When a child
/// dialog pushed on top of it ends, `resume_dialog` receives the child's result.
#[async_trait]
pub trait Dialog: Send + Sync {
    fn id(&self) -> &str;

    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult>;

    async fn continue_dialog(&self, dc: &mut DialogContext<'_>) -> DialogResult<DialogTurnResult> {
        dc.end_dialog(None).await
    }

    async fn resume_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        _reason: DialogReason,
        result: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        dc.end_dialog(result).await
    }

    async fn reprompt_dialog(
        &self,
        _turn: &TurnContext,
        _instance: &DialogInstance,
    ) -> DialogResult<()> {
        Ok(())
    }

    async fn end_dialog(
        &self,
        _turn: &TurnContext,
        _instance: &DialogInstance,
        _reason: DialogReason,
    ) -> DialogResult<()> {
        Ok(())
    }
}
