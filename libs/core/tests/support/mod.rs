use dlg_core::dialogs::{DialogSet, DialogState, DialogTurnResult};
use dlg_core::prompts::{ATTEMPT_COUNT_KEY, PERSISTED_STATE};
use dlg_core::testkit::TestAdapter;
use dlg_core::{DialogResult, PromptOptions};
use dlg_schema::Activity;
use serde_json::Value;

/// Drives one conversation through a dialog set, one turn per call.
pub struct Conversation {
    pub dialogs: DialogSet,
    pub adapter: TestAdapter,
    pub state: DialogState,
}

#[allow(dead_code)]
impl Conversation {
    pub fn new(dialogs: DialogSet) -> Self {
        Self::with_adapter(dialogs, TestAdapter::new())
    }

    pub fn with_adapter(dialogs: DialogSet, adapter: TestAdapter) -> Self {
        Self {
            dialogs,
            adapter,
            state: DialogState::new(),
        }
    }

    pub async fn begin(
        &mut self,
        dialog_id: &str,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        self.begin_from(TestAdapter::message("start"), dialog_id, options)
            .await
    }

    /// Like [`Conversation::begin`], on a turn started by `activity`.
    pub async fn begin_from(
        &mut self,
        activity: Activity,
        dialog_id: &str,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        let turn = self.adapter.turn(activity);
        let mut dc = self.dialogs.create_context(&turn, &mut self.state);
        dc.begin_dialog(dialog_id, options).await
    }

    pub async fn prompt(
        &mut self,
        dialog_id: &str,
        options: PromptOptions,
    ) -> DialogResult<DialogTurnResult> {
        let turn = self.adapter.turn(TestAdapter::message("start"));
        let mut dc = self.dialogs.create_context(&turn, &mut self.state);
        dc.prompt(dialog_id, options).await
    }

    pub async fn send(&mut self, activity: Activity) -> DialogResult<DialogTurnResult> {
        let turn = self.adapter.turn(activity);
        let mut dc = self.dialogs.create_context(&turn, &mut self.state);
        dc.continue_dialog().await
    }

    pub async fn say(&mut self, text: &str) -> DialogResult<DialogTurnResult> {
        self.send(TestAdapter::message(text)).await
    }

    pub async fn reprompt(&mut self) -> DialogResult<()> {
        let turn = self.adapter.turn(TestAdapter::message("again"));
        let mut dc = self.dialogs.create_context(&turn, &mut self.state);
        dc.reprompt_dialog().await
    }

    pub fn attempt_count(&self) -> u64 {
        self.state
            .dialog_stack
            .last()
            .and_then(|instance| instance.state.get(PERSISTED_STATE))
            .and_then(|state| state.get(ATTEMPT_COUNT_KEY))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    /// Texts of all activities sent so far, skipping those without text.
    pub fn sent_texts(&self) -> Vec<String> {
        self.adapter
            .sent()
            .into_iter()
            .filter_map(|activity| activity.text)
            .collect()
    }
}
