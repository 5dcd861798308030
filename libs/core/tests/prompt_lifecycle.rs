mod support;

use anyhow::anyhow;
use async_trait::async_trait;
use dlg_core::dialogs::{
    Dialog, DialogContext, DialogSet, DialogTurnResult, DialogTurnStatus,
};
use dlg_core::prompts::{
    PromptValidator, PromptValidatorContext, TextPrompt, validator_fn,
};
use dlg_core::testkit::TestAdapter;
use dlg_core::{DialogError, DialogResult, PromptOptions};
use dlg_schema::{Activity, InputHint};
use serde_json::{Value, json};

use support::Conversation;

fn name_options() -> PromptOptions {
    PromptOptions::new()
        .with_prompt_text("What's your name?")
        .with_retry_prompt_text("Please tell me your name.")
}

fn text_prompt(dialogs: &mut DialogSet, prompt: TextPrompt) {
    dialogs.add(prompt).unwrap();
}

#[tokio::test]
async fn text_prompt_asks_then_completes_with_the_reply() {
    let mut dialogs = DialogSet::new();
    text_prompt(&mut dialogs, TextPrompt::new("name").unwrap());
    let mut conv = Conversation::new(dialogs);

    let result = conv.prompt("name", name_options()).await.unwrap();
    assert!(result.is_waiting());
    let sent = conv.adapter.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text.as_deref(), Some("What's your name?"));
    assert_eq!(sent[0].input_hint, Some(InputHint::ExpectingInput));

    let result = conv.say("Ada").await.unwrap();
    assert!(result.is_complete());
    assert_eq!(result.result, Some(json!("Ada")));
    assert!(conv.state.is_empty());
}

#[tokio::test]
async fn options_are_required_and_must_have_the_right_shape() {
    let mut dialogs = DialogSet::new();
    text_prompt(&mut dialogs, TextPrompt::new("name").unwrap());

    let mut conv = Conversation::new(dialogs);
    let err = conv.begin("name", None).await.unwrap_err();
    assert!(matches!(err, DialogError::InvalidArgument(_)));

    let err = conv.begin("name", Some(json!("not options"))).await.unwrap_err();
    assert!(matches!(err, DialogError::InvalidArgument(_)));
    assert!(conv.adapter.sent().is_empty());
}

#[test]
fn blank_prompt_ids_are_rejected() {
    let err = TextPrompt::new("  ").unwrap_err();
    assert!(matches!(err, DialogError::InvalidArgument(_)));
}

#[tokio::test]
async fn every_failed_message_counts_as_an_attempt() {
    let mut dialogs = DialogSet::new();
    let prompt = TextPrompt::new("name")
        .unwrap()
        .with_validator(validator_fn(|_: &PromptValidatorContext<'_, String>| Ok(false)));
    text_prompt(&mut dialogs, prompt);
    let mut conv = Conversation::new(dialogs);

    conv.prompt("name", name_options()).await.unwrap();
    for expected in 1..=3 {
        let result = conv.say("nope").await.unwrap();
        assert!(result.is_waiting());
        assert_eq!(conv.attempt_count(), expected);
    }

    assert_eq!(
        conv.sent_texts(),
        vec![
            "What's your name?",
            "Please tell me your name.",
            "Please tell me your name.",
            "Please tell me your name.",
        ]
    );
}

#[tokio::test]
async fn non_message_activities_are_ignored() {
    let mut dialogs = DialogSet::new();
    text_prompt(&mut dialogs, TextPrompt::new("name").unwrap());
    let mut conv = Conversation::new(dialogs);
    conv.prompt("name", name_options()).await.unwrap();

    let result = conv
        .send(TestAdapter::event("custom/event", json!({ "x": 1 })))
        .await
        .unwrap();
    assert!(result.is_waiting());
    assert_eq!(conv.attempt_count(), 0);
    assert_eq!(conv.adapter.sent().len(), 1);
}

#[tokio::test]
async fn validator_sees_recognized_value_and_attempts() {
    let mut dialogs = DialogSet::new();
    let prompt = TextPrompt::new("name").unwrap().with_validator(validator_fn(
        |ctx: &PromptValidatorContext<'_, String>| {
            let long_enough = ctx.recognized.value().is_some_and(|name| name.len() >= 3);
            Ok(long_enough || ctx.attempt_count() >= 3)
        },
    ));
    text_prompt(&mut dialogs, prompt);
    let mut conv = Conversation::new(dialogs);
    conv.prompt("name", name_options()).await.unwrap();

    assert!(conv.say("Al").await.unwrap().is_waiting());
    let result = conv.say("Ada").await.unwrap();
    assert_eq!(result.result, Some(json!("Ada")));

    conv.prompt("name", name_options()).await.unwrap();
    assert!(conv.say("A").await.unwrap().is_waiting());
    assert!(conv.say("B").await.unwrap().is_waiting());
    let result = conv.say("C").await.unwrap();
    assert_eq!(result.result, Some(json!("C")));
}

#[tokio::test]
async fn validator_errors_fail_the_turn() {
    let mut dialogs = DialogSet::new();
    let prompt = TextPrompt::new("name")
        .unwrap()
        .with_validator(validator_fn(|_: &PromptValidatorContext<'_, String>| {
            Err(anyhow!("validator backend down"))
        }));
    text_prompt(&mut dialogs, prompt);
    let mut conv = Conversation::new(dialogs);
    conv.prompt("name", name_options()).await.unwrap();

    let err = conv.say("Ada").await.unwrap_err();
    assert!(matches!(err, DialogError::Validator(_)));
}

/// Answers the user itself and rejects the input.
struct RespondingValidator;

#[async_trait]
impl PromptValidator<String> for RespondingValidator {
    async fn validate(&self, ctx: &PromptValidatorContext<'_, String>) -> anyhow::Result<bool> {
        ctx.turn
            .send_activity(Activity::text("Names need a capital letter."))
            .await?;
        Ok(false)
    }
}

#[tokio::test]
async fn retry_prompt_is_skipped_when_the_validator_already_replied() {
    let mut dialogs = DialogSet::new();
    let prompt = TextPrompt::new("name")
        .unwrap()
        .with_validator(RespondingValidator);
    text_prompt(&mut dialogs, prompt);
    let mut conv = Conversation::new(dialogs);
    conv.prompt("name", name_options()).await.unwrap();

    assert!(conv.say("ada").await.unwrap().is_waiting());
    assert_eq!(
        conv.sent_texts(),
        vec!["What's your name?", "Names need a capital letter."]
    );
}

#[tokio::test]
async fn reprompt_renders_the_same_question_each_time() {
    let mut dialogs = DialogSet::new();
    text_prompt(&mut dialogs, TextPrompt::new("name").unwrap());
    let mut conv = Conversation::new(dialogs);
    conv.prompt("name", name_options()).await.unwrap();

    conv.reprompt().await.unwrap();
    conv.reprompt().await.unwrap();

    let sent = conv.adapter.sent();
    assert_eq!(sent.len(), 3);
    for activity in &sent[1..] {
        assert_eq!(activity.text, sent[0].text);
        assert_eq!(activity.input_hint, sent[0].input_hint);
    }
    assert_eq!(conv.attempt_count(), 0);
}

/// Pushed on top of a prompt; ends on the next turn with a value of its own.
struct Interruption;

#[async_trait]
impl Dialog for Interruption {
    fn id(&self) -> &str {
        "interruption"
    }

    async fn begin_dialog(
        &self,
        _dc: &mut DialogContext<'_>,
        _options: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        Ok(DialogTurnResult::end_of_turn())
    }

    async fn continue_dialog(&self, dc: &mut DialogContext<'_>) -> DialogResult<DialogTurnResult> {
        dc.end_dialog(Some(json!("help shown"))).await
    }
}

#[tokio::test]
async fn resumed_prompt_asks_again_instead_of_taking_the_child_result() {
    let mut dialogs = DialogSet::new();
    text_prompt(&mut dialogs, TextPrompt::new("name").unwrap());
    dialogs.add(Interruption).unwrap();
    let mut conv = Conversation::new(dialogs);

    conv.prompt("name", name_options()).await.unwrap();
    conv.begin("interruption", None).await.unwrap();
    assert_eq!(conv.state.dialog_stack.len(), 2);

    let result = conv.say("help").await.unwrap();
    assert_eq!(result.status, DialogTurnStatus::Waiting);
    assert_eq!(conv.state.dialog_stack.len(), 1);
    assert_eq!(
        conv.sent_texts(),
        vec!["What's your name?", "What's your name?"]
    );

    let result = conv.say("Ada").await.unwrap();
    assert_eq!(result.result, Some(json!("Ada")));
}
