mod support;

use dlg_core::choices::FoundChoice;
use dlg_core::dialogs::DialogSet;
use dlg_core::prompts::{
    ActivityPrompt, AttachmentPrompt, ChoicePrompt, ConfirmPrompt, DateTimePrompt,
    DateTimeResolution, NumberKind, NumberPrompt, PromptValidatorContext, validator_fn,
};
use dlg_core::testkit::TestAdapter;
use dlg_core::PromptOptions;
use dlg_schema::{Activity, ActivityType, Attachment};
use serde_json::json;

use support::Conversation;

fn conversation_with(dialog: impl dlg_core::Dialog + 'static) -> Conversation {
    let mut dialogs = DialogSet::new();
    dialogs.add(dialog).unwrap();
    Conversation::new(dialogs)
}

#[tokio::test]
async fn number_prompt_returns_the_typed_number() {
    let mut conv = conversation_with(NumberPrompt::new("age", NumberKind::Int32).unwrap());
    conv.prompt(
        "age",
        PromptOptions::new()
            .with_prompt_text("How old are you?")
            .with_retry_prompt_text("Please enter a number."),
    )
    .await
    .unwrap();

    assert!(conv.say("old enough").await.unwrap().is_waiting());
    let result = conv.say("I'm 42").await.unwrap();
    assert!(result.is_complete());
    assert_eq!(result.result_as::<i64>(), Some(42));
    assert_eq!(
        conv.sent_texts(),
        vec!["How old are you?", "Please enter a number."]
    );
}

#[tokio::test]
async fn choice_prompt_lists_choices_inline_and_matches_by_position() {
    let mut conv = conversation_with(ChoicePrompt::new("color").unwrap());
    conv.prompt(
        "color",
        PromptOptions::new()
            .with_prompt_text("Pick a color")
            .with_choices(["red", "green", "blue"]),
    )
    .await
    .unwrap();

    assert_eq!(
        conv.sent_texts(),
        vec!["Pick a color (1) red, (2) green, or (3) blue"]
    );

    let result = conv.say("2").await.unwrap();
    let found: FoundChoice = result.result_as().unwrap();
    assert_eq!(found.value, "green");
    assert_eq!(found.index, 1);
}

#[tokio::test]
async fn choice_prompt_matches_choice_text() {
    let mut conv = conversation_with(ChoicePrompt::new("color").unwrap());
    conv.prompt(
        "color",
        PromptOptions::new()
            .with_prompt_text("Pick a color")
            .with_retry_prompt_text("Please pick one of the colors.")
            .with_choices(["red", "green", "blue"]),
    )
    .await
    .unwrap();

    assert!(conv.say("purple").await.unwrap().is_waiting());
    assert_eq!(
        conv.sent_texts()[1],
        "Please pick one of the colors. (1) red, (2) green, or (3) blue"
    );

    let result = conv.say("I'd like blue please").await.unwrap();
    let found: FoundChoice = result.result_as().unwrap();
    assert_eq!(found.value, "blue");
    assert_eq!(found.index, 2);
}

#[tokio::test]
async fn confirm_prompt_appends_yes_no_and_accepts_words_or_numbers() {
    let mut conv = conversation_with(ConfirmPrompt::new("sure").unwrap());
    let options = PromptOptions::new().with_prompt_text("Continue?");

    conv.prompt("sure", options.clone()).await.unwrap();
    assert_eq!(conv.sent_texts(), vec!["Continue? (1) Yes or (2) No"]);
    let result = conv.say("yes").await.unwrap();
    assert_eq!(result.result_as::<bool>(), Some(true));

    conv.prompt("sure", options).await.unwrap();
    let result = conv.say("2").await.unwrap();
    assert_eq!(result.result_as::<bool>(), Some(false));
}

#[tokio::test]
async fn confirm_prompt_follows_the_activity_locale() {
    let mut conv = conversation_with(ConfirmPrompt::new("sure").unwrap());
    conv.prompt("sure", PromptOptions::new().with_prompt_text("Continuer ?"))
        .await
        .unwrap();

    let reply = Activity {
        locale: Some("fr-fr".into()),
        ..TestAdapter::message("non")
    };
    let result = conv.send(reply).await.unwrap();
    assert_eq!(result.result_as::<bool>(), Some(false));
}

#[tokio::test]
async fn datetime_prompt_resolves_iso_dates() {
    let mut conv = conversation_with(DateTimePrompt::new("when").unwrap());
    conv.prompt("when", PromptOptions::new().with_prompt_text("When?"))
        .await
        .unwrap();

    assert!(conv.say("whenever").await.unwrap().is_waiting());
    let result = conv.say("let's meet on 2024-05-01").await.unwrap();
    let resolutions: Vec<DateTimeResolution> = result.result_as().unwrap();
    assert_eq!(resolutions[0].value.as_deref(), Some("2024-05-01"));
}

#[tokio::test]
async fn attachment_prompt_waits_for_an_attachment() {
    let mut conv = conversation_with(AttachmentPrompt::new("upload").unwrap());
    conv.prompt("upload", PromptOptions::new().with_prompt_text("Send a photo"))
        .await
        .unwrap();

    assert!(conv.say("here you go").await.unwrap().is_waiting());

    let photo = Attachment {
        content_type: "image/png".into(),
        content_url: Some("https://files.example.com/photo.png".into()),
        name: Some("photo.png".into()),
        ..Default::default()
    };
    let reply = Activity {
        attachments: vec![photo.clone()],
        ..Activity::message()
    };
    let result = conv.send(reply).await.unwrap();
    assert_eq!(result.result_as::<Vec<Attachment>>(), Some(vec![photo]));
}

#[tokio::test]
async fn activity_prompt_accepts_events_through_its_validator() {
    let prompt = ActivityPrompt::new(
        "wait-for-event",
        validator_fn(|ctx: &PromptValidatorContext<'_, Activity>| {
            Ok(ctx
                .recognized
                .value()
                .is_some_and(|activity| activity.is_type(ActivityType::Event)))
        }),
    )
    .unwrap();
    let mut conv = conversation_with(prompt);
    conv.prompt(
        "wait-for-event",
        PromptOptions::new()
            .with_prompt_text("Waiting for the device")
            .with_retry_prompt_text("Still waiting for the device"),
    )
    .await
    .unwrap();

    assert!(conv.say("hello?").await.unwrap().is_waiting());
    assert_eq!(conv.attempt_count(), 1);

    let result = conv
        .send(TestAdapter::event("device/ready", json!({ "serial": "A-17" })))
        .await
        .unwrap();
    let activity: Activity = result.result_as().unwrap();
    assert_eq!(activity.name.as_deref(), Some("device/ready"));
    assert_eq!(activity.value, Some(json!({ "serial": "A-17" })));
    assert_eq!(
        conv.sent_texts(),
        vec!["Waiting for the device", "Still waiting for the device"]
    );
}
