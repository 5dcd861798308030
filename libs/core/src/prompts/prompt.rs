use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dlg_schema::{Activity, ActivityType, InputHint};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::choices::{Choice, ChoiceFactory, ChoiceFactoryOptions, ListStyle};
use crate::dialogs::{Dialog, DialogContext, DialogInstance, DialogReason, DialogTurnResult};
use crate::error::{DialogError, DialogResult};
use crate::prompts::{
    PromptOptions, PromptRecognizerResult, PromptValidator, PromptValidatorContext,
};
use crate::telemetry;
use crate::turn::TurnContext;

/// Dialog state slot holding the [`PromptOptions`].
pub const PERSISTED_OPTIONS: &str = "options";
/// Dialog state slot holding the prompt's private state map.
pub const PERSISTED_STATE: &str = "state";
pub const ATTEMPT_COUNT_KEY: &str = "AttemptCount";

/// How one flavor of prompt renders its question and reads the answer.
///
/// Everything else (state slots, attempt counting, validation, retries) is
/// shared by [`Prompt`].
#[async_trait]
pub trait PromptKind: Send + Sync + 'static {
    type Output: Serialize + Send + Sync + 'static;

    /// Short label used in logs and metrics.
    const KIND: &'static str;

    async fn on_prompt(
        &self,
        turn: &TurnContext,
        state: &Map<String, Value>,
        options: &PromptOptions,
        is_retry: bool,
    ) -> DialogResult<()>;

    async fn on_recognize(
        &self,
        turn: &TurnContext,
        state: &Map<String, Value>,
        options: &PromptOptions,
    ) -> DialogResult<PromptRecognizerResult<Self::Output>>;
}

/// A dialog that asks one question and ends with the recognized answer.
pub struct Prompt<K: PromptKind> {
    id: String,
    kind: K,
    validator: Option<Arc<dyn PromptValidator<K::Output>>>,
}

impl<K: PromptKind> Prompt<K> {
    pub fn with_kind(id: impl Into<String>, kind: K) -> DialogResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DialogError::invalid_argument("dialog id cannot be blank"));
        }
        Ok(Self {
            id,
            kind,
            validator: None,
        })
    }

    pub fn with_validator(mut self, validator: impl PromptValidator<K::Output> + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut K {
        &mut self.kind
    }

    async fn validate(
        &self,
        turn: &TurnContext,
        recognized: &PromptRecognizerResult<K::Output>,
        state: &Map<String, Value>,
        options: &PromptOptions,
    ) -> DialogResult<bool> {
        match &self.validator {
            Some(validator) => {
                let ctx = PromptValidatorContext {
                    turn,
                    recognized,
                    state,
                    options,
                };
                validator.validate(&ctx).await.map_err(DialogError::Validator)
            }
            None => Ok(recognized.succeeded()),
        }
    }
}

impl<K: PromptKind + fmt::Debug> fmt::Debug for Prompt<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prompt")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

#[async_trait]
impl<K: PromptKind> Dialog for Prompt<K> {
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

        let state = init_state(dc.require_active_mut()?, &options)?;
        telemetry::record_prompt_started(K::KIND);
        debug!(dialog_id = %self.id, kind = K::KIND, "prompt started");

        self.kind.on_prompt(dc.turn(), &state, &options, false).await?;
        Ok(DialogTurnResult::end_of_turn())
    }

    async fn continue_dialog(&self, dc: &mut DialogContext<'_>) -> DialogResult<DialogTurnResult> {
        let turn = dc.turn();
        if !turn.is_type(ActivityType::Message) {
            return Ok(DialogTurnResult::end_of_turn());
        }

        let (options, mut state) = load_state(dc.require_active_mut()?)?;
        let recognized = self.kind.on_recognize(turn, &state, &options).await?;
        let attempt = record_attempt(dc.require_active_mut()?, &mut state)?;

        if self.validate(turn, &recognized, &state, &options).await? {
            telemetry::record_prompt_completed(K::KIND, "recognized");
            info!(dialog_id = %self.id, kind = K::KIND, attempt, "prompt recognized");
            let value = recognized
                .into_value()
                .map(serde_json::to_value)
                .transpose()?;
            return dc.end_dialog(value).await;
        }

        debug!(dialog_id = %self.id, kind = K::KIND, attempt, "prompt input rejected");
        if !turn.responded() {
            telemetry::record_prompt_retry(K::KIND);
            self.kind.on_prompt(turn, &state, &options, true).await?;
        }
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
        let (options, state) = load_state(instance)?;
        self.kind.on_prompt(turn, &state, &options, false).await
    }
}

/// Decodes dialog options; `Ok(None)` when none were passed.
pub(crate) fn parse_options(options: Option<Value>) -> DialogResult<Option<PromptOptions>> {
    match options {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value).map(Some).map_err(|err| {
            DialogError::invalid_argument(format!("Prompt options must be PromptOptions: {err}"))
        }),
    }
}

/// Writes the options and a fresh attempt counter into `instance`.
pub(crate) fn init_state(
    instance: &mut DialogInstance,
    options: &PromptOptions,
) -> DialogResult<Map<String, Value>> {
    let mut state = Map::new();
    state.insert(ATTEMPT_COUNT_KEY.to_string(), json!(0));
    instance.set_slot(PERSISTED_OPTIONS, options)?;
    instance.set_slot(PERSISTED_STATE, &state)?;
    Ok(state)
}

pub(crate) fn load_state(
    instance: &DialogInstance,
) -> DialogResult<(PromptOptions, Map<String, Value>)> {
    let options = instance.required_slot(PERSISTED_OPTIONS)?;
    let state = instance.slot(PERSISTED_STATE)?.unwrap_or_default();
    Ok((options, state))
}

/// Bumps the attempt counter in `state` and persists it; returns the new count.
pub(crate) fn record_attempt(
    instance: &mut DialogInstance,
    state: &mut Map<String, Value>,
) -> DialogResult<u64> {
    let attempt = state
        .get(ATTEMPT_COUNT_KEY)
        .and_then(Value::as_u64)
        .unwrap_or(0)
        + 1;
    state.insert(ATTEMPT_COUNT_KEY.to_string(), json!(attempt));
    instance.set_slot(PERSISTED_STATE, state)?;
    Ok(attempt)
}

/// Sends the retry prompt when retrying and one was given, else the prompt.
pub(crate) async fn send_prompt(
    turn: &TurnContext,
    options: &PromptOptions,
    is_retry: bool,
) -> DialogResult<()> {
    let activity = match (is_retry, &options.retry_prompt) {
        (true, Some(retry)) => Some(retry),
        _ => options.prompt.as_ref(),
    };
    if let Some(activity) = activity {
        turn.send_activity(activity.clone()).await?;
    }
    Ok(())
}

/// Renders `choices` onto a copy of `prompt` using `style`.
///
/// The input activity is never modified. Without a prompt the rendered
/// choices are returned as-is, marked as expecting input.
pub fn append_choices(
    prompt: Option<&Activity>,
    channel_id: &str,
    choices: &[Choice],
    style: ListStyle,
    options: Option<&ChoiceFactoryOptions>,
) -> Activity {
    let text = prompt
        .and_then(|p| p.text.as_deref())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_default();

    let rendered = match style {
        ListStyle::Inline => ChoiceFactory::inline(choices, Some(text), None, options),
        ListStyle::List => ChoiceFactory::list(choices, Some(text), None, options),
        ListStyle::SuggestedAction => ChoiceFactory::suggested_action(choices, Some(text), None),
        ListStyle::HeroCard => ChoiceFactory::hero_card(choices, Some(text), None),
        ListStyle::None => Activity::text(text),
        ListStyle::Auto => {
            ChoiceFactory::for_channel(channel_id, choices, Some(text), None, options)
        }
    };

    match prompt {
        Some(prompt) => {
            let mut merged = prompt.clone();
            merged.text = rendered.text;
            if let Some(actions) = rendered
                .suggested_actions
                .filter(|actions| !actions.actions.is_empty())
            {
                merged.suggested_actions = Some(actions);
            }
            merged.attachments.extend(rendered.attachments);
            merged
        }
        None => {
            let mut rendered = rendered;
            rendered.input_hint = Some(InputHint::ExpectingInput);
            rendered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlg_schema::channels;

    fn colors() -> Vec<Choice> {
        ChoiceFactory::to_choices(["red", "green", "blue"])
    }

    #[test]
    fn append_choices_leaves_the_prompt_untouched() {
        let prompt = Activity::text("favorite color?");
        let before = prompt.clone();

        let rendered = append_choices(
            Some(&prompt),
            channels::TEST,
            &colors(),
            ListStyle::Inline,
            None,
        );
        assert_eq!(prompt, before);
        assert_eq!(
            rendered.text.as_deref(),
            Some("favorite color? (1) red, (2) green, or (3) blue")
        );
    }

    #[test]
    fn append_choices_merges_actions_and_cards() {
        let prompt = Activity::text("pick");
        let suggested = append_choices(
            Some(&prompt),
            channels::TEST,
            &colors(),
            ListStyle::SuggestedAction,
            None,
        );
        assert_eq!(suggested.suggested_actions.unwrap().actions.len(), 3);
        assert_eq!(suggested.text.as_deref(), Some("pick"));

        let card = append_choices(
            Some(&prompt),
            channels::TEST,
            &colors(),
            ListStyle::HeroCard,
            None,
        );
        assert_eq!(card.attachments.len(), 1);
        assert!(card.text.is_none());
    }

    #[test]
    fn append_choices_without_prompt_expects_input() {
        let rendered = append_choices(None, channels::TEST, &colors(), ListStyle::List, None);
        assert_eq!(rendered.input_hint, Some(InputHint::ExpectingInput));
        assert_eq!(
            rendered.text.as_deref(),
            Some("\n\n   1. red\n   2. green\n   3. blue")
        );
    }

    #[test]
    fn style_none_keeps_only_text() {
        let prompt = Activity::text("pick");
        let rendered = append_choices(
            Some(&prompt),
            channels::WEBCHAT,
            &colors(),
            ListStyle::None,
            None,
        );
        assert_eq!(rendered.text.as_deref(), Some("pick"));
        assert!(rendered.suggested_actions.is_none());
        assert!(rendered.attachments.is_empty());
    }

    #[test]
    fn blank_options_are_rejected() {
        assert!(parse_options(None).unwrap().is_none());
        let err = parse_options(Some(json!("not options"))).unwrap_err();
        assert!(matches!(err, DialogError::InvalidArgument(_)));
    }
}
