use async_trait::async_trait;
use dlg_schema::ActivityType;
use serde_json::{Map, Value};

use crate::choices::{
    ChoiceFactoryOptions, FindChoicesOptions, FoundChoice, ListStyle, recognize_choices,
};
use crate::config::PromptDefaults;
use crate::culture::CultureTable;
use crate::error::DialogResult;
use crate::prompts::prompt::append_choices;
use crate::prompts::{Prompt, PromptKind, PromptOptions, PromptRecognizerResult};
use crate::turn::TurnContext;

/// Offers the choices from the prompt options and returns the one picked.
#[derive(Debug, Clone, Default)]
pub struct ChoiceKind {
    pub default_locale: Option<String>,
    pub style: ListStyle,
    pub choice_options: Option<ChoiceFactoryOptions>,
    pub recognizer_options: Option<FindChoicesOptions>,
    pub cultures: CultureTable,
}

pub type ChoicePrompt = Prompt<ChoiceKind>;

impl Prompt<ChoiceKind> {
    pub fn new(id: impl Into<String>) -> DialogResult<Self> {
        Prompt::with_kind(id, ChoiceKind::default())
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.kind_mut().default_locale = Some(locale.into());
        self
    }

    /// Takes the default locale from process-wide [`PromptDefaults`].
    pub fn with_defaults(self, defaults: &PromptDefaults) -> Self {
        self.with_default_locale(defaults.default_locale.as_str())
    }

    pub fn with_style(mut self, style: ListStyle) -> Self {
        self.kind_mut().style = style;
        self
    }

    pub fn with_choice_options(mut self, options: ChoiceFactoryOptions) -> Self {
        self.kind_mut().choice_options = Some(options);
        self
    }

    pub fn with_recognizer_options(mut self, options: FindChoicesOptions) -> Self {
        self.kind_mut().recognizer_options = Some(options);
        self
    }

    pub fn with_cultures(mut self, cultures: CultureTable) -> Self {
        self.kind_mut().cultures = cultures;
        self
    }
}

#[async_trait]
impl PromptKind for ChoiceKind {
    type Output = FoundChoice;
    const KIND: &'static str = "choice";

    async fn on_prompt(
        &self,
        turn: &TurnContext,
        _state: &Map<String, Value>,
        options: &PromptOptions,
        is_retry: bool,
    ) -> DialogResult<()> {
        let (channel_id, locale) =
            turn.with_activity(|a| (a.channel_id.clone().unwrap_or_default(), a.locale.clone()));
        let culture = self
            .cultures
            .resolve([locale.as_deref(), self.default_locale.as_deref()]);
        let factory_options = self
            .choice_options
            .clone()
            .unwrap_or_else(|| culture.choice_factory_options());
        let style = options.style.unwrap_or(self.style);

        let base = match (is_retry, &options.retry_prompt) {
            (true, Some(retry)) => Some(retry),
            _ => options.prompt.as_ref(),
        };
        let activity = append_choices(
            base,
            &channel_id,
            &options.choices,
            style,
            Some(&factory_options),
        );
        turn.send_activity(activity).await?;
        Ok(())
    }

    async fn on_recognize(
        &self,
        turn: &TurnContext,
        _state: &Map<String, Value>,
        options: &PromptOptions,
    ) -> DialogResult<PromptRecognizerResult<FoundChoice>> {
        let activity = turn.activity();
        if !activity.is_type(ActivityType::Message) {
            return Ok(PromptRecognizerResult::none());
        }
        let Some(utterance) = activity.text.as_deref().filter(|t| !t.is_empty()) else {
            return Ok(PromptRecognizerResult::none());
        };

        let mut find_options = self.recognizer_options.clone().unwrap_or_default();
        let culture = self.cultures.resolve([
            activity.locale.as_deref(),
            find_options.values.locale.as_deref(),
            self.default_locale.as_deref(),
        ]);
        find_options.values.locale = Some(culture.locale.clone());

        let found = recognize_choices(utterance, &options.choices, Some(&find_options));
        Ok(found
            .into_iter()
            .next()
            .map(|m| PromptRecognizerResult::success(m.resolution))
            .unwrap_or_default())
    }
}
