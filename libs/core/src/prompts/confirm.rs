use async_trait::async_trait;
use dlg_schema::ActivityType;
use serde_json::{Map, Value};

use crate::choices::{
    Choice, ChoiceFactoryOptions, FindChoicesOptions, ListStyle, recognize_choices, tokenize,
};
use crate::config::PromptDefaults;
use crate::culture::{CultureTable, PromptCultureModel};
use crate::error::DialogResult;
use crate::prompts::prompt::append_choices;
use crate::prompts::{Prompt, PromptKind, PromptOptions, PromptRecognizerResult};
use crate::turn::TurnContext;

const ENGLISH_YES: &[&str] = &["yes", "y", "yeah", "yep", "sure", "ok", "true"];
const ENGLISH_NO: &[&str] = &["no", "n", "nope", "false"];

/// Asks a yes/no question and returns a boolean.
#[derive(Debug, Clone, Default)]
pub struct ConfirmKind {
    pub default_locale: Option<String>,
    /// Used when the prompt options carry no style.
    pub style: ListStyle,
    /// Overrides the culture's phrasing.
    pub choice_options: Option<ChoiceFactoryOptions>,
    /// Overrides the choices matched when the user answers by number.
    pub confirm_choices: Option<(Choice, Choice)>,
    pub cultures: CultureTable,
}

pub type ConfirmPrompt = Prompt<ConfirmKind>;

impl Prompt<ConfirmKind> {
    pub fn new(id: impl Into<String>) -> DialogResult<Self> {
        Prompt::with_kind(id, ConfirmKind::default())
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

    pub fn with_confirm_choices(mut self, yes: Choice, no: Choice) -> Self {
        self.kind_mut().confirm_choices = Some((yes, no));
        self
    }

    pub fn with_cultures(mut self, cultures: CultureTable) -> Self {
        self.kind_mut().cultures = cultures;
        self
    }
}

impl ConfirmKind {
    fn culture(&self, activity_locale: Option<&str>) -> &PromptCultureModel {
        self.cultures
            .resolve([activity_locale, self.default_locale.as_deref()])
    }

    fn factory_options(&self, culture: &PromptCultureModel) -> ChoiceFactoryOptions {
        self.choice_options
            .clone()
            .unwrap_or_else(|| culture.choice_factory_options())
    }
}

/// Yes/no lexicon lookup: the culture's own words plus common English ones.
fn recognize_boolean(utterance: &str, culture: &PromptCultureModel) -> Option<bool> {
    let yes = culture.yes_in_language.to_lowercase();
    let no = culture.no_in_language.to_lowercase();
    let whole = utterance.trim().to_lowercase();
    if whole == yes {
        return Some(true);
    }
    if whole == no {
        return Some(false);
    }
    tokenize(utterance).into_iter().find_map(|token| {
        let word = token.normalized.as_str();
        if word == yes || ENGLISH_YES.contains(&word) {
            Some(true)
        } else if word == no || ENGLISH_NO.contains(&word) {
            Some(false)
        } else {
            None
        }
    })
}

#[async_trait]
impl PromptKind for ConfirmKind {
    type Output = bool;
    const KIND: &'static str = "confirm";

    async fn on_prompt(
        &self,
        turn: &TurnContext,
        _state: &Map<String, Value>,
        options: &PromptOptions,
        is_retry: bool,
    ) -> DialogResult<()> {
        let (channel_id, locale) =
            turn.with_activity(|a| (a.channel_id.clone().unwrap_or_default(), a.locale.clone()));
        let culture = self.culture(locale.as_deref());
        let choices = [
            Choice::new(culture.yes_in_language.as_str()),
            Choice::new(culture.no_in_language.as_str()),
        ];
        let factory_options = self.factory_options(culture);
        let style = options.style.unwrap_or(self.style);

        let base = match (is_retry, &options.retry_prompt) {
            (true, Some(retry)) => Some(retry),
            _ => options.prompt.as_ref(),
        };
        let activity = append_choices(base, &channel_id, &choices, style, Some(&factory_options));
        turn.send_activity(activity).await?;
        Ok(())
    }

    async fn on_recognize(
        &self,
        turn: &TurnContext,
        _state: &Map<String, Value>,
        _options: &PromptOptions,
    ) -> DialogResult<PromptRecognizerResult<bool>> {
        let activity = turn.activity();
        if !activity.is_type(ActivityType::Message) {
            return Ok(PromptRecognizerResult::none());
        }
        let Some(utterance) = activity.text.as_deref().filter(|t| !t.trim().is_empty()) else {
            return Ok(PromptRecognizerResult::none());
        };

        let culture = self.culture(activity.locale.as_deref());
        if let Some(value) = recognize_boolean(utterance, culture) {
            return Ok(PromptRecognizerResult::success(value));
        }

        // Prompts rendered with numbers accept "1" / "2" as answers.
        if !self.factory_options(culture).include_numbers {
            return Ok(PromptRecognizerResult::none());
        }
        let choices = match &self.confirm_choices {
            Some((yes, no)) => vec![yes.clone(), no.clone()],
            None => vec![
                Choice::new(culture.yes_in_language.as_str()),
                Choice::new(culture.no_in_language.as_str()),
            ],
        };
        let found = recognize_choices(utterance, &choices, Some(&FindChoicesOptions::default()));
        Ok(found
            .first()
            .map(|m| PromptRecognizerResult::success(m.resolution.index == 0))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culture::supported_cultures;

    fn culture(locale: &str) -> &'static PromptCultureModel {
        supported_cultures()
            .iter()
            .find(|c| c.locale == locale)
            .unwrap()
    }

    #[test]
    fn english_synonyms_are_understood() {
        let en = culture("en-us");
        assert_eq!(recognize_boolean("yes please", en), Some(true));
        assert_eq!(recognize_boolean("Nope.", en), Some(false));
        assert_eq!(recognize_boolean("maybe later", en), None);
    }

    #[test]
    fn culture_words_are_understood() {
        let fr = culture("fr-fr");
        assert_eq!(recognize_boolean("oui", fr), Some(true));
        assert_eq!(recognize_boolean("Non", fr), Some(false));

        let ja = culture("ja-jp");
        assert_eq!(recognize_boolean("はい", ja), Some(true));
    }
}
