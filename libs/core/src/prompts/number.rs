use async_trait::async_trait;
use dlg_schema::ActivityType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::PromptDefaults;
use crate::culture::{locales, map_to_nearest_language};
use crate::error::DialogResult;
use crate::prompts::prompt::send_prompt;
use crate::prompts::{Prompt, PromptKind, PromptOptions, PromptRecognizerResult};
use crate::turn::TurnContext;

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?\d(?:[\d.,]*\d)?").expect("number pattern is valid"));

/// Languages writing `1.234,5` rather than `1,234.5`.
const COMMA_DECIMAL_LANGUAGES: &[&str] = &["bg", "de", "es", "fr", "it", "nl", "pt", "sv", "tr"];

/// Numeric type a [`NumberPrompt`] produces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum NumberKind {
    Int32,
    Int64,
    Float32,
    #[default]
    Float64,
}

/// A recognized number, typed by the prompt's [`NumberKind`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NumberValue {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
}

impl NumberValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            NumberValue::Int32(v) => f64::from(v),
            NumberValue::Int64(v) => v as f64,
            NumberValue::Float32(v) => f64::from(v),
            NumberValue::Float64(v) => v,
        }
    }

    /// Integer value; `None` for floating-point kinds.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            NumberValue::Int32(v) => Some(i64::from(v)),
            NumberValue::Int64(v) => Some(v),
            NumberValue::Float32(_) | NumberValue::Float64(_) => None,
        }
    }
}

/// Recognizes the first number in the message.
#[derive(Debug, Clone, Default)]
pub struct NumberPromptKind {
    pub number_kind: NumberKind,
    pub default_locale: Option<String>,
}

pub type NumberPrompt = Prompt<NumberPromptKind>;

impl Prompt<NumberPromptKind> {
    pub fn new(id: impl Into<String>, number_kind: NumberKind) -> DialogResult<Self> {
        Prompt::with_kind(
            id,
            NumberPromptKind {
                number_kind,
                default_locale: None,
            },
        )
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.kind_mut().default_locale = Some(locale.into());
        self
    }

    /// Takes the default locale from process-wide [`PromptDefaults`].
    pub fn with_defaults(self, defaults: &PromptDefaults) -> Self {
        self.with_default_locale(defaults.default_locale.as_str())
    }
}

/// Finds the first number in `utterance` and parses it as `kind`.
///
/// Thousands and decimal separators follow `locale`. Integer kinds reject
/// fractional input.
pub fn recognize_number(utterance: &str, locale: &str, kind: NumberKind) -> Option<NumberValue> {
    let raw = NUMBER.find(utterance)?.as_str();
    let normalized = normalize_separators(raw, locale);
    match kind {
        NumberKind::Int32 => normalized.parse().ok().map(NumberValue::Int32),
        NumberKind::Int64 => normalized.parse().ok().map(NumberValue::Int64),
        NumberKind::Float32 => normalized.parse().ok().map(NumberValue::Float32),
        NumberKind::Float64 => normalized.parse().ok().map(NumberValue::Float64),
    }
}

fn normalize_separators(raw: &str, locale: &str) -> String {
    let culture = map_to_nearest_language(locale);
    let language = culture.split('-').next().unwrap_or_default();
    let (thousands, decimal) = if COMMA_DECIMAL_LANGUAGES.contains(&language) {
        ('.', ',')
    } else {
        (',', '.')
    };
    raw.trim_start_matches('+')
        .chars()
        .filter(|c| *c != thousands)
        .map(|c| if c == decimal { '.' } else { c })
        .collect()
}

#[async_trait]
impl PromptKind for NumberPromptKind {
    type Output = NumberValue;
    const KIND: &'static str = "number";

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
    ) -> DialogResult<PromptRecognizerResult<NumberValue>> {
        let value = turn.with_activity(|activity| {
            if !activity.is_type(ActivityType::Message) {
                return None;
            }
            let utterance = activity.text.as_deref().filter(|t| !t.is_empty())?;
            let locale = activity
                .locale
                .as_deref()
                .or(self.default_locale.as_deref())
                .unwrap_or(locales::ENGLISH);
            recognize_number(utterance, locale, self.number_kind)
        });
        Ok(value
            .map(PromptRecognizerResult::success)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_found_inside_text() {
        assert_eq!(
            recognize_number("I am 42 years old", "en-us", NumberKind::Int32),
            Some(NumberValue::Int32(42))
        );
        assert_eq!(
            recognize_number("-7 degrees", "en-us", NumberKind::Int64),
            Some(NumberValue::Int64(-7))
        );
        assert_eq!(recognize_number("no digits here", "en-us", NumberKind::Int32), None);
    }

    #[test]
    fn integer_kinds_reject_fractions() {
        assert_eq!(recognize_number("3.5", "en-us", NumberKind::Int32), None);
        assert_eq!(
            recognize_number("3.5", "en-us", NumberKind::Float64),
            Some(NumberValue::Float64(3.5))
        );
    }

    #[test]
    fn separators_follow_the_culture() {
        assert_eq!(
            recognize_number("1,234.5", "en-us", NumberKind::Float64),
            Some(NumberValue::Float64(1234.5))
        );
        assert_eq!(
            recognize_number("1.234,5", "de-DE", NumberKind::Float64),
            Some(NumberValue::Float64(1234.5))
        );
        assert_eq!(
            recognize_number("3,5", "fr-fr", NumberKind::Float32),
            Some(NumberValue::Float32(3.5))
        );
    }

    #[test]
    fn out_of_range_values_fail() {
        assert_eq!(recognize_number("99999999999", "en-us", NumberKind::Int32), None);
        assert_eq!(
            recognize_number("99999999999", "en-us", NumberKind::Int64),
            Some(NumberValue::Int64(99_999_999_999))
        );
    }

    #[test]
    fn values_serialize_as_plain_numbers() {
        assert_eq!(serde_json::to_value(NumberValue::Int32(5)).unwrap(), serde_json::json!(5));
        assert_eq!(NumberValue::Float32(2.5).as_f64(), 2.5);
        assert_eq!(NumberValue::Float64(2.5).as_i64(), None);
    }
}
