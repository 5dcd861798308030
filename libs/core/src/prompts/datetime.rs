use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dlg_schema::ActivityType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{Date, Duration, Month, OffsetDateTime, Time};

use crate::choices::tokenize;
use crate::config::PromptDefaults;
use crate::culture::locales;
use crate::error::DialogResult;
use crate::prompts::prompt::send_prompt;
use crate::prompts::{Prompt, PromptKind, PromptOptions, PromptRecognizerResult};
use crate::turn::TurnContext;

static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<date>\d{4}-\d{2}-\d{2})(?:[T ](?P<time>\d{1,2}:\d{2}(?::\d{2})?))?|\b(?P<clock>\d{1,2}:\d{2}(?::\d{2})?)\b",
    )
    .expect("date-time pattern is valid")
});

const RANGE_CONNECTORS: &[&str] = &["to", "until", "through", "-"];

/// One possible reading of a date or time expression.
///
/// Values use `yyyy-MM-dd`, `HH:mm:ss` or `yyyy-MM-dd HH:mm:ss`; ranges fill
/// `start` and `end` instead of `value`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeResolution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timex: Option<String>,
}

/// Turns an utterance into date-time resolutions.
///
/// Implementations return the resolutions of the first expression found, or
/// an empty list when there is none.
pub trait DateTimeRecognizer: Send + Sync {
    fn recognize(
        &self,
        utterance: &str,
        locale: &str,
        reference: Option<OffsetDateTime>,
    ) -> Vec<DateTimeResolution>;
}

/// Understands ISO-8601 dates, times and date-times, `<date> to <date>`
/// ranges, and `today` / `tomorrow` / `yesterday` relative to the reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoDateTimeRecognizer;

impl DateTimeRecognizer for IsoDateTimeRecognizer {
    fn recognize(
        &self,
        utterance: &str,
        _locale: &str,
        reference: Option<OffsetDateTime>,
    ) -> Vec<DateTimeResolution> {
        if let Some(resolution) = recognize_iso(utterance) {
            return vec![resolution];
        }
        let today = reference.unwrap_or_else(OffsetDateTime::now_utc).date();
        recognize_relative(utterance, today).into_iter().collect()
    }
}

fn recognize_iso(utterance: &str) -> Option<DateTimeResolution> {
    let mut captures = DATE_TIME.captures_iter(utterance);
    let first = captures.next()?;

    if let Some(clock) = first.name("clock") {
        let time = parse_time(clock.as_str())?;
        return Some(DateTimeResolution {
            value: Some(format_time(time)),
            timex: Some(format!("T{}", clock_timex(clock.as_str()))),
            ..Default::default()
        });
    }

    let date_match = first.name("date")?;
    let date = parse_date(date_match.as_str())?;

    if let Some(time_match) = first.name("time") {
        let time = parse_time(time_match.as_str())?;
        return Some(DateTimeResolution {
            value: Some(format!("{} {}", format_date(date), format_time(time))),
            timex: Some(format!(
                "{}T{}",
                format_date(date),
                clock_timex(time_match.as_str())
            )),
            ..Default::default()
        });
    }

    // `<date> to <date>` becomes a range.
    if let Some(second) = captures.next()
        && let Some(end_match) = second.name("date")
        && second.name("time").is_none()
    {
        let between = utterance[first.get(0)?.end()..end_match.start()]
            .trim()
            .to_lowercase();
        if RANGE_CONNECTORS.contains(&between.as_str())
            && let Some(end) = parse_date(end_match.as_str())
            && end > date
        {
            let days = (end - date).whole_days();
            return Some(DateTimeResolution {
                start: Some(format_date(date)),
                end: Some(format_date(end)),
                timex: Some(format!("({},{},P{days}D)", format_date(date), format_date(end))),
                ..Default::default()
            });
        }
    }

    Some(DateTimeResolution {
        value: Some(format_date(date)),
        timex: Some(format_date(date)),
        ..Default::default()
    })
}

fn recognize_relative(utterance: &str, today: Date) -> Option<DateTimeResolution> {
    tokenize(utterance).into_iter().find_map(|token| {
        let offset = match token.normalized.as_str() {
            "today" => 0,
            "tomorrow" => 1,
            "yesterday" => -1,
            _ => return None,
        };
        let date = today.checked_add(Duration::days(offset))?;
        Some(DateTimeResolution {
            value: Some(format_date(date)),
            timex: Some(format_date(date)),
            ..Default::default()
        })
    })
}

fn parse_date(raw: &str) -> Option<Date> {
    let mut parts = raw.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

fn parse_time(raw: &str) -> Option<Time> {
    let mut parts = raw.split(':');
    let hour: u8 = parts.next()?.parse().ok()?;
    let minute: u8 = parts.next()?.parse().ok()?;
    let second: u8 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    Time::from_hms(hour, minute, second).ok()
}

fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn format_time(time: Time) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    )
}

/// Zero-pads the hour of a `H:mm[:ss]` clock reading.
fn clock_timex(raw: &str) -> String {
    match raw.split_once(':') {
        Some((hour, rest)) if hour.len() == 1 => format!("0{hour}:{rest}"),
        _ => raw.to_string(),
    }
}

/// Recognizes dates and times through a pluggable [`DateTimeRecognizer`].
#[derive(Clone)]
pub struct DateTimeKind {
    pub default_locale: Option<String>,
    pub recognizer: Arc<dyn DateTimeRecognizer>,
}

impl Default for DateTimeKind {
    fn default() -> Self {
        Self {
            default_locale: None,
            recognizer: Arc::new(IsoDateTimeRecognizer),
        }
    }
}

impl fmt::Debug for DateTimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateTimeKind")
            .field("default_locale", &self.default_locale)
            .finish_non_exhaustive()
    }
}

pub type DateTimePrompt = Prompt<DateTimeKind>;

impl Prompt<DateTimeKind> {
    pub fn new(id: impl Into<String>) -> DialogResult<Self> {
        Prompt::with_kind(id, DateTimeKind::default())
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.kind_mut().default_locale = Some(locale.into());
        self
    }

    /// Takes the default locale from process-wide [`PromptDefaults`].
    pub fn with_defaults(self, defaults: &PromptDefaults) -> Self {
        self.with_default_locale(defaults.default_locale.as_str())
    }

    pub fn with_recognizer(mut self, recognizer: impl DateTimeRecognizer + 'static) -> Self {
        self.kind_mut().recognizer = Arc::new(recognizer);
        self
    }
}

#[async_trait]
impl PromptKind for DateTimeKind {
    type Output = Vec<DateTimeResolution>;
    const KIND: &'static str = "datetime";

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
    ) -> DialogResult<PromptRecognizerResult<Vec<DateTimeResolution>>> {
        let resolutions = turn.with_activity(|activity| {
            if !activity.is_type(ActivityType::Message) {
                return Vec::new();
            }
            let Some(utterance) = activity.text.as_deref().filter(|t| !t.is_empty()) else {
                return Vec::new();
            };
            let locale = activity
                .locale
                .as_deref()
                .or(self.default_locale.as_deref())
                .unwrap_or(locales::ENGLISH);
            self.recognizer
                .recognize(utterance, locale, activity.local_timestamp)
        });

        if resolutions.is_empty() {
            Ok(PromptRecognizerResult::none())
        } else {
            Ok(PromptRecognizerResult::success(resolutions))
        }
    }
}
