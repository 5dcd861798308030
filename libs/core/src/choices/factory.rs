use dlg_schema::{Activity, CardAction, HeroCard, InputHint, SuggestedActions};
use serde::{Deserialize, Serialize};

use crate::choices::{Choice, channel};

/// How a list of choices is rendered into a prompt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum ListStyle {
    /// Choices are not rendered; only the prompt text is sent.
    None,
    /// Picks a layout from the channel's capabilities.
    #[default]
    Auto,
    Inline,
    List,
    SuggestedAction,
    HeroCard,
}

/// Phrasing used when choices are rendered as text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceFactoryOptions {
    pub inline_separator: String,
    pub inline_or: String,
    pub inline_or_more: String,
    pub include_numbers: bool,
}

impl Default for ChoiceFactoryOptions {
    fn default() -> Self {
        Self {
            inline_separator: ", ".into(),
            inline_or: " or ".into(),
            inline_or_more: ", or ".into(),
            include_numbers: true,
        }
    }
}

/// Builds message activities that present a set of choices.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceFactory;

impl ChoiceFactory {
    /// Chooses hero card, suggested actions, inline or list for `channel_id`.
    pub fn for_channel(
        channel_id: &str,
        choices: &[Choice],
        text: Option<&str>,
        speak: Option<&str>,
        options: Option<&ChoiceFactoryOptions>,
    ) -> Activity {
        let max_title_length = choices
            .iter()
            .map(|c| c.title().chars().count())
            .max()
            .unwrap_or(0);
        let supports_suggested =
            channel::supports_suggested_actions_count(channel_id, choices.len());
        let supports_cards = channel::supports_card_actions_count(channel_id, choices.len());
        let long_titles = max_title_length > channel::max_action_title_length(channel_id);

        if !long_titles && !supports_suggested && supports_cards {
            return Self::hero_card(choices, text, speak);
        }
        if !long_titles && supports_suggested {
            return Self::suggested_action(choices, text, speak);
        }
        if !long_titles && choices.len() <= 3 {
            return Self::inline(choices, text, speak, options);
        }
        Self::list(choices, text, speak, options)
    }

    /// `text (1) red, (2) green, or (3) blue`
    pub fn inline(
        choices: &[Choice],
        text: Option<&str>,
        speak: Option<&str>,
        options: Option<&ChoiceFactoryOptions>,
    ) -> Activity {
        let defaults = ChoiceFactoryOptions::default();
        let opt = options.unwrap_or(&defaults);

        let mut out = match text.filter(|t| !t.trim().is_empty()) {
            Some(text) => format!("{text} "),
            None => " ".to_string(),
        };
        let mut connector = "";
        for (index, choice) in choices.iter().enumerate() {
            out.push_str(connector);
            if opt.include_numbers {
                out.push_str(&format!("({}) ", index + 1));
            }
            out.push_str(choice.title());
            connector = if index + 2 == choices.len() {
                if index == 0 {
                    &opt.inline_or
                } else {
                    &opt.inline_or_more
                }
            } else {
                &opt.inline_separator
            };
        }
        message(out, speak)
    }

    /// One choice per line, numbered or bulleted.
    pub fn list(
        choices: &[Choice],
        text: Option<&str>,
        speak: Option<&str>,
        options: Option<&ChoiceFactoryOptions>,
    ) -> Activity {
        let include_numbers = options.map(|o| o.include_numbers).unwrap_or(true);

        let mut out = match text {
            Some(text) => format!("{text}\n\n   "),
            None => String::new(),
        };
        let mut connector = "";
        for (index, choice) in choices.iter().enumerate() {
            out.push_str(connector);
            if include_numbers {
                out.push_str(&format!("{}. ", index + 1));
            } else {
                out.push_str("- ");
            }
            out.push_str(choice.title());
            connector = "\n   ";
        }
        message(out, speak)
    }

    pub fn suggested_action(
        choices: &[Choice],
        text: Option<&str>,
        speak: Option<&str>,
    ) -> Activity {
        let mut activity = Activity::message();
        activity.text = text.map(str::to_string);
        activity.speak = speak.map(str::to_string);
        activity.input_hint = Some(InputHint::ExpectingInput);
        activity.suggested_actions = Some(SuggestedActions {
            to: Vec::new(),
            actions: extract_actions(choices),
        });
        activity
    }

    pub fn hero_card(choices: &[Choice], text: Option<&str>, speak: Option<&str>) -> Activity {
        let card = HeroCard {
            text: text.map(str::to_string),
            buttons: extract_actions(choices),
            ..Default::default()
        };
        let mut activity = Activity::message();
        activity.speak = speak.map(str::to_string);
        activity.input_hint = Some(InputHint::ExpectingInput);
        activity.attachments.push(card.to_attachment());
        activity
    }

    pub fn to_choices<I, S>(values: I) -> Vec<Choice>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values.into_iter().map(Choice::new).collect()
    }
}

fn message(text: String, speak: Option<&str>) -> Activity {
    let mut activity = Activity::text(text);
    activity.speak = speak.map(str::to_string);
    activity.input_hint = Some(InputHint::ExpectingInput);
    activity
}

fn extract_actions(choices: &[Choice]) -> Vec<CardAction> {
    choices
        .iter()
        .map(|choice| {
            choice
                .action
                .clone()
                .unwrap_or_else(|| CardAction::im_back(choice.value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlg_schema::channels;
    use dlg_schema::card::content_types;
    use serde_json::json;

    fn colors() -> Vec<Choice> {
        ChoiceFactory::to_choices(["red", "green", "blue"])
    }

    #[test]
    fn inline_joins_with_or_more() {
        let activity = ChoiceFactory::inline(&colors(), Some("select from:"), None, None);
        assert_eq!(
            activity.text.as_deref(),
            Some("select from: (1) red, (2) green, or (3) blue")
        );
        assert_eq!(activity.input_hint, Some(InputHint::ExpectingInput));
    }

    #[test]
    fn inline_two_choices_use_plain_or() {
        let choices = ChoiceFactory::to_choices(["yes", "no"]);
        let options = ChoiceFactoryOptions {
            include_numbers: false,
            ..Default::default()
        };
        let activity = ChoiceFactory::inline(&choices, Some("ok?"), None, Some(&options));
        assert_eq!(activity.text.as_deref(), Some("ok? yes or no"));
    }

    #[test]
    fn list_numbers_each_line() {
        let activity = ChoiceFactory::list(&colors(), Some("select from:"), None, None);
        assert_eq!(
            activity.text.as_deref(),
            Some("select from:\n\n   1. red\n   2. green\n   3. blue")
        );

        let options = ChoiceFactoryOptions {
            include_numbers: false,
            ..Default::default()
        };
        let activity = ChoiceFactory::list(&colors(), None, None, Some(&options));
        assert_eq!(activity.text.as_deref(), Some("- red\n   - green\n   - blue"));
    }

    #[test]
    fn suggested_actions_are_im_back() {
        let activity = ChoiceFactory::suggested_action(&colors(), Some("pick"), None);
        let actions = activity.suggested_actions.unwrap().actions;
        assert_eq!(
            serde_json::to_value(&actions[0]).unwrap(),
            json!({ "type": "imBack", "title": "red", "value": "red" })
        );
    }

    #[test]
    fn hero_card_carries_buttons() {
        let activity = ChoiceFactory::hero_card(&colors(), Some("pick"), None);
        assert_eq!(activity.attachments.len(), 1);
        let attachment = &activity.attachments[0];
        assert!(attachment.is_content_type(content_types::HERO_CARD));
        assert_eq!(attachment.content["text"], json!("pick"));
        assert_eq!(attachment.content["buttons"].as_array().unwrap().len(), 3);
        assert!(activity.text.is_none());
    }

    #[test]
    fn for_channel_picks_layout_by_capability() {
        let choices = colors();

        let webchat =
            ChoiceFactory::for_channel(channels::WEBCHAT, &choices, Some("pick"), None, None);
        assert!(webchat.suggested_actions.is_some());

        let teams =
            ChoiceFactory::for_channel(channels::MSTEAMS, &choices, Some("pick"), None, None);
        assert_eq!(teams.attachments.len(), 1);

        let sms = ChoiceFactory::for_channel(channels::SMS, &choices, Some("pick"), None, None);
        assert_eq!(sms.text.as_deref(), Some("pick (1) red, (2) green, or (3) blue"));

        let many = ChoiceFactory::to_choices(["a", "b", "c", "d"]);
        let sms = ChoiceFactory::for_channel(channels::SMS, &many, Some("pick"), None, None);
        assert!(sms.text.unwrap().starts_with("pick\n\n   1. a"));
    }

    #[test]
    fn long_titles_fall_back_to_list() {
        let choices = ChoiceFactory::to_choices(["a very long choice title indeed", "short"]);
        let activity =
            ChoiceFactory::for_channel(channels::WEBCHAT, &choices, Some("pick"), None, None);
        assert!(activity.suggested_actions.is_none());
        assert!(activity.text.unwrap().contains("1. a very long choice title indeed"));
    }
}
