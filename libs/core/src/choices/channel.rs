//! What each channel can render, used to pick a choice layout.

use dlg_schema::channels;

const DEFAULT_BUTTON_COUNT: usize = 100;
const MAX_ACTION_TITLE_LENGTH: usize = 20;

pub fn supports_suggested_actions(channel_id: &str) -> bool {
    supports_suggested_actions_count(channel_id, DEFAULT_BUTTON_COUNT)
}

pub fn supports_suggested_actions_count(channel_id: &str, button_count: usize) -> bool {
    match channel_id {
        channels::FACEBOOK | channels::SKYPE => button_count <= 10,
        channels::LINE => button_count <= 13,
        channels::KIK => button_count <= 20,
        channels::TELEGRAM
        | channels::EMULATOR
        | channels::DIRECTLINE
        | channels::DIRECTLINE_SPEECH
        | channels::WEBCHAT => button_count <= 100,
        _ => false,
    }
}

pub fn supports_card_actions(channel_id: &str) -> bool {
    supports_card_actions_count(channel_id, DEFAULT_BUTTON_COUNT)
}

pub fn supports_card_actions_count(channel_id: &str, button_count: usize) -> bool {
    match channel_id {
        channels::FACEBOOK | channels::SKYPE | channels::MSTEAMS => button_count <= 3,
        channels::LINE => button_count <= 99,
        channels::SLACK
        | channels::EMULATOR
        | channels::DIRECTLINE
        | channels::DIRECTLINE_SPEECH
        | channels::WEBCHAT
        | channels::CORTANA => button_count <= 100,
        _ => false,
    }
}

pub fn has_message_feed(channel_id: &str) -> bool {
    channel_id != channels::CORTANA
}

pub fn max_action_title_length(_channel_id: &str) -> usize {
    MAX_ACTION_TITLE_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggested_action_limits() {
        assert!(supports_suggested_actions_count(channels::FACEBOOK, 10));
        assert!(!supports_suggested_actions_count(channels::FACEBOOK, 11));
        assert!(supports_suggested_actions_count(channels::LINE, 13));
        assert!(supports_suggested_actions_count(channels::KIK, 20));
        assert!(supports_suggested_actions(channels::WEBCHAT));
        assert!(!supports_suggested_actions(channels::MSTEAMS));
        assert!(!supports_suggested_actions("unknown"));
    }

    #[test]
    fn card_action_limits() {
        assert!(supports_card_actions_count(channels::MSTEAMS, 3));
        assert!(!supports_card_actions_count(channels::MSTEAMS, 4));
        assert!(supports_card_actions_count(channels::LINE, 99));
        assert!(supports_card_actions(channels::CORTANA));
        assert!(!supports_card_actions(channels::TELEGRAM));
    }

    #[test]
    fn only_cortana_lacks_a_message_feed() {
        assert!(!has_message_feed(channels::CORTANA));
        assert!(has_message_feed(channels::EMULATOR));
        assert_eq!(max_action_title_length(channels::SLACK), 20);
    }
}
