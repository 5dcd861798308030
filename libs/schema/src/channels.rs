//! Well-known channel identifiers.

pub const CORTANA: &str = "cortana";
pub const DIRECTLINE: &str = "directline";
pub const DIRECTLINE_SPEECH: &str = "directlinespeech";
pub const EMAIL: &str = "email";
pub const EMULATOR: &str = "emulator";
pub const FACEBOOK: &str = "facebook";
pub const GROUPME: &str = "groupme";
pub const KIK: &str = "kik";
pub const LINE: &str = "line";
pub const MSTEAMS: &str = "msteams";
pub const SKYPE: &str = "skype";
pub const SKYPE_FOR_BUSINESS: &str = "skypeforbusiness";
pub const SLACK: &str = "slack";
pub const SMS: &str = "sms";
pub const TELEGRAM: &str = "telegram";
pub const TEST: &str = "test";
pub const WEBCHAT: &str = "webchat";
