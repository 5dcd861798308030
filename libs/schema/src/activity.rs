use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::card::{Attachment, SuggestedActions};
use crate::token::InvokeResponse;

/// Kind of an [`Activity`] as carried in its `type` field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    #[default]
    Message,
    Event,
    Invoke,
    InvokeResponse,
    Trace,
    Typing,
    ConversationUpdate,
    EndOfConversation,
    #[serde(other)]
    Unknown,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Message => "message",
            ActivityType::Event => "event",
            ActivityType::Invoke => "invoke",
            ActivityType::InvokeResponse => "invokeResponse",
            ActivityType::Trace => "trace",
            ActivityType::Typing => "typing",
            ActivityType::ConversationUpdate => "conversationUpdate",
            ActivityType::EndOfConversation => "endOfConversation",
            ActivityType::Unknown => "unknown",
        }
    }
}

/// Tells the channel whether the bot expects a reply after this activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum InputHint {
    AcceptingInput,
    ExpectingInput,
    IgnoringInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ChannelAccount {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_group: Option<bool>,
}

impl ConversationAccount {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Addressing details needed to send a reply into an existing conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConversationReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// A single unit of communication between a user and a bot.
///
/// Mirrors the Bot Framework activity schema closely enough that channel
/// payloads deserialize without loss for the fields prompts care about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type", default)]
    pub r#type: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub timestamp: Option<OffsetDateTime>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub local_timestamp: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speak: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_hint: Option<InputHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<SuggestedActions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_data: Option<Value>,
}

impl Activity {
    pub fn new(kind: ActivityType) -> Self {
        Self {
            r#type: kind,
            ..Default::default()
        }
    }

    pub fn message() -> Self {
        Self::new(ActivityType::Message)
    }

    /// Message activity carrying `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::message()
        }
    }

    /// Reply used by invoke handlers to hand a status/body pair back to the adapter.
    pub fn invoke_response(response: InvokeResponse) -> Self {
        Self {
            value: Some(json!({ "status": response.status, "body": response.body })),
            ..Self::new(ActivityType::InvokeResponse)
        }
    }

    pub fn is_type(&self, kind: ActivityType) -> bool {
        self.r#type == kind
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Streaming connections (Direct Line Speech, named pipes) carry a
    /// non-http service URL.
    pub fn is_from_streaming_connection(&self) -> bool {
        self.service_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty() && !url.to_ascii_lowercase().starts_with("http"))
    }

    /// Decodes `value` into `T`, treating malformed payloads as absent.
    pub fn value_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.value
            .as_ref()
            .filter(|value| !value.is_null())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn conversation_reference(&self) -> ConversationReference {
        ConversationReference {
            activity_id: self.id.clone(),
            user: self.from.clone(),
            bot: self.recipient.clone(),
            conversation: self.conversation.clone(),
            channel_id: self.channel_id.clone(),
            service_url: self.service_url.clone(),
            locale: self.locale.clone(),
        }
    }

    /// Addresses an outgoing reply using `reference`, keeping any field the
    /// caller already set explicitly.
    pub fn apply_conversation_reference(&mut self, reference: &ConversationReference) {
        if self.channel_id.is_none() {
            self.channel_id = reference.channel_id.clone();
        }
        if self.service_url.is_none() {
            self.service_url = reference.service_url.clone();
        }
        if self.conversation.is_none() {
            self.conversation = reference.conversation.clone();
        }
        if self.from.is_none() {
            self.from = reference.bot.clone();
        }
        if self.recipient.is_none() {
            self.recipient = reference.user.clone();
        }
        if self.reply_to_id.is_none() {
            self.reply_to_id = reference.activity_id.clone();
        }
        if self.locale.is_none() {
            self.locale = reference.locale.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_channel_payload() {
        let activity: Activity = serde_json::from_value(json!({
            "type": "message",
            "id": "a-1",
            "timestamp": "2024-05-01T10:00:00Z",
            "channelId": "webchat",
            "serviceUrl": "https://smba.example.com",
            "from": { "id": "user-1", "name": "Ada" },
            "recipient": { "id": "bot-1" },
            "conversation": { "id": "conv-1" },
            "text": "hello"
        }))
        .unwrap();

        assert!(activity.is_type(ActivityType::Message));
        assert_eq!(activity.text_or_empty(), "hello");
        assert_eq!(activity.from.as_ref().unwrap().name.as_deref(), Some("Ada"));
        assert!(activity.timestamp.is_some());
        assert!(!activity.is_from_streaming_connection());
    }

    #[test]
    fn unknown_types_do_not_fail_decoding() {
        let activity: Activity =
            serde_json::from_value(json!({ "type": "messageReaction" })).unwrap();
        assert_eq!(activity.r#type, ActivityType::Unknown);
    }

    #[test]
    fn serializes_camel_case_and_skips_empty_fields() {
        let mut activity = Activity::text("hi");
        activity.input_hint = Some(InputHint::ExpectingInput);
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(
            value,
            json!({ "type": "message", "text": "hi", "inputHint": "expectingInput" })
        );
    }

    #[test]
    fn streaming_connection_detected_from_service_url() {
        let mut activity = Activity::message();
        activity.service_url = Some("urn:botframework:namedpipe:bot".into());
        assert!(activity.is_from_streaming_connection());
        activity.service_url = Some("HTTPS://example.com".into());
        assert!(!activity.is_from_streaming_connection());
    }

    #[test]
    fn reply_is_addressed_from_reference() {
        let mut incoming = Activity::text("hello");
        incoming.id = Some("in-1".into());
        incoming.channel_id = Some("msteams".into());
        incoming.from = Some(ChannelAccount::new("user"));
        incoming.recipient = Some(ChannelAccount::new("bot"));
        incoming.conversation = Some(ConversationAccount::new("conv"));

        let mut reply = Activity::text("hi back");
        reply.apply_conversation_reference(&incoming.conversation_reference());

        assert_eq!(reply.from.unwrap().id, "bot");
        assert_eq!(reply.recipient.unwrap().id, "user");
        assert_eq!(reply.reply_to_id.as_deref(), Some("in-1"));
        assert_eq!(reply.channel_id.as_deref(), Some("msteams"));
    }

    #[test]
    fn invoke_response_wraps_status_and_body() {
        let activity = Activity::invoke_response(InvokeResponse::new(404));
        assert!(activity.is_type(ActivityType::InvokeResponse));
        assert_eq!(activity.value, Some(json!({ "status": 404, "body": null })));
    }

    #[test]
    fn value_as_ignores_malformed_payloads() {
        let mut activity = Activity::new(ActivityType::Invoke);
        activity.value = Some(json!("not an object"));
        let decoded: Option<crate::token::TokenExchangeInvokeRequest> = activity.value_as();
        assert!(decoded.is_none());
    }
}
