use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::token::TokenExchangeResource;

pub mod content_types {
    pub const HERO_CARD: &str = "application/vnd.microsoft.card.hero";
    pub const SIGNIN_CARD: &str = "application/vnd.microsoft.card.signin";
    pub const OAUTH_CARD: &str = "application/vnd.microsoft.card.oauth";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Attachment {
    pub fn is_content_type(&self, content_type: &str) -> bool {
        self.content_type.eq_ignore_ascii_case(content_type)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    ImBack,
    PostBack,
    MessageBack,
    OpenUrl,
    Signin,
    Call,
    ShowImage,
    DownloadFile,
    PlayAudio,
    PlayVideo,
}

/// A clickable action on a card or in a suggested-actions strip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardAction {
    #[serde(rename = "type")]
    pub r#type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CardAction {
    pub fn new(kind: ActionType) -> Self {
        Self {
            r#type: kind,
            title: None,
            value: None,
            text: None,
            display_text: None,
            image: None,
        }
    }

    /// `imBack` action whose title and posted value are both `value`.
    pub fn im_back(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            title: Some(value.clone()),
            value: Some(Value::String(value)),
            ..Self::new(ActionType::ImBack)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_value(mut self, value: Option<String>) -> Self {
        self.value = value.map(Value::String);
        self
    }

    pub fn value_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedActions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(default)]
    pub actions: Vec<CardAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HeroCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub buttons: Vec<CardAction>,
}

impl HeroCard {
    pub fn to_attachment(&self) -> Attachment {
        to_attachment(content_types::HERO_CARD, self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SigninCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub buttons: Vec<CardAction>,
}

impl SigninCard {
    pub fn to_attachment(&self) -> Attachment {
        to_attachment(content_types::SIGNIN_CARD, self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OAuthCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub connection_name: String,
    #[serde(default)]
    pub buttons: Vec<CardAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_exchange_resource: Option<TokenExchangeResource>,
}

impl OAuthCard {
    pub fn to_attachment(&self) -> Attachment {
        to_attachment(content_types::OAUTH_CARD, self)
    }
}

fn to_attachment<T: Serialize>(content_type: &str, card: &T) -> Attachment {
    Attachment {
        content_type: content_type.to_string(),
        content: serde_json::to_value(card).unwrap_or_default(),
        ..Default::default()
    }
}
