use serde::{Deserialize, Serialize};

use crate::credentials::ClaimsIdentity;

/// Where to send the reply when the prompt runs inside a skill.
///
/// Stored in the prompt's dialog state so the `tokens/response` event, which
/// arrives from the token service rather than the parent bot, can be routed
/// back to the parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CallerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_service_url: Option<String>,
    /// Audience (the parent bot's app id) for the rebuilt connector client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl CallerInfo {
    /// Captures the caller when `identity` is a skill claim; `None` otherwise.
    pub fn from_skill_call(
        identity: Option<&ClaimsIdentity>,
        service_url: Option<&str>,
    ) -> Option<Self> {
        let identity = identity.filter(|identity| identity.is_skill_claim())?;
        Some(Self {
            caller_service_url: service_url.map(str::to_string),
            scope: identity.app_id().map(str::to_string),
        })
    }
}
