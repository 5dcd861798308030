use std::collections::HashMap;
use std::fmt;

pub mod claims {
    pub const APP_ID: &str = "appid";
    pub const AUDIENCE: &str = "aud";
    pub const AUTHORIZED_PARTY: &str = "azp";
    pub const VERSION: &str = "ver";
}

/// App id carried by skill calls made without authentication.
pub const ANONYMOUS_SKILL_APP_ID: &str = "AnonymousSkill";
/// Audience of tokens issued by the channel service to a bot.
pub const TO_BOT_FROM_CHANNEL_TOKEN_ISSUER: &str = "https://api.botframework.com";

/// Authenticated identity of the caller, as a flat claim map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClaimsIdentity {
    claims: HashMap<String, String>,
    authenticated: bool,
}

impl ClaimsIdentity {
    pub fn new<I, K, V>(claims: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            claims: claims
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            authenticated: true,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).map(String::as_str)
    }

    pub fn claims(&self) -> &HashMap<String, String> {
        &self.claims
    }

    /// True when the identity belongs to a bot calling this bot as a skill.
    pub fn is_skill_claim(&self) -> bool {
        if self.claim(claims::APP_ID) == Some(ANONYMOUS_SKILL_APP_ID) {
            return true;
        }

        if non_blank(self.claim(claims::VERSION)).is_none() {
            return false;
        }

        let Some(audience) = non_blank(self.claim(claims::AUDIENCE)) else {
            return false;
        };
        if audience.eq_ignore_ascii_case(TO_BOT_FROM_CHANNEL_TOKEN_ISSUER) {
            return false;
        }

        match non_blank(self.app_id()) {
            Some(app_id) => !app_id.eq_ignore_ascii_case(audience),
            None => false,
        }
    }

    /// App id of the caller: `appid` for v1 tokens, `azp` for v2 tokens.
    pub fn app_id(&self) -> Option<&str> {
        match non_blank(self.claim(claims::VERSION)) {
            None | Some("1.0") => self.claim(claims::APP_ID),
            Some("2.0") => self.claim(claims::AUTHORIZED_PARTY),
            Some(_) => None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Credentials of an additional AAD app used for OAuth sign-in.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_password: String,
    pub oauth_scope: Option<String>,
}

impl AppCredentials {
    pub fn new(app_id: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_password: app_password.into(),
            oauth_scope: None,
        }
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("app_password", &"<redacted>")
            .field("oauth_scope", &self.oauth_scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_skill_is_a_skill_claim() {
        let identity = ClaimsIdentity::new([(claims::APP_ID, ANONYMOUS_SKILL_APP_ID)]);
        assert!(identity.is_skill_claim());
    }

    #[test]
    fn v1_skill_claim_uses_appid() {
        let identity = ClaimsIdentity::new([
            (claims::VERSION, "1.0"),
            (claims::AUDIENCE, "skill-app"),
            (claims::APP_ID, "parent-app"),
        ]);
        assert!(identity.is_skill_claim());
        assert_eq!(identity.app_id(), Some("parent-app"));
    }

    #[test]
    fn v2_skill_claim_uses_azp() {
        let identity = ClaimsIdentity::new([
            (claims::VERSION, "2.0"),
            (claims::AUDIENCE, "skill-app"),
            (claims::AUTHORIZED_PARTY, "parent-app"),
        ]);
        assert!(identity.is_skill_claim());
        assert_eq!(identity.app_id(), Some("parent-app"));
    }

    #[test]
    fn channel_issued_tokens_are_not_skill_claims() {
        let identity = ClaimsIdentity::new([
            (claims::VERSION, "1.0"),
            (claims::AUDIENCE, TO_BOT_FROM_CHANNEL_TOKEN_ISSUER),
            (claims::APP_ID, "parent-app"),
        ]);
        assert!(!identity.is_skill_claim());
    }

    #[test]
    fn missing_version_or_same_audience_is_not_a_skill_claim() {
        let no_version = ClaimsIdentity::new([(claims::AUDIENCE, "a"), (claims::APP_ID, "b")]);
        assert!(!no_version.is_skill_claim());

        let same_app = ClaimsIdentity::new([
            (claims::VERSION, "1.0"),
            (claims::AUDIENCE, "bot"),
            (claims::APP_ID, "BOT"),
        ]);
        assert!(!same_app.is_skill_claim());
    }

    #[test]
    fn debug_output_redacts_password() {
        let creds = AppCredentials::new("app", "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
