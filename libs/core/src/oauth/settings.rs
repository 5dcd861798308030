use std::env;
use std::time::Duration;

use crate::credentials::AppCredentials;
use crate::error::{DialogError, DialogResult};

/// How long a sign-in card stays valid when no timeout is configured.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Connection and card settings for an [`OAuthPrompt`](crate::oauth::OAuthPrompt).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OAuthPromptSettings {
    /// Name of the OAuth connection configured on the token service.
    pub connection_name: String,
    /// Button title of the sign-in card.
    pub title: Option<String>,
    /// Text shown on the sign-in card.
    pub text: Option<String>,
    pub timeout: Option<Duration>,
    /// End the prompt instead of re-prompting when a message fails validation.
    pub end_on_invalid_message: bool,
    pub oauth_app_credentials: Option<AppCredentials>,
}

impl OAuthPromptSettings {
    pub fn new(connection_name: impl Into<String>) -> Self {
        Self {
            connection_name: connection_name.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_end_on_invalid_message(mut self, end: bool) -> Self {
        self.end_on_invalid_message = end;
        self
    }

    pub fn with_oauth_app_credentials(mut self, credentials: AppCredentials) -> Self {
        self.oauth_app_credentials = Some(credentials);
        self
    }

    /// Configured timeout, or [`DEFAULT_LOGIN_TIMEOUT`].
    pub fn login_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_LOGIN_TIMEOUT)
    }

    /// Reads `OAUTH_CONNECTION_NAME` (required), `OAUTH_PROMPT_TITLE`,
    /// `OAUTH_PROMPT_TEXT`, `OAUTH_PROMPT_TIMEOUT_MS` and
    /// `OAUTH_END_ON_INVALID_MESSAGE`.
    pub fn from_env() -> DialogResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DialogResult<Self> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let connection_name = non_blank("OAUTH_CONNECTION_NAME").ok_or_else(|| {
            DialogError::invalid_argument("OAUTH_CONNECTION_NAME must be set")
        })?;

        let timeout = match non_blank("OAUTH_PROMPT_TIMEOUT_MS") {
            Some(raw) => Some(Duration::from_millis(raw.parse().map_err(|_| {
                DialogError::invalid_argument(format!(
                    "OAUTH_PROMPT_TIMEOUT_MS must be a number of milliseconds, got '{raw}'"
                ))
            })?)),
            None => None,
        };

        let end_on_invalid_message = non_blank("OAUTH_END_ON_INVALID_MESSAGE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(Self {
            connection_name,
            title: non_blank("OAUTH_PROMPT_TITLE"),
            text: non_blank("OAUTH_PROMPT_TEXT"),
            timeout,
            end_on_invalid_message,
            oauth_app_credentials: None,
        })
    }
}
