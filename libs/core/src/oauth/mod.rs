//! Sign-in prompt backed by the Bot Framework token service.

mod caller;
mod prompt;
mod settings;
pub mod token_access;

pub use caller::CallerInfo;
pub use prompt::{OAuthPrompt, PERSISTED_CALLER, PERSISTED_EXPIRES};
pub use settings::{DEFAULT_LOGIN_TIMEOUT, OAuthPromptSettings};
