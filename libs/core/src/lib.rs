//! Dialog runtime core: turn context, dialog stack and prompt dialogs.
//!
//! A bot hands each inbound activity to a [`TurnContext`], then lets a
//! [`DialogContext`] route it to the dialog on top of the conversation's
//! stack. Prompts in [`prompts`] and the sign-in prompt in [`oauth`] are the
//! dialogs this crate ships.
pub mod adapter;
pub mod choices;
pub mod config;
pub mod credentials;
pub mod culture;
pub mod dialogs;
pub mod error;
pub mod oauth;
pub mod prompts;
pub mod telemetry;
#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
pub mod turn;

pub use adapter::{BotAdapter, ConnectorClient, ConnectorClientBuilder, UserTokenProvider};
pub use config::PromptDefaults;
pub use credentials::{AppCredentials, ClaimsIdentity};
pub use culture::{CultureTable, PromptCultureModel};
pub use dialogs::{
    Dialog, DialogContext, DialogInstance, DialogReason, DialogSet, DialogState, DialogTurnResult,
    DialogTurnStatus,
};
pub use error::{DialogError, DialogResult};
pub use oauth::{OAuthPrompt, OAuthPromptSettings};
pub use prompts::{
    ActivityPrompt, AttachmentPrompt, ChoicePrompt, ConfirmPrompt, DateTimePrompt, NumberPrompt,
    PromptOptions, PromptRecognizerResult, PromptValidator, PromptValidatorContext, TextPrompt,
};
pub use turn::{TurnContext, TurnState};

/// Returns the semantic version advertised by this crate.
///
/// ```
/// assert_eq!(dlg_core::version(), "0.1.0");
/// ```
pub fn version() -> &'static str {
    "0.1.0"
}
