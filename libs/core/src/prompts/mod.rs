//! Prompt dialogs: ask a question, recognize the reply, validate, retry.

mod activity;
mod attachment;
mod choice;
mod confirm;
mod datetime;
mod number;
mod options;
pub(crate) mod prompt;
mod recognizer_result;
mod text;
mod validator;

pub use activity::ActivityPrompt;
pub use attachment::{AttachmentKind, AttachmentPrompt};
pub use choice::{ChoiceKind, ChoicePrompt};
pub use confirm::{ConfirmKind, ConfirmPrompt};
pub use datetime::{
    DateTimeKind, DateTimePrompt, DateTimeRecognizer, DateTimeResolution, IsoDateTimeRecognizer,
};
pub use number::{NumberKind, NumberPrompt, NumberPromptKind, NumberValue, recognize_number};
pub use options::PromptOptions;
pub use prompt::{
    ATTEMPT_COUNT_KEY, PERSISTED_OPTIONS, PERSISTED_STATE, Prompt, PromptKind, append_choices,
};
pub use recognizer_result::PromptRecognizerResult;
pub use text::{TextKind, TextPrompt};
pub use validator::{FnValidator, PromptValidator, PromptValidatorContext, validator_fn};
