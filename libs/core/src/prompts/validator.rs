use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::prompts::{ATTEMPT_COUNT_KEY, PromptOptions, PromptRecognizerResult};
use crate::turn::TurnContext;

/// What a validator sees: the turn, the recognition outcome and the prompt's state.
pub struct PromptValidatorContext<'a, T> {
    pub turn: &'a TurnContext,
    pub recognized: &'a PromptRecognizerResult<T>,
    /// The prompt's private state slot, including the attempt counter.
    pub state: &'a Map<String, Value>,
    pub options: &'a PromptOptions,
}

impl<T> PromptValidatorContext<'_, T> {
    /// Recognition attempts so far, counting the current one.
    pub fn attempt_count(&self) -> u64 {
        self.state
            .get(ATTEMPT_COUNT_KEY)
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }
}

impl<T: fmt::Debug> fmt::Debug for PromptValidatorContext<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptValidatorContext")
            .field("recognized", self.recognized)
            .field("state", self.state)
            .field("options", self.options)
            .finish()
    }
}

/// Extra acceptance check run after recognition.
///
/// Returning `Ok(false)` re-prompts; an error fails the turn.
#[async_trait]
pub trait PromptValidator<T>: Send + Sync
where
    T: Send + Sync,
{
    async fn validate(&self, ctx: &PromptValidatorContext<'_, T>) -> anyhow::Result<bool>;
}

/// Adapts a synchronous closure into a [`PromptValidator`].
pub struct FnValidator<F>(F);

#[async_trait]
impl<T, F> PromptValidator<T> for FnValidator<F>
where
    T: Send + Sync,
    F: Fn(&PromptValidatorContext<'_, T>) -> anyhow::Result<bool> + Send + Sync,
{
    async fn validate(&self, ctx: &PromptValidatorContext<'_, T>) -> anyhow::Result<bool> {
        (self.0)(ctx)
    }
}

pub fn validator_fn<T, F>(f: F) -> FnValidator<F>
where
    T: Send + Sync,
    F: Fn(&PromptValidatorContext<'_, T>) -> anyhow::Result<bool> + Send + Sync,
{
    FnValidator(f)
}
