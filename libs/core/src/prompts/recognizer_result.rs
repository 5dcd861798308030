/// Outcome of one recognition attempt.
///
/// A result either succeeded with a value or failed without one; the
/// constructors are the only way to build it.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRecognizerResult<T> {
    succeeded: bool,
    value: Option<T>,
    allow_interruption: bool,
}

impl<T> Default for PromptRecognizerResult<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> PromptRecognizerResult<T> {
    /// Nothing recognized this turn.
    pub fn none() -> Self {
        Self {
            succeeded: false,
            value: None,
            allow_interruption: false,
        }
    }

    pub fn success(value: T) -> Self {
        Self {
            succeeded: true,
            value: Some(value),
            allow_interruption: false,
        }
    }

    /// Flag carried for the host's use only; the prompt lifecycle never reads it.
    pub fn with_allow_interruption(mut self, allow: bool) -> Self {
        self.allow_interruption = allow;
        self
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn allow_interruption(&self) -> bool {
        self.allow_interruption
    }
}
