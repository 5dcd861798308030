use std::env;

use crate::culture::locales;

/// Process-wide defaults for culture-aware prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDefaults {
    /// Locale used when neither the activity nor the prompt names one.
    pub default_locale: String,
}

impl Default for PromptDefaults {
    fn default() -> Self {
        Self {
            default_locale: locales::ENGLISH.to_string(),
        }
    }
}

impl PromptDefaults {
    /// Reads `DIALOGS_DEFAULT_LOCALE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_locale = lookup("DIALOGS_DEFAULT_LOCALE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| locales::ENGLISH.to_string());
        Self { default_locale }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_english() {
        let defaults = PromptDefaults::from_lookup(|_| None);
        assert_eq!(defaults, PromptDefaults::default());
        assert_eq!(defaults.default_locale, "en-us");
    }

    #[test]
    fn reads_locale_from_env() {
        let defaults = PromptDefaults::from_lookup(|key| {
            (key == "DIALOGS_DEFAULT_LOCALE").then(|| " fr-fr ".to_string())
        });
        assert_eq!(defaults.default_locale, "fr-fr");

        let blank = PromptDefaults::from_lookup(|_| Some("  ".into()));
        assert_eq!(blank.default_locale, "en-us");
    }
}
