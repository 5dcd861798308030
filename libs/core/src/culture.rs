//! Per-locale phrasing used when rendering and recognizing choices.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::choices::ChoiceFactoryOptions;

pub mod locales {
    pub const BULGARIAN: &str = "bg-bg";
    pub const CHINESE: &str = "zh-cn";
    pub const DUTCH: &str = "nl-nl";
    pub const ENGLISH: &str = "en-us";
    pub const FRENCH: &str = "fr-fr";
    pub const GERMAN: &str = "de-de";
    pub const HINDI: &str = "hi-in";
    pub const ITALIAN: &str = "it-it";
    pub const JAPANESE: &str = "ja-jp";
    pub const KOREAN: &str = "ko-kr";
    pub const PORTUGUESE: &str = "pt-br";
    pub const SPANISH: &str = "es-es";
    pub const SWEDISH: &str = "sv-se";
    pub const TURKISH: &str = "tr-tr";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PromptCultureModel {
    pub locale: String,
    pub separator: String,
    pub inline_or: String,
    pub inline_or_more: String,
    pub yes_in_language: String,
    pub no_in_language: String,
}

impl PromptCultureModel {
    fn new(
        locale: &str,
        separator: &str,
        inline_or: &str,
        inline_or_more: &str,
        yes: &str,
        no: &str,
    ) -> Self {
        Self {
            locale: locale.to_string(),
            separator: separator.to_string(),
            inline_or: inline_or.to_string(),
            inline_or_more: inline_or_more.to_string(),
            yes_in_language: yes.to_string(),
            no_in_language: no.to_string(),
        }
    }

    pub fn choice_factory_options(&self) -> ChoiceFactoryOptions {
        ChoiceFactoryOptions {
            inline_separator: self.separator.clone(),
            inline_or: self.inline_or.clone(),
            inline_or_more: self.inline_or_more.clone(),
            include_numbers: true,
        }
    }
}

static SUPPORTED_CULTURES: Lazy<Vec<PromptCultureModel>> = Lazy::new(|| {
    use locales::*;
    vec![
        PromptCultureModel::new(BULGARIAN, ", ", " или ", ", или ", "да", "Не"),
        PromptCultureModel::new(CHINESE, "， ", " 要么 ", "， 要么 ", "是的", "不"),
        PromptCultureModel::new(DUTCH, ", ", " of ", ", of ", "Ja", "Nee"),
        PromptCultureModel::new(ENGLISH, ", ", " or ", ", or ", "Yes", "No"),
        PromptCultureModel::new(FRENCH, ", ", " ou ", ", ou ", "Oui", "Non"),
        PromptCultureModel::new(GERMAN, ", ", " oder ", ", oder ", "Ja", "Nein"),
        PromptCultureModel::new(HINDI, ", ", " या ", ", या ", "हां", "नहीं"),
        PromptCultureModel::new(ITALIAN, ", ", " o ", " o ", "Si", "No"),
        PromptCultureModel::new(JAPANESE, "、 ", " または ", "、 または ", "はい", "いいえ"),
        PromptCultureModel::new(KOREAN, ", ", " 또는 ", " 또는 ", "예", "아니"),
        PromptCultureModel::new(PORTUGUESE, ", ", " ou ", ", ou ", "Sim", "Não"),
        PromptCultureModel::new(SPANISH, ", ", " o ", ", o ", "Sí", "No"),
        PromptCultureModel::new(SWEDISH, ", ", " eller ", " eller ", "Ja", "Nej"),
        PromptCultureModel::new(TURKISH, ", ", " veya ", " veya ", "Evet", "Hayır"),
    ]
});

/// The built-in cultures, in lookup order.
pub fn supported_cultures() -> &'static [PromptCultureModel] {
    &SUPPORTED_CULTURES
}

/// Normalizes `culture_code` to a supported locale.
///
/// Exact matches win; otherwise the first supported locale sharing the
/// language prefix (`es-mx` -> `es-es`). Unknown codes come back lowercased.
pub fn map_to_nearest_language(culture_code: &str) -> String {
    let code = culture_code.to_lowercase();
    if SUPPORTED_CULTURES.iter().any(|c| c.locale == code) {
        return code;
    }
    SUPPORTED_CULTURES
        .iter()
        .find(|c| {
            let language = c.locale.split('-').next().unwrap_or_default();
            code.starts_with(language)
        })
        .map(|c| c.locale.clone())
        .unwrap_or(code)
}

/// Set of cultures a prompt renders and recognizes with.
///
/// Prompts start from [`CultureTable::default`]; a custom table can be passed
/// at construction to add or override locales.
#[derive(Debug, Clone, PartialEq)]
pub struct CultureTable {
    cultures: Vec<PromptCultureModel>,
}

impl Default for CultureTable {
    fn default() -> Self {
        Self {
            cultures: SUPPORTED_CULTURES.clone(),
        }
    }
}

impl CultureTable {
    pub fn new(cultures: impl IntoIterator<Item = PromptCultureModel>) -> Self {
        Self {
            cultures: cultures.into_iter().collect(),
        }
    }

    /// Adds `culture`, replacing any entry with the same locale.
    pub fn with_culture(mut self, culture: PromptCultureModel) -> Self {
        self.cultures.retain(|c| c.locale != culture.locale);
        self.cultures.push(culture);
        self
    }

    pub fn get(&self, locale: &str) -> Option<&PromptCultureModel> {
        self.cultures.iter().find(|c| c.locale == locale)
    }

    /// Resolves the culture for a turn: the first candidate locale that is
    /// present, mapped to its nearest language, falling back to English.
    pub fn resolve<'a>(
        &self,
        candidates: impl IntoIterator<Item = Option<&'a str>>,
    ) -> &PromptCultureModel {
        let locale = candidates
            .into_iter()
            .flatten()
            .next()
            .unwrap_or(locales::ENGLISH);
        let culture = map_to_nearest_language(locale);
        self.get(&culture)
            .or_else(|| self.get(locales::ENGLISH))
            .unwrap_or(&SUPPORTED_CULTURES[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_locales_map_to_themselves() {
        assert_eq!(map_to_nearest_language("EN-US"), "en-us");
        assert_eq!(map_to_nearest_language("ja-jp"), "ja-jp");
    }

    #[test]
    fn regional_variants_map_by_language() {
        assert_eq!(map_to_nearest_language("es-mx"), "es-es");
        assert_eq!(map_to_nearest_language("en-gb"), "en-us");
        assert_eq!(map_to_nearest_language("pt-PT"), "pt-br");
    }

    #[test]
    fn unknown_locales_are_returned_lowercased() {
        assert_eq!(map_to_nearest_language("XX-YY"), "xx-yy");
    }

    #[test]
    fn resolve_falls_back_to_english() {
        let table = CultureTable::default();
        assert_eq!(table.resolve([None, Some("fr-ca")]).locale, locales::FRENCH);
        assert_eq!(table.resolve([Some("xx-yy")]).locale, locales::ENGLISH);
        assert_eq!(table.resolve([None, None]).locale, locales::ENGLISH);
    }

    #[test]
    fn custom_cultures_override_defaults() {
        let table = CultureTable::default().with_culture(PromptCultureModel::new(
            locales::ENGLISH,
            "; ",
            " or else ",
            "; or else ",
            "Aye",
            "Nay",
        ));
        let english = table.resolve([Some("en-us")]);
        assert_eq!(english.yes_in_language, "Aye");
        assert_eq!(english.choice_factory_options().inline_or, " or else ");
        assert_eq!(supported_cultures().len(), 14);
    }
}
