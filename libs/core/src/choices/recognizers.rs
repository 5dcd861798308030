use crate::choices::find::{FindChoicesOptions, find_choices};
use crate::choices::tokenizer::tokenize;
use crate::choices::{Choice, FoundChoice, ModelResult};

const ORDINAL_WORDS: &[(&str, usize)] = &[
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
    ("sixth", 6),
    ("seventh", 7),
    ("eighth", 8),
    ("ninth", 9),
    ("tenth", 10),
];

const CARDINAL_WORDS: &[(&str, usize)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

/// Position-like reference found in an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexRef {
    Position(usize),
    Last,
}

pub fn recognize_choices_from_strings(
    utterance: &str,
    choices: &[&str],
    options: Option<&FindChoicesOptions>,
) -> Vec<ModelResult<FoundChoice>> {
    let choices: Vec<Choice> = choices.iter().map(|c| Choice::new(*c)).collect();
    recognize_choices(utterance, &choices, options)
}

/// Matches `utterance` against `choices` by text first, then by ordinal
/// ("the second one", "last") and finally by a bare 1-based index ("2").
pub fn recognize_choices(
    utterance: &str,
    choices: &[Choice],
    options: Option<&FindChoicesOptions>,
) -> Vec<ModelResult<FoundChoice>> {
    let defaults = FindChoicesOptions::default();
    let options = options.unwrap_or(&defaults);

    let mut matched = find_choices(utterance, choices, options);
    if !matched.is_empty() {
        return matched;
    }

    let mut refs = Vec::new();
    if options.recognize_ordinals {
        refs = recognize_index_refs(utterance, parse_ordinal);
        matched.extend(refs.iter().filter_map(|r| match_choice_by_index(choices, r)));
    }
    if refs.is_empty() && options.recognize_numbers {
        refs = recognize_index_refs(utterance, parse_cardinal);
        matched.extend(refs.iter().filter_map(|r| match_choice_by_index(choices, r)));
    }
    matched.sort_by_key(|m| m.start);
    matched
}

fn recognize_index_refs(
    utterance: &str,
    parse: fn(&str) -> Option<IndexRef>,
) -> Vec<ModelResult<IndexRef>> {
    tokenize(utterance)
        .into_iter()
        .filter_map(|token| {
            parse(&token.normalized).map(|resolution| ModelResult {
                text: token.text,
                start: token.start,
                end: token.end,
                type_name: "number".to_string(),
                resolution,
            })
        })
        .collect()
}

fn parse_ordinal(word: &str) -> Option<IndexRef> {
    if word == "last" {
        return Some(IndexRef::Last);
    }
    if let Some((_, n)) = ORDINAL_WORDS.iter().find(|(w, _)| *w == word) {
        return Some(IndexRef::Position(*n));
    }
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| word.strip_suffix(suffix))?;
    digits.parse().ok().map(IndexRef::Position)
}

fn parse_cardinal(word: &str) -> Option<IndexRef> {
    if let Some((_, n)) = CARDINAL_WORDS.iter().find(|(w, _)| *w == word) {
        return Some(IndexRef::Position(*n));
    }
    if !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()) {
        return word.parse().ok().map(IndexRef::Position);
    }
    None
}

fn match_choice_by_index(
    choices: &[Choice],
    found: &ModelResult<IndexRef>,
) -> Option<ModelResult<FoundChoice>> {
    let position = match found.resolution {
        IndexRef::Position(n) => n,
        IndexRef::Last => choices.len(),
    };
    let index = position.checked_sub(1)?;
    let choice = choices.get(index)?;
    Some(ModelResult {
        text: found.text.clone(),
        start: found.start,
        end: found.end,
        type_name: "choice".to_string(),
        resolution: FoundChoice {
            value: choice.value.clone(),
            index,
            score: 1.0,
            synonym: None,
        },
    })
}
