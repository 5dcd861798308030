use std::cmp::Ordering;
use std::collections::HashSet;

use crate::choices::tokenizer::{Token, tokenize};
use crate::choices::{Choice, FoundChoice, FoundValue, ModelResult, SortedValue};

#[derive(Debug, Clone, PartialEq)]
pub struct FindValuesOptions {
    /// Accept matches where only some of a value's tokens were found.
    pub allow_partial_matches: bool,
    pub locale: Option<String>,
    /// Maximum number of unmatched tokens allowed between matched ones.
    pub max_token_distance: usize,
}

impl Default for FindValuesOptions {
    fn default() -> Self {
        Self {
            allow_partial_matches: false,
            locale: None,
            max_token_distance: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FindChoicesOptions {
    pub values: FindValuesOptions,
    /// Skip matching against each choice's value.
    pub no_value: bool,
    /// Skip matching against each choice's action title.
    pub no_action: bool,
    pub recognize_numbers: bool,
    pub recognize_ordinals: bool,
}

impl Default for FindChoicesOptions {
    fn default() -> Self {
        Self {
            values: FindValuesOptions::default(),
            no_value: false,
            no_action: false,
            recognize_numbers: true,
            recognize_ordinals: true,
        }
    }
}

impl FindChoicesOptions {
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.values.locale = Some(locale.into());
        self
    }
}

pub fn find_choices_from_strings(
    utterance: &str,
    choices: &[&str],
    options: &FindChoicesOptions,
) -> Vec<ModelResult<FoundChoice>> {
    let choices: Vec<Choice> = choices.iter().map(|c| Choice::new(*c)).collect();
    find_choices(utterance, &choices, options)
}

/// Finds the choices mentioned in `utterance` by value, action title or synonym.
pub fn find_choices(
    utterance: &str,
    choices: &[Choice],
    options: &FindChoicesOptions,
) -> Vec<ModelResult<FoundChoice>> {
    let mut synonyms = Vec::new();
    for (index, choice) in choices.iter().enumerate() {
        if !options.no_value {
            synonyms.push(SortedValue::new(choice.value.clone(), index));
        }
        if !options.no_action
            && let Some(title) = choice.action.as_ref().and_then(|a| a.title.as_ref())
        {
            synonyms.push(SortedValue::new(title.clone(), index));
        }
        for synonym in &choice.synonyms {
            synonyms.push(SortedValue::new(synonym.clone(), index));
        }
    }

    find_values(utterance, &synonyms, &options.values)
        .into_iter()
        .map(|found| {
            let choice = &choices[found.resolution.index];
            ModelResult {
                text: found.text,
                start: found.start,
                end: found.end,
                type_name: "choice".to_string(),
                resolution: FoundChoice {
                    value: choice.value.clone(),
                    index: found.resolution.index,
                    score: found.resolution.score,
                    synonym: Some(found.resolution.value),
                },
            }
        })
        .collect()
}

/// Token-level search for `values` inside `utterance`.
///
/// Longer values are searched first; each utterance token and each value index
/// is claimed by at most one result, best score first. Results are ordered by
/// their position in the utterance.
pub fn find_values(
    utterance: &str,
    values: &[SortedValue],
    options: &FindValuesOptions,
) -> Vec<ModelResult<FoundValue>> {
    let mut sorted: Vec<&SortedValue> = values.iter().collect();
    sorted.sort_by_key(|v| std::cmp::Reverse(v.value.chars().count()));

    let tokens = tokenize(utterance);
    let mut matches = Vec::new();
    for entry in sorted {
        let searched = tokenize(entry.value.trim());
        let mut start_pos = 0;
        while start_pos < tokens.len() {
            match match_value(&tokens, options, entry, &searched, start_pos) {
                Some(found) => {
                    start_pos = found.end + 1;
                    matches.push(found);
                }
                None => break,
            }
        }
    }

    matches.sort_by(|a, b| {
        b.resolution
            .score
            .partial_cmp(&a.resolution.score)
            .unwrap_or(Ordering::Equal)
    });

    let chars: Vec<char> = utterance.chars().collect();
    let mut found_indexes = HashSet::new();
    let mut used_tokens = HashSet::new();
    let mut results = Vec::new();
    for mut found in matches {
        let overlaps = (found.start..=found.end).any(|i| used_tokens.contains(&i));
        if found_indexes.contains(&found.resolution.index) || overlaps {
            continue;
        }
        found_indexes.insert(found.resolution.index);
        used_tokens.extend(found.start..=found.end);

        found.start = tokens[found.start].start;
        found.end = tokens[found.end].end;
        found.text = chars[found.start..=found.end].iter().collect();
        results.push(found);
    }

    results.sort_by_key(|r| r.start);
    results
}

fn match_value(
    source: &[Token],
    options: &FindValuesOptions,
    entry: &SortedValue,
    searched: &[Token],
    mut start_pos: usize,
) -> Option<ModelResult<FoundValue>> {
    let mut matched = 0usize;
    let mut total_deviation = 0usize;
    let mut start = None;
    let mut end = 0usize;

    for token in searched {
        let Some(pos) = index_of_token(source, token, start_pos) else {
            continue;
        };
        let distance = if matched > 0 { pos - start_pos } else { 0 };
        if distance <= options.max_token_distance {
            matched += 1;
            total_deviation += distance;
            start_pos = pos + 1;
            if start.is_none() {
                start = Some(pos);
            }
            end = pos;
        }
    }

    if matched == 0 || (matched != searched.len() && !options.allow_partial_matches) {
        return None;
    }

    // Partial matches score zero: completeness is whole-token only.
    let completeness = (matched / searched.len()) as f32;
    let accuracy = matched as f32 / (matched + total_deviation) as f32;

    Some(ModelResult {
        text: String::new(),
        start: start?,
        end,
        type_name: "value".to_string(),
        resolution: FoundValue {
            value: entry.value.clone(),
            index: entry.index,
            score: completeness * accuracy,
        },
    })
}

fn index_of_token(tokens: &[Token], token: &Token, start_pos: usize) -> Option<usize> {
    tokens
        .iter()
        .enumerate()
        .skip(start_pos)
        .find(|(_, t)| t.normalized == token.normalized)
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> Vec<SortedValue> {
        vec![
            SortedValue::new("red", 0),
            SortedValue::new("green", 1),
            SortedValue::new("blue", 2),
        ]
    }

    #[test]
    fn finds_a_simple_value() {
        let found = find_values("the red one please", &colors(), &FindValuesOptions::default());
        assert_eq!(found.len(), 1);
        let first = &found[0];
        assert_eq!(first.text, "red");
        assert_eq!((first.start, first.end), (4, 6));
        assert_eq!(first.resolution.index, 0);
        assert_eq!(first.resolution.score, 1.0);
    }

    #[test]
    fn finds_multiple_values_in_position_order() {
        let found = find_values(
            "blue or red, either is fine",
            &colors(),
            &FindValuesOptions::default(),
        );
        let values: Vec<&str> = found.iter().map(|f| f.resolution.value.as_str()).collect();
        assert_eq!(values, vec!["blue", "red"]);
    }

    #[test]
    fn accuracy_drops_with_token_distance() {
        let values = vec![SortedValue::new("bread and butter", 0)];
        let found = find_values(
            "bread with lots of butter",
            &values,
            &FindValuesOptions::default(),
        );
        assert!(found.is_empty(), "butter is too far from bread");

        let found = find_values("bread and some butter", &values, &FindValuesOptions::default());
        assert_eq!(found.len(), 1);
        assert!(found[0].resolution.score < 1.0);
        assert_eq!(found[0].text, "bread and some butter");
    }

    #[test]
    fn partial_matches_are_opt_in() {
        let values = vec![SortedValue::new("new york city", 0)];
        assert!(find_values("york", &values, &FindValuesOptions::default()).is_empty());

        let options = FindValuesOptions {
            allow_partial_matches: true,
            ..Default::default()
        };
        let found = find_values("york", &values, &options);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].resolution.score, 0.0);
    }

    #[test]
    fn choices_match_on_synonyms_and_titles() {
        let choices = vec![
            Choice::new("red").with_synonyms(["crimson"]),
            Choice::new("blue").with_action(
                dlg_schema::CardAction::im_back("blue").with_title("Ocean"),
            ),
        ];
        let options = FindChoicesOptions::default();

        let found = find_choices("crimson", &choices, &options);
        assert_eq!(found[0].resolution.value, "red");
        assert_eq!(found[0].resolution.synonym.as_deref(), Some("crimson"));

        let found = find_choices("the ocean", &choices, &options);
        assert_eq!(found[0].resolution.value, "blue");
        assert_eq!(found[0].type_name, "choice");
    }

    #[test]
    fn longer_values_win_overlapping_tokens() {
        let found = find_choices_from_strings(
            "I want a chocolate cake",
            &["cake", "chocolate cake"],
            &FindChoicesOptions::default(),
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].resolution.value, "chocolate cake");
        assert_eq!(found[0].text, "chocolate cake");
    }
}
