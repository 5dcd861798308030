use serde::{Deserialize, Serialize};

/// A run of non-breaking characters. `start`/`end` are inclusive char offsets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub normalized: String,
}

/// Splits `text` on whitespace, punctuation and symbol ranges.
///
/// Characters outside the basic multilingual plane (emoji and friends) are
/// emitted as single-character tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current: Option<Token> = None;

    for (i, ch) in text.chars().enumerate() {
        let code = ch as u32;
        if is_breaking_char(code) {
            push_token(&mut tokens, current.take());
        } else if code > 0xFFFF {
            push_token(&mut tokens, current.take());
            tokens.push(Token {
                start: i,
                end: i,
                text: ch.to_string(),
                normalized: ch.to_string(),
            });
        } else if let Some(token) = current.as_mut() {
            token.text.push(ch);
            token.end = i;
        } else {
            current = Some(Token {
                start: i,
                end: i,
                text: ch.to_string(),
                normalized: String::new(),
            });
        }
    }
    push_token(&mut tokens, current);
    tokens
}

fn push_token(tokens: &mut Vec<Token>, token: Option<Token>) {
    if let Some(mut token) = token {
        token.normalized = token.text.to_lowercase();
        tokens.push(token);
    }
}

fn is_breaking_char(code: u32) -> bool {
    matches!(
        code,
        0x0000..=0x002F
            | 0x003A..=0x0040
            | 0x005B..=0x0060
            | 0x007B..=0x00BF
            | 0x02B9..=0x036F
            | 0x2000..=0x2BFF
            | 0x2E00..=0x2E7F
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(text: &str) -> Vec<String> {
        tokenize(text).into_iter().map(|t| t.normalized).collect()
    }

    #[test]
    fn splits_on_spaces_and_punctuation() {
        let tokens = tokenize("How are you?");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "How");
        assert_eq!(tokens[0].normalized, "how");
        assert_eq!((tokens[2].start, tokens[2].end), (8, 10));
    }

    #[test]
    fn empty_and_whitespace_yield_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \t ").is_empty());
    }

    #[test]
    fn single_letter_at_end_is_kept() {
        let tokens = tokenize("a b");
        assert_eq!(normalized("a b"), vec!["a", "b"]);
        assert_eq!((tokens[1].start, tokens[1].end), (2, 2));
    }

    #[test]
    fn astral_characters_are_separate_tokens() {
        let tokens = tokenize("food💥👍😀");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].text, "food");
        assert_eq!(tokens[1].text, "💥");
        assert_eq!((tokens[3].start, tokens[3].end), (6, 6));
    }

    #[test]
    fn digits_and_ordinals_stay_together() {
        assert_eq!(normalized("pick the 2nd, not 10"), vec!["pick", "the", "2nd", "not", "10"]);
    }
}
