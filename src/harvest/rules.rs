//! Stateless extraction rules shared by the text formats.
//!
//! Each rule is a pure function from text (or a previously extracted list) to
//! zero or more matches. Finding nothing is a valid result.

use regex::Regex;

/// Text a match contributes: capture group 1 when present, otherwise the
/// whole match.
fn match_text<'t>(caps: &regex::Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

/// First match in the text, ignoring any later ones.
pub fn first_match<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern.captures(text).map(|caps| match_text(&caps))
}

/// All non-overlapping matches in document order, duplicates kept.
pub fn all_matches(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .map(|caps| match_text(&caps).to_string())
        .collect()
}

/// Applies a secondary pattern to every item of a source list.
///
/// Every participating capture group of every match contributes one token;
/// tokens are concatenated in source order without deduplication.
pub fn derive_list(source: &[String], pattern: &Regex) -> Vec<String> {
    source
        .iter()
        .flat_map(|item| {
            pattern.captures_iter(item).flat_map(|caps| {
                caps.iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str().to_string())
                    .collect::<Vec<_>>()
            })
        })
        .collect()
}

/// Sum of character counts of all items.
pub fn total_length(items: &[String]) -> usize {
    items.iter().map(|item| item.chars().count()).sum()
}

fn is_line_terminator(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Splits on every line terminator, `\r\n` counting as one.
///
/// A trailing terminator does not start a new line; lone `\r`, form feeds
/// and the Unicode line/paragraph separators all end a line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !is_line_terminator(c) {
            continue;
        }
        lines.push(&text[start..idx]);
        start = idx + c.len_utf8();
        if c == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                chars.next();
                start = next + 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Number of lines; a trailing line terminator does not start a new line.
pub fn count_lines(text: &str) -> usize {
    split_lines(text).len()
}

pub fn count_matches(pattern: &Regex, text: &str) -> usize {
    pattern.find_iter(text).count()
}

/// One step of a [`Classifier`]: when `applies` holds, the label becomes `level`.
pub struct ClassRule<S, L> {
    pub applies: fn(&S) -> bool,
    pub level: L,
}

/// Ordered decision table over extracted signals.
///
/// Rules are evaluated in order and each true rule overwrites the label, so
/// the last applicable rule decides. A later rule may assign a lower level
/// than an earlier one.
pub struct Classifier<S, L> {
    baseline: L,
    rules: Vec<ClassRule<S, L>>,
}

impl<S, L: Copy> Classifier<S, L> {
    pub fn new(baseline: L, rules: Vec<ClassRule<S, L>>) -> Self {
        Self { baseline, rules }
    }

    pub fn classify(&self, signals: &S) -> L {
        self.rules.iter().fold(self.baseline, |current, rule| {
            if (rule.applies)(signals) {
                rule.level
            } else {
                current
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_lines_handles_every_terminator() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("a\nb\n"), 2);
        assert_eq!(count_lines("a\rb\rc"), 3);
        assert_eq!(count_lines("a\r\nb\r\n"), 2);
        assert_eq!(count_lines("a\u{2028}b\x0cc"), 3);
        assert_eq!(count_lines("\n\n"), 2);
        assert_eq!(split_lines("x\r\n\ry"), vec!["x", "", "y"]);
    }

    #[test]
    fn test_first_match_prefers_group_and_first_occurrence() {
        let re = Regex::new(r"id=(\d+)").unwrap();
        assert_eq!(first_match(&re, "id=7 id=9"), Some("7"));
        assert_eq!(first_match(&re, "nothing"), None);

        let whole = Regex::new(r"\d+").unwrap();
        assert_eq!(first_match(&whole, "a 42 b 43"), Some("42"));
    }

    #[test]
    fn test_all_matches_keeps_duplicates_in_order() {
        let re = Regex::new(r"\w+;").unwrap();
        assert_eq!(all_matches(&re, "b; a; b;"), vec!["b;", "a;", "b;"]);
    }

    #[test]
    fn test_derive_list_concatenates_alternation_groups() {
        let re = Regex::new(r"FROM (\w+)|INTO (\w+)|JOIN (\w+)").unwrap();
        let source = vec![
            "INSERT INTO t1 SELECT * FROM t2 JOIN t3;".to_string(),
            "SELECT * FROM t2;".to_string(),
        ];
        assert_eq!(derive_list(&source, &re), vec!["t1", "t2", "t3", "t2"]);
        assert!(derive_list(&[], &re).is_empty());
    }

    #[test]
    fn test_total_length_counts_characters() {
        assert_eq!(total_length(&[]), 0);
        assert_eq!(total_length(&["abc".to_string(), "é;".to_string()]), 5);
    }

    #[test]
    fn test_classifier_last_true_rule_wins() {
        fn large(n: &u32) -> bool {
            *n > 10
        }
        fn even(n: &u32) -> bool {
            *n % 2 == 0
        }

        // A later rule assigning a lower level overrides an earlier higher one.
        let classifier: Classifier<u32, u8> = Classifier::new(
            0,
            vec![
                ClassRule { applies: large, level: 3 },
                ClassRule { applies: even, level: 1 },
            ],
        );
        assert_eq!(classifier.classify(&3), 0);
        assert_eq!(classifier.classify(&11), 3);
        assert_eq!(classifier.classify(&12), 1);
        assert_eq!(classifier.classify(&4), 1);
    }
}
