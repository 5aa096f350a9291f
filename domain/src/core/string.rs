//! String utilities for the domain layer.

/// Truncate a string to a maximum byte length with ellipsis (UTF-8 safe)
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Split text into trimmed sentences on `.`, `!`, `?` and line breaks.
///
/// Bullet markers are stripped so list items count as sentences too.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        match ch {
            '.' | '!' | '?' => {
                current.push(ch);
                push_sentence(&mut sentences, &current);
                current.clear();
            }
            '\n' => {
                push_sentence(&mut sentences, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_sentence(&mut sentences, &current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let cleaned = raw
        .trim()
        .trim_start_matches(['-', '*', '•', '#'])
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == ')')
        .trim();
    // A lone "1." list marker is not a sentence
    if cleaned.chars().filter(|c| c.is_alphanumeric()).count() >= 3 {
        sentences.push(cleaned.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("council", 20), "council");
        assert_eq!(truncate("multi agent council", 8), "multi...");
    }

    #[test]
    fn test_truncate_multibyte_boundary() {
        // 'é' is two bytes; a target of 3 lands inside the second one
        assert_eq!(truncate("éééé", 6), "é...");
        assert_eq!(truncate("éééé", 7), "éé...");
    }

    #[test]
    fn test_split_sentences() {
        let text = "We agreed on Rust. Is latency a concern?\n- Add caching layer\n1. Measure";
        let sentences = split_sentences(text);
        assert_eq!(
            sentences,
            vec![
                "We agreed on Rust.",
                "Is latency a concern?",
                "Add caching layer",
                "Measure",
            ]
        );
    }

    #[test]
    fn test_split_sentences_drops_fragments() {
        assert!(split_sentences("1.\n\n- .").is_empty());
    }
}
