/// Characters kept inside a word in addition to alphanumerics
fn is_joiner(c: char) -> bool {
    matches!(c, '-' | '_' | '\'')
}

/// Characters that split a compound word into sub-tokens
fn is_compound_separator(c: char) -> bool {
    matches!(c, '-' | '_')
}

/// Split a phrase into lowercase index words.
///
/// Anything other than an alphanumeric, `-`, `_` or `'` separates words.
/// Joiners are kept only inside a word. Compounds joined by `-` or `_` are
/// emitted whole and then once per part, so `"Auto-Indent"` yields
/// `auto-indent`, `auto`, `indent`.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut words = Vec::new();
    let mut current = String::new();

    for c in lowered.chars() {
        if c.is_alphanumeric() || is_joiner(c) {
            current.push(c);
        } else if !current.is_empty() {
            push_word(&current, &mut words);
            current.clear();
        }
    }
    if !current.is_empty() {
        push_word(&current, &mut words);
    }
    words
}

fn push_word(raw: &str, words: &mut Vec<String>) {
    let word = raw.trim_matches(is_joiner);
    if word.is_empty() {
        return;
    }
    words.push(word.to_string());

    if word.contains(is_compound_separator) {
        for part in word.split(is_compound_separator) {
            let part = part.trim_matches(is_joiner);
            if !part.is_empty() {
                words.push(part.to_string());
            }
        }
    }
}

/// Split a query into lowercase whitespace-separated terms
pub fn query_terms(raw: &str) -> Vec<String> {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
