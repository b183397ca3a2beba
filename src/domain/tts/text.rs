use regex::Regex;
use std::sync::LazyLock;

/// Stress mark emitted by the diacritizer (HEBREW ACCENT OLE)
pub const STRESS_MARK: char = '\u{05AB}';
/// Vocal shva mark emitted by the diacritizer (HEBREW POINT METEG)
pub const VOCAL_SHVA_MARK: char = '\u{05BD}';
/// Prefix boundary marker emitted by the diacritizer
pub const PREFIX_MARK: char = '|';

/// Diacritics the diacritizer produces that are not part of standard niqqud.
/// The voice model was trained on standard niqqud only.
pub const NON_STANDARD_DIACRITICS: [char; 3] = [STRESS_MARK, VOCAL_SHVA_MARK, PREFIX_MARK];

/// Returned for empty input so the voice model always gets something to say
const EMPTY_TEXT_PROMPT: &str = "You need to add some text for me to talk.";

static NON_STANDARD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let class: String = NON_STANDARD_DIACRITICS
        .iter()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    Regex::new(&format!("[{}]", class)).expect("non-standard diacritics pattern is valid")
});

static HEBREW_POINTS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{0591}-\u{05C7}]").expect("hebrew points pattern is valid")
});

/// Remove stress, vocal shva and prefix markers, keeping standard niqqud
pub fn strip_non_standard_diacritics(text: &str) -> String {
    NON_STANDARD_PATTERN.replace_all(text, "").into_owned()
}

/// Remove every Hebrew point and cantillation mark (U+0591..=U+05C7)
pub fn strip_hebrew_points(text: &str) -> String {
    HEBREW_POINTS_PATTERN.replace_all(text, "").into_owned()
}

pub fn is_hebrew_letter(c: char) -> bool {
    ('\u{05D0}'..='\u{05EA}').contains(&c)
}

/// Punctuation cleanup applied before the voice model tokenizes text.
///
/// Collapses whitespace, upper-cases a leading lowercase letter, rewrites
/// punctuation the tokenizer handles poorly and makes sure the text ends with
/// a sentence ender.
pub fn normalize_punctuation(text: &str) -> String {
    if text.trim().is_empty() {
        return EMPTY_TEXT_PROMPT.to_string();
    }

    let mut normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut chars = normalized.chars();
    if let Some(first) = chars.next() {
        if first.is_lowercase() {
            normalized = first.to_uppercase().chain(chars).collect();
        }
    }

    const REPLACEMENTS: [(&str, &str); 12] = [
        ("...", ", "),
        ("\u{2026}", ", "),
        (":", ","),
        (" - ", ", "),
        (";", ", "),
        ("\u{2014}", "-"),
        ("\u{2013}", "-"),
        (" ,", ","),
        ("\u{201C}", "\""),
        ("\u{201D}", "\""),
        ("\u{2018}", "'"),
        ("\u{2019}", "'"),
    ];
    for (from, to) in REPLACEMENTS {
        normalized = normalized.replace(from, to);
    }

    let mut normalized = normalized.trim_end_matches(' ').to_string();

    const SENTENCE_ENDERS: [char; 5] = ['.', '!', '?', '-', ','];
    if !normalized.ends_with(SENTENCE_ENDERS) {
        normalized.push('.');
    }

    normalized
}
