//! Language-specific text helpers.
//!
//! Everything here is keyed on the primary language subtag (`nb-NO` is `nb`).
//! Norwegian (`no`, `nb`, `nn`) and English have phrase tables and number
//! words; every other language falls back to English phrases and digits.

use std::collections::HashSet;

/// Languages written in sentence case, where Title Case Headings look foreign.
const SENTENCE_CASE_LANGUAGES: &[&str] = &[
    "no", "nb", "nn", "sv", "da", "fi", "fr", "es", "it", "pt", "nl", "pl",
];

const ENGLISH_NUMBERS: &[&str] = &[
    "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven", "twelve",
];

const NORWEGIAN_NUMBERS: &[&str] = &[
    "to", "tre", "fire", "fem", "seks", "sju", "åtte", "ni", "ti", "elleve", "tolv",
];

/// Smallest and largest count recognised in a title.
const TITLE_COUNT_RANGE: std::ops::RangeInclusive<usize> = 2..=12;

const STOP_WORDS: &[&str] = &[
    // English
    "about", "after", "also", "been", "before", "being", "between", "could", "does", "each",
    "from", "have", "here", "into", "just", "more", "most", "much", "must", "only", "other",
    "over", "same", "should", "some", "such", "than", "that", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "under", "very", "what", "when", "where",
    "which", "while", "will", "with", "would", "your", "slide", "slides", "overview",
    // Norwegian
    "alle", "andre", "både", "blir", "deres", "dette", "disse", "eller", "etter", "fordi",
    "hva", "hvem", "hvor", "hvordan", "ikke", "inn", "kunne", "mange", "mellom", "noen",
    "også", "over", "skal", "slik", "under", "uten", "vårt", "våre", "være", "vært", "ville",
    "oversikt",
];

/// Localised phrases used for synthesised slides.
#[derive(Debug)]
pub struct Phrases {
    pub presentation: &'static str,
    pub agenda: &'static str,
    pub summary: &'static str,
    pub key_features: &'static str,
    pub key_figures: &'static str,
    pub process: &'static str,
    pub comparison: &'static str,
    /// Generic filler titles, in order of preference.
    pub fillers: &'static [&'static str],
}

static ENGLISH: Phrases = Phrases {
    presentation: "Presentation",
    agenda: "Agenda",
    summary: "Summary and next steps",
    key_features: "Key features",
    key_figures: "Key figures",
    process: "How it works",
    comparison: "Side by side",
    fillers: &[
        "Background",
        "Key points",
        "Challenges",
        "Opportunities",
        "Recommendations",
        "Discussion",
        "Questions and answers",
        "Further reading",
    ],
};

static NORWEGIAN: Phrases = Phrases {
    presentation: "Presentasjon",
    agenda: "Agenda",
    summary: "Oppsummering og veien videre",
    key_features: "Viktige egenskaper",
    key_figures: "Nøkkeltall",
    process: "Slik fungerer det",
    comparison: "Sammenligning",
    fillers: &[
        "Bakgrunn",
        "Hovedpunkter",
        "Utfordringer",
        "Muligheter",
        "Anbefalinger",
        "Diskusjon",
        "Spørsmål og svar",
        "Videre lesning",
    ],
};

/// Lowercase primary subtag of a language tag.
pub fn primary_subtag(language: &str) -> String {
    language
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn is_norwegian(language: &str) -> bool {
    matches!(primary_subtag(language).as_str(), "no" | "nb" | "nn")
}

/// Phrase table for a language.
pub fn phrases(language: &str) -> &'static Phrases {
    if is_norwegian(language) {
        &NORWEGIAN
    } else {
        &ENGLISH
    }
}

fn number_words(language: &str) -> &'static [&'static str] {
    if is_norwegian(language) {
        NORWEGIAN_NUMBERS
    } else if primary_subtag(language) == "en" {
        ENGLISH_NUMBERS
    } else {
        &[]
    }
}

/// Returns true for stop words skipped when picking keywords.
pub fn is_stop_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOP_WORDS.contains(&lower.as_str())
}

/// Returns true if headings in this language are written in sentence case.
pub fn uses_sentence_case(language: &str) -> bool {
    SENTENCE_CASE_LANGUAGES.contains(&primary_subtag(language).as_str())
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lowercase_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// Acronyms, brand names and anything with digits keep their casing.
fn keeps_casing(word: &str) -> bool {
    word.chars().skip(1).any(char::is_uppercase) || word.chars().any(|c| c.is_ascii_digit())
}

/// Converts Title Cased Headings to sentence case for languages that use it.
///
/// Only headings where most words are capitalised are rewritten; acronyms,
/// mixed-case names and words after a colon are kept.
pub fn sentence_case(text: &str, language: &str) -> String {
    sentence_case_keeping(text, language, &HashSet::new())
}

/// Like [`sentence_case`], but words in `proper_nouns` also keep their casing.
pub fn sentence_case_keeping(
    text: &str,
    language: &str,
    proper_nouns: &HashSet<String>,
) -> String {
    if !uses_sentence_case(language) {
        return text.to_string();
    }

    let words: Vec<&str> = text.split(' ').collect();
    let later: Vec<&str> = words
        .iter()
        .skip(1)
        .copied()
        .filter(|w| w.chars().next().is_some_and(char::is_alphabetic))
        .collect();
    let capitalised = later.iter().filter(|w| starts_uppercase(w)).count();
    let title_cased = capitalised >= 2 && capitalised * 3 >= later.len() * 2;

    if !title_cased {
        return capitalize_first(text);
    }

    let mut out = Vec::with_capacity(words.len());
    for (index, word) in words.iter().enumerate() {
        let after_colon = index > 0 && words[index - 1].ends_with(':');
        if index == 0 {
            out.push(capitalize_first(word));
        } else if after_colon
            || keeps_casing(word)
            || proper_nouns.contains(trim_word(word))
        {
            out.push((*word).to_string());
        } else {
            out.push(lowercase_first(word));
        }
    }
    out.join(" ")
}

fn trim_word(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Capitalised words that appear mid-sentence in `source`.
///
/// These are taken to be names and keep their casing in sentence-cased
/// headings.
pub fn proper_nouns(source: &str) -> HashSet<String> {
    let mut nouns = HashSet::new();
    for line in source.lines() {
        let mut sentence_start = true;
        for token in line.split_whitespace() {
            let word = trim_word(token);
            if word.is_empty() {
                continue;
            }
            if !sentence_start
                && word.chars().count() > 1
                && starts_uppercase(word)
                && word.chars().all(char::is_alphabetic)
            {
                nouns.insert(word.to_string());
            }
            sentence_start = token.ends_with(['.', '!', '?', ':']);
        }
    }
    nouns
}

/// A count mentioned in a title, e.g. "Five risks" or "3 priorities".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCount {
    /// The number mentioned.
    pub value: usize,
    /// Byte range of the number within the title.
    pub start: usize,
    pub end: usize,
    /// Whether the number was written as a word.
    pub as_word: bool,
}

/// Whitespace-separated tokens with their byte offsets.
fn tokens(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (index, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(begin) = start.take() {
                out.push((begin, &text[begin..index]));
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        out.push((begin, &text[begin..]));
    }
    out
}

/// Finds the first count between two and twelve mentioned in a title.
///
/// Digits count only as standalone tokens and never when followed by a
/// percent sign; number words are recognised for English and Norwegian.
pub fn title_count(title: &str, language: &str) -> Option<TitleCount> {
    let words = number_words(language);
    let tokens = tokens(title);

    for (position, &(offset, raw)) in tokens.iter().enumerate() {
        let core = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if core.is_empty() {
            continue;
        }
        let start = offset + raw.find(core).unwrap_or(0);
        let end = start + core.len();

        if core.chars().all(|c| c.is_ascii_digit()) {
            let percent_follows = title[end..].starts_with('%')
                || tokens
                    .get(position + 1)
                    .is_some_and(|(_, next)| next.starts_with('%'));
            if percent_follows || core.len() > 2 {
                continue;
            }
            if let Ok(value) = core.parse::<usize>()
                && TITLE_COUNT_RANGE.contains(&value)
            {
                return Some(TitleCount {
                    value,
                    start,
                    end,
                    as_word: false,
                });
            }
            continue;
        }

        let lower = core.to_lowercase();
        if let Some(index) = words.iter().position(|w| *w == lower) {
            return Some(TitleCount {
                value: index + TITLE_COUNT_RANGE.start(),
                start,
                end,
                as_word: true,
            });
        }
    }
    None
}

/// Rewrites the count in a title to `actual`, removing it below two.
pub fn replace_title_count(
    title: &str,
    count: &TitleCount,
    actual: usize,
    language: &str,
) -> String {
    let original = &title[count.start..count.end];
    let replacement = if !TITLE_COUNT_RANGE.contains(&actual) {
        String::new()
    } else if count.as_word {
        let word = number_words(language)
            .get(actual - TITLE_COUNT_RANGE.start())
            .map(|w| (*w).to_string())
            .unwrap_or_else(|| actual.to_string());
        if starts_uppercase(original) {
            capitalize_first(&word)
        } else {
            word
        }
    } else {
        actual.to_string()
    };

    let joined = format!("{}{}{}", &title[..count.start], replacement, &title[count.end..]);
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    if replacement.is_empty() && count.start == 0 {
        capitalize_first(&collapsed)
    } else {
        collapsed
    }
}
