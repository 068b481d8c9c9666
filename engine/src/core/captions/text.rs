//! Caption Text Tools
//!
//! Pure text transformations used by the bulk editing commands: literal
//! find/replace, the profanity filter, best-effort punctuation, word-count
//! based splitting, and the reading-speed report.

use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use specta::Type;

use super::Caption;
use crate::core::{CaptionId, CoreError, CoreResult};

/// Words masked or removed by the profanity filter (matched whole-word, any case)
pub const PROFANITY_WORDS: &[&str] = &["fuck", "shit", "damn", "hell", "ass"];

/// Sentence openers that turn the appended terminal mark into `?`
const QUESTION_WORDS: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "which", "whose", "whom", "is", "are", "was",
    "were", "do", "does", "did", "can", "could", "will", "would", "should", "shall", "may",
    "might", "have", "has",
];

// =============================================================================
// Find / Replace
// =============================================================================

/// Builds a matcher for a literal (non-regex) search string.
pub fn literal_matcher(find: &str, case_sensitive: bool) -> CoreResult<Regex> {
    RegexBuilder::new(&regex::escape(find))
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| CoreError::InvalidArgument(format!("Unusable search text: {}", e)))
}

/// Replaces every match in `text`, returning the new text and the match count.
pub fn replace_matches(text: &str, matcher: &Regex, replacement: &str) -> (String, usize) {
    let count = matcher.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    let replaced = matcher.replace_all(text, NoExpand(replacement)).into_owned();
    (replaced, count)
}

// =============================================================================
// Profanity Filter
// =============================================================================

/// Builds the whole-word, case-insensitive profanity matcher.
pub fn profanity_matcher() -> CoreResult<Regex> {
    let pattern = format!(r"\b(?:{})\b", PROFANITY_WORDS.join("|"));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| CoreError::Internal(format!("Profanity pattern failed to compile: {}", e)))
}

/// Masks (`bleep = true`) or removes profane words from `text`.
///
/// Masks keep the character width of the word. Removal collapses the
/// whitespace left behind.
pub fn filter_profanity(text: &str, matcher: &Regex, bleep: bool) -> (String, usize) {
    let count = matcher.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }

    let replaced = matcher.replace_all(text, |caps: &regex::Captures<'_>| {
        if bleep {
            "*".repeat(caps[0].chars().count())
        } else {
            String::new()
        }
    });

    let cleaned = if bleep {
        replaced.into_owned()
    } else {
        collapse_spaces(&replaced)
    };
    (cleaned, count)
}

/// Collapses runs of spaces/tabs and trims each line, keeping line breaks.
fn collapse_spaces(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Punctuation
// =============================================================================

fn ends_sentence(text: &str) -> bool {
    text.ends_with(['.', '!', '?', '…'])
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => text.to_string(),
    }
}

fn starts_lowercase(text: &str) -> bool {
    text.trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_lowercase())
}

fn opens_question(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .map(|word| {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            QUESTION_WORDS.contains(&word.as_str())
        })
        .unwrap_or(false)
}

fn tidy_spacing(text: &str) -> String {
    let mut tidied = collapse_spaces(text);
    while tidied.contains(" ,") || tidied.contains(" .") {
        tidied = tidied.replace(" ,", ",").replace(" .", ".");
    }
    tidied
}

/// Punctuates a run of caption texts in timeline order.
///
/// A caption begins a sentence when it is the first non-empty caption or the
/// previous non-empty caption ends with terminal punctuation. Missing terminal
/// punctuation is appended unless the next non-empty caption starts in
/// lowercase, which means the sentence continues across captions.
pub fn auto_punctuate_texts(texts: &[&str]) -> Vec<String> {
    let tidied: Vec<String> = texts.iter().map(|t| tidy_spacing(t)).collect();
    let mut result = Vec::with_capacity(tidied.len());
    let mut begins_sentence = true;

    for (index, text) in tidied.iter().enumerate() {
        if text.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut punctuated = if begins_sentence {
            capitalize_first(text)
        } else {
            text.clone()
        };

        if !ends_sentence(&punctuated) {
            let next = tidied[index + 1..].iter().find(|t| !t.is_empty());
            let continues = next.is_some_and(|t| starts_lowercase(t));
            if !continues {
                let trimmed_len = punctuated.trim_end_matches([',', ';', ':']).len();
                punctuated.truncate(trimmed_len);
                let mark = if opens_question(&punctuated) { '?' } else { '.' };
                punctuated.push(mark);
            }
        }

        begins_sentence = ends_sentence(&punctuated);
        result.push(punctuated);
    }

    result
}

// =============================================================================
// Splitting
// =============================================================================

/// Divides text at `round(word_count * fraction)` words.
///
/// Words are never broken; each half is re-joined with single spaces.
pub fn split_words(text: &str, fraction: f64) -> (String, String) {
    let words: Vec<&str> = text.split_whitespace().collect();
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.5
    };
    let split_at = ((words.len() as f64) * fraction).round() as usize;
    let split_at = split_at.min(words.len());

    (words[..split_at].join(" "), words[split_at..].join(" "))
}

// =============================================================================
// Reading Speed
// =============================================================================

/// Classification of a caption's reading speed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSpeedFlag {
    Ok,
    TooFast,
    TooSlow,
}

/// One row of the reading-speed report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Type)]
pub struct ReadingSpeedEntry {
    pub id: CaptionId,
    pub wpm: f64,
    pub flag: ReadingSpeedFlag,
}

/// Words per minute for a caption; 0 for zero-length spans
pub fn words_per_minute(caption: &Caption) -> f64 {
    let duration = caption.duration();
    if duration == 0 {
        return 0.0;
    }
    caption.word_count() as f64 / (duration as f64 / 60_000.0)
}

/// Builds one report entry per caption, in store order.
pub fn analyze_reading_speed(
    captions: &[Caption],
    max_wpm: f64,
    min_wpm: f64,
) -> Vec<ReadingSpeedEntry> {
    captions
        .iter()
        .map(|caption| {
            let wpm = words_per_minute(caption);
            let flag = if wpm > max_wpm {
                ReadingSpeedFlag::TooFast
            } else if wpm < min_wpm {
                ReadingSpeedFlag::TooSlow
            } else {
                ReadingSpeedFlag::Ok
            };
            ReadingSpeedEntry {
                id: caption.id.clone(),
                wpm,
                flag,
            }
        })
        .collect()
}
