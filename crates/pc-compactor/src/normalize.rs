//! Normalizer — deterministic text canonicalisation passes.
//!
//! Passes run in a fixed order, each on the previous pass's output:
//! 1. Unicode normalization (NFC / NFKC)
//! 2. Zero-width removal
//! 3. Combining-mark stripping (lossy: drops accents that did not compose)
//! 4. Elongation collapse ("soooo" → "soo")
//! 5. Repeated emoji collapse
//! 6. Punctuation runs
//! 7. Whitespace collapse
//! 8. URL → email → number aliasing
//! 9. Lowercasing

use pc_core::{NormalizationConfig, PipelinePreset, UnicodeMode};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const URL_PLACEHOLDER: &str = "<URL>";
pub const EMAIL_PLACEHOLDER: &str = "<EMAIL>";
pub const NUMBER_PLACEHOLDER: &str = "<NUM>";

/// Zero-width space, non-joiner, joiner, word joiner, BOM.
const ZERO_WIDTH: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'];

static RE_EXCLAIM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!{2,}").unwrap());
static RE_QUESTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\?{2,}").unwrap());
static RE_ELLIPSIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{3,}").unwrap());
static RE_DASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[-\u{2014}\u{2013}]{2,}").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static RE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").unwrap());
static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.+-]+@[\w-]+(?:\.[\w-]+)+").unwrap());
static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{3,}\b").unwrap());

/// Normalize to the given unicode form.
pub fn normalize_unicode(text: &str, mode: UnicodeMode) -> String {
    match mode {
        UnicodeMode::Canonical => text.nfc().collect(),
        UnicodeMode::Compatibility => text.nfkc().collect(),
    }
}

/// Remove invisible joiner/marker code points.
pub fn remove_zero_width(text: &str) -> String {
    text.chars().filter(|c| !ZERO_WIDTH.contains(c)).collect()
}

/// Remove combining marks (accents, Zalgo stacks). Lossy.
pub fn strip_combining_marks(text: &str) -> String {
    text.chars().filter(|c| !is_combining_mark(*c)).collect()
}

/// Collapse 3+ repeats of an ASCII letter to exactly 2; shorter runs are kept.
///
/// Runs are matched case-insensitively and keep their first two characters.
pub fn collapse_elongation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run_char: Option<char> = None;
    let mut run_len = 0usize;
    for c in text.chars() {
        let same = c.is_ascii_alphabetic()
            && matches!(run_char, Some(r) if r.eq_ignore_ascii_case(&c));
        if same {
            run_len += 1;
        } else {
            run_char = c.is_ascii_alphabetic().then_some(c);
            run_len = 1;
        }
        if run_len <= 2 {
            out.push(c);
        }
    }
    out
}

/// Collapse consecutive repeats of a supplementary-plane code point to one.
pub fn collapse_emoji(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if prev == Some(c) && u32::from(c) > 0xFFFF {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// `!!!` → `!`, `??` → `?`, `...` → `.`, dash runs → `-`.
pub fn normalize_punctuation(text: &str) -> String {
    let result = RE_EXCLAIM.replace_all(text, "!");
    let result = RE_QUESTION.replace_all(&result, "?");
    let result = RE_ELLIPSIS.replace_all(&result, ".");
    RE_DASHES.replace_all(&result, "-").into_owned()
}

/// Any whitespace run becomes one space; ends are trimmed.
pub fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_string()
}

pub fn alias_urls(text: &str) -> String {
    RE_URL.replace_all(text, URL_PLACEHOLDER).into_owned()
}

pub fn alias_emails(text: &str) -> String {
    RE_EMAIL.replace_all(text, EMAIL_PLACEHOLDER).into_owned()
}

/// Digit runs of length 3 or more.
pub fn alias_numbers(text: &str) -> String {
    RE_NUMBER.replace_all(text, NUMBER_PLACEHOLDER).into_owned()
}

fn lowercase(text: &str, strip_marks: bool) -> String {
    let lowered = text.to_lowercase();
    if strip_marks {
        strip_combining_marks(&lowered)
    } else {
        lowered
    }
}

/// Run every enabled pass of `config`, in the fixed order.
pub fn normalize(text: &str, config: &NormalizationConfig) -> String {
    let mut result = normalize_unicode(text, config.unicode_mode);

    if config.remove_zero_width {
        let removed = remove_zero_width(&result);
        // A dropped joiner can leave a base letter next to its mark.
        result = if removed.len() != result.len() {
            normalize_unicode(&removed, config.unicode_mode)
        } else {
            removed
        };
    }
    if config.strip_combining_marks {
        let stripped = strip_combining_marks(&result);
        // Hangul jamo split by a mark compose once the mark is gone.
        result = if stripped.len() != result.len() {
            normalize_unicode(&stripped, config.unicode_mode)
        } else {
            stripped
        };
    }
    if config.collapse_elongation {
        result = collapse_elongation(&result);
    }
    if config.collapse_repeated_emoji {
        result = collapse_emoji(&result);
    }
    if config.normalize_punctuation {
        result = normalize_punctuation(&result);
    }
    if config.collapse_whitespace {
        result = collapse_whitespace(&result);
    }
    if config.alias_urls {
        result = alias_urls(&result);
    }
    if config.alias_emails {
        result = alias_emails(&result);
    }
    if config.alias_numbers {
        result = alias_numbers(&result);
    }
    if config.lowercase {
        result = lowercase(&result, config.strip_combining_marks);
    }
    result
}

/// Run a named preset.
pub fn normalize_preset(text: &str, preset: PipelinePreset) -> String {
    normalize(text, &preset.config())
}
