//! Keyword highlighting, relevance scoring, and date normalization.
//!
//! Everything in this module is a pure function of its inputs and the fixed
//! AMR keyword list, so the annotations attached to an article are stable
//! across runs. The highlighter inserts literal `<mark>` tags that the news
//! frontend renders directly.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::models::RawDate;

/// The fixed, ordered list of domain terms used for both highlighting and
/// relevance scoring. Order matters: highlighting applies the keywords
/// sequentially, and the text-scan fallback of the relevance scorer picks
/// the first hits in this order.
pub const AMR_KEYWORDS: [&str; 12] = [
    "antimicrobial resistance",
    "antibiotic resistance",
    "amr",
    "superbugs",
    "drug-resistant",
    "mrsa",
    "bacteria",
    "pathogens",
    "infection",
    "antibiotikaresistens",
    "multiresistent",
    "superbakterier",
];

/// Number of characters kept in the highlighted summary.
pub const SUMMARY_PREVIEW_CHARS: usize = 300;

/// Returned by the highlighter when the body is empty or absent.
pub const NO_TEXT: &str = "Ingen tekst fundet.";
/// Returned by the date policy when no usable date is present.
pub const UNKNOWN_DATE: &str = "Ukendt dato";
/// Returned by the relevance scorer when nothing matched.
pub const GENERAL_HEALTH: &str = "Generel sundhed";

static HIGHLIGHT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    AMR_KEYWORDS
        .iter()
        .map(|keyword| {
            RegexBuilder::new(&regex::escape(keyword))
                .case_insensitive(true)
                .build()
                .unwrap()
        })
        .collect()
});

/// Wrap every case-insensitive occurrence of each AMR keyword in `<mark>`
/// tags, preserving the original casing of the match.
///
/// With `limit`, the text is first cut to its leading `limit` characters and
/// `"..."` is appended (even when the text was already shorter); without it
/// the full text is used. Empty text yields the [`NO_TEXT`] sentinel
/// regardless of `limit`.
///
/// Keywords are applied one after another in list order. A later keyword
/// can therefore match inside markup inserted by an earlier one; this
/// mirrors the behavior the frontend was built against and is deliberately
/// not corrected here.
pub fn highlight_keywords(text: &str, limit: Option<usize>) -> String {
    if text.is_empty() {
        return NO_TEXT.to_string();
    }

    let mut out = match limit {
        Some(n) => {
            let mut preview: String = text.chars().take(n).collect();
            preview.push_str("...");
            preview
        }
        None => text.to_string(),
    };

    for pattern in HIGHLIGHT_PATTERNS.iter() {
        out = pattern.replace_all(&out, "<mark>${0}</mark>").into_owned();
    }
    out
}

/// Explain why an article matched the AMR query.
///
/// Tags whose lowercase form is exactly a keyword win (original casing is
/// reported); only when no tag hits does the scorer fall back to scanning
/// the keyword list for substrings of the lowercased body, stopping after
/// three hits. Duplicate hits are removed in first-seen order, which keeps
/// the message deterministic.
pub fn relevance_reason(text: &str, tags: &[String]) -> String {
    let text_lower = text.to_lowercase();

    let mut hits: Vec<String> = tags
        .iter()
        .filter(|tag| AMR_KEYWORDS.contains(&tag.to_lowercase().as_str()))
        .cloned()
        .collect();

    if hits.is_empty() {
        for keyword in AMR_KEYWORDS {
            if text_lower.contains(keyword) {
                hits.push(keyword.to_string());
                if hits.len() >= 3 {
                    break;
                }
            }
        }
    }

    if hits.is_empty() {
        GENERAL_HEALTH.to_string()
    } else {
        let matched = hits.into_iter().unique().take(3).join(", ");
        format!("🔥 Matcher: {matched}")
    }
}

/// Resolve a raw date value into a display string.
///
/// Absent dates and structured dates without a display string yield the
/// [`UNKNOWN_DATE`] sentinel. A known producer artifact prefixes some date
/// strings with a stray letter directly before the first digit (e.g.
/// `"d2025-06-01"`); that letter is stripped.
pub fn normalize_date(date: Option<&RawDate>) -> String {
    let display = match date {
        None => return UNKNOWN_DATE.to_string(),
        Some(RawDate::Plain(s)) => s.as_str(),
        Some(RawDate::Structured { display }) => {
            display.as_deref().unwrap_or(UNKNOWN_DATE)
        }
    };
    strip_date_artifact(display).to_string()
}

fn strip_date_artifact(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1].is_ascii_digit() {
        &s[1..]
    } else {
        s
    }
}
