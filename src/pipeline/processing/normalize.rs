//! Text canonicalization for the free-text join keys.
//!
//! Both datasets spell the same operator/line/station in half-width,
//! full-width, spaced, and cased variants; every comparison in the pipeline
//! goes through these functions first. Both are pure and idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

/// Innermost parenthetical group, matched after width folding
static PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^()]*\)").unwrap());

/// Canonicalizes a free-text field: full-width alphanumerics and punctuation
/// fold to half-width (kana is left untouched), case folds to lower, and all
/// ordinary and ideographic spaces are removed.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(fold_width)
        .flat_map(char::to_lowercase)
        .filter(|c| *c != ' ')
        .collect()
}

/// Canonicalizes a line name on top of [`normalize`]:
/// every parenthetical qualifier is removed, leading JR brand and 地下鉄
/// prefixes are stripped until none remain, and a trailing 本線 suffix
/// collapses to the plain 線 suffix.
pub fn normalize_line(text: &str) -> String {
    let mut name = normalize(text);

    // Branch-line qualifiers such as (方南町支線); innermost-out so nested
    // groups cannot survive a single pass
    loop {
        let stripped = PAREN_RE.replace_all(&name, "").into_owned();
        if stripped == name {
            break;
        }
        name = stripped;
    }

    loop {
        if let Some(rest) = name.strip_prefix("jr") {
            name = rest.to_string();
        } else if let Some(rest) = name.strip_prefix("地下鉄") {
            name = rest.to_string();
        } else {
            break;
        }
    }

    while let Some(stem) = name.strip_suffix("本線") {
        name = format!("{stem}線");
    }

    name
}

/// Folds one full-width ASCII-range character to its half-width form.
/// Kana lives outside U+FF01..=U+FF5E and passes through unchanged.
fn fold_width(c: char) -> char {
    match c {
        '\u{ff01}'..='\u{ff5e}' => {
            char::from_u32(c as u32 - 0xfee0).expect("offset stays within ASCII")
        }
        '\u{3000}' => ' ',
        _ => c,
    }
}
