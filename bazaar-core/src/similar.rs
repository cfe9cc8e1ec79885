//! Similar-name search patterns
//!
//! Turns a user-typed name into SQL `LIKE` patterns that tolerate a single
//! mistyped character. Patterns are meant for case-insensitive matching
//! (`ILIKE`) with backslash as the escape character.

use std::collections::HashSet;

/// Inputs shorter than this only get the containment pattern; a wildcard in
/// a two-letter word matches nearly everything.
const MIN_TYPO_LEN: usize = 3;

/// Build the LIKE patterns for `name`.
///
/// The first pattern is always plain containment (`%name%`). For names of
/// at least three characters it is followed by one pattern per position
/// with that character replaced by the single-character wildcard `_`.
/// `%`, `_` and `\` typed by the user are escaped and match literally.
///
/// # Example
///
/// ```
/// use bazaar_core::similar_patterns;
///
/// assert_eq!(
///     similar_patterns("Bike"),
///     vec!["%bike%", "%_ike%", "%b_ke%", "%bi_e%", "%bik_%"],
/// );
/// assert!(similar_patterns("  ").is_empty());
/// ```
pub fn similar_patterns(name: &str) -> Vec<String> {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = normalized.chars().collect();
    let mut patterns = vec![format!("%{}%", escape(&chars))];

    if chars.len() >= MIN_TYPO_LEN {
        let mut seen: HashSet<String> = patterns.iter().cloned().collect();
        for i in 0..chars.len() {
            let pattern = format!("%{}_{}%", escape(&chars[..i]), escape(&chars[i + 1..]));
            if seen.insert(pattern.clone()) {
                patterns.push(pattern);
            }
        }
    }

    patterns
}

fn escape(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    for &c in chars {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
