//! Query and label folding for accent- and punctuation-insensitive matching.
//!
//! Both the user's query and every trie edge label pass through the same
//! folding before comparison, so matching stays consistent regardless of how
//! the index was cased or accented. NFKD tables come from the
//! `unicode-normalization` crate.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a string into its canonical matching form.
///
/// The folding pipeline:
/// 1. Compatibility decomposition (NFKD)
/// 2. Strip combining marks (accents, diacritics)
/// 3. Lowercase
/// 4. Keep only letters and digits
///
/// The result is empty exactly when the input contains no letters or digits.
/// Folding is idempotent: `fold_key(fold_key(s)) == fold_key(s)`.
pub fn fold_key(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// True when two strings are equal after folding.
pub fn equals_folded(a: &str, b: &str) -> bool {
    fold_key(a) == fold_key(b)
}
