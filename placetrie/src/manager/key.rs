//! Shard key derivation.

use crate::text::fold_key;

/// Derive the shard key for a query.
///
/// The key is the first `prefix_len` characters of the folded query, with
/// anything outside `[a-z0-9]` replaced by `_` and right-padded with `_` to
/// exactly `prefix_len`. Returns `None` when the query folds to nothing, in
/// which case there is no shard to consult.
pub fn shard_key(query: &str, prefix_len: usize) -> Option<String> {
    let folded = fold_key(query);
    if folded.is_empty() {
        return None;
    }
    let mut key = String::with_capacity(prefix_len);
    for c in folded.chars().take(prefix_len) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            key.push(c);
        } else {
            key.push('_');
        }
    }
    while key.len() < prefix_len {
        key.push('_');
    }
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ascii() {
        assert_eq!(shard_key("Main St", 3).unwrap(), "mai");
        assert_eq!(shard_key("abc", 3).unwrap(), "abc");
    }

    #[test]
    fn test_punctuation_folds_away() {
        assert_eq!(shard_key("Un-2", 3).unwrap(), "un2");
    }

    #[test]
    fn test_short_query_is_padded() {
        assert_eq!(shard_key("é", 3).unwrap(), "e__");
        assert_eq!(shard_key("ab", 3).unwrap(), "ab_");
    }

    #[test]
    fn test_empty_fold_has_no_key() {
        assert_eq!(shard_key("", 3), None);
        assert_eq!(shard_key("---", 3), None);
        assert_eq!(shard_key(" . ", 3), None);
    }

    #[test]
    fn test_non_ascii_letters_map_to_underscore() {
        assert_eq!(shard_key("東京", 3).unwrap(), "___");
        assert_eq!(shard_key("ßs", 3).unwrap(), "_s_");
    }

    #[test]
    fn test_key_alphabet_and_length() {
        for (query, len) in [("Fifth Avenue!", 3), ("N", 4), ("高速道路 12", 5)] {
            let key = shard_key(query, len).unwrap();
            assert_eq!(key.len(), len);
            assert!(key
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        }
    }

    #[test]
    fn test_depends_only_on_folded_prefix() {
        assert_eq!(shard_key("MAIN street", 3), shard_key("main STREET", 3));
        assert_eq!(shard_key("Maières", 3), shard_key("maiXXX", 3));
    }
}
