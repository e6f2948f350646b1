//! General helpers shared by the tokenizers and the binder.

use phf::phf_set;

/// Words that never resolve against a scope.
pub static RESERVED_WORDS: phf::Set<&'static str> = phf_set! {
    "true",
    "false",
    "null",
    "undefined",
    "this",
};

/// Tags whose elements hold a user-editable value.
pub static INPUT_TAGS: phf::Set<&'static str> = phf_set! {
    "input",
    "select",
    "textarea",
};

/// Check if a word is reserved
#[inline]
pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.contains(word)
}

/// Check if a tag is input-capable (case-insensitive)
#[inline]
pub fn is_input_tag(tag: &str) -> bool {
    INPUT_TAGS.contains(tag) || INPUT_TAGS.contains(tag.to_ascii_lowercase().as_str())
}

#[inline]
pub fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

#[inline]
pub fn is_identifier_part(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Check if the whole string is a single identifier
pub fn is_identifier(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.split_first() {
        Some((first, rest)) => is_identifier_start(*first) && rest.iter().all(|b| is_identifier_part(*b)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved_word("this"));
        assert!(is_reserved_word("undefined"));
        assert!(!is_reserved_word("user"));
    }

    #[test]
    fn test_identifier() {
        assert!(is_identifier("user_name"));
        assert!(is_identifier("$index"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a.b"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_input_tags() {
        assert!(is_input_tag("input"));
        assert!(is_input_tag("TEXTAREA"));
        assert!(!is_input_tag("div"));
    }
}
