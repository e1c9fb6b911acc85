//! Tagged-word value encoding.
//!
//! Every register holds a plain `u32`. A word is either a number or a
//! reference into the string table; references carry [`STRING_TAG`] in
//! bit 31 and the table index in the low 31 bits. Keeping both in one
//! flat word is what lets a call frame snapshot the whole register bank
//! with a single array copy.

use std::fmt;

/// Bit marking a word as a string-table reference.
pub const STRING_TAG: u32 = 0x8000_0000;

/// Largest string index a reference can carry.
pub const MAX_STRING_INDEX: u32 = !STRING_TAG;

/// Produce a tagged reference to string-table entry `index`.
///
/// `index` must not exceed [`MAX_STRING_INDEX`]; higher bits are discarded.
pub const fn tag(index: u32) -> u32 {
    (index & MAX_STRING_INDEX) | STRING_TAG
}

/// Returns true if `word` carries the string-reference tag.
pub const fn is_reference(word: u32) -> bool {
    word & STRING_TAG != 0
}

/// Strip the tag and return the string-table index.
pub const fn untag(word: u32) -> u32 {
    word & MAX_STRING_INDEX
}

/// Decoded view of a register word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    /// Plain unsigned integer.
    Number(u32),
    /// Index into the string table.
    Str(u32),
}

impl Value {
    /// Interpret a raw register word.
    pub const fn from_word(word: u32) -> Self {
        if is_reference(word) {
            Value::Str(untag(word))
        } else {
            Value::Number(word)
        }
    }

    /// Encode back into a raw register word.
    pub const fn to_word(self) -> u32 {
        match self {
            Value::Number(n) => n,
            Value::Str(index) => tag(index),
        }
    }

    /// Resolve a string reference against `strings`.
    ///
    /// Returns `None` for numbers and for references past the end of the
    /// table.
    pub fn resolve<'s>(&self, strings: &'s [String]) -> Option<&'s str> {
        match self {
            Value::Str(index) => strings.get(*index as usize).map(String::as_str),
            Value::Number(_) => None,
        }
    }
}

impl From<u32> for Value {
    fn from(word: u32) -> Self {
        Value::from_word(word)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(index) => write!(f, "str#{index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_sets_high_bit() {
        assert_eq!(tag(0), 0x8000_0000);
        assert_eq!(tag(7), 0x8000_0007);
    }

    #[test]
    fn untag_recovers_index() {
        assert_eq!(untag(tag(0)), 0);
        assert_eq!(untag(tag(12345)), 12345);
        assert_eq!(untag(tag(MAX_STRING_INDEX)), MAX_STRING_INDEX);
    }

    #[test]
    fn plain_numbers_are_not_references() {
        assert!(!is_reference(0));
        assert!(!is_reference(42));
        assert!(!is_reference(MAX_STRING_INDEX));
        assert!(is_reference(tag(3)));
    }

    #[test]
    fn value_view() {
        assert_eq!(Value::from_word(5), Value::Number(5));
        assert_eq!(Value::from_word(tag(2)), Value::Str(2));
        assert_eq!(Value::Str(2).to_word(), tag(2));
        assert_eq!(Value::Number(9).to_word(), 9);
    }

    #[test]
    fn resolve_against_table() {
        let strings = vec!["hello".to_string(), "world".to_string()];
        assert_eq!(Value::Str(1).resolve(&strings), Some("world"));
        assert_eq!(Value::Str(2).resolve(&strings), None);
        assert_eq!(Value::Number(1).resolve(&strings), None);
    }

    #[test]
    fn display() {
        assert_eq!(Value::Number(42).to_string(), "42");
        assert_eq!(Value::Str(3).to_string(), "str#3");
    }
}
