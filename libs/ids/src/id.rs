use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IdError;

/// A storage-assigned entity identifier.
///
/// Always within `0..=i64::MAX`, the range of a BIGINT primary key. Serializes
/// as a JSON string, never as a number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(i64);

impl Id {
    /// Wrap a raw storage key. Negative keys are rejected.
    pub fn new(raw: i64) -> Result<Self, IdError> {
        if raw < 0 {
            return Err(IdError::invalid(raw.to_string(), "negative identifier"));
        }
        Ok(Self(raw))
    }

    /// The raw storage key.
    pub fn get(self) -> i64 {
        self.0
    }
}

/// Render an identifier in its lossless string form.
pub fn encode(id: Id) -> String {
    id.0.to_string()
}

/// Parse the lossless string form back into an identifier.
///
/// Only ASCII digit strings are accepted. Signs, whitespace, decimal points,
/// exponents and values beyond the storage range all fail.
pub fn decode(text: &str) -> Result<Id, IdError> {
    if text.is_empty() {
        return Err(IdError::invalid(text, "empty identifier"));
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdError::invalid(text, "expected only ASCII digits"));
    }

    // All-digit input can only fail to parse on overflow.
    text.parse::<i64>()
        .map(Id)
        .map_err(|_| IdError::invalid(text, "identifier out of range"))
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

impl FromStr for Id {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

impl TryFrom<i64> for Id {
    type Error = IdError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Id::new(raw)
    }
}

impl From<Id> for i64 {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&encode(*self))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(IdVisitor)
    }
}

struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
    type Value = Id;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer identifier as a string of digits")
    }

    fn visit_str<E>(self, v: &str) -> Result<Id, E>
    where
        E: de::Error,
    {
        decode(v).map_err(E::custom)
    }

    // Older clients still send bare integers. Accept them when they fit.
    fn visit_u64<E>(self, v: u64) -> Result<Id, E>
    where
        E: de::Error,
    {
        i64::try_from(v)
            .map(Id)
            .map_err(|_| E::custom(IdError::invalid(v.to_string(), "identifier out of range")))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Id, E>
    where
        E: de::Error,
    {
        Id::new(v).map_err(E::custom)
    }

    fn visit_f64<E>(self, v: f64) -> Result<Id, E>
    where
        E: de::Error,
    {
        Err(E::custom(IdError::invalid(
            v.to_string(),
            "floating-point identifier",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encodes_without_padding_or_sign() {
        assert_eq!(encode(Id::new(0).unwrap()), "0");
        assert_eq!(encode(Id::new(42).unwrap()), "42");
        assert_eq!(encode(Id::new(i64::MAX).unwrap()), "9223372036854775807");
    }

    #[test]
    fn rejects_negative_raw_keys() {
        assert!(Id::new(-1).is_err());
        assert!(Id::try_from(i64::MIN).is_err());
    }

    #[test]
    fn decode_rejects_malformed_input() {
        for input in [
            "", " 1", "1 ", "+1", "-1", "1.0", "1e3", "0x10", "abc", "12a", "١٢",
            "9223372036854775808", "99999999999999999999",
        ] {
            let err = decode(input).unwrap_err();
            assert_eq!(err.input(), input);
            assert!(matches!(err, IdError::InvalidIdentifier { .. }));
        }
    }

    #[test]
    fn decode_accepts_leading_zeros_and_canonicalises() {
        let id = decode("007").unwrap();
        assert_eq!(id.get(), 7);
        assert_eq!(encode(id), "7");
    }

    #[test]
    fn serializes_as_json_string() {
        let id = Id::new(1_062_937_393_938_825_217).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1062937393938825217\"");
    }

    #[test]
    fn deserializes_from_string_and_integer() {
        let from_str: Id = serde_json::from_str("\"123\"").unwrap();
        let from_int: Id = serde_json::from_str("123").unwrap();
        assert_eq!(from_str, from_int);
    }

    #[test]
    fn deserialize_rejects_floats_negatives_and_overflow() {
        assert!(serde_json::from_str::<Id>("1.5").is_err());
        assert!(serde_json::from_str::<Id>("-3").is_err());
        assert!(serde_json::from_str::<Id>("18446744073709551615").is_err());
        assert!(serde_json::from_str::<Id>("\"1.5\"").is_err());
        assert!(serde_json::from_str::<Id>("true").is_err());
        assert!(serde_json::from_str::<Id>("null").is_err());
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(raw in 0i64..=i64::MAX) {
            let id = Id::new(raw).unwrap();
            prop_assert_eq!(decode(&encode(id)).unwrap(), id);
        }

        #[test]
        fn encoded_form_is_digits_only(raw in 0i64..=i64::MAX) {
            let text = encode(Id::new(raw).unwrap());
            prop_assert!(!text.is_empty());
            prop_assert!(text.bytes().all(|b| b.is_ascii_digit()));
            prop_assert!(text == "0" || !text.starts_with('0'));
        }

        #[test]
        fn non_digit_strings_never_decode(s in ".*[^0-9].*") {
            prop_assert!(decode(&s).is_err());
        }
    }
}
