//! Exact codec between [`Value`] and the store-native `(tag, bytes)` record.
//!
//! Wire shapes (the backing store's own):
//! ```text
//! STRING / PATH : UTF-16LE code units, one trailing NUL unit
//! STRINGS       : each element UTF-16LE + NUL, then one extra NUL unit
//!                 (an empty list is the terminator alone)
//! INTEGER       : 4 bytes, little-endian two's complement
//! LONG_INT      : 8 bytes, little-endian two's complement
//! BINARY        : the raw bytes, verbatim
//! NONE          : empty payload
//! ```
//!
//! [`encode`] and [`decode`] are mutual inverses: `decode(encode(v)) == v`
//! for every value, and `encode(decode(t, b)) == (t, b)` for every canonical
//! payload. Decoding is strict: odd-length or invalidly paired UTF-16,
//! wrong-width integer payloads, and unterminated string lists are rejected
//! with [`ValueError::Malformed`] rather than repaired.

use crate::error::{ValueError, ValueResult};
use crate::tag::ValueTag;
use crate::value::Value;

/// Encode a value into its store-native `(tag, bytes)` record.
pub fn encode(value: &Value) -> (ValueTag, Vec<u8>) {
    let tag = value.tag();
    let data = match value {
        Value::None => Vec::new(),
        Value::Int32(n) => n.to_le_bytes().to_vec(),
        Value::Int64(n) => n.to_le_bytes().to_vec(),
        Value::String(s) | Value::ExpandablePath(s) => encode_string(s),
        Value::MultiString(strings) => {
            let mut data = Vec::new();
            for s in strings {
                data.extend_from_slice(&encode_string(s));
            }
            data.extend_from_slice(&0u16.to_le_bytes());
            data
        }
        Value::Binary(bytes) => bytes.clone(),
    };
    (tag, data)
}

/// Decode a store-native `(tag, bytes)` record into a value.
///
/// `raw_tag` is the store's numeric tag; anything outside the closed set is
/// [`ValueError::UnknownTag`].
pub fn decode_raw(raw_tag: u32, data: &[u8]) -> ValueResult<Value> {
    let tag = ValueTag::from_raw(raw_tag).ok_or(ValueError::UnknownTag(raw_tag))?;
    decode(tag, data)
}

/// Decode a store-native payload under an already-resolved tag.
pub fn decode(tag: ValueTag, data: &[u8]) -> ValueResult<Value> {
    match tag {
        ValueTag::None => {
            if data.is_empty() {
                Ok(Value::None)
            } else {
                Err(malformed(tag, "NONE carries no payload"))
            }
        }
        ValueTag::Int32 => {
            let bytes: [u8; 4] = data
                .try_into()
                .map_err(|_| malformed(tag, format!("expected 4 bytes, got {}", data.len())))?;
            Ok(Value::Int32(i32::from_le_bytes(bytes)))
        }
        ValueTag::Int64 => {
            let bytes: [u8; 8] = data
                .try_into()
                .map_err(|_| malformed(tag, format!("expected 8 bytes, got {}", data.len())))?;
            Ok(Value::Int64(i64::from_le_bytes(bytes)))
        }
        ValueTag::String => Ok(Value::String(decode_string(tag, data)?)),
        ValueTag::ExpandablePath => Ok(Value::ExpandablePath(decode_string(tag, data)?)),
        ValueTag::MultiString => Ok(Value::MultiString(decode_string_list(tag, data)?)),
        ValueTag::Binary => Ok(Value::Binary(data.to_vec())),
    }
}

fn encode_string(s: &str) -> Vec<u8> {
    let mut data = Vec::with_capacity((s.len() + 1) * 2);
    for unit in s.encode_utf16() {
        data.extend_from_slice(&unit.to_le_bytes());
    }
    data.extend_from_slice(&0u16.to_le_bytes());
    data
}

fn decode_units(tag: ValueTag, data: &[u8]) -> ValueResult<Vec<u16>> {
    if data.len() % 2 != 0 {
        return Err(malformed(
            tag,
            format!("odd payload length {} is not UTF-16", data.len()),
        ));
    }
    Ok(data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

fn units_to_string(tag: ValueTag, units: &[u16]) -> ValueResult<String> {
    String::from_utf16(units).map_err(|_| malformed(tag, "unpaired UTF-16 surrogate"))
}

/// A single string: all units up to the trailing NUL. The terminator is
/// required; an embedded NUL would make the payload ambiguous and is
/// rejected.
fn decode_string(tag: ValueTag, data: &[u8]) -> ValueResult<String> {
    let units = decode_units(tag, data)?;
    match units.split_last() {
        Some((&0, body)) if !body.contains(&0) => units_to_string(tag, body),
        Some((&0, _)) => Err(malformed(tag, "embedded NUL in string payload")),
        _ => Err(malformed(tag, "missing NUL terminator")),
    }
}

/// A string list: NUL-terminated elements followed by one extra NUL unit.
fn decode_string_list(tag: ValueTag, data: &[u8]) -> ValueResult<Vec<String>> {
    let units = decode_units(tag, data)?;
    let body = match units.split_last() {
        Some((&0, body)) => body,
        _ => return Err(malformed(tag, "missing list terminator")),
    };
    if body.is_empty() {
        return Ok(Vec::new());
    }
    if body.last() != Some(&0) {
        return Err(malformed(tag, "unterminated final element"));
    }
    body.split(|unit| *unit == 0)
        .filter(|element| !element.is_empty())
        .map(|element| units_to_string(tag, element))
        .collect()
}

fn malformed(tag: ValueTag, reason: impl Into<String>) -> ValueError {
    ValueError::Malformed {
        tag,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn strings_are_utf16le_with_a_nul_terminator() {
        let (tag, data) = encode(&Value::String("Hi".into()));
        assert_eq!(tag, ValueTag::String);
        assert_eq!(data, vec![b'H', 0, b'i', 0, 0, 0]);
        assert_eq!(decode(tag, &data), Ok(Value::String("Hi".into())));
    }

    #[test]
    fn expandable_paths_share_the_string_shape() {
        let value = Value::ExpandablePath("%SystemRoot%".into());
        let (tag, data) = encode(&value);
        assert_eq!(tag, ValueTag::ExpandablePath);
        assert_eq!(decode(tag, &data), Ok(value));
    }

    #[test]
    fn non_ascii_strings_round_trip() {
        for s in ["héllo", "ключ", "emoji \u{1F5C2} pair", ""] {
            let value = Value::String(s.to_string());
            let (tag, data) = encode(&value);
            assert_eq!(decode(tag, &data), Ok(value), "string {s:?}");
        }
    }

    #[test]
    fn string_lists_are_nul_joined_and_double_terminated() {
        let (tag, data) = encode(&Value::MultiString(vec!["a".into(), "b".into()]));
        assert_eq!(tag, ValueTag::MultiString);
        assert_eq!(data, vec![b'a', 0, 0, 0, b'b', 0, 0, 0, 0, 0]);
        assert_eq!(
            decode(tag, &data),
            Ok(Value::MultiString(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn empty_string_list_is_the_terminator_alone() {
        let (tag, data) = encode(&Value::MultiString(vec![]));
        assert_eq!(data, vec![0, 0]);
        assert_eq!(decode(tag, &data), Ok(Value::MultiString(vec![])));
    }

    #[test]
    fn integers_are_fixed_width_little_endian() {
        let (tag, data) = encode(&Value::Int32(0x0102_0304));
        assert_eq!(tag, ValueTag::Int32);
        assert_eq!(data, vec![4, 3, 2, 1]);
        let (tag, data) = encode(&Value::Int64(-1));
        assert_eq!(tag, ValueTag::Int64);
        assert_eq!(data, vec![0xff; 8]);
    }

    #[test]
    fn binary_and_none_pass_bytes_through() {
        let (tag, data) = encode(&Value::Binary(vec![0, 1, 2]));
        assert_eq!((tag, data.as_slice()), (ValueTag::Binary, &[0u8, 1, 2][..]));
        let (tag, data) = encode(&Value::None);
        assert_eq!(tag, ValueTag::None);
        assert!(data.is_empty());
        assert_eq!(decode(ValueTag::None, &[]), Ok(Value::None));
    }

    #[test]
    fn decode_is_strict() {
        // Odd length is not UTF-16.
        assert!(decode(ValueTag::String, &[b'a']).is_err());
        // Missing terminators.
        assert!(decode(ValueTag::String, &[b'a', 0]).is_err());
        assert!(decode(ValueTag::String, &[]).is_err());
        assert!(decode(ValueTag::MultiString, &[]).is_err());
        assert!(decode(ValueTag::MultiString, &[b'a', 0, 0, 0]).is_err());
        // Wrong integer widths.
        assert!(decode(ValueTag::Int32, &[1, 2, 3]).is_err());
        assert!(decode(ValueTag::Int32, &[0; 8]).is_err());
        assert!(decode(ValueTag::Int64, &[0; 4]).is_err());
        // NONE with a payload.
        assert!(decode(ValueTag::None, &[0]).is_err());
        // Unpaired surrogate.
        let lone_surrogate = 0xD800u16.to_le_bytes();
        let mut data = lone_surrogate.to_vec();
        data.extend_from_slice(&[0, 0]);
        assert!(decode(ValueTag::String, &data).is_err());
    }

    #[test]
    fn unknown_raw_tags_are_rejected() {
        assert_eq!(decode_raw(5, &[]), Err(ValueError::UnknownTag(5)));
        assert_eq!(
            decode_raw(ValueTag::Int32.raw(), &7i32.to_le_bytes()),
            Ok(Value::Int32(7))
        );
    }

    fn arbitrary_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::None),
            any::<i32>().prop_map(Value::Int32),
            any::<i64>().prop_map(Value::Int64),
            "[^\u{0}]*".prop_map(Value::String),
            "[^\u{0}]*".prop_map(Value::ExpandablePath),
            proptest::collection::vec("[^\u{0}]+", 0..4).prop_map(Value::MultiString),
            proptest::collection::vec(any::<u8>(), 0..32).prop_map(Value::Binary),
        ]
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(value in arbitrary_value()) {
            let (tag, data) = encode(&value);
            prop_assert_eq!(decode(tag, &data), Ok(value));
        }

        #[test]
        fn encode_inverts_decode(value in arbitrary_value()) {
            // Every canonical payload is one some value encodes to, so this
            // quantifies encode∘decode over the canonical payload space.
            let (tag, data) = encode(&value);
            let decoded = decode(tag, &data).unwrap();
            prop_assert_eq!(encode(&decoded), (tag, data));
        }
    }
}
