//! Targeted `output_base` substitution on a serialized document.
//!
//! Only the top-level member's value bytes are replaced; every other byte of
//! the payload is passed through untouched.

use std::ops::Range;

use thiserror::Error;

pub const OUTPUT_BASE: &str = "output_base";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("malformed JSON at byte {0}")]
    Malformed(usize),
}

enum Lookup {
    Found(Range<usize>),
    Missing { open: usize, empty: bool },
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while matches!(bytes.get(i), Some(b' ' | b'\t' | b'\n' | b'\r')) {
        i += 1;
    }
    i
}

/// `i` points at an opening quote; returns the index after the closing one.
fn skip_string(bytes: &[u8], mut i: usize) -> Result<usize, PatchError> {
    let start = i;
    i += 1;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'\\' => i += 2,
            b'"' => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(PatchError::Malformed(start))
}

fn skip_value(bytes: &[u8], mut i: usize) -> Result<usize, PatchError> {
    let start = i;
    match bytes.get(i) {
        Some(b'"') => skip_string(bytes, i),
        Some(b'{' | b'[') => {
            let mut depth = 0usize;
            while let Some(&b) = bytes.get(i) {
                match b {
                    b'"' => {
                        i = skip_string(bytes, i)?;
                        continue;
                    }
                    b'{' | b'[' => depth += 1,
                    b'}' | b']' => {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(i + 1);
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            Err(PatchError::Malformed(start))
        }
        Some(_) => {
            while let Some(&b) = bytes.get(i) {
                if matches!(b, b',' | b'}' | b']' | b' ' | b'\t' | b'\n' | b'\r') {
                    break;
                }
                i += 1;
            }
            if i == start {
                return Err(PatchError::Malformed(start));
            }
            Ok(i)
        }
        None => Err(PatchError::Malformed(start)),
    }
}

fn find_member(bytes: &[u8], key: &str) -> Result<Lookup, PatchError> {
    let open = skip_ws(bytes, 0);
    if bytes.get(open) != Some(&b'{') {
        return Err(PatchError::NotAnObject);
    }
    let mut i = open + 1;
    let mut empty = true;
    loop {
        i = skip_ws(bytes, i);
        match bytes.get(i) {
            Some(b'}') if empty => return Ok(Lookup::Missing { open, empty }),
            Some(b'"') => {}
            _ => return Err(PatchError::Malformed(i)),
        }
        empty = false;

        let key_end = skip_string(bytes, i)?;
        let found = &bytes[i + 1..key_end - 1] == key.as_bytes();
        i = skip_ws(bytes, key_end);
        if bytes.get(i) != Some(&b':') {
            return Err(PatchError::Malformed(i));
        }
        let value_start = skip_ws(bytes, i + 1);
        let value_end = skip_value(bytes, value_start)?;
        if found {
            return Ok(Lookup::Found(value_start..value_end));
        }

        i = skip_ws(bytes, value_end);
        match bytes.get(i) {
            Some(b',') => i += 1,
            Some(b'}') => return Ok(Lookup::Missing { open, empty }),
            _ => return Err(PatchError::Malformed(i)),
        }
    }
}

/// Returns a copy of `payload` whose top-level `output_base` is `dir`. The
/// member is inserted first when absent.
pub fn set_output_base(payload: &[u8], dir: &str) -> Result<Vec<u8>, PatchError> {
    // encoding a str never fails; escaping follows JSON string rules
    let encoded = serde_json::Value::String(dir.to_owned()).to_string();
    let mut out = Vec::with_capacity(payload.len() + encoded.len() + OUTPUT_BASE.len() + 4);
    match find_member(payload, OUTPUT_BASE)? {
        Lookup::Found(range) => {
            out.extend_from_slice(&payload[..range.start]);
            out.extend_from_slice(encoded.as_bytes());
            out.extend_from_slice(&payload[range.end..]);
        }
        Lookup::Missing { open, empty } => {
            out.extend_from_slice(&payload[..=open]);
            out.push(b'"');
            out.extend_from_slice(OUTPUT_BASE.as_bytes());
            out.extend_from_slice(b"\":");
            out.extend_from_slice(encoded.as_bytes());
            if !empty {
                out.push(b',');
            }
            out.extend_from_slice(&payload[open + 1..]);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn patch(payload: &str, dir: &str) -> String {
        let out = set_output_base(payload.as_bytes(), dir).expect("patch");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn replaces_only_the_value() {
        assert_eq!(
            patch(r#"{"output_base":"","packages":[{"name":"p"}]}"#, "./outA"),
            r#"{"output_base":"./outA","packages":[{"name":"p"}]}"#
        );
        assert_eq!(
            patch("{ \"a\" : 1 ,\n \"output_base\" : \"old\" }", "new"),
            "{ \"a\" : 1 ,\n \"output_base\" : \"new\" }"
        );
    }

    #[test]
    fn nested_members_are_not_touched() {
        let src = r#"{"packages":[{"output_base":"inner","s":"}\"{"}],"output_base":"x"}"#;
        assert_eq!(
            patch(src, "y"),
            r#"{"packages":[{"output_base":"inner","s":"}\"{"}],"output_base":"y"}"#
        );
    }

    #[test]
    fn inserts_when_missing() {
        assert_eq!(patch("{}", "d"), r#"{"output_base":"d"}"#);
        assert_eq!(patch(r#"{"packages":[]}"#, "d"), r#"{"output_base":"d","packages":[]}"#);
    }

    #[test]
    fn directory_is_escaped() {
        assert_eq!(
            patch(r#"{"output_base":""}"#, "a\"b\\c"),
            r#"{"output_base":"a\"b\\c"}"#
        );
    }

    #[test]
    fn rejects_non_objects() {
        assert_eq!(set_output_base(b"[1,2]", "d"), Err(PatchError::NotAnObject));
        assert_eq!(set_output_base(b"", "d"), Err(PatchError::NotAnObject));
        assert!(matches!(
            set_output_base(br#"{"output_base":"#, "d"),
            Err(PatchError::Malformed(_))
        ));
    }

    proptest::proptest! {
        #[test]
        fn patched_payload_decodes_with_the_new_base(
            dir in "\\PC{0,24}",
            old in "[a-z./]{0,8}",
            extra in "\\PC{0,16}",
        ) {
            let payload = serde_json::json!({
                "output_base": old,
                "packages": [{ "name": extra, "output_base": "nested" }],
            })
            .to_string();
            let out = set_output_base(payload.as_bytes(), &dir).expect("patch");
            let mut value: serde_json::Value = serde_json::from_slice(&out).expect("json");
            proptest::prop_assert_eq!(value["output_base"].as_str(), Some(dir.as_str()));
            value["output_base"] = serde_json::Value::String(old);
            let original: serde_json::Value = serde_json::from_str(&payload).expect("json");
            proptest::prop_assert_eq!(value, original);
        }
    }
}
