//! Query-string and urlencoded-form field access
//!
//! Covers the second input shape: `data`, `size` and `q` read by name from
//! the URL query string, with an `application/x-www-form-urlencoded` body
//! filling in fields the query does not set.

use std::collections::HashMap;

/// Parsed `key=value` fields from a query string and/or form body.
///
/// When a key repeats, the first value wins.
#[derive(Debug, Default)]
pub struct FormValues {
    values: HashMap<String, String>,
}

impl FormValues {
    /// Parse a single urlencoded pair list (`a=1&b=2`).
    pub fn parse(input: &str) -> Self {
        let mut values = HashMap::new();
        for pair in input.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                values
                    .entry(form_decode(key))
                    .or_insert_with(|| form_decode(value));
            }
        }
        Self { values }
    }

    /// Parse the query string, then fill in keys the query did not set
    /// from an urlencoded request body.
    pub fn from_query_and_body(query: Option<&str>, body: &[u8]) -> Self {
        let mut form = query.map(Self::parse).unwrap_or_default();
        if !body.is_empty() {
            if let Ok(body) = std::str::from_utf8(body) {
                for (key, value) in Self::parse(body).values {
                    form.values.entry(key).or_insert(value);
                }
            }
        }
        form
    }

    /// Get a field value, or `""` when absent.
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Decode percent escapes in a path segment. `+` stays literal here, and
/// the result is raw bytes: a path payload is not required to be UTF-8.
pub fn percent_decode(segment: &str) -> Vec<u8> {
    decode_bytes(segment, false)
}

/// Decode a form component: percent escapes plus `+` as space.
fn form_decode(component: &str) -> String {
    String::from_utf8_lossy(&decode_bytes(component, true)).into_owned()
}

fn decode_bytes(input: &str, plus_as_space: bool) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                out.push(hex_value(bytes[i + 1]) << 4 | hex_value(bytes[i + 2]));
                i += 3;
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}
