//! Key normalization
//!
//! Primary keys and index values are compared case-insensitively.
//! Every boundary (store, lookup, diff) goes through [`normalize`] so the
//! maps underneath only ever see upper-cased strings.

/// Upper-case a primary key or index value, one `char` at a time.
///
/// Characters whose upper case spans several characters (`ß` → `SS`) are
/// kept as they are, so distinct keys such as `straße` and `strasse` never
/// collide and the normalized length in chars matches the input.
pub fn normalize(raw: &str) -> String {
    raw.chars().map(upper_char).collect()
}

fn upper_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

/// Canonical base-10 form of an integer primary key.
pub fn int_key(key: i64) -> String {
    key.to_string()
}
