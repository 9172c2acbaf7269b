//! Key/value pair splitting for urlencoded bodies and query strings.
//!
//! Both formats share one policy: pairs are separated by `&`, keys from
//! values by the *first* `=`, and when the same key appears twice the first
//! occurrence wins — later duplicates are silently dropped. That last rule is
//! deliberate and load-bearing, not an accident; callers rely on
//! `"a=1&a=2"` decoding to `{a: "1"}`.

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;

/// Splits `input` into an ordered key→value map, first occurrence winning.
///
/// A chunk without `=` becomes a key with an empty value. Empty chunks
/// (from `"a=1&&b=2"` or a trailing `&`) are skipped.
pub(crate) fn parse_pairs(input: &str) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for chunk in input.split('&') {
        if chunk.is_empty() {
            continue;
        }
        let (key, value) = chunk.split_once('=').unwrap_or((chunk, ""));
        map.entry(key.to_owned()).or_insert_with(|| value.to_owned());
    }
    map
}

/// Percent-decodes a whole urlencoded body to UTF-8 text.
///
/// Decoding happens before pair splitting, so an encoded `&` or `=` inside a
/// value takes part in the split. `+` is left as-is.
pub(crate) fn percent_decode(body: &str) -> Option<String> {
    percent_decode_str(body)
        .decode_utf8()
        .ok()
        .map(|cow| cow.into_owned())
}
