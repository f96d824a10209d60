//! Percent-encoding for generated links.

use urlencoding::encode;

/// Append one encoded path segment value.
#[inline]
pub(crate) fn push_segment(out: &mut String, value: &str) {
    out.push_str(&encode(value));
}

/// Append a catch-all value. `/` is kept as a separator unless
/// `encode_slashes` is set.
pub(crate) fn push_catch_all(out: &mut String, value: &str, encode_slashes: bool) {
    if encode_slashes {
        push_segment(out, value);
        return;
    }
    for (i, piece) in value.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        push_segment(out, piece);
    }
}

/// Append `?k=v&...`; nothing when `pairs` is empty.
pub(crate) fn push_query<'a>(out: &mut String, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) {
    let mut first = true;
    for (key, value) in pairs {
        out.push(if first { '?' } else { '&' });
        first = false;
        out.push_str(&encode(key));
        out.push('=');
        out.push_str(&encode(value));
    }
}

/// Append `#fragment`, encoded.
pub(crate) fn push_fragment(out: &mut String, fragment: &str) {
    out.push('#');
    out.push_str(&encode(fragment));
}
