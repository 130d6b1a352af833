//! Form-style percent decoding shared by the router and request parsing.

use std::borrow::Cow;

/// Decodes one URL component the way HTML forms encode it.
///
/// `+` becomes a space, `%XX` escapes are decoded and any resulting invalid
/// UTF-8 is replaced with `U+FFFD`. Malformed escapes are kept verbatim.
///
/// ```rust
/// use caravel_router::decode_component;
///
/// assert_eq!(decode_component("joe%20bloggs"), "joe bloggs");
/// assert_eq!(decode_component("joe+bloggs"), "joe bloggs");
/// assert_eq!(decode_component("100%"), "100%");
/// ```
#[must_use]
pub fn decode_component(raw: &str) -> Cow<'_, str> {
    if !raw.bytes().any(|b| b == b'%' || b == b'+') {
        return Cow::Borrowed(raw);
    }
    let spaced = raw.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_is_borrowed() {
        assert!(matches!(decode_component("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_percent_and_plus() {
        assert_eq!(decode_component("a%2Fb+c"), "a/b c");
    }

    #[test]
    fn test_encoded_plus_stays_plus() {
        assert_eq!(decode_component("1%2B1"), "1+1");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        assert_eq!(decode_component("%FF"), "\u{FFFD}");
    }
}
