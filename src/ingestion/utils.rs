//! Utility functions for common operations

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const PLACEHOLDER_IMAGE_BASE: &str = "https://picsum.photos/seed";

/// Characters a URI component may carry unescaped
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// How far into a payload the HTML sniff looks
const HTML_SNIFF_BYTES: usize = 200;

/// Parse a loosely formatted number ("$1,250.00", "1.5 baths")
/// Keeps only digits, '.' and '-'; anything that doesn't then parse
/// to a finite number is absent.
pub fn parse_num(value: &str) -> Option<f64> {
    let clean: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    clean.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a loosely formatted integer ("4 guests", "1,200")
/// Keeps only digits and '-', then reads the leading `-?digits` run.
pub fn parse_int(value: &str) -> Option<i64> {
    let clean: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();

    let digits_start = usize::from(clean.starts_with('-'));
    let digits_len = clean[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();

    if digits_len == 0 {
        return None;
    }

    clean[..digits_start + digits_len].parse::<i64>().ok()
}

/// Deterministic placeholder photo for listings without one
pub fn fallback_image_url(id: &str, place: &str, property_type: &str, room_type: &str) -> String {
    let seed = format!("{}-{}-{}-{}", id, place, property_type, room_type);
    format!(
        "{}/{}/800/600",
        PLACEHOLDER_IMAGE_BASE,
        utf8_percent_encode(&seed, URI_COMPONENT)
    )
}

/// Case-insensitive `<html` search over the whole body
pub fn looks_like_html(body: &[u8]) -> bool {
    String::from_utf8_lossy(body).to_lowercase().contains("<html")
}

/// Whether the head of a payload is an HTML document rather than data
pub fn starts_like_html(body: &[u8]) -> bool {
    let head = &body[..body.len().min(HTML_SNIFF_BYTES)];
    let head = String::from_utf8_lossy(head).to_lowercase();
    let head = head.trim_start_matches('\u{feff}').trim_start();

    head.starts_with('<') && (head.contains("<!doctype html") || head.contains("<html"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_num() {
        assert_eq!(parse_num("$1,250.00"), Some(1250.0));
        assert_eq!(parse_num("1.5 baths"), Some(1.5));
        assert_eq!(parse_num("-3"), Some(-3.0));
        assert_eq!(parse_num("Half-bath"), None);
        assert_eq!(parse_num(""), None);
        assert_eq!(parse_num("n/a"), None);
        assert_eq!(parse_num("1-2"), None);
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("4"), Some(4));
        assert_eq!(parse_int("4 guests"), Some(4));
        assert_eq!(parse_int("1,200"), Some(1200));
        assert_eq!(parse_int("-2"), Some(-2));
        assert_eq!(parse_int("1-2"), Some(1));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("none"), None);
        assert_eq!(parse_int("-"), None);
    }

    #[test]
    fn test_fallback_image_is_deterministic() {
        let a = fallback_image_url("42", "Downtown", "Loft", "Entire home/apt");
        let b = fallback_image_url("42", "Downtown", "Loft", "Entire home/apt");
        let c = fallback_image_url("43", "Downtown", "Loft", "Entire home/apt");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("https://picsum.photos/seed/42-Downtown-Loft-"));
        assert!(a.ends_with("/800/600"));
        assert!(!a.contains(' '));
    }

    #[test]
    fn test_fallback_image_seed_encoding() {
        let url = fallback_image_url("7", "Old Town", "Condo", "Entire home/apt");
        assert_eq!(
            url,
            "https://picsum.photos/seed/7-Old%20Town-Condo-Entire%20home%2Fapt/800/600"
        );

        let url = fallback_image_url("8", "St. John's (N)", "", "");
        assert!(url.contains("8-St.%20John's%20(N)--"));
    }

    #[test]
    fn test_html_detection() {
        assert!(looks_like_html(b"<HTML><body>Not Found</body></HTML>"));
        assert!(!looks_like_html(b"id,name\n1,Loft\n"));

        assert!(starts_like_html(b"  <!DOCTYPE html><html>"));
        assert!(starts_like_html(b"\n<html lang=\"en\">"));
        assert!(!starts_like_html(b"id,name,description\n1,Loft,<html> in text\n"));
        assert!(!starts_like_html(b""));
    }
}
