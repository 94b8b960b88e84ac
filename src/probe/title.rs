use std::sync::OnceLock;

use regex::bytes::Regex;

static TITLE_RE: OnceLock<Regex> = OnceLock::new();

// Byte-level and ASCII case-insensitive so bodies that are not valid UTF-8 still match.
fn title_regex() -> &'static Regex {
    TITLE_RE.get_or_init(|| {
        Regex::new(r"(?is-u)<title(?:\s[^>]*)?>(.*?)</title(?:\s[^>]*)?>")
            .expect("title pattern is valid")
    })
}

/// Returns the text of the first `<title>` element with line breaks removed,
/// or an empty string when the body has no title.
pub fn extract_title(body: &[u8]) -> String {
    let Some(caps) = title_regex().captures(body) else {
        return String::new();
    };
    let Some(inner) = caps.get(1) else {
        return String::new();
    };
    String::from_utf8_lossy(inner.as_bytes())
        .replace("\r\n", "")
        .replace('\n', "")
}
