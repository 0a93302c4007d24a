use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fallback object name when nothing survives sanitization.
const FALLBACK_NAME: &str = "file";

/// Make a filename safe to embed in a URL and to store on any filesystem.
///
/// Lower-cases, strips diacritics, maps everything outside `[a-z0-9.-]` to
/// `-`, collapses hyphen runs and trims hyphens at both ends. Idempotent.
pub fn sanitize_filename(filename: &str) -> String {
    let mut out = String::with_capacity(filename.len());
    for c in filename.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)) {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-' {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('-').to_string()
}

/// Object key for an upload: millisecond timestamp prefix plus the
/// sanitized name.
pub fn object_key(filename: &str, timestamp_millis: i64) -> String {
    let name = sanitize_filename(filename);
    let name = if name.is_empty() { FALLBACK_NAME } else { &name };
    format!("{timestamp_millis}-{name}")
}

/// MIME type guessed from the extension of a key.
pub fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
