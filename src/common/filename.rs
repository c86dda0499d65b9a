use std::path::Path;

pub const DEFAULT_STEM: &str = "video";

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || ('\u{4E00}'..='\u{9FFF}').contains(&c)
        || ('\u{3400}'..='\u{4DBF}').contains(&c)
}

/// Keeps ASCII letters, digits and CJK ideographs. Falls back to `video`.
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| is_allowed(*c)).collect();
    if cleaned.is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        cleaned
    }
}

/// Sanitized stem of an uploaded file name, e.g. `my clip (1).mov` -> `myclip1`.
pub fn sanitized_stem(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    sanitize(stem)
}

/// Lowercase alphanumeric extension of `file_name`, if any.
pub fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            e.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|e| !e.is_empty())
}

pub fn output_file_name(original: &str) -> String {
    format!("compressed_{}.mp4", sanitized_stem(original))
}

/// `attachment; filename*=UTF-8''...` for an already sanitized file name.
pub fn content_disposition(file_name: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(file_name.as_bytes()).collect();
    // form encoding writes spaces as '+'; RFC 5987 wants %20
    format!(
        "attachment; filename*=UTF-8''{}",
        encoded.replace('+', "%20")
    )
}
