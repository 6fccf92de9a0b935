//! Object naming for storage writes.
//!
//! Every write that may be retried gets a uniqueness-guaranteeing suffix
//! so a replayed upload lands beside the earlier partial attempt instead
//! of colliding with it.

/// Generate a storage object name under `prefix`.
///
/// The original filename is sanitized and, when `unique` is set, a short
/// UUID fragment is inserted before the extension:
/// `videos/clip-9f8a31d2.mp4`.
pub fn object_name(prefix: &str, original: &str, unique: bool) -> String {
    let sanitized = sanitize_filename(original);
    let (stem, ext) = split_extension(&sanitized);

    let mut name = String::new();
    if !prefix.is_empty() {
        name.push_str(prefix.trim_end_matches('/'));
        name.push('/');
    }
    name.push_str(stem);
    if unique {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        name.push('-');
        name.push_str(&suffix[..8]);
    }
    if !ext.is_empty() {
        name.push('.');
        name.push_str(ext);
    }
    name
}

/// Reduce a user-supplied filename to a safe object-name component.
///
/// Path separators and non `[A-Za-z0-9._-]` characters become `_`;
/// an empty result falls back to `"upload"`.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches('.').to_string();
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed
    }
}

/// Split `name` into (stem, extension). The extension excludes the dot.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos < name.len() - 1 => (&name[..pos], &name[pos + 1..]),
        _ => (name, ""),
    }
}
