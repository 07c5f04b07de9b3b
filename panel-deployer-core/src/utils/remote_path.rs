//! POSIX path helpers for remote paths

/// Join `relative` under `base` with exactly one separator.
pub fn join(base: &str, relative: &str) -> String {
    let relative = relative.trim_start_matches('/');
    let base = trim_trailing_slash(base);
    if relative.is_empty() {
        return base.to_string();
    }
    if base == "/" {
        format!("/{relative}")
    } else {
        format!("{base}/{relative}")
    }
}

/// Strip trailing separators, keeping a lone `/`.
pub fn trim_trailing_slash(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

/// Parent directory, or `None` for `/` and bare names.
pub fn parent(path: &str) -> Option<&str> {
    let path = trim_trailing_slash(path);
    match path.rfind('/') {
        Some(0) if path.len() > 1 => Some("/"),
        Some(0) | None => None,
        Some(idx) => Some(&path[..idx]),
    }
}

/// Last path component.
pub fn file_name(path: &str) -> &str {
    let path = trim_trailing_slash(path);
    path.rsplit('/').next().unwrap_or(path)
}
