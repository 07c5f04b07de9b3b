//! Shell quoting for remote commands

/// Quote `value` for a POSIX shell.
///
/// Values made only of safe characters are returned unchanged; anything
/// else is wrapped in single quotes with embedded quotes escaped as `'\''`.
pub fn quote(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_safe_char) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '@' | '%' | '+' | '=' | ',')
}
