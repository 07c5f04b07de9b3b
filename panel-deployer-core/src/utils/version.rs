//! Dotted-numeric version comparison

use std::cmp::Ordering;

/// Compare two dotted version strings component by component.
///
/// Missing trailing components count as zero (`1.2` == `1.2.0`). A leading
/// `v` is ignored, and non-numeric suffixes within a component are dropped
/// (`3-beta` compares as `3`).
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = components(a);
    let right = components(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

/// `true` iff `installed` is strictly older than `latest`.
pub fn is_update_available(installed: &str, latest: &str) -> bool {
    compare_versions(installed, latest) == Ordering::Less
}

fn components(version: &str) -> Vec<u64> {
    let version = version.trim();
    let version = version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version);

    version
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn older_minor_has_update() {
        assert!(is_update_available("1.2.0", "1.3.0"));
    }

    #[test]
    fn equal_versions_have_no_update() {
        assert!(!is_update_available("2.0.0", "2.0.0"));
    }

    #[test]
    fn components_compare_numerically_not_lexically() {
        assert!(!is_update_available("2.0.10", "2.0.9"));
        assert_eq!(compare_versions("2.0.10", "2.0.9"), Ordering::Greater);
    }

    #[test]
    fn missing_trailing_components_are_zero() {
        assert_eq!(compare_versions("1.2", "1.2.0"), Ordering::Equal);
        assert!(is_update_available("1.2", "1.2.1"));
    }

    #[test]
    fn prefix_and_suffix_are_tolerated() {
        assert_eq!(compare_versions("v1.4.0", "1.4"), Ordering::Equal);
        assert!(is_update_available("3-beta.1", "3.2"));
    }
}
