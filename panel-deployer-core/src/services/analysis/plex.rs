//! Plex-enabled webview detection from webview metadata

use serde::Serialize;
use serde_json::Value;

/// Which check identified a webview as Plex-enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlexSignal {
    /// A file named like `plexed.php`
    PlexedFile,
    /// Any file name mentioning plex
    PlexFile,
    /// A page title mentioning plex
    PageTitle,
    /// A page option whose value contains `Plex`
    OptionValue,
    /// `plex` anywhere in the document (last resort)
    RawSubstring,
}

const FILE_NAME_FIELDS: [&str; 4] = ["name", "file", "filename", "path"];

/// Inspect webview metadata for Plex signals.
///
/// Checks run in order and the first hit wins. The metadata has no fixed
/// schema; only `files[]` and `pages[].title` / `pages[].option[]` are
/// looked at before the raw substring fallback.
pub fn detect_plex(metadata: &Value) -> Option<PlexSignal> {
    let file_names = file_names(metadata);

    if file_names
        .iter()
        .any(|f| f.to_ascii_lowercase().contains("plexed.php"))
    {
        return Some(PlexSignal::PlexedFile);
    }
    if file_names
        .iter()
        .any(|f| f.to_ascii_lowercase().contains("plex"))
    {
        return Some(PlexSignal::PlexFile);
    }

    let pages = metadata
        .get("pages")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if pages.iter().any(|page| {
        page.get("title")
            .and_then(Value::as_str)
            .is_some_and(|t| t.to_ascii_lowercase().contains("plex"))
    }) {
        return Some(PlexSignal::PageTitle);
    }

    if pages.iter().any(|page| {
        page.get("option")
            .and_then(Value::as_array)
            .is_some_and(|options| options.iter().any(option_mentions_plex))
    }) {
        return Some(PlexSignal::OptionValue);
    }

    if metadata.to_string().to_ascii_lowercase().contains("plex") {
        return Some(PlexSignal::RawSubstring);
    }
    None
}

fn file_names(metadata: &Value) -> Vec<&str> {
    let Some(files) = metadata.get("files").and_then(Value::as_array) else {
        return Vec::new();
    };
    files
        .iter()
        .filter_map(|file| match file {
            Value::String(name) => Some(name.as_str()),
            Value::Object(map) => FILE_NAME_FIELDS
                .iter()
                .find_map(|field| map.get(*field).and_then(Value::as_str)),
            _ => None,
        })
        .collect()
}

fn option_mentions_plex(option: &Value) -> bool {
    match option {
        Value::String(value) => value.contains("Plex"),
        Value::Object(map) => map
            .get("value")
            .and_then(Value::as_str)
            .is_some_and(|value| value.contains("Plex")),
        _ => false,
    }
}
