use std::collections::{HashMap, HashSet};

use unicode_normalization::UnicodeNormalization;

/// Sanitized descriptions keyed by the zip path of the media file they describe,
/// plus the media paths that were superseded and must not be extracted.
///
/// Keys are NFC-normalized so that names stored decomposed in the archive still match.
/// Inserting a key twice keeps the last description.
#[derive(Debug, Default, Clone)]
pub struct DescriptionMap {
    descriptions: HashMap<String, String>,
    excluded: HashSet<String>,
}

/// Normalized lookup key for a zip path
pub fn media_key(zip_path: &str) -> String {
    zip_path.nfc().collect()
}

impl DescriptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a description with a media path, returning the one it replaced
    pub fn insert(&mut self, zip_path: &str, description: String) -> Option<String> {
        self.descriptions.insert(media_key(zip_path), description)
    }

    pub fn get(&self, zip_path: &str) -> Option<&str> {
        self.descriptions.get(&media_key(zip_path)).map(String::as_str)
    }

    pub fn contains(&self, zip_path: &str) -> bool {
        self.descriptions.contains_key(&media_key(zip_path))
    }

    /// Move the description of `from` to `to` and exclude `from` from the output.
    /// Returns false (and changes nothing) when `from` has no description.
    pub fn reassign(&mut self, from: &str, to: &str) -> bool {
        let from_key = media_key(from);
        let Some(description) = self.descriptions.remove(&from_key) else {
            return false;
        };
        self.descriptions.insert(media_key(to), description);
        self.excluded.insert(from_key);
        true
    }

    pub fn is_excluded(&self, zip_path: &str) -> bool {
        self.excluded.contains(&media_key(zip_path))
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }
}
