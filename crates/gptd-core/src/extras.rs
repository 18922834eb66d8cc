use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::descriptions::DescriptionMap;
use crate::media::MediaEntry;

/// Localized suffixes Google Photos appends to locally edited copies
pub const DEFAULT_MODIFIED_MARKERS: &[&str] = &[
    "-modifié",     // FR
    "-edited",      // EN
    "-bearbeitet",  // DE
    "-modificato",  // IT
    "-bewerkt",     // NL
    "-edytowane",   // PL
    "-editat",      // CA
    "-ha editado",  // ES
    "-編集済み",     // JA
];

/// Matches edited-variant stems against a list of markers (case-insensitive, NFC)
#[derive(Debug, Clone)]
pub struct ModifiedMarkers {
    markers: Vec<String>,
}

impl Default for ModifiedMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_MODIFIED_MARKERS.iter().copied())
    }
}

impl ModifiedMarkers {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers = markers
            .into_iter()
            .map(|m| normalize(m.as_ref()))
            .filter(|m| !m.is_empty())
            .collect();
        Self { markers }
    }

    /// Stem of the original file if `stem` ends with one of the markers.
    /// The returned stem is NFC-normalized.
    pub fn original_stem(&self, stem: &str) -> Option<String> {
        let stem: Vec<char> = stem.nfc().collect();

        for marker in &self.markers {
            let marker_chars = marker.chars().count();
            if marker_chars >= stem.len() {
                continue;
            }
            let split = stem.len() - marker_chars;
            let tail: String = stem[split..].iter().collect();
            if tail.to_lowercase() == *marker {
                return Some(stem[..split].iter().collect());
            }
        }
        None
    }

    /// Zip path of the original file a modified variant was derived from
    pub fn original_path(&self, media: &MediaEntry) -> Option<String> {
        let original_stem = self.original_stem(media.stem())?;
        let dir = media.dir();
        let name = format!("{}{}", original_stem, media.extension());
        Some(if dir.is_empty() {
            name
        } else {
            format!("{}/{}", dir, name)
        })
    }
}

fn normalize(s: &str) -> String {
    s.nfc().collect::<String>().to_lowercase()
}

/// Give every modified variant the description of its original and exclude the
/// original from extraction. Returns the number of descriptions moved.
pub fn reassociate_modified(
    media: &[MediaEntry],
    markers: &ModifiedMarkers,
    descriptions: &mut DescriptionMap,
) -> usize {
    let mut moved = 0;
    for m in media {
        let Some(original) = markers.original_path(m) else {
            continue;
        };
        if descriptions.reassign(&original, &m.zip_path) {
            info!("Removed original image:\n      {}\n      {}", original, m.zip_path);
            moved += 1;
        } else {
            debug!("Modified variant without described original: {}", m.zip_path);
        }
    }
    moved
}
