use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::descriptions::DescriptionMap;
use crate::sanitize::sanitize_description;

/// Extension shared by every Takeout metadata sidecar
pub const SIDECAR_EXTENSION: &str = ".json";

/// Segment newer exports insert between the media name and ".json".
/// Long names get it cut short (".supplemental-metad.json", ".suppl.json", ...).
const SUPPLEMENTAL_METADATA: &str = "supplemental-metadata";

static TRAILING_COUNTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<name>.+?)(?P<ext>\.[^./]+)(?P<counter>\(\d+\))$").unwrap());

/// The part of a Google Photos JSON sidecar we care about. Everything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct SidecarRecord {
    #[serde(default)]
    pub description: Option<String>,
}

impl SidecarRecord {
    /// Description with surrounding whitespace removed, or None when it is missing or blank
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// Parse sidecar JSON content
pub fn parse_sidecar(bytes: &[u8]) -> serde_json::Result<SidecarRecord> {
    serde_json::from_slice(bytes)
}

/// What happened to one sidecar during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarOutcome {
    /// A description was stored for its media file
    Described,
    /// Valid sidecar without a usable description
    NoDescription,
    /// Content could not be parsed; the sidecar was skipped
    Invalid,
}

/// Parse one sidecar and store its sanitized description under the media path it
/// belongs to. A later sidecar for the same media path replaces the earlier one.
pub fn resolve_sidecar(sidecar_path: &str, bytes: &[u8], descriptions: &mut DescriptionMap) -> SidecarOutcome {
    let record = match parse_sidecar(bytes) {
        Ok(record) => record,
        Err(e) => {
            warn!("Ignored invalid JSON: {} ({})", sidecar_path, e);
            return SidecarOutcome::Invalid;
        }
    };

    let Some(description) = record.description() else {
        return SidecarOutcome::NoDescription;
    };
    let Some(media_path) = media_path_for_sidecar(sidecar_path) else {
        return SidecarOutcome::NoDescription;
    };

    let sanitized = sanitize_description(description);
    if sanitized.is_empty() {
        debug!("Description of {} is empty once sanitized", media_path);
        return SidecarOutcome::NoDescription;
    }
    if sanitized != description {
        info!("Sanitized description:\n      {}\n      {}", description, sanitized);
    }

    if let Some(previous) = descriptions.insert(&media_path, sanitized) {
        debug!("Replaced description of {} (was {:?})", media_path, previous);
    }
    SidecarOutcome::Described
}

pub fn is_sidecar(zip_path: &str) -> bool {
    zip_path.ends_with(SIDECAR_EXTENSION)
}

/// Zip path of the media file a sidecar describes.
///
/// `A/1.jpg.json`, `A/1.jpg.supplemental-metadata.json` and
/// `A/1.jpg.supplemental-me.json` all give `A/1.jpg`; the duplicate counter Google
/// appends after the extension (`A/1.jpg(2).json`) is moved back before it (`A/1(2).jpg`).
/// Returns None for paths that are not sidecars.
pub fn media_path_for_sidecar(sidecar_path: &str) -> Option<String> {
    let without_json = sidecar_path.strip_suffix(SIDECAR_EXTENSION)?;
    let base = strip_supplemental_segment(without_json);
    if base.is_empty() || base.ends_with('/') {
        return None;
    }
    Some(move_trailing_counter(&base))
}

/// Drop a (possibly truncated) ".supplemental-metadata" segment, keeping any
/// duplicate counter that followed it.
fn strip_supplemental_segment(path: &str) -> String {
    let Some(dot) = path.rfind('.') else {
        return path.to_string();
    };
    let segment = &path[dot + 1..];
    if segment.contains('/') {
        return path.to_string();
    }

    let (name, counter) = match segment.rfind('(') {
        Some(open) if is_counter(&segment[open..]) => segment.split_at(open),
        _ => (segment, ""),
    };
    if !name.is_empty() && SUPPLEMENTAL_METADATA.starts_with(name) {
        format!("{}{}", &path[..dot], counter)
    } else {
        path.to_string()
    }
}

fn is_counter(s: &str) -> bool {
    s.len() > 2
        && s.starts_with('(')
        && s.ends_with(')')
        && s[1..s.len() - 1].bytes().all(|b| b.is_ascii_digit())
}

fn move_trailing_counter(path: &str) -> String {
    match TRAILING_COUNTER_RE.captures(path) {
        Some(caps) => format!("{}{}{}", &caps["name"], &caps["counter"], &caps["ext"]),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_description() {
        let record = parse_sidecar(br#"{"title":"1.jpg","description":"  Noel 2021 ","photoTakenTime":{"timestamp":"1"}}"#).unwrap();
        assert_eq!(record.description(), Some("Noel 2021"));

        let record = parse_sidecar(br#"{"title":"1.jpg","description":""}"#).unwrap();
        assert_eq!(record.description(), None);

        let record = parse_sidecar(br#"{"title":"1.jpg"}"#).unwrap();
        assert_eq!(record.description(), None);

        assert!(parse_sidecar(b"{not json").is_err());
        assert!(parse_sidecar(br#"{"description": 42}"#).is_err());
    }

    #[test]
    fn test_media_path_for_sidecar() {
        assert_eq!(media_path_for_sidecar("A/1.jpg.json").as_deref(), Some("A/1.jpg"));
        assert_eq!(
            media_path_for_sidecar("A/1.jpg.supplemental-metadata.json").as_deref(),
            Some("A/1.jpg")
        );
        assert_eq!(
            media_path_for_sidecar("A/IMG_20200101_123456789.jpg.supplemental-me.json").as_deref(),
            Some("A/IMG_20200101_123456789.jpg")
        );
        assert_eq!(media_path_for_sidecar("A/1.jpg.s.json").as_deref(), Some("A/1.jpg"));
        assert_eq!(media_path_for_sidecar("1.jpg.json").as_deref(), Some("1.jpg"));
        assert_eq!(media_path_for_sidecar("A/1.jpg"), None);
        assert_eq!(media_path_for_sidecar("A/.json"), None);
    }

    #[test]
    fn test_media_path_moves_counter() {
        assert_eq!(media_path_for_sidecar("A/IMG.jpg(1).json").as_deref(), Some("A/IMG(1).jpg"));
        assert_eq!(
            media_path_for_sidecar("A/IMG.jpg.supplemental-metadata(2).json").as_deref(),
            Some("A/IMG(2).jpg")
        );
        assert_eq!(media_path_for_sidecar("A/IMG(1).jpg.json").as_deref(), Some("A/IMG(1).jpg"));
    }

    #[test]
    fn test_resolve_sidecar() {
        let mut descriptions = DescriptionMap::new();

        let outcome = resolve_sidecar(
            "A/1.jpg.supplemental-metadata.json",
            br#"{"description":"  Plage :  Nice  "}"#,
            &mut descriptions,
        );
        assert_eq!(outcome, SidecarOutcome::Described);
        assert_eq!(descriptions.get("A/1.jpg"), Some("Plage Nice"));

        let outcome = resolve_sidecar("A/2.jpg.json", br#"{"description":""}"#, &mut descriptions);
        assert_eq!(outcome, SidecarOutcome::NoDescription);
        let outcome = resolve_sidecar("A/3.jpg.json", br#"{"description":"???"}"#, &mut descriptions);
        assert_eq!(outcome, SidecarOutcome::NoDescription);
        let outcome = resolve_sidecar("A/4.jpg.json", b"\xff\xfe", &mut descriptions);
        assert_eq!(outcome, SidecarOutcome::Invalid);

        assert_eq!(descriptions.len(), 1);
    }

    #[test]
    fn test_resolve_sidecar_last_wins() {
        let mut descriptions = DescriptionMap::new();
        resolve_sidecar("A/1.jpg.json", br#"{"description":"old"}"#, &mut descriptions);
        resolve_sidecar("A/1.jpg.supplemental-metadata.json", br#"{"description":"new"}"#, &mut descriptions);
        assert_eq!(descriptions.get("A/1.jpg"), Some("new"));
        assert_eq!(descriptions.len(), 1);
    }
}
