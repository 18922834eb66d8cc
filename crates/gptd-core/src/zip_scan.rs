use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use encoding_rs::SHIFT_JIS;
use tracing::info;
use zip::ZipArchive;

use crate::descriptions::DescriptionMap;
use crate::folder_filter::FolderFilter;
use crate::media::MediaEntry;
use crate::sidecar::{self, SidecarOutcome};
use crate::ThrottledProgress;

/// Decode ZIP entry name, trying UTF-8 first, then Shift_JIS
fn decode_zip_name(raw: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(raw) {
        return s.to_string();
    }

    // Fall back to Shift_JIS (common for Japanese ZIP files)
    let (decoded, _, had_errors) = SHIFT_JIS.decode(raw);
    if !had_errors {
        return decoded.into_owned();
    }

    String::from_utf8_lossy(raw).into_owned()
}

fn open_archive(zip_path: &str) -> anyhow::Result<ZipArchive<File>> {
    let file = File::open(zip_path).with_context(|| format!("cannot open archive {}", zip_path))?;
    ZipArchive::new(file).with_context(|| format!("cannot read archive {}", zip_path))
}

/// Open every archive up front; they stay open for the whole run
pub fn open_archives(zip_paths: &[String]) -> anyhow::Result<Vec<ZipArchive<File>>> {
    zip_paths.iter().map(|p| open_archive(p)).collect()
}

/// Result of scanning all zip files
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Non-sidecar file entries, in archive order
    pub media: Vec<MediaEntry>,
    /// Sanitized descriptions from every sidecar of every archive
    pub descriptions: DescriptionMap,
    pub sidecars_read: u64,
    pub invalid_sidecars: u64,
}

/// Scan all zip files: collect media entries and resolve every sidecar description.
///
/// Sidecars may sit in a different archive than their media file (large exports are
/// split), so the description map covers all archives before anything is written.
///
/// `archives` are the opened `zip_paths`, in the same order.
pub fn scan_zips(
    zip_paths: &[String],
    archives: &mut [ZipArchive<File>],
    folders: &FolderFilter,
    progress: &ThrottledProgress,
) -> anyhow::Result<ScanResult> {
    let mut result = ScanResult::default();

    for (zip_index, (zip_path, archive)) in zip_paths.iter().zip(archives.iter_mut()).enumerate() {
        let total = archive.len() as u64;

        let zip_name = Path::new(zip_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(zip_path)
            .to_string();
        info!("Reading {} ({} entries)", zip_name, total);

        for i in 0..archive.len() {
            progress.report("scan", i as u64, total, &format!("Scanning {}", zip_name));
            let mut entry = archive.by_index(i)?;
            let entry_path = decode_zip_name(entry.name_raw());

            if entry.is_dir() || entry_path.ends_with('/') {
                continue;
            }

            let filename = entry_path.rsplit('/').next().unwrap_or("").to_string();
            if filename.is_empty() || !folders.matches(&entry_path) {
                continue;
            }

            if sidecar::is_sidecar(&entry_path) {
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry
                    .read_to_end(&mut bytes)
                    .with_context(|| format!("cannot read {} from {}", entry_path, zip_name))?;
                result.sidecars_read += 1;
                if sidecar::resolve_sidecar(&entry_path, &bytes, &mut result.descriptions)
                    == SidecarOutcome::Invalid
                {
                    result.invalid_sidecars += 1;
                }
                continue;
            }

            let size = entry.size();
            result.media.push(MediaEntry::new(entry_path, zip_index, i, filename, size));
        }
        progress.report("scan", total, total, &format!("Scanned {}", zip_name));
    }

    info!(
        "Found {} media files, {} JSON files ({} invalid), {} descriptions",
        result.media.len(),
        result.sidecars_read,
        result.invalid_sidecars,
        result.descriptions.len()
    );

    Ok(result)
}
