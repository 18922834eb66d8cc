use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::date::{DateInferencer, DateStyle, InferredDate};
use crate::descriptions::DescriptionMap;
use crate::media::MediaEntry;
use crate::naming::{self, NameLayout};
use crate::ThrottledProgress;

/// Which length gets checked before writing, and its limit in characters.
/// Exceeding it only logs a warning; names are never shortened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthCheck {
    /// Full output path
    Path(usize),
    /// Output filename alone
    FileName(usize),
    Off,
}

impl Default for LengthCheck {
    fn default() -> Self {
        Self::Path(256)
    }
}

impl LengthCheck {
    /// Length that went over the limit, if any
    pub fn exceeded(&self, path: &Path) -> Option<usize> {
        let (len, limit) = match *self {
            Self::Path(limit) => (path.to_string_lossy().chars().count(), limit),
            Self::FileName(limit) => (
                path.file_name()
                    .map_or(0, |n| n.to_string_lossy().chars().count()),
                limit,
            ),
            Self::Off => return None,
        };
        (len > limit).then_some(len)
    }
}

/// Naming and extraction settings for the write phase
#[derive(Debug, Default)]
pub struct WriteSettings {
    pub layout: NameLayout,
    pub date_style: DateStyle,
    pub length_check: LengthCheck,
    pub set_mtime: bool,
}

/// Result of the write phase.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub files_written: u64,
    pub files_described: u64,
    pub files_dated: u64,
    pub files_excluded: u64,
    pub length_warnings: u64,
}

/// Where a media entry goes: its archive directory under the output root, renamed
pub struct PlannedFile<'a> {
    pub media: &'a MediaEntry,
    pub dest: PathBuf,
    pub described: bool,
    pub date: Option<InferredDate>,
}

/// Compute the destination of every entry that is not excluded, in input order
pub fn plan_output<'a>(
    media: &'a [MediaEntry],
    descriptions: &DescriptionMap,
    inferencer: &DateInferencer,
    output_dir: &Path,
    settings: &WriteSettings,
) -> Vec<PlannedFile<'a>> {
    media
        .iter()
        .filter(|m| !descriptions.is_excluded(&m.zip_path))
        .map(|m| {
            let description = descriptions.get(&m.zip_path);
            let date = description.and_then(|d| inferencer.infer(d));
            let token = description.and_then(|_| settings.date_style.render(date.as_ref()));
            let filename = naming::compose_filename(m, description, token.as_deref(), settings.layout);

            // Mirror the archive directories, never climbing out of the output root
            let mut dest = output_dir.to_path_buf();
            for component in m.dir().split('/').filter(|c| !matches!(*c, "" | "." | "..")) {
                dest.push(component);
            }
            dest.push(filename);

            PlannedFile {
                media: m,
                dest,
                described: description.is_some(),
                date,
            }
        })
        .collect()
}

/// Rename and copy every planned entry out of its archive, one after another.
///
/// Existing files at a destination are overwritten; two entries mapping to the same
/// destination leave the last one on disk.
pub fn write_output(
    media: &[MediaEntry],
    descriptions: &DescriptionMap,
    inferencer: &DateInferencer,
    archives: &mut [ZipArchive<File>],
    output_dir: &Path,
    settings: &WriteSettings,
    progress: &ThrottledProgress,
) -> anyhow::Result<WriteResult> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output directory {}", output_dir.display()))?;

    let planned = plan_output(media, descriptions, inferencer, output_dir, settings);
    let total = planned.len() as u64;
    let mut result = WriteResult {
        files_excluded: (media.len() - planned.len()) as u64,
        ..WriteResult::default()
    };

    let mut created_dirs: HashSet<PathBuf> = HashSet::new();

    for (n, plan) in planned.iter().enumerate() {
        let m = plan.media;

        if let Some(parent) = plan.dest.parent() {
            if !created_dirs.contains(parent) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("cannot create directory {}", parent.display()))?;
                created_dirs.insert(parent.to_path_buf());
            }
        }

        if let Some(len) = settings.length_check.exceeded(&plan.dest) {
            warn!("Path exceeds length limit ({} chars): {}", len, plan.dest.display());
            result.length_warnings += 1;
        }

        let mut entry = archives[m.zip_index].by_index(m.entry_index)?;
        let mut out_file = io::BufWriter::new(
            File::create(&plan.dest).with_context(|| format!("cannot create {}", plan.dest.display()))?,
        );
        io::copy(&mut entry, &mut out_file).with_context(|| format!("cannot extract {}", m.zip_path))?;
        out_file.flush()?;
        drop(out_file);

        if settings.set_mtime {
            if let Some(date) = &plan.date {
                if let Err(e) = apply_date_mtime(&plan.dest, date) {
                    warn!("Cannot set modification time of {}: {}", plan.dest.display(), e);
                }
            }
        }

        debug!("Extracted {} -> {}", m.zip_path, plan.dest.display());
        result.files_written += 1;
        if plan.described {
            result.files_described += 1;
        }
        if plan.date.is_some() {
            result.files_dated += 1;
        }
        progress.report("write", n as u64, total, "Writing files");
    }

    Ok(result)
}

/// Set the mtime of `path` to local midnight of the first day `date` covers
fn apply_date_mtime(path: &Path, date: &InferredDate) -> io::Result<()> {
    let Some(local) = date
        .earliest()
        .and_then(|dt| dt.and_local_timezone(chrono::Local).earliest())
    else {
        return Ok(());
    };
    let ft = filetime::FileTime::from_unix_time(local.timestamp(), 0);
    filetime::set_file_mtime(path, ft)
}
