pub mod date;
pub mod descriptions;
pub mod error;
pub mod extras;
pub mod folder_filter;
pub mod media;
pub mod naming;
pub mod sanitize;
pub mod sidecar;
pub mod writer;
pub mod zip_scan;

use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

pub use date::{DateInferencer, DateStyle, InferredDate};
pub use descriptions::DescriptionMap;
pub use error::GptdError;
pub use extras::ModifiedMarkers;
pub use folder_filter::FolderFilter;
pub use naming::NameLayout;
pub use writer::LengthCheck;

/// Archive name pattern looked up in the working directory when none is given
pub const DEFAULT_ARCHIVE_PATTERN: &str = "takeout-*.zip";

/// Output root used when none is given
pub const DEFAULT_OUTPUT_DIR: &str = "target";

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub zip_files: Vec<String>,
    pub output: PathBuf,
    /// Only entries under these folder names; empty means all
    pub folders: Vec<String>,
    pub layout: NameLayout,
    pub date_style: DateStyle,
    pub length_check: LengthCheck,
    /// Move descriptions from originals to their edited variants
    pub reassociate: bool,
    pub modified_markers: ModifiedMarkers,
    /// Set file mtimes from the inferred date
    pub set_mtime: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            zip_files: Vec::new(),
            output: PathBuf::from(DEFAULT_OUTPUT_DIR),
            folders: Vec::new(),
            layout: NameLayout::default(),
            date_style: DateStyle::default(),
            length_check: LengthCheck::default(),
            reassociate: true,
            modified_markers: ModifiedMarkers::default(),
            set_mtime: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    pub archives: u64,
    pub media_found: u64,
    pub sidecars_read: u64,
    pub invalid_sidecars: u64,
    pub descriptions: u64,
    pub reassociated: u64,
    pub files_written: u64,
    pub files_described: u64,
    pub files_dated: u64,
    pub files_excluded: u64,
    pub length_warnings: u64,
}

/// Type alias for progress callback
pub type ProgressCallback<'a> = dyn Fn(&str, u64, u64, &str) + Send + Sync + 'a;

/// Throttled progress reporter: emits at most every 200ms, and always on completion.
pub struct ThrottledProgress<'a> {
    inner: &'a ProgressCallback<'a>,
    last_emit: std::cell::Cell<Instant>,
}

impl<'a> ThrottledProgress<'a> {
    pub fn new(inner: &'a ProgressCallback<'a>) -> Self {
        Self {
            inner,
            last_emit: std::cell::Cell::new(Instant::now() - std::time::Duration::from_secs(1)),
        }
    }

    pub fn report(&self, stage: &str, current: u64, total: u64, message: &str) {
        let is_done = current + 1 >= total;
        if !is_done {
            if self.last_emit.get().elapsed().as_millis() < 200 {
                return;
            }
            self.last_emit.set(Instant::now());
        }
        (self.inner)(stage, current, total, message);
    }
}

/// Run the full pipeline: scan archives and resolve sidecars, reassociate edited
/// variants, then rename and extract every remaining file.
pub fn process(options: &ProcessOptions, progress_callback: &ProgressCallback<'_>) -> anyhow::Result<ProcessResult> {
    if options.zip_files.is_empty() {
        return Err(GptdError::NoArchives.into());
    }
    let tp = ThrottledProgress::new(progress_callback);
    let t = Instant::now();

    // Stage 1: Scan all zips and build the description map
    info!("Reading JSON files");
    let mut archives = zip_scan::open_archives(&options.zip_files)?;
    let folders = FolderFilter::new(&options.folders);
    let scan = zip_scan::scan_zips(&options.zip_files, &mut archives, &folders, &tp)?;
    let media = scan.media;
    let mut descriptions = scan.descriptions;

    // Stage 2: Edited variants take over their original's description
    let reassociated = if options.reassociate {
        info!("Handling modified image files");
        extras::reassociate_modified(&media, &options.modified_markers, &mut descriptions)
    } else {
        0
    };

    // Stage 3: Rename and extract
    info!("Extracting image files");
    let settings = writer::WriteSettings {
        layout: options.layout,
        date_style: options.date_style,
        length_check: options.length_check,
        set_mtime: options.set_mtime,
    };
    let written = writer::write_output(
        &media,
        &descriptions,
        &DateInferencer::default(),
        &mut archives,
        &options.output,
        &settings,
        &tp,
    )?;

    info!(
        "Wrote {} files to {} in {:.2}s",
        written.files_written,
        options.output.display(),
        t.elapsed().as_secs_f64()
    );

    Ok(ProcessResult {
        archives: options.zip_files.len() as u64,
        media_found: media.len() as u64,
        sidecars_read: scan.sidecars_read,
        invalid_sidecars: scan.invalid_sidecars,
        descriptions: descriptions.len() as u64,
        reassociated: reassociated as u64,
        files_written: written.files_written,
        files_described: written.files_described,
        files_dated: written.files_dated,
        files_excluded: written.files_excluded,
        length_warnings: written.length_warnings,
    })
}
