mod logging;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, ValueEnum};
use gptd_core::{DateStyle, GptdError, LengthCheck, ModifiedMarkers, NameLayout, ProcessOptions};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "gptd",
    version,
    about = "Google Photos Takeout descriptions - rename and extract files using their sidecar descriptions"
)]
struct Cli {
    /// Google Takeout zip files (default: every takeout-*.zip in the current directory)
    zip_files: Vec<String>,

    /// Output directory
    #[arg(short, long, default_value = gptd_core::DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Only process entries under this folder name (repeatable)
    #[arg(long = "folder", value_name = "NAME")]
    folders: Vec<String>,

    /// Where the description goes in the new file name
    #[arg(long, value_enum, default_value_t = Layout::DatePrefixed)]
    layout: Layout,

    /// Always write a full YYYY-MM-DD date, with X for unknown parts
    #[arg(long)]
    date_placeholders: bool,

    /// Which length to check against the platform limit before writing
    #[arg(long, value_enum, default_value_t = LengthCheckMode::Path)]
    length_check: LengthCheckMode,

    /// Suffix marking an edited copy, e.g. "-edited" (repeatable, replaces the built-in list)
    #[arg(long = "modified-marker", value_name = "TOKEN", allow_hyphen_values = true)]
    modified_markers: Vec<String>,

    /// Keep descriptions on originals instead of moving them to edited copies
    #[arg(long)]
    no_reassociate: bool,

    /// Set file modification times from the date found in the description
    #[arg(long)]
    set_mtime: bool,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Layout {
    /// <date>___<description>___<name>.<ext>
    DatePrefixed,
    /// <name>___<description>.<ext>
    DescriptionSuffix,
}

impl From<Layout> for NameLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::DatePrefixed => NameLayout::DatePrefixed,
            Layout::DescriptionSuffix => NameLayout::DescriptionSuffix,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LengthCheckMode {
    /// Full output path, 256 characters
    Path,
    /// Output file name, 200 characters
    FileName,
    Off,
}

impl From<LengthCheckMode> for LengthCheck {
    fn from(mode: LengthCheckMode) -> Self {
        match mode {
            LengthCheckMode::Path => LengthCheck::Path(256),
            LengthCheckMode::FileName => LengthCheck::FileName(200),
            LengthCheckMode::Off => LengthCheck::Off,
        }
    }
}

/// Every archive in `dir` matching `pattern`, sorted by path
fn discover_archives(dir: &Path, pattern: &str) -> anyhow::Result<Vec<String>> {
    let full_pattern = dir.join(pattern);
    let full_pattern = full_pattern.to_string_lossy();
    let paths = glob::glob(&full_pattern).map_err(|e| GptdError::InvalidPattern {
        pattern: full_pattern.to_string(),
        message: e.msg.to_string(),
    })?;

    let mut archives: Vec<String> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Ignored unreadable path: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .map(|path| path.to_string_lossy().to_string())
        .collect();
    archives.sort();

    if archives.is_empty() {
        return Err(GptdError::NoArchiveFound {
            pattern: pattern.to_string(),
            dir: dir.display().to_string(),
        }
        .into());
    }
    Ok(archives)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);
    let t_total = std::time::Instant::now();

    let zip_files = if cli.zip_files.is_empty() {
        let archives = discover_archives(Path::new("."), gptd_core::DEFAULT_ARCHIVE_PATTERN)?;
        info!("Found {} archives: {}", archives.len(), archives.join(", "));
        archives
    } else {
        cli.zip_files
    };

    let modified_markers = if cli.modified_markers.is_empty() {
        ModifiedMarkers::default()
    } else {
        ModifiedMarkers::new(&cli.modified_markers)
    };

    let options = ProcessOptions {
        zip_files,
        output: cli.output,
        folders: cli.folders,
        layout: cli.layout.into(),
        date_style: if cli.date_placeholders {
            DateStyle::Placeholder
        } else {
            DateStyle::Compact
        },
        length_check: cli.length_check.into(),
        reassociate: !cli.no_reassociate,
        modified_markers,
        set_mtime: cli.set_mtime,
    };

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} {msg}")
            .unwrap(),
    );
    let current_stage = Mutex::new(String::new());

    let result = gptd_core::process(&options, &|stage, current, total, message| {
        if let Ok(mut last) = current_stage.lock() {
            if *last != stage {
                *last = stage.to_string();
                pb.reset();
            }
        }
        pb.set_length(total);
        pb.set_position((current + 1).min(total));
        pb.set_message(message.to_string());
    });
    pb.finish_and_clear();
    let result = result?;

    eprintln!(
        "Done! {} media files, {} descriptions ({} moved to edited copies), {} files written, {} described, {} dated, {} excluded, {} invalid JSON, {} length warnings ({:.2}s)",
        result.media_found,
        result.descriptions,
        result.reassociated,
        result.files_written,
        result.files_described,
        result.files_dated,
        result.files_excluded,
        result.invalid_sidecars,
        result.length_warnings,
        t_total.elapsed().as_secs_f64()
    );

    Ok(())
}
