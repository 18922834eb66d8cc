use std::path::Path;

#[derive(Debug, Clone)]
pub struct MediaEntry {
    /// Relative path inside the zip
    pub zip_path: String,
    /// Index of the zip file in the input list
    pub zip_index: usize,
    /// Index of this entry within the zip archive (for by_index access)
    pub entry_index: usize,
    /// Just the filename
    pub filename: String,
    /// Uncompressed size in bytes
    pub size: u64,
}

impl MediaEntry {
    pub fn new(zip_path: String, zip_index: usize, entry_index: usize, filename: String, size: u64) -> Self {
        Self {
            zip_path,
            zip_index,
            entry_index,
            filename,
            size,
        }
    }

    /// Directory part of the zip path, without trailing slash ("" at the archive root)
    pub fn dir(&self) -> &str {
        match self.zip_path.rfind('/') {
            Some(pos) => &self.zip_path[..pos],
            None => "",
        }
    }

    /// Filename without its last extension
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }

    /// Last extension including the leading dot, or "" when there is none
    pub fn extension(&self) -> &str {
        let stem_len = self.stem().len();
        &self.filename[stem_len..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> MediaEntry {
        let filename = path.rsplit('/').next().unwrap().to_string();
        MediaEntry::new(path.to_string(), 0, 0, filename, 0)
    }

    #[test]
    fn test_path_parts() {
        let m = entry("Takeout/Google Photos/Trip/IMG_1.jpg");
        assert_eq!(m.dir(), "Takeout/Google Photos/Trip");
        assert_eq!(m.stem(), "IMG_1");
        assert_eq!(m.extension(), ".jpg");

        let m = entry("archive.tar.gz");
        assert_eq!(m.dir(), "");
        assert_eq!(m.stem(), "archive.tar");
        assert_eq!(m.extension(), ".gz");

        let m = entry("A/README");
        assert_eq!(m.stem(), "README");
        assert_eq!(m.extension(), "");
    }
}
