use unicode_normalization::UnicodeNormalization;

/// Restricts processing to entries living under selected folders.
///
/// A folder matches when any directory component of the zip path equals one of the
/// configured names (NFC, case-sensitive), so `Trip` selects both
/// `Takeout/Google Photos/Trip/a.jpg` and `Trip/sub/b.jpg`. No names selects everything.
#[derive(Debug, Clone, Default)]
pub struct FolderFilter {
    folders: Vec<String>,
}

impl FolderFilter {
    pub fn new<I, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let folders = folders
            .into_iter()
            .map(|f| f.as_ref().trim_matches('/').nfc().collect::<String>())
            .filter(|f| !f.is_empty())
            .collect();
        Self { folders }
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn matches(&self, zip_path: &str) -> bool {
        if self.folders.is_empty() {
            return true;
        }
        let Some((dir, _)) = zip_path.rsplit_once('/') else {
            return false;
        };
        dir.split('/').any(|component| {
            let component: String = component.nfc().collect();
            self.folders.iter().any(|f| *f == component)
        })
    }
}
