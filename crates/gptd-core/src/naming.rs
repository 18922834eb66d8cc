use crate::media::MediaEntry;

/// Joins the parts of a composed filename
pub const SEPARATOR: &str = "___";

/// Order of the parts in a renamed file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameLayout {
    /// `{date}___{description}___{stem}{ext}`
    #[default]
    DatePrefixed,
    /// `{stem}___{description}{ext}`
    DescriptionSuffix,
}

/// Output filename for a media entry.
///
/// Entries without a description keep their original name. A missing date token
/// drops the date segment together with its separator.
pub fn compose_filename(
    media: &MediaEntry,
    description: Option<&str>,
    date_token: Option<&str>,
    layout: NameLayout,
) -> String {
    let Some(description) = description else {
        return media.filename.clone();
    };
    let stem = media.stem();
    let ext = media.extension();

    match layout {
        NameLayout::DatePrefixed => match date_token {
            Some(date) => format!("{date}{SEPARATOR}{description}{SEPARATOR}{stem}{ext}"),
            None => format!("{description}{SEPARATOR}{stem}{ext}"),
        },
        NameLayout::DescriptionSuffix => format!("{stem}{SEPARATOR}{description}{ext}"),
    }
}
