use regex::Regex;
use std::sync::LazyLock;

/// Maximum filename component length on common filesystems, in bytes
const MAX_NAME_BYTES: usize = 255;

/// Characters rejected by at least one of Windows, macOS or Linux
const INVALID_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Windows device names that cannot be used as a filename, with or without extension
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL",
    "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9",
    "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

static MULTI_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Make a free-text description usable as part of a filename.
///
/// Trims, drops characters that are illegal in filenames, guards reserved device
/// names, caps the length and collapses whitespace runs to a single space.
/// Applying it to its own output returns the same string.
pub fn sanitize_description(description: &str) -> String {
    let cleaned: String = description
        .trim()
        .chars()
        .filter(|c| !c.is_control() && !INVALID_CHARS.contains(c))
        .collect();

    let mut name = cleaned.trim_end_matches(['.', ' ']).to_string();

    if let Some(base_len) = reserved_base_len(&name) {
        name.insert(base_len, '_');
    }

    truncate_at_char_boundary(&mut name, MAX_NAME_BYTES);

    let collapsed = MULTI_SPACE_RE.replace_all(&name, " ");
    collapsed
        .trim()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}

/// Length of the reserved device name at the start of `name`, if it is one
fn reserved_base_len(name: &str) -> Option<usize> {
    let base = name.split('.').next().unwrap_or(name).trim_end();
    RESERVED_NAMES
        .iter()
        .any(|r| r.eq_ignore_ascii_case(base))
        .then_some(base.len())
}

fn truncate_at_char_boundary(s: &mut String, max_bytes: usize) {
    if s.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_collapses() {
        assert_eq!(sanitize_description("  Plage   de  Nice  "), "Plage de Nice");
        assert_eq!(sanitize_description("a \u{a0} b"), "a b");
    }

    #[test]
    fn test_removes_invalid_chars() {
        assert_eq!(sanitize_description("Anniv 25/12/2023"), "Anniv 25122023");
        assert_eq!(sanitize_description("Quoi ? \"Rien\" : <ok>"), "Quoi Rien ok");
        assert_eq!(sanitize_description("ligne 1\nligne 2\ttab"), "ligne 1ligne 2tab");
        assert_eq!(sanitize_description("fin..."), "fin");
    }

    #[test]
    fn test_reserved_names() {
        assert_eq!(sanitize_description("con"), "con_");
        assert_eq!(sanitize_description("LPT1.txt"), "LPT1_.txt");
        assert_eq!(sanitize_description("Concert"), "Concert");
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_description(&long);
        assert!(out.len() <= MAX_NAME_BYTES);
        assert_eq!(out.len(), 254);
        assert!(out.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_truncation_leaves_no_trailing_dot() {
        let input = format!("{}.\u{a0}.tail", "x".repeat(251));
        let once = sanitize_description(&input);
        assert_eq!(once, "x".repeat(251));
        assert_eq!(sanitize_description(&once), once);
    }

    #[test]
    fn test_idempotent() {
        let long = "x".repeat(300);
        let dotted = format!("{}.\u{a0}.tail", "x".repeat(251));
        let spaced = format!("{} . \u{a0}. fin", "y".repeat(250));
        for input in [
            "  Noël   2021 : chez Mamie ",
            "été 2022",
            long.as_str(),
            "aux",
            "a  .  ",
            "***",
            dotted.as_str(),
            spaced.as_str(),
        ] {
            let once = sanitize_description(input);
            assert_eq!(sanitize_description(&once), once, "input: {input:?}");
        }
    }
}
