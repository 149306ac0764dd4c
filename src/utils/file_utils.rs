//! File system utilities

use regex::Regex;
use std::sync::OnceLock;

/// Name used when sanitizing leaves nothing behind
pub const DEFAULT_FILE_NAME: &str = "untitled";

/// Upper bound for a file name in bytes
pub const MAX_FILE_NAME_BYTES: usize = 200;

/// Windows 保留设备名（CON、NUL、COM1 等，可带扩展名）
fn is_reserved_name(name: &str) -> bool {
    static RESERVED: OnceLock<Option<Regex>> = OnceLock::new();
    RESERVED
        .get_or_init(|| Regex::new(r"(?i)^(con|prn|aux|nul|com[1-9]|lpt[1-9])\s*(\..*)?$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}

/// Sanitize filename for filesystem
///
/// Never fails: an input that sanitizes to nothing becomes [`DEFAULT_FILE_NAME`].
pub fn sanitize_filename(filename: &str) -> String {
    let replaced: String = filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Windows 不允许文件名以点或空格结尾
    let mut name = replaced
        .trim()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string();

    if name.is_empty() {
        return DEFAULT_FILE_NAME.to_string();
    }

    if is_reserved_name(&name) {
        name.insert(0, '_');
    }

    if name.len() > MAX_FILE_NAME_BYTES {
        truncate_to_bytes(&mut name, MAX_FILE_NAME_BYTES);
        let kept = name.trim_end_matches(|c: char| c == '.' || c.is_whitespace()).len();
        if kept == 0 {
            return DEFAULT_FILE_NAME.to_string();
        }
        name.truncate(kept);
    }
    name
}

fn truncate_to_bytes(name: &mut String, max_bytes: usize) {
    if name.len() <= max_bytes {
        return;
    }
    let mut cut = max_bytes;
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    name.truncate(cut);
}

/// Normalize a folder chosen by the user to forward slashes
pub fn normalize_folder(folder: &str) -> String {
    folder.trim().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_legal(name: &str) {
        assert!(!name.is_empty());
        assert!(!name
            .chars()
            .any(|c| matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
                || c.is_control()));
    }

    #[test]
    fn test_illegal_characters_replaced() {
        assert_eq!(sanitize_filename("My:Video?"), "My_Video_");
        assert_eq!(sanitize_filename("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_filename("line\nbreak\t"), "line_break_");
    }

    #[test]
    fn test_empty_and_blank_names() {
        assert_eq!(sanitize_filename(""), DEFAULT_FILE_NAME);
        assert_eq!(sanitize_filename("   "), DEFAULT_FILE_NAME);
        assert_eq!(sanitize_filename("..."), DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_only_illegal_characters() {
        let name = sanitize_filename("<>:\"|?*");
        assert_legal(&name);
        assert_eq!(name, "_______");
    }

    #[test]
    fn test_trims_whitespace_and_trailing_dots() {
        assert_eq!(sanitize_filename("  第一课：Hello World.  "), "第一课：Hello World");
    }

    #[test]
    fn test_reserved_device_names() {
        assert_eq!(sanitize_filename("CON"), "_CON");
        assert_eq!(sanitize_filename("lpt1.ts"), "_lpt1.ts");
        assert_eq!(sanitize_filename("console"), "console");
        assert_eq!(sanitize_filename("CON .txt"), "_CON .txt");
        assert_eq!(sanitize_filename("nul  .ts"), "_nul  .ts");
    }

    #[test]
    fn test_long_names_truncated_on_char_boundary() {
        let long = "视".repeat(100);
        let name = sanitize_filename(&long);
        assert!(name.len() <= MAX_FILE_NAME_BYTES);
        assert!(name.chars().all(|c| c == '视'));
    }

    #[test]
    fn test_sanitize_is_total() {
        for raw in ["", "/", "\\\\", "\u{0}\u{1}", " . ", "a/../b", "?*?"] {
            assert_legal(&sanitize_filename(raw));
        }
    }

    #[test]
    fn test_normalize_folder() {
        assert_eq!(normalize_folder("C:\\Users\\me\\Videos"), "C:/Users/me/Videos");
        assert_eq!(normalize_folder(" /d "), "/d");
    }
}
