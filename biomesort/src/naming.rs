//! Screenshot filename conventions.
//!
//! Input files are named `{x}_{z}_{id}.png`, where `x` and `z` are signed
//! world coordinates and `id` is an opaque token. Sorted files are placed at
//! `{category}/{id}.png`, with `_{n}` inserted before the extension when
//! the name is already taken.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Category used when no usable name is available.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Extension of screenshot files, without the dot.
pub const SCREENSHOT_EXTENSION: &str = "png";

/// A screenshot whose name carried a world position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotRecord {
    /// Coordinates as written; values past `i64` saturate
    pub x: i64,
    pub z: i64,
    /// Opaque id, reused as the destination file stem
    pub random_id: String,
    /// Where the file currently lives
    pub source: PathBuf,
}

/// Screenshot name pattern.
///
/// - Group 1: x coordinate, optionally negative
/// - Group 2: z coordinate, optionally negative
/// - Group 3: id, anything up to the first dot
fn screenshot_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(-?[0-9]+)_(-?[0-9]+)_([^.]+)\.png$")
            .expect("screenshot name pattern is valid")
    })
}

/// Parse the position and id out of a screenshot path.
///
/// Returns `None` only when the file name does not follow the pattern.
/// Coordinates outside the world's range still decode; the caller decides
/// what to do with them.
///
/// # Example
///
/// ```
/// use biomesort::naming::decode;
/// use std::path::Path;
///
/// let record = decode(Path::new("shots/100_-200_7777.png")).unwrap();
/// assert_eq!((record.x, record.z), (100, -200));
/// assert_eq!(record.random_id, "7777");
/// assert!(decode(Path::new("bad.png")).is_none());
/// ```
pub fn decode(path: &Path) -> Option<ScreenshotRecord> {
    let name = path.file_name()?.to_str()?;
    let caps = screenshot_pattern().captures(name)?;

    Some(ScreenshotRecord {
        x: parse_coordinate(&caps[1]),
        z: parse_coordinate(&caps[2]),
        random_id: caps[3].to_string(),
        source: path.to_path_buf(),
    })
}

/// Parse a matched coordinate. The pattern guarantees digits, so the only
/// possible failure is overflow.
fn parse_coordinate(digits: &str) -> i64 {
    digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Turn a classification name into a single path segment.
///
/// Drops any namespace prefix (`minecraft:plains` becomes `plains`), folds
/// every `unknown...` value into `unknown` and replaces path separators.
/// `.` and `..` also become `unknown`, so the result never leaves the
/// directory it is joined onto.
pub fn normalize_category(name: &str) -> String {
    let base = name.rsplit(':').next().unwrap_or(name);

    if base
        .get(..UNKNOWN_CATEGORY.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(UNKNOWN_CATEGORY))
    {
        return UNKNOWN_CATEGORY.to_string();
    }

    let cleaned = base.replace(['/', '\\'], "_");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        UNKNOWN_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Relative destination for a screenshot: `{category}/{id}.png`.
pub fn encode(category: &str, random_id: &str) -> PathBuf {
    Path::new(&normalize_category(category))
        .join(format!("{}.{}", random_id, SCREENSHOT_EXTENSION))
}

/// First free variant of `path` on disk.
///
/// Returns `path` unchanged when nothing exists there, otherwise
/// `{stem}_{n}{.ext}` for the smallest free `n >= 1`.
pub fn disambiguate(path: &Path) -> PathBuf {
    disambiguate_by(path, |candidate| candidate.symlink_metadata().is_ok())
}

/// Like [`disambiguate`], with occupancy decided by `is_taken`.
pub fn disambiguate_by<F>(path: &Path, mut is_taken: F) -> PathBuf
where
    F: FnMut(&Path) -> bool,
{
    if !is_taken(path) {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n: u64 = 1;
    loop {
        let candidate = path.with_file_name(format!("{}_{}{}", stem, n, ext));
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// True if `path` has the screenshot extension, in any case.
pub fn has_screenshot_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SCREENSHOT_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_decode_signed_coordinates() {
        let record = decode(Path::new("/tmp/shots/100_-200_7777.png")).unwrap();
        assert_eq!(record.x, 100);
        assert_eq!(record.z, -200);
        assert_eq!(record.random_id, "7777");
        assert_eq!(record.source, Path::new("/tmp/shots/100_-200_7777.png"));
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        let record = decode(Path::new("-5_3_abc.PNG")).unwrap();
        assert_eq!((record.x, record.z), (-5, 3));
        assert_eq!(record.random_id, "abc");
    }

    #[test]
    fn test_decode_rejects_bad_names() {
        for name in [
            "bad.png",
            "1_2.png",
            "1_2_3.jpg",
            "1_2_3.png.bak",
            "1_2_.png",
            "a_2_3.png",
            "+1_2_3.png",
            "1_2_3.4.png",
        ] {
            assert!(decode(Path::new(name)).is_none(), "{} should not decode", name);
        }
    }

    #[test]
    fn test_decode_keeps_out_of_range_coordinates() {
        let wide = decode(Path::new("99999999999_-2147483649_1.png")).unwrap();
        assert_eq!((wide.x, wide.z), (99_999_999_999, -2_147_483_649));

        let huge = decode(Path::new("123456789012345678901234_-123456789012345678901234_2.png")).unwrap();
        assert_eq!((huge.x, huge.z), (i64::MAX, i64::MIN));
        assert_eq!(huge.random_id, "2");

        let edge = decode(Path::new("2147483647_-2147483648_1.png")).unwrap();
        assert_eq!((edge.x, edge.z), (i32::MAX as i64, i32::MIN as i64));
    }

    #[test]
    fn test_decode_id_may_contain_underscores() {
        let record = decode(Path::new("1_2_a_b.png")).unwrap();
        assert_eq!(record.random_id, "a_b");
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("minecraft:plains"), "plains");
        assert_eq!(normalize_category("universal_minecraft:dark_forest"), "dark_forest");
        assert_eq!(normalize_category("plains"), "plains");
        assert_eq!(normalize_category("unknown(42)"), "unknown");
        assert_eq!(normalize_category("mod:Unknown_thing"), "unknown");
        assert_eq!(normalize_category("mod:a/b\\c"), "a_b_c");
        assert_eq!(normalize_category("  spaced  "), "spaced");
        assert_eq!(normalize_category(""), "unknown");
        assert_eq!(normalize_category("minecraft:"), "unknown");
        assert_eq!(normalize_category("   "), "unknown");
        assert_eq!(normalize_category("mod:.."), "unknown");
        assert_eq!(normalize_category("."), "unknown");
        assert_eq!(normalize_category(" .. "), "unknown");
        assert_eq!(normalize_category("a..b"), "a..b");
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode("minecraft:plains", "1"), PathBuf::from("plains/1.png"));
        assert_eq!(encode("unknown(7)", "abc"), PathBuf::from("unknown/abc.png"));
        assert_eq!(encode("mod:..", "9"), PathBuf::from("unknown/9.png"));
    }

    #[test]
    fn test_disambiguate_free_path_is_unchanged() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("42.png");
        assert_eq!(disambiguate(&path), path);
    }

    #[test]
    fn test_disambiguate_appends_smallest_free_suffix() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("42.png");
        fs::write(&base, b"original").unwrap();

        let first = disambiguate(&base);
        assert_eq!(first, temp.path().join("42_1.png"));
        fs::write(&first, b"first").unwrap();

        let second = disambiguate(&base);
        assert_eq!(second, temp.path().join("42_2.png"));

        assert_eq!(fs::read(&base).unwrap(), b"original");
    }

    #[test]
    fn test_disambiguate_fills_gaps() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("7.png"), b"").unwrap();
        fs::write(temp.path().join("7_2.png"), b"").unwrap();

        assert_eq!(disambiguate(&temp.path().join("7.png")), temp.path().join("7_1.png"));
    }

    #[test]
    fn test_disambiguate_by_reservations() {
        let mut taken: HashSet<PathBuf> = HashSet::new();
        let base = PathBuf::from("out/plains/5.png");

        for expected in ["out/plains/5.png", "out/plains/5_1.png", "out/plains/5_2.png"] {
            let next = disambiguate_by(&base, |p| taken.contains(p));
            assert_eq!(next, PathBuf::from(expected));
            taken.insert(next);
        }
    }

    #[test]
    fn test_disambiguate_without_extension() {
        let taken = PathBuf::from("dir/name");
        let next = disambiguate_by(&taken, |p| p == taken.as_path());
        assert_eq!(next, PathBuf::from("dir/name_1"));
    }

    #[test]
    fn test_has_screenshot_extension() {
        assert!(has_screenshot_extension(Path::new("a.png")));
        assert!(has_screenshot_extension(Path::new("a.PnG")));
        assert!(!has_screenshot_extension(Path::new("a.jpg")));
        assert!(!has_screenshot_extension(Path::new("png")));
    }
}
