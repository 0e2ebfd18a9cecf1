//! Reference time from `options.txt`

use std::path::Path;

use super::{ImportError, ImportResult};

/// Parse the first line of an options file as Unix seconds
pub fn parse_reference_time(text: &str) -> Option<i64> {
    text.lines().next()?.trim().parse().ok()
}

/// Read the reference time from an options file
pub fn read_reference_time(path: &Path) -> ImportResult<i64> {
    let content = std::fs::read_to_string(path)?;

    parse_reference_time(&content).ok_or_else(|| ImportError::Options {
        path: path.to_path_buf(),
        reason: "first line is not a Unix timestamp".to_string(),
    })
}

/// Pick the reference time used by age filters
///
/// A configured value wins, then the options file, then the wall clock.
pub fn resolve_reference_time(configured: Option<i64>, options_path: &Path) -> i64 {
    if let Some(time) = configured {
        tracing::info!(reference_time = time, "Using configured reference time");
        return time;
    }

    match read_reference_time(options_path) {
        Ok(time) => {
            tracing::info!(reference_time = time, "Read reference time from {:?}", options_path);
            time
        }
        Err(e) => {
            let now = chrono::Utc::now().timestamp();
            tracing::warn!("No reference time ({}); using current time {}", e, now);
            now
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_reference_time() {
        assert_eq!(parse_reference_time("1503695452\n1\n"), Some(1_503_695_452));
        assert_eq!(parse_reference_time("  42  "), Some(42));
        assert_eq!(parse_reference_time(""), None);
        assert_eq!(parse_reference_time("soon"), None);
    }

    #[test]
    fn test_read_reference_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.txt");

        std::fs::write(&path, "1503695452\n0\n").unwrap();
        assert_eq!(read_reference_time(&path).unwrap(), 1_503_695_452);

        std::fs::write(&path, "not a number\n").unwrap();
        assert!(matches!(
            read_reference_time(&path),
            Err(ImportError::Options { .. })
        ));

        let missing = dir.path().join("absent.txt");
        assert!(matches!(read_reference_time(&missing), Err(ImportError::Io(_))));
    }

    #[test]
    fn test_resolve_reference_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.txt");
        std::fs::write(&path, "1503695452\n").unwrap();

        assert_eq!(resolve_reference_time(Some(7), &path), 7);
        assert_eq!(resolve_reference_time(None, &path), 1_503_695_452);

        let before = chrono::Utc::now().timestamp();
        let fallback = resolve_reference_time(None, &dir.path().join("absent.txt"));
        assert!(fallback >= before);
    }
}
