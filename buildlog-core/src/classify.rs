//! Console classification
//!
//! Pure functions that turn raw console text into structured data:
//! - [`classify`] maps one line to a [`LogLevel`]
//! - [`infer_status`] derives a terminal [`BuildStatus`] from the whole text
//! - [`classify_console`] splits, filters and classifies every line
//!
//! Matching is case-sensitive substring containment and the first matching
//! rule wins, so a line carrying both an error and a warning marker is an
//! error.

use crate::domain::build::{BuildStatus, InvalidStatus};
use crate::domain::log::{LogLevel, NewLogLine};

const ERROR_MARKERS: [&str; 5] = ["[ERROR]", "ERROR", "FAILURE", "Failed", "Exception"];
const WARN_MARKERS: [&str; 2] = ["[WARN]", "WARNING"];
const DEBUG_MARKER: &str = "[DEBUG]";

/// Status markers in precedence order
const STATUS_MARKERS: [(&str, BuildStatus); 3] = [
    ("Finished: SUCCESS", BuildStatus::Success),
    ("Finished: FAILURE", BuildStatus::Failure),
    ("Finished: UNSTABLE", BuildStatus::Unstable),
];

/// Classify a single non-blank console line
pub fn classify(line: &str) -> LogLevel {
    if ERROR_MARKERS.iter().any(|m| line.contains(m)) {
        LogLevel::Error
    } else if WARN_MARKERS.iter().any(|m| line.contains(m)) {
        LogLevel::Warn
    } else if line.contains(DEBUG_MARKER) {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

/// Infer the terminal status of a build from its console text.
///
/// Falls back to [`BuildStatus::Unknown`] when no marker is present.
pub fn infer_status(console: &str) -> BuildStatus {
    STATUS_MARKERS
        .iter()
        .find(|(marker, _)| console.contains(marker))
        .map(|(_, status)| *status)
        .unwrap_or(BuildStatus::Unknown)
}

/// Parse an explicit status supplied by a trigger.
///
/// Missing, empty, and the literal string `"null"` (what webhook templates
/// emit for an unset variable) all count as absent.
pub fn explicit_status(raw: Option<&str>) -> Result<Option<BuildStatus>, InvalidStatus> {
    match raw.map(str::trim) {
        None | Some("") | Some("null") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

/// Resolve the status to persist: the explicit one if present, otherwise
/// inferred from the console text.
pub fn resolve_status(explicit: Option<BuildStatus>, console: &str) -> BuildStatus {
    explicit.unwrap_or_else(|| infer_status(console))
}

/// Split console text into classified lines.
///
/// Lines that are empty after trimming are dropped. `line_no` is the 1-based
/// position in the original text, so gaps mark the dropped lines.
pub fn classify_console(console: &str) -> Vec<NewLogLine> {
    console
        .split('\n')
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                return None;
            }
            Some(NewLogLine {
                line_no: idx as i32 + 1,
                level: classify(line),
                message: line.to_string(),
                stack_trace: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error_markers() {
        for line in [
            "[ERROR] compile failed",
            "ERROR: something",
            "BUILD FAILURE",
            "Failed to execute goal",
            "java.lang.NullPointerException",
        ] {
            assert_eq!(classify(line), LogLevel::Error, "line: {line}");
        }
    }

    #[test]
    fn test_classify_warn_and_debug() {
        assert_eq!(classify("[WARN] deprecated api"), LogLevel::Warn);
        assert_eq!(classify("WARNING: unchecked cast"), LogLevel::Warn);
        assert_eq!(classify("[DEBUG] resolving deps"), LogLevel::Debug);
        assert_eq!(classify("Building..."), LogLevel::Info);
    }

    #[test]
    fn test_classify_error_beats_warn() {
        assert_eq!(classify("[WARN] retrying after ERROR"), LogLevel::Error);
        assert_eq!(classify("WARNING: Exception ignored"), LogLevel::Error);
    }

    #[test]
    fn test_classify_warn_beats_debug() {
        assert_eq!(classify("[DEBUG] WARNING raised"), LogLevel::Warn);
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(classify("error in lowercase"), LogLevel::Info);
        assert_eq!(classify("[warn] lowercase"), LogLevel::Info);
        assert_eq!(classify("failed lowercase"), LogLevel::Info);
    }

    #[test]
    fn test_classify_same_marker_same_level() {
        assert_eq!(classify("a [ERROR] b"), classify("[ERROR] something else"));
        assert_eq!(classify("x WARNING"), classify("WARNING y"));
    }

    #[test]
    fn test_infer_status_markers() {
        assert_eq!(infer_status("...\nFinished: SUCCESS\n"), BuildStatus::Success);
        assert_eq!(infer_status("...\nFinished: FAILURE\n"), BuildStatus::Failure);
        assert_eq!(infer_status("Finished: UNSTABLE"), BuildStatus::Unstable);
        assert_eq!(infer_status("no marker here"), BuildStatus::Unknown);
        assert_eq!(infer_status(""), BuildStatus::Unknown);
    }

    #[test]
    fn test_infer_status_precedence() {
        let both = "Finished: FAILURE\nFinished: SUCCESS\n";
        assert_eq!(infer_status(both), BuildStatus::Success);

        let failure_and_unstable = "Finished: UNSTABLE\nFinished: FAILURE";
        assert_eq!(infer_status(failure_and_unstable), BuildStatus::Failure);
    }

    #[test]
    fn test_explicit_status_absent_values() {
        assert_eq!(explicit_status(None), Ok(None));
        assert_eq!(explicit_status(Some("")), Ok(None));
        assert_eq!(explicit_status(Some("null")), Ok(None));
        assert_eq!(
            explicit_status(Some("UNSTABLE")),
            Ok(Some(BuildStatus::Unstable))
        );
        assert!(explicit_status(Some("BROKEN")).is_err());
    }

    #[test]
    fn test_resolve_status_prefers_explicit() {
        let console = "Finished: FAILURE";
        assert_eq!(
            resolve_status(Some(BuildStatus::Success), console),
            BuildStatus::Success
        );
        assert_eq!(resolve_status(None, console), BuildStatus::Failure);
    }

    #[test]
    fn test_classify_console_scenario() {
        let lines = classify_console("Building...\n[ERROR] compile failed\nFinished: FAILURE\n");

        let summary: Vec<(&str, LogLevel)> = lines
            .iter()
            .map(|l| (l.message.as_str(), l.level))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Building...", LogLevel::Info),
                ("[ERROR] compile failed", LogLevel::Error),
                ("Finished: FAILURE", LogLevel::Error),
            ]
        );
    }

    #[test]
    fn test_classify_console_skips_blank_lines() {
        let lines = classify_console("first\n\n   \n\t\nsecond\r\n");

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].message, "first");
        assert_eq!(lines[0].line_no, 1);
        assert_eq!(lines[1].message, "second");
        assert_eq!(lines[1].line_no, 5);
    }

    #[test]
    fn test_classify_console_empty_text() {
        assert!(classify_console("").is_empty());
        assert!(classify_console("\n\n").is_empty());
    }
}
