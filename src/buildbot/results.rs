use std::fmt;

use serde::{Deserialize, Serialize};

/// Title shown for a build or step that has no result yet.
pub const IN_PROGRESS: &str = "in progress";

/// Class number used for in-progress results.
const IN_PROGRESS_CLASS: i64 = 99;

/// Outcome of a build or step, indexed by the server's integer result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildResult {
    Success,
    Warnings,
    Failure,
    Skipped,
    Exception,
    Retry,
    Cancelled,
    Unknown,
}

impl BuildResult {
    /// All results in server code order.
    pub const ALL: [BuildResult; 8] = [
        Self::Success,
        Self::Warnings,
        Self::Failure,
        Self::Skipped,
        Self::Exception,
        Self::Retry,
        Self::Cancelled,
        Self::Unknown,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warnings => "warnings",
            Self::Failure => "failure",
            Self::Skipped => "skipped",
            Self::Exception => "exception",
            Self::Retry => "retry",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human title for a raw result code.
///
/// `None` renders as `"in progress"`, which is distinct from the `unknown`
/// label. Codes outside the vocabulary also render as `"unknown"`.
pub fn result_title(code: Option<i64>) -> &'static str {
    match code {
        None => IN_PROGRESS,
        Some(code) => BuildResult::from_code(code)
            .unwrap_or(BuildResult::Unknown)
            .label(),
    }
}

/// CSS-style class name for a raw result code (`results_2`, `results_99 pulse`).
pub fn result_class(code: Option<i64>, no_pulse: bool) -> String {
    match code {
        Some(code) => format!("results_{code}"),
        None if no_pulse => format!("results_{IN_PROGRESS_CLASS}"),
        None => format!("results_{IN_PROGRESS_CLASS} pulse"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_title_in_progress() {
        assert_eq!(result_title(None), "in progress");
    }

    #[test]
    fn test_result_title_known_codes() {
        assert_eq!(result_title(Some(0)), "success");
        assert_eq!(result_title(Some(2)), "failure");
        assert_eq!(result_title(Some(6)), "cancelled");
        assert_eq!(result_title(Some(7)), "unknown");
    }

    #[test]
    fn test_result_title_out_of_range() {
        assert_eq!(result_title(Some(8)), "unknown");
        assert_eq!(result_title(Some(-1)), "unknown");
    }

    #[test]
    fn test_codes_follow_vocabulary_order() {
        for (idx, result) in BuildResult::ALL.iter().enumerate() {
            assert_eq!(result.code(), idx as i64);
            assert_eq!(BuildResult::from_code(idx as i64), Some(*result));
        }
    }

    #[test]
    fn test_result_class() {
        assert_eq!(result_class(Some(2), false), "results_2");
        assert_eq!(result_class(None, false), "results_99 pulse");
        assert_eq!(result_class(None, true), "results_99");
    }
}
