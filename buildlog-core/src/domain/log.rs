//! Log domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One classified line of a build's console output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLine {
    pub id: i64,
    pub build_id: Uuid,
    pub line_no: i32,
    pub level: LogLevel,
    pub message: String,
    pub stack_trace: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A log line that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogLine {
    pub line_no: i32,
    pub level: LogLevel,
    pub message: String,
    pub stack_trace: Option<String>,
}

/// Severity of a log line.
///
/// Variants are listed in classification precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error,
    Warn,
    Debug,
    Info,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
        }
    }

    /// ERROR and WARN lines are the ones surfaced by "important" views
    pub fn is_important(&self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Warn)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid log level: {0}")]
pub struct InvalidLevel(pub String);

impl FromStr for LogLevel {
    type Err = InvalidLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            _ => Err(InvalidLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse_is_lenient_on_case() {
        assert_eq!("error".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert_eq!(" Warn ".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("TRACE".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_serializes_uppercase() {
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"WARN\"");
    }

    #[test]
    fn test_important_levels() {
        assert!(LogLevel::Error.is_important());
        assert!(LogLevel::Warn.is_important());
        assert!(!LogLevel::Debug.is_important());
        assert!(!LogLevel::Info.is_important());
    }
}
