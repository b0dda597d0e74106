//! Engine diagnostics on stderr
//!
//! compose-go logs through logrus, which produces lines such as
//!
//! ```text
//! time="2025-01-01T01:00:00-07:00" level=warning msg="the attribute `version` is obsolete"
//! ```
//!
//! while the Docker CLI renders the same entries as `WARN[0000] message`.

use regex::Regex;
use std::sync::OnceLock;

/// Log level in logrus rank order (`Panic` is the most severe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Panic,
    Fatal,
    Error,
    Warning,
    Info,
    Debug,
    Trace,
}

impl Level {
    /// Parse a logrus level name or its four-letter CLI abbreviation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "panic" | "pani" => Some(Level::Panic),
            "fatal" | "fata" => Some(Level::Fatal),
            "error" | "erro" => Some(Level::Error),
            "warning" | "warn" => Some(Level::Warning),
            "info" => Some(Level::Info),
            "debug" | "debu" => Some(Level::Debug),
            "trace" | "trac" => Some(Level::Trace),
            _ => None,
        }
    }

    /// Whether an entry at this level means the load failed
    pub fn is_failure(self) -> bool {
        self <= Level::Error
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Panic => write!(f, "panic"),
            Level::Fatal => write!(f, "fatal"),
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Info => write!(f, "info"),
            Level::Debug => write!(f, "debug"),
            Level::Trace => write!(f, "trace"),
        }
    }
}

/// A single stderr line from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Level, `None` when the line is not a recognised log entry
    pub level: Option<Level>,
    /// Message text
    pub message: String,
}

impl Diagnostic {
    /// Parse one stderr line
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if let Some(caps) = logrus_pattern().captures(line) {
            let level = Level::parse(&caps["level"]);
            let message = caps
                .name("msg")
                .map(|m| unescape(m.as_str()))
                .or_else(|| caps.name("bare").map(|m| m.as_str().to_string()))
                .unwrap_or_default();
            return Self { level, message };
        }

        if let Some(caps) = cli_pattern().captures(line) {
            return Self {
                level: Level::parse(&caps["level"]),
                message: caps["msg"].trim().to_string(),
            };
        }

        Self {
            level: None,
            message: line.to_string(),
        }
    }

    /// Parse a whole stderr buffer, skipping blank lines
    pub fn parse_all(stderr: &str) -> Vec<Self> {
        stderr
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    pub fn is_failure(&self) -> bool {
        self.level.is_some_and(Level::is_failure)
    }
}

fn logrus_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^time="[^"]*"\s+level=(?P<level>[a-z]+)\s+msg=(?:"(?P<msg>(?:[^"\\]|\\.)*)"|(?P<bare>\S+))"#)
            .expect("logrus pattern is valid")
    })
}

fn cli_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<level>PANI|FATA|ERRO|WARN|INFO|DEBU|TRAC)\[\d+\]\s*(?P<msg>.*)$")
            .expect("cli log pattern is valid")
    })
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logrus_warning() {
        let d = Diagnostic::parse(
            r#"time="2025-01-01T01:00:00-07:00" level=warning msg="the attribute `version` is obsolete, it will be ignored""#,
        );
        assert_eq!(d.level, Some(Level::Warning));
        assert_eq!(d.message, "the attribute `version` is obsolete, it will be ignored");
        assert!(!d.is_failure());
    }

    #[test]
    fn test_parse_logrus_escaped_quotes() {
        let d = Diagnostic::parse(
            r#"time="2025-01-01T01:00:00Z" level=error msg="service \"web\" has neither an image nor a build context""#,
        );
        assert_eq!(d.level, Some(Level::Error));
        assert_eq!(d.message, r#"service "web" has neither an image nor a build context"#);
        assert!(d.is_failure());
    }

    #[test]
    fn test_parse_cli_format() {
        let d = Diagnostic::parse("WARN[0000] /tmp/compose.yml: `version` is obsolete");
        assert_eq!(d.level, Some(Level::Warning));
        assert_eq!(d.message, "/tmp/compose.yml: `version` is obsolete");
    }

    #[test]
    fn test_parse_plain_line() {
        let d = Diagnostic::parse("service \"web\" refers to undefined network front");
        assert_eq!(d.level, None);
        assert!(!d.is_failure());
    }

    #[test]
    fn test_parse_all_skips_blank_lines() {
        let all = Diagnostic::parse_all("\nWARN[0000] one\n\n  \nERRO[0000] two\n");
        assert_eq!(all.len(), 2);
        assert!(all[1].is_failure());
    }

    #[test]
    fn test_level_order() {
        assert!(Level::Panic < Level::Fatal);
        assert!(Level::Error < Level::Warning);
        assert_eq!(Level::parse("WARN").map(|l| l.to_string()).as_deref(), Some("warning"));
        assert!(Level::Fatal.is_failure());
        assert!(!Level::Info.is_failure());
    }
}
