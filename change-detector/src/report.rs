use std::fmt::{self, Display};

use chrono::{DateTime, Local};
use revision_store::Fingerprint;

/// The format used for the last updated time in old revision reports.
pub const TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

const ABSENT: &str = "None";

/// A human readable rendering of one side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The stored revision, along with the time the store was last updated.
    Old {
        last_updated: Option<DateTime<Local>>,
        fingerprint: Option<Fingerprint>,
        text: Option<String>,
    },

    /// The revision as currently observed.
    New {
        fingerprint: Option<Fingerprint>,
        text: Option<String>,
    },
}

/// The two reports produced when an artifact has been modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub old: Report,
    pub new: Report,
}

impl Report {
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        match self {
            Report::Old { fingerprint, .. } | Report::New { fingerprint, .. } => *fingerprint,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Report::Old { text, .. } | Report::New { text, .. } => text.as_deref(),
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Report::Old { last_updated, .. } => {
                match last_updated {
                    Some(time) => writeln!(f, "Last revision: {}", time.format(TIME_FORMAT))?,
                    None => writeln!(f, "Last revision: {}", ABSENT)?,
                }
                "Old"
            }
            Report::New { .. } => "New",
        };

        match self.fingerprint() {
            Some(fingerprint) => writeln!(f, "{} fingerprint: {}", label, fingerprint)?,
            None => writeln!(f, "{} fingerprint: {}", label, ABSENT)?,
        }

        // Only present text is framed, so a text that reads "None" can't be
        // mistaken for a missing revision.
        match self.text() {
            Some(text) => {
                let separator = "- ".repeat(30);
                writeln!(f, "{} text:", label)?;
                writeln!(f, "{}", separator)?;
                writeln!(f, "{}", text)?;
                write!(f, "{}", separator)
            }
            None => write!(f, "{} text: {}", label, ABSENT),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_old_report() {
        let time = Local.with_ymd_and_hms(2013, 5, 17, 9, 3, 1).unwrap();
        let report = Report::Old {
            last_updated: Some(time),
            fingerprint: Some(Fingerprint::from(1234)),
            text: Some(String::from("def f():\n    return 1")),
        };

        let separator = "- ".repeat(30);
        assert_eq!(
            report.to_string(),
            format!(
                "Last revision: 17.05.2013 09:03:01\nOld fingerprint: 1234\nOld text:\n{}\ndef f():\n    return 1\n{}",
                separator, separator
            )
        );
    }

    #[test]
    fn test_absent_markers() {
        let report = Report::Old {
            last_updated: None,
            fingerprint: None,
            text: None,
        };
        assert_eq!(
            report.to_string(),
            "Last revision: None\nOld fingerprint: None\nOld text: None"
        );

        let report = Report::New {
            fingerprint: None,
            text: None,
        };
        assert_eq!(report.to_string(), "New fingerprint: None\nNew text: None");
    }

    #[test]
    fn test_none_text_is_not_absent() {
        let absent = Report::New {
            fingerprint: Some(Fingerprint::from(1)),
            text: None,
        };
        let literal = Report::New {
            fingerprint: Some(Fingerprint::from(1)),
            text: Some(String::from("None")),
        };

        let separator = "- ".repeat(30);
        assert_ne!(absent.to_string(), literal.to_string());
        assert_eq!(
            literal.to_string(),
            format!("New fingerprint: 1\nNew text:\n{}\nNone\n{}", separator, separator)
        );
    }

    #[test]
    fn test_empty_text_is_not_absent() {
        let report = Report::New {
            fingerprint: Some(Fingerprint::from(0)),
            text: Some(String::new()),
        };

        let separator = "- ".repeat(30);
        assert_eq!(
            report.to_string(),
            format!("New fingerprint: 0\nNew text:\n{}\n\n{}", separator, separator)
        );
    }
}
