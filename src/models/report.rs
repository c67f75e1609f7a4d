//! Formatted report entries and the assembled report

use std::fmt;

/// Line break used inside and between report entries
pub const LINE_BREAK: &str = "\r\n";

const PREAMBLE: &str = "Optimal conditions upcoming on the following dates:";
const POSTAMBLE: &str = "Have fun!";

/// Text block describing one qualifying reading
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormattedEntry(String);

impl FormattedEntry {
    #[must_use]
    pub fn new(text: String) -> Self {
        Self(text)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormattedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, deduplicated entries of one run. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    entries: Vec<FormattedEntry>,
}

impl Report {
    /// Build a report; `None` when there is nothing to report
    #[must_use]
    pub fn from_entries(entries: Vec<FormattedEntry>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[FormattedEntry] {
        &self.entries
    }

    /// Full message body handed to the notifier
    #[must_use]
    pub fn body(&self) -> String {
        let separator = LINE_BREAK.repeat(2);
        let entries: Vec<&str> = self.entries.iter().map(FormattedEntry::as_str).collect();
        format!(
            "{PREAMBLE}{separator}{}{separator}{POSTAMBLE}",
            entries.join(&separator)
        )
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body())
    }
}
