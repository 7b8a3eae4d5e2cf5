//! Provenance headers for files written by the workflow tools.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix of every provenance line, so tabular readers can skip them as comments.
pub const COMMENT: &str = "#";

const CREATED_BY: &str = "riboviz";

/// Who wrote a file, with which version, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    tool: String,
    version: String,
    timestamp: u64,
}

impl Provenance {
    /// Provenance for the given tool at the current time.
    pub fn new(tool: impl Into<String>) -> Self {
        // a clock before the epoch is reported as the epoch
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            tool: tool.into(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            timestamp,
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("{COMMENT} Created by: {CREATED_BY}"),
            format!("{COMMENT} Date: {} (seconds since Unix epoch)", self.timestamp),
            format!("{COMMENT} Command-line tool: {}", self.tool),
            format!("{COMMENT} Version: {}", self.version),
        ]
    }

    pub fn write_header(&self, writer: &mut impl Write) -> std::io::Result<()> {
        for line in self.lines() {
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lines_are_comments() {
        let provenance = Provenance::new("check_fasta_gff");
        let mut buf = Vec::new();
        provenance.write_header(&mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.starts_with(COMMENT)));
        assert_eq!(lines[0], "# Created by: riboviz");
        assert_eq!(lines[2], "# Command-line tool: check_fasta_gff");
        assert_eq!(lines[3], format!("# Version: {}", env!("CARGO_PKG_VERSION")));
    }
}
