use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::check_fasta_gff::*;
use crate::provenance::Provenance;

pub const SEQUENCE: &str = "Sequence";
pub const FEATURE: &str = "Feature";
pub const ISSUE_TYPE: &str = "IssueType";
pub const ISSUE_DATA: &str = "IssueData";

/// Column names of the issues report.
pub const HEADER: [&str; 4] = [SEQUENCE, FEATURE, ISSUE_TYPE, ISSUE_DATA];

/// Write issues as a delimited report preceded by provenance comment lines.
///
/// The report is written to a temporary file beside `file` and moved into place
/// once complete, so a failed run never leaves a partial report behind.
pub fn write_issues(
    file: impl AsRef<Path>,
    issues: &[Issue],
    delimiter: u8,
    provenance: &Provenance,
) -> Result<()> {
    let file = file.as_ref();
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| Error::file_io(file, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::file_io(file, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        provenance
            .write_header(&mut writer)
            .map_err(|e| Error::file_io(file, e))?;

        let mut tsv = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(&mut writer);
        tsv.write_record(HEADER).map_err(|e| Error::file_io(file, e))?;
        for issue in issues {
            tsv.write_record([
                issue.sequence.to_string(),
                issue.feature.clone(),
                issue.issue_type.to_string(),
                issue.data.to_string(),
            ])
            .map_err(|e| Error::file_io(file, e))?;
        }
        tsv.flush().map_err(|e| Error::file_io(file, e))?;
        drop(tsv);

        writer.flush().map_err(|e| Error::file_io(file, e))?;
    }

    tmp.persist(file).map_err(|e| Error::file_io(file, e.error))?;
    log::debug!("Wrote {} issues to {}", issues.len(), file.display());
    Ok(())
}

#[derive(Debug, Deserialize)]
struct IssueRow {
    #[serde(rename = "Sequence")]
    sequence: String,
    #[serde(rename = "Feature")]
    feature: String,
    #[serde(rename = "IssueType")]
    issue_type: String,
    #[serde(rename = "IssueData")]
    issue_data: String,
}

impl TryFrom<IssueRow> for Issue {
    type Error = Error;

    fn try_from(row: IssueRow) -> Result<Self> {
        Ok(Issue::new(
            SequenceRef::from(row.sequence.as_str()),
            row.feature,
            row.issue_type.parse()?,
            row.issue_data.parse()?,
        ))
    }
}

/// Read issues back from a report written by [`write_issues`], skipping comment lines.
pub fn read_issues(file: impl AsRef<Path>, delimiter: u8) -> Result<Vec<Issue>> {
    let file = file.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .from_path(file)
        .map_err(|e| Error::file_io(file, e))?;

    rdr.deserialize::<IssueRow>()
        .enumerate()
        .map(|(idx, row)| {
            row.map_err(|e| Error::ParseRecord {
                origin: path_str(file),
                idx,
                source: Box::new(e),
            })
            .and_then(Issue::try_from)
        })
        .collect()
}
