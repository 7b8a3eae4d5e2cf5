//! Workflow record files, listing the files each step of a workflow read and wrote.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::errors::*;
use crate::provenance::Provenance;
use crate::utils::*;

pub const SAMPLE_NAME: &str = "SampleName";
pub const DESCRIPTION: &str = "Description";
pub const PROGRAM: &str = "Program";
pub const FILE: &str = "File";
pub const READ_WRITE: &str = "Read/Write";

/// Column names of a workflow record file.
pub const HEADER: [&str; 5] = [SAMPLE_NAME, DESCRIPTION, PROGRAM, FILE, READ_WRITE];

pub const TOOL_NAME: &str = "workflow_record";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadWrite {
    Read,
    Write,
}

impl fmt::Display for ReadWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadWrite::Read => f.write_str("read"),
            ReadWrite::Write => f.write_str("write"),
        }
    }
}

/// One file touched by one workflow step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub sample_name: Option<String>,
    pub description: String,
    pub program: String,
    pub file: String,
    pub read_write: ReadWrite,
}

impl RecordRow {
    pub fn new(
        sample_name: Option<&str>,
        description: &str,
        program: &str,
        file: &str,
        read_write: ReadWrite,
    ) -> Self {
        Self {
            sample_name: sample_name.map(|s| s.to_owned()),
            description: description.to_owned(),
            program: program.to_owned(),
            file: file.to_owned(),
            read_write,
        }
    }

    fn fields(&self) -> [String; 5] {
        [
            self.sample_name.clone().unwrap_or_default(),
            self.description.clone(),
            self.program.clone(),
            self.file.clone(),
            self.read_write.to_string(),
        ]
    }
}

/// Create a workflow record file holding provenance comments and the header row.
pub fn create_record_file(file: impl AsRef<Path>, delimiter: u8) -> Result<()> {
    let file = file.as_ref();
    let mut writer = create_writer(file)?;
    Provenance::new(TOOL_NAME)
        .write_header(&mut writer)
        .map_err(|e| Error::file_io(file, e))?;

    {
        let mut tsv = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(&mut writer);
        tsv.write_record(HEADER).map_err(|e| Error::file_io(file, e))?;
        tsv.flush().map_err(|e| Error::file_io(file, e))?;
    }

    finish_writer(writer, file)
}

/// Append the files a step read and wrote to a workflow record file.
///
/// Files read are recorded before files written. Nothing is written when both
/// lists are empty.
pub fn record_step<S: AsRef<str>>(
    file: impl AsRef<Path>,
    program: &str,
    description: &str,
    files_read: &[S],
    files_written: &[S],
    sample_name: Option<&str>,
    delimiter: u8,
) -> Result<()> {
    let file = file.as_ref();
    if files_read.is_empty() && files_written.is_empty() {
        return Ok(());
    }

    let rows = files_read
        .iter()
        .map(|f| (f, ReadWrite::Read))
        .chain(files_written.iter().map(|f| (f, ReadWrite::Write)))
        .map(|(f, rw)| RecordRow::new(sample_name, description, program, f.as_ref(), rw));

    let handle = OpenOptions::new()
        .append(true)
        .create(true)
        .open(file)
        .map_err(|e| Error::file_io(file, e))?;
    let mut tsv = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(handle);
    for row in rows {
        tsv.write_record(row.fields())
            .map_err(|e| Error::file_io(file, e))?;
    }
    tsv.flush().map_err(|e| Error::file_io(file, e))?;

    let mut handle = tsv.into_inner().map_err(|e| Error::file_io(file, e.into_error()))?;
    handle.flush().map_err(|e| Error::file_io(file, e))
}
