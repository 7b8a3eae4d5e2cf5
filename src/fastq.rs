//! FASTQ file naming, counting and comparison.

use std::path::Path;

use needletail::parse_fastx_file;

use crate::errors::*;

/// FASTQ file extensions.
pub const FASTQ_EXTENSIONS: [&str; 2] = [".fq", ".fastq"];
pub const FASTQ_EXTENSION: &str = ".fastq";
pub const FQ_EXTENSION: &str = ".fq";
pub const GZ_EXTENSION: &str = ".gz";

/// Does the file name end with `.gz` (in any case)?
pub fn is_fastq_gz(file_name: &str) -> bool {
    crate::utils::is_gz(file_name)
}

/// Remove a trailing `.gz` extension, if any.
pub fn strip_fastq_gz(file_name: &str) -> &str {
    if is_fastq_gz(file_name) {
        &file_name[..file_name.len() - GZ_EXTENSION.len()]
    } else {
        file_name
    }
}

/// Does the file name carry a FASTQ extension, optionally followed by `.gz`?
pub fn is_fastq(file_name: &str) -> bool {
    let stripped = strip_fastq_gz(file_name).to_ascii_lowercase();
    FASTQ_EXTENSIONS.iter().any(|ext| stripped.ends_with(ext))
}

/// File name for a tag, e.g. `tag01` becomes `tag01.fastq` or `tag01.fastq.gz`.
pub fn get_fastq_filename(tag: &str, is_gz: bool) -> String {
    if is_gz {
        format!("{tag}{FASTQ_EXTENSION}{GZ_EXTENSION}")
    } else {
        format!("{tag}{FASTQ_EXTENSION}")
    }
}

pub fn get_fastq_filenames<S: AsRef<str>>(
    tags: impl IntoIterator<Item = S>,
    is_gz: bool,
) -> Vec<String> {
    tags.into_iter()
        .map(|t| get_fastq_filename(t.as_ref(), is_gz))
        .collect()
}

/// Number of records in a FASTQ (or FASTA) file. An empty file holds zero records.
pub fn count_sequences(file: impl AsRef<Path>) -> Result<usize> {
    let file = file.as_ref();
    let Some(mut reader) = open_fastx(file)? else {
        return Ok(0);
    };

    let mut count = 0;
    while let Some(record) = reader.next() {
        record.map_err(|e| Error::ParseRecord {
            origin: path_str(file),
            idx: count,
            source: Box::new(e),
        })?;
        count += 1;
    }

    Ok(count)
}

/// Check that two FASTQ files hold the same records, with the same IDs,
/// sequences and quality scores, in the same order.
pub fn equal_fastq(file1: impl AsRef<Path>, file2: impl AsRef<Path>) -> Result<()> {
    let (file1, file2) = (file1.as_ref(), file2.as_ref());
    let mut reader1 = open_fastx(file1)?;
    let mut reader2 = open_fastx(file2)?;

    let mut idx = 0;
    loop {
        let next1 = reader1.as_mut().and_then(|r| r.next());
        let next2 = reader2.as_mut().and_then(|r| r.next());

        let (record1, record2) = match (next1, next2) {
            (None, None) => return Ok(()),
            (Some(_), None) => {
                return Err(Error::mismatch(
                    file1,
                    file2,
                    format!("second file ends after {idx} records"),
                ))
            }
            (None, Some(_)) => {
                return Err(Error::mismatch(
                    file1,
                    file2,
                    format!("first file ends after {idx} records"),
                ))
            }
            (Some(r1), Some(r2)) => (r1, r2),
        };

        let record1 = record1.map_err(|e| Error::ParseRecord {
            origin: path_str(file1),
            idx,
            source: Box::new(e),
        })?;
        let record2 = record2.map_err(|e| Error::ParseRecord {
            origin: path_str(file2),
            idx,
            source: Box::new(e),
        })?;

        if record1.id() != record2.id() {
            return Err(Error::mismatch(
                file1,
                file2,
                format!(
                    "record {idx} IDs differ: {} versus {}",
                    utf8(record1.id()),
                    utf8(record2.id())
                ),
            ));
        }
        if record1.seq() != record2.seq() {
            return Err(Error::mismatch(
                file1,
                file2,
                format!("record {idx} ({}) sequences differ", utf8(record1.id())),
            ));
        }
        if record1.qual() != record2.qual() {
            return Err(Error::mismatch(
                file1,
                file2,
                format!("record {idx} ({}) quality scores differ", utf8(record1.id())),
            ));
        }

        idx += 1;
    }
}

/// Open a FASTA/FASTQ file, or `None` if the file is empty.
pub(crate) fn open_fastx(
    file: &Path,
) -> Result<Option<Box<dyn needletail::parser::FastxReader>>> {
    use needletail::errors::ParseErrorKind;

    match parse_fastx_file(file) {
        Ok(reader) => Ok(Some(reader)),
        Err(e) if matches!(e.kind, ParseErrorKind::EmptyFile) => Ok(None),
        Err(e) => Err(Error::file_io(file, e)),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_fastq_gz_names() {
        assert!(is_fastq_gz("sample.fastq.gz"));
        assert!(is_fastq_gz("sample.fq.GZ"));
        assert!(!is_fastq_gz("sample.fastq"));
        assert_eq!(strip_fastq_gz("sample.fastq.gz"), "sample.fastq");
        assert_eq!(strip_fastq_gz("sample.fq"), "sample.fq");
        assert!(is_fastq("dir/sample.FQ.gz"));
        assert!(!is_fastq("sample.fasta"));
    }

    #[test]
    fn test_get_fastq_filenames() {
        assert_eq!(get_fastq_filename("tag01", false), "tag01.fastq");
        assert_eq!(get_fastq_filename("tag01", true), "tag01.fastq.gz");
        assert_eq!(
            get_fastq_filenames(["Tag0", "Tag1"], true),
            vec!["Tag0.fastq.gz", "Tag1.fastq.gz"]
        );
    }

    #[test]
    fn test_equal_fastq() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.fastq");
        let b = dir.path().join("b.fastq");
        let c = dir.path().join("c.fastq");
        let d = dir.path().join("d.fastq");
        std::fs::write(&a, "@r1\nACGT\n+\nIIII\n@r2\nGGCC\n+\nIIII\n").unwrap();
        std::fs::write(&b, "@r1\nACGT\n+\nIIII\n@r2\nGGCC\n+\nIIII\n").unwrap();
        std::fs::write(&c, "@r1\nACGT\n+\nIIII\n@r2\nGGCC\n+\nIII#\n").unwrap();
        std::fs::write(&d, "@r1\nACGT\n+\nIIII\n").unwrap();

        equal_fastq(&a, &b).unwrap();
        assert!(matches!(equal_fastq(&a, &c), Err(Error::Mismatch { .. })));
        assert!(matches!(equal_fastq(&a, &d), Err(Error::Mismatch { .. })));
        assert_eq!(count_sequences(&a).unwrap(), 2);
    }

    #[test]
    fn test_count_sequences_empty() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.fastq");
        std::fs::write(&empty, "").unwrap();
        assert_eq!(count_sequences(&empty).unwrap(), 0);
    }
}
