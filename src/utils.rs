use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::{write::GzEncoder, Compression};

use crate::errors::*;

pub type BoxedWriter = BufWriter<Box<dyn Write>>;

/// Create a buffered writer for a file, creating parent directories as needed.
///
/// Output is gzip-compressed if the file name ends with `.gz`.
pub fn create_writer(file: impl AsRef<Path>) -> Result<BoxedWriter> {
    let file_path = file.as_ref();

    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::file_io(file_path, e))?;
    }

    let handle = File::create(file_path).map_err(|e| Error::file_io(file_path, e))?;
    let inner: Box<dyn Write> = if is_gz(file_path) {
        Box::new(GzEncoder::new(handle, Compression::default()))
    } else {
        Box::new(handle)
    };

    Ok(BufWriter::new(inner))
}

pub fn is_gz(file: impl AsRef<Path>) -> bool {
    file.as_ref()
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Write one sequence record, as FASTQ when quality scores are present and FASTA otherwise.
pub fn write_seq_record(
    writer: &mut impl Write,
    id: &[u8],
    seq: &[u8],
    qual: Option<&[u8]>,
) -> std::io::Result<()> {
    match qual {
        Some(qual) => {
            writer.write_all(b"@")?;
            writer.write_all(id)?;
            writer.write_all(b"\n")?;
            writer.write_all(seq)?;
            writer.write_all(b"\n+\n")?;
            writer.write_all(qual)?;
            writer.write_all(b"\n")
        }
        None => {
            writer.write_all(b">")?;
            writer.write_all(id)?;
            writer.write_all(b"\n")?;
            writer.write_all(seq)?;
            writer.write_all(b"\n")
        }
    }
}

/// Finish writing, surfacing errors that dropping the writer would swallow.
pub fn finish_writer(writer: BoxedWriter, file: impl AsRef<Path>) -> Result<()> {
    let mut inner = writer
        .into_inner()
        .map_err(|e| Error::file_io(file.as_ref(), e.into_error()))?;
    inner.flush().map_err(|e| Error::file_io(file.as_ref(), e))
}

/// Set up logging for a command-line tool: info level, or debug when verbose.
/// `RUST_LOG` filters still apply on top.
pub fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

/// A delimiter given as a character, as a single byte.
pub fn delimiter_byte(delimiter: char, context: &str) -> Result<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(|b| b.is_ascii())
        .ok_or_else(|| Error::Parse {
            string: delimiter.to_string(),
            context: context.to_owned(),
            reason: "delimiter must be a single ASCII character",
        })
}

fn read_tsv_rows(file: &Path, delimiter: u8) -> Result<Vec<csv::StringRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .has_headers(false)
        .flexible(true)
        .from_path(file)
        .map_err(|e| Error::file_io(file, e))?;

    rdr.records()
        .enumerate()
        .map(|(idx, r)| {
            r.map_err(|e| Error::ParseRecord {
                origin: path_str(file),
                idx,
                source: Box::new(e),
            })
        })
        .collect()
}

/// Check that two delimited files hold the same rows, ignoring comment lines.
pub fn equal_tsv(file1: impl AsRef<Path>, file2: impl AsRef<Path>, delimiter: u8) -> Result<()> {
    let (file1, file2) = (file1.as_ref(), file2.as_ref());
    let rows1 = read_tsv_rows(file1, delimiter)?;
    let rows2 = read_tsv_rows(file2, delimiter)?;

    if rows1.len() != rows2.len() {
        return Err(Error::mismatch(
            file1,
            file2,
            format!("{} rows versus {} rows", rows1.len(), rows2.len()),
        ));
    }

    for (idx, (r1, r2)) in rows1.iter().zip(&rows2).enumerate() {
        if r1 != r2 {
            return Err(Error::mismatch(
                file1,
                file2,
                format!("row {idx} differs: {:?} versus {:?}", r1, r2),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_create_writer_gz() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out.fastq.gz");

        let mut writer = create_writer(&path).unwrap();
        write_seq_record(&mut writer, b"read1", b"ACGT", Some(b"IIII")).unwrap();
        finish_writer(writer, &path).unwrap();

        let mut text = String::new();
        GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "@read1\nACGT\n+\nIIII\n");
    }

    #[test]
    fn test_write_fasta_record() {
        let mut buf = Vec::new();
        write_seq_record(&mut buf, b"seq1", b"GATTACA", None).unwrap();
        assert_eq!(buf, b">seq1\nGATTACA\n");
    }

    #[test]
    fn test_delimiter_byte() {
        assert_eq!(delimiter_byte('\t', "test").unwrap(), b'\t');
        assert_eq!(delimiter_byte(',', "test").unwrap(), b',');
        assert!(matches!(delimiter_byte('é', "test"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_equal_tsv() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.tsv");
        let b = dir.path().join("b.tsv");
        let c = dir.path().join("c.tsv");
        std::fs::write(&a, "# tool A\nx\ty\n1\t2\n").unwrap();
        std::fs::write(&b, "# tool B\nx\ty\n1\t2\n").unwrap();
        std::fs::write(&c, "x\ty\n1\t3\n").unwrap();

        equal_tsv(&a, &b, b'\t').unwrap();
        assert!(matches!(equal_tsv(&a, &c, b'\t'), Err(Error::Mismatch { .. })));
    }
}
