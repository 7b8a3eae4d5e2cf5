//! Demultiplexing of barcoded reads into per-sample FASTQ files.
//!
//! Reads are expected to carry their barcode in the read ID, as the second
//! delimiter-separated chunk (`READ_BARCODE_UMI`, the layout `umi_tools extract`
//! produces). Each read goes to the first sample whose barcode lies within the
//! allowed number of mismatches, or to `Unassigned`.

use std::path::{Path, PathBuf};

use memchr::memchr_iter;
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::errors::*;
use crate::fastq::{is_fastq_gz, open_fastx, FQ_EXTENSION, GZ_EXTENSION};
use crate::provenance::Provenance;
use crate::utils::*;

pub const SAMPLE_ID: &str = "SampleID";
pub const TAG_READ: &str = "TagRead";
pub const NUM_READS: &str = "NumReads";
pub const UNASSIGNED_TAG: &str = "Unassigned";
pub const TOTAL: &str = "Total";
pub const NUM_READS_FILE: &str = "num_reads.tsv";

pub const TOOL_NAME: &str = "demultiplex_fastq";

#[derive(Debug, Deserialize)]
struct SampleRow {
    #[serde(rename = "SampleID")]
    sample_id: String,
    #[serde(rename = "TagRead")]
    tag_read: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub id: String,
    pub barcode: Vec<u8>,
}

/// Read the samples of a sample sheet.
///
/// The sheet needs `SampleID` and `TagRead` columns. Other columns are ignored
/// and lines starting with `#` are comments.
pub fn read_sample_sheet(file: impl AsRef<Path>, delimiter: u8) -> Result<Vec<Sample>> {
    let file = file.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(file)
        .map_err(|e| Error::file_io(file, e))?;

    let samples = rdr
        .deserialize::<SampleRow>()
        .enumerate()
        .map(|(idx, row)| {
            row.map(|row| Sample {
                id: row.sample_id,
                barcode: row.tag_read.into_bytes(),
            })
            .map_err(|e| Error::ParseRecord {
                origin: path_str(file),
                idx,
                source: Box::new(e),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut seen = FxHashSet::default();
    if let Some(dup) = samples.iter().find(|s| !seen.insert(s.id.as_str())) {
        return Err(Error::Parse {
            string: dup.id.clone(),
            context: path_str(file),
            reason: "duplicate sample ID",
        });
    }

    Ok(samples)
}

/// Number of differing positions, counting each base one sequence has beyond
/// the other as a difference.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> usize {
    let differing = a.iter().zip(b).filter(|(x, y)| x != y).count();
    differing + a.len().abs_diff(b.len())
}

/// The barcode in a read ID: the second `delimiter`-separated chunk of the ID
/// (the header up to the first whitespace).
pub fn barcode_from_read_id(id: &[u8], delimiter: u8) -> Option<&[u8]> {
    let end = id
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .unwrap_or(id.len());
    let id = &id[..end];

    let mut bounds = memchr_iter(delimiter, id);
    let start = bounds.next()? + 1;
    let stop = bounds.next().unwrap_or(id.len());
    Some(&id[start..stop])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemultiplexConfig {
    /// Mismatches allowed between a read's barcode and a sample's barcode.
    pub mismatches: usize,
    /// Separator of the chunks of a read ID.
    pub delimiter: u8,
    /// Column delimiter of the sample sheet and the read counts file.
    pub sheet_delimiter: u8,
}

impl Default for DemultiplexConfig {
    fn default() -> Self {
        Self {
            mismatches: 1,
            delimiter: b'_',
            sheet_delimiter: b'\t',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCount {
    pub sample_id: String,
    pub tag_read: String,
    pub num_reads: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DemultiplexSummary {
    pub samples: Vec<SampleCount>,
    pub unassigned: usize,
    pub total: usize,
}

/// Output files of one sample, one per mate.
struct SampleOutput {
    files: Vec<PathBuf>,
    writers: Vec<BoxedWriter>,
    num_reads: usize,
}

impl SampleOutput {
    fn create(out_dir: &Path, tag: &str, paired: bool, is_gz: bool) -> Result<Self> {
        let ext = if is_gz {
            format!("{FQ_EXTENSION}{GZ_EXTENSION}")
        } else {
            FQ_EXTENSION.to_owned()
        };
        let files = if paired {
            vec![
                out_dir.join(format!("{tag}_R1{ext}")),
                out_dir.join(format!("{tag}_R2{ext}")),
            ]
        } else {
            vec![out_dir.join(format!("{tag}{ext}"))]
        };
        let writers = files.iter().map(|f| create_writer(f)).collect::<Result<Vec<_>>>()?;

        Ok(Self {
            files,
            writers,
            num_reads: 0,
        })
    }

    fn write(&mut self, mate: usize, id: &[u8], seq: &[u8], qual: Option<&[u8]>) -> Result<()> {
        write_seq_record(&mut self.writers[mate], id, seq, qual)
            .map_err(|e| Error::file_io(&self.files[mate], e))
    }

    fn finish(self) -> Result<usize> {
        for (writer, file) in self.writers.into_iter().zip(&self.files) {
            finish_writer(writer, file)?;
        }
        Ok(self.num_reads)
    }
}

/// Split reads into one FASTQ file per sample in `out_dir`, and write the read
/// counts to `num_reads.tsv` there.
///
/// With a mate file, mates are read in lockstep and written to `_R1`/`_R2`
/// files. Outputs are gzip-compressed if `read1` is.
pub fn demultiplex_fastq(
    sample_sheet: impl AsRef<Path>,
    read1: impl AsRef<Path>,
    read2: Option<&Path>,
    out_dir: impl AsRef<Path>,
    config: &DemultiplexConfig,
) -> Result<DemultiplexSummary> {
    let (read1, out_dir) = (read1.as_ref(), out_dir.as_ref());
    let samples = read_sample_sheet(sample_sheet, config.sheet_delimiter)?;
    let paired = read2.is_some();
    let is_gz = is_fastq_gz(&path_str(read1));

    let mut outputs = samples
        .iter()
        .map(|s| SampleOutput::create(out_dir, &s.id, paired, is_gz))
        .collect::<Result<Vec<_>>>()?;
    let mut unassigned = SampleOutput::create(out_dir, UNASSIGNED_TAG, paired, is_gz)?;

    let mut reader1 = open_fastx(read1)?;
    let mut reader2 = match read2 {
        Some(file) => open_fastx(file)?,
        None => None,
    };
    let unpaired = || Error::UnpairedRead(read2.map(|f| path_str(f)).unwrap_or_default());

    let mut total = 0;
    loop {
        let Some(record1) = reader1.as_mut().and_then(|r| r.next()) else {
            if paired && reader2.as_mut().and_then(|r| r.next()).is_some() {
                return Err(unpaired());
            }
            break;
        };
        let record1 = record1.map_err(|e| Error::ParseRecord {
            origin: path_str(read1),
            idx: total,
            source: Box::new(e),
        })?;

        let sample = barcode_from_read_id(record1.id(), config.delimiter).and_then(|barcode| {
            samples
                .iter()
                .position(|s| hamming_distance(barcode, &s.barcode) <= config.mismatches)
        });
        let output = match sample {
            Some(i) => &mut outputs[i],
            None => &mut unassigned,
        };
        output.write(0, record1.id(), &record1.seq(), record1.qual())?;

        if let Some(file) = read2 {
            let record2 = reader2
                .as_mut()
                .and_then(|r| r.next())
                .ok_or_else(unpaired)?
                .map_err(|e| Error::ParseRecord {
                    origin: path_str(file),
                    idx: total,
                    source: Box::new(e),
                })?;
            output.write(1, record2.id(), &record2.seq(), record2.qual())?;
        }

        output.num_reads += 1;
        total += 1;
    }

    let mut summary = DemultiplexSummary {
        unassigned: unassigned.finish()?,
        total,
        ..Default::default()
    };
    for (sample, output) in samples.into_iter().zip(outputs) {
        summary.samples.push(SampleCount {
            sample_id: sample.id,
            tag_read: utf8(&sample.barcode),
            num_reads: output.finish()?,
        });
    }

    write_num_reads(out_dir.join(NUM_READS_FILE), &summary, config.sheet_delimiter)?;
    log::info!(
        "Assigned {} of {} reads to {} samples",
        total - summary.unassigned,
        total,
        summary.samples.len()
    );
    Ok(summary)
}

fn write_num_reads(file: PathBuf, summary: &DemultiplexSummary, delimiter: u8) -> Result<()> {
    let mut writer = create_writer(&file)?;
    Provenance::new(TOOL_NAME)
        .write_header(&mut writer)
        .map_err(|e| Error::file_io(&file, e))?;

    {
        let mut tsv = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(&mut writer);
        let mut rows = vec![[SAMPLE_ID.to_owned(), TAG_READ.to_owned(), NUM_READS.to_owned()]];
        rows.extend(summary.samples.iter().map(|s| {
            [s.sample_id.clone(), s.tag_read.clone(), s.num_reads.to_string()]
        }));
        rows.push([UNASSIGNED_TAG.to_owned(), String::new(), summary.unassigned.to_string()]);
        rows.push([TOTAL.to_owned(), String::new(), summary.total.to_string()]);

        for row in rows {
            tsv.write_record(&row).map_err(|e| Error::file_io(&file, e))?;
        }
        tsv.flush().map_err(|e| Error::file_io(&file, e))?;
    }

    finish_writer(writer, &file)
}
