//! Random subsampling of FASTA/FASTQ files.

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::errors::*;
use crate::fastq::open_fastx;
use crate::utils::*;

pub const DEFAULT_PROBABILITY: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct SubsampleConfig {
    /// Probability of keeping each record.
    pub probability: f64,
    /// Replace the output file if it exists.
    pub overwrite: bool,
    /// Seed for reproducible sampling. Drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for SubsampleConfig {
    fn default() -> Self {
        Self {
            probability: DEFAULT_PROBABILITY,
            overwrite: false,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubsampleSummary {
    pub read: usize,
    pub written: usize,
}

/// Keep each record of `input` with the configured probability, writing kept
/// records to `output` in input order.
///
/// FASTQ input gives FASTQ output and FASTA input gives FASTA output. The
/// output is gzip-compressed if its name ends with `.gz`.
pub fn subsample_bioseqfile(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &SubsampleConfig,
) -> Result<SubsampleSummary> {
    let (input, output) = (input.as_ref(), output.as_ref());

    if !(0.0..=1.0).contains(&config.probability) {
        return Err(Error::InvalidProbability(config.probability));
    }
    if output.exists() && !config.overwrite {
        return Err(Error::OutputExists(path_str(output)));
    }

    let mut rng = match config.seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_entropy(),
    };

    let mut summary = SubsampleSummary::default();
    let reader = open_fastx(input)?;
    let mut writer = create_writer(output)?;

    if let Some(mut reader) = reader {
        while let Some(record) = reader.next() {
            let record = record.map_err(|e| Error::ParseRecord {
                origin: path_str(input),
                idx: summary.read,
                source: Box::new(e),
            })?;
            summary.read += 1;

            if rng.gen_bool(config.probability) {
                write_seq_record(&mut writer, record.id(), &record.seq(), record.qual())
                    .map_err(|e| Error::file_io(output, e))?;
                summary.written += 1;
            }
        }
    }

    finish_writer(writer, output)?;
    log::info!(
        "Kept {} of {} records from {} in {}",
        summary.written,
        summary.read,
        input.display(),
        output.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::fastq::{count_sequences, equal_fastq};

    fn write_fastq(path: &Path, n: usize) {
        let text = (0..n)
            .map(|i| format!("@read{i}\nACGTACGT\n+\nIIIIIIII\n"))
            .collect::<String>();
        std::fs::write(path, text).unwrap();
    }

    fn config(probability: f64, seed: u64) -> SubsampleConfig {
        SubsampleConfig {
            probability,
            overwrite: true,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_keep_all_and_none() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.fastq");
        write_fastq(&input, 50);

        let all = dir.path().join("all.fastq");
        let summary = subsample_bioseqfile(&input, &all, &config(1.0, 1)).unwrap();
        assert_eq!(summary, SubsampleSummary { read: 50, written: 50 });
        equal_fastq(&input, &all).unwrap();

        let none = dir.path().join("none.fastq");
        let summary = subsample_bioseqfile(&input, &none, &config(0.0, 1)).unwrap();
        assert_eq!(summary, SubsampleSummary { read: 50, written: 0 });
        assert_eq!(count_sequences(&none).unwrap(), 0);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.fastq");
        write_fastq(&input, 200);

        let out1 = dir.path().join("out1.fastq");
        let out2 = dir.path().join("out2.fastq");
        let s1 = subsample_bioseqfile(&input, &out1, &config(0.5, 42)).unwrap();
        let s2 = subsample_bioseqfile(&input, &out2, &config(0.5, 42)).unwrap();

        assert_eq!(s1, s2);
        assert!(s1.written > 0 && s1.written < 200);
        assert_eq!(count_sequences(&out1).unwrap(), s1.written);
        equal_fastq(&out1, &out2).unwrap();
    }

    #[test]
    fn test_fasta_stays_fasta() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.fasta");
        std::fs::write(&input, ">s1\nGATTACA\n>s2\nCCCGGG\n").unwrap();

        let output = dir.path().join("out.fasta");
        subsample_bioseqfile(&input, &output, &config(1.0, 7)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            ">s1\nGATTACA\n>s2\nCCCGGG\n"
        );
    }

    #[test]
    fn test_output_exists() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.fastq");
        write_fastq(&input, 3);
        let output = dir.path().join("out.fastq");
        std::fs::write(&output, "").unwrap();

        let config = SubsampleConfig {
            overwrite: false,
            ..config(0.5, 1)
        };
        assert!(matches!(
            subsample_bioseqfile(&input, &output, &config),
            Err(Error::OutputExists(_))
        ));
    }

    #[test]
    fn test_invalid_probability() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.fastq");
        write_fastq(&input, 3);

        for p in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                subsample_bioseqfile(&input, dir.path().join("out.fastq"), &config(p, 1)),
                Err(Error::InvalidProbability(_))
            ));
        }
    }
}
