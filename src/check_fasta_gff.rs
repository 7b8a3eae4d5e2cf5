//! Consistency checks between a FASTA file of transcript sequences and a GFF
//! file annotating the CDSs on them.
//!
//! Checking happens in three stages: the annotation is indexed by sequence and
//! feature ID ([`FeatureIndex`]), an [`IssueDetector`] applies the rules to the
//! index and the sequences, and the issues found are written as a delimited
//! report ([`write_issues`]).

use std::path::Path;

use crate::errors::*;
use crate::provenance::Provenance;

mod annotation;
pub use annotation::*;
mod config;
pub use config::*;
mod detect;
pub use detect::*;
mod index;
pub use index::*;
mod issues;
pub use issues::*;
mod report;
pub use report::*;
mod sequences;
pub use sequences::*;

pub const TOOL_NAME: &str = "check_fasta_gff";

/// Check a FASTA/GFF pair and write the issues found to `output`.
pub fn check_fasta_gff(
    fasta: impl AsRef<Path>,
    gff: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &CheckConfig,
) -> Result<Vec<Issue>> {
    let delimiter = config.delimiter_byte()?;
    let sequences = SequenceSet::from_fasta_file(fasta)?;
    let annotation = Annotation::from_gff_file(gff)?;

    let issues = IssueDetector::new(config.clone()).detect(&sequences, &annotation);
    write_issues(&output, &issues, delimiter, &Provenance::new(TOOL_NAME))?;

    log::info!(
        "Found {} issues in {} sequences and {} features",
        issues.len(),
        sequences.len(),
        annotation.len()
    );
    for (issue_type, count) in count_issues(&issues) {
        log::info!("{issue_type}: {count}");
    }

    Ok(issues)
}
