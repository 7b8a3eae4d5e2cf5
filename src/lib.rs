//! Workflow tools for ribosome profiling data.
//!
//! # Overview
//! riboviz prepares and checks the inputs of a ribosome profiling analysis.
//!
//! This is useful for:
//! * Checking that a FASTA file of transcripts agrees with the GFF file annotating its CDSs
//! * Subsampling large FASTQ files for quick test runs
//! * Demultiplexing barcoded reads into per-sample FASTQ files
//! * Recording which files each step of a workflow read and wrote
//!
//! ## Checking FASTA and GFF files
//! [`check_fasta_gff::check_fasta_gff`] reads a FASTA file and a GFF file, applies a set of
//! consistency rules and writes the issues found to a delimited report:
//! ```text
//! # Created by: riboviz
//! # Date: 1760745600 (seconds since Unix epoch)
//! # Command-line tool: check_fasta_gff
//! # Version: 0.1.0
//! Sequence                   Feature                 IssueType           IssueData
//! YAL003C_mRNA                                       SequenceNotInFasta
//! YAL008C_mRNA               YAL008C_CDS             IncompleteFeature
//! *                          YAL005C_CDS             DuplicateFeatureIds 3
//! ```
//! Every issue names the sequence it concerns (or `*` if it spans several), the feature it
//! concerns (empty if it concerns a whole sequence), its type and, for counting issues, a count.
//!
//! For each mRNA with CDSs, the rules check that:
//! * every CDS has an `ID` or `Name` attribute, and that no feature ID is used twice
//! * there is a single CDS
//! * the sequence is in the FASTA file
//! * the coding sequence is a whole number of codons, starts with a start codon, ends with a
//!   stop codon and has no stop codon in between
//!
//! and finally that every FASTA sequence is annotated in the GFF file.
//!
//! The rules are configured by a [`check_fasta_gff::CheckConfig`], which can be read from YAML.
//!
//! ## Other tools
//! * [`subsample::subsample_bioseqfile`] keeps each record of a FASTA/FASTQ file with a fixed
//!   probability.
//! * [`demultiplex::demultiplex_fastq`] splits reads by the barcode in their IDs.
//! * [`workflow_record`] writes the record of files read and written by workflow steps.
//! * [`fastq`] holds FASTQ naming helpers and comparisons.
//!
//! Files written by these tools start with [`provenance`] comment lines.

pub mod check_fasta_gff;
pub mod demultiplex;
pub mod errors;
pub mod fastq;
pub mod provenance;
pub mod subsample;
pub mod utils;
pub mod workflow_record;

// commonly used functions and types

pub use crate::check_fasta_gff::{check_fasta_gff, CheckConfig, Issue, IssueType};
pub use crate::errors::{Error, Result};
