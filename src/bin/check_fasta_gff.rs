use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;

use riboviz::check_fasta_gff::*;
use riboviz::errors::Result;
use riboviz::utils::init_logger;

/// Check a FASTA file of transcript sequences against the GFF file annotating their CDSs.
#[derive(Parser, Debug)]
#[command(name = "check_fasta_gff", version, about)]
struct Cli {
    /// FASTA file of transcript sequences
    #[arg(short, long)]
    fasta: PathBuf,

    /// GFF3 file of mRNA and CDS features
    #[arg(short, long)]
    gff: PathBuf,

    /// Issues report to write
    #[arg(short, long)]
    output: PathBuf,

    /// Name of CDSs with neither ID nor Name attribute, `{}` standing for the sequence ID
    #[arg(long, value_name = "FORMAT")]
    feature_format: Option<String>,

    /// Identify CDSs by their Name attribute before their ID attribute
    #[arg(long)]
    use_feature_name: bool,

    /// Accepted start codon (repeatable, default ATG)
    #[arg(long = "start-codon", value_name = "CODON")]
    start_codons: Vec<String>,

    /// YAML configuration, overridden by the options above
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print progress messages
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(file) => CheckConfig::from_yaml_file(file)?,
        None => CheckConfig::default(),
    };
    if let Some(format) = &cli.feature_format {
        config.feature_format = FeatureFormat::parse(format)?;
    }
    if cli.use_feature_name {
        config.use_feature_name = true;
    }
    if !cli.start_codons.is_empty() {
        config.start_codons = cli.start_codons;
    }
    log::debug!("{config:?}");

    let issues = check_fasta_gff(&cli.fasta, &cli.gff, &cli.output, &config)?;
    log::info!("Wrote {} issues to {}", issues.len(), cli.output.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {e}", "error:".red().bold());
        process::exit(1);
    }
}
