use std::fmt;
use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::errors::*;
use crate::utils::delimiter_byte;

pub const DEFAULT_FEATURE_FORMAT: &str = "{}_CDS";
pub const DEFAULT_START_CODON: &str = "ATG";

/// Format used to name a CDS that has neither an `ID` nor a `Name` attribute.
///
/// The format holds exactly one `{}` placeholder, which is replaced by the
/// sequence ID of the CDS. Braces can be escaped with `\`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct FeatureFormat {
    prefix: String,
    suffix: String,
}

impl FeatureFormat {
    pub fn parse(format: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut curr = String::new();
        let mut escape = false;
        let mut in_placeholder = false;

        for c in format.chars() {
            match c {
                '{' if !escape => {
                    if in_placeholder {
                        Err(Error::Parse {
                            string: format.to_owned(),
                            context: "feature format".to_owned(),
                            reason: "cannot have nested braces",
                        })?;
                    }
                    parts.push(std::mem::take(&mut curr));
                    in_placeholder = true;
                }
                '}' if !escape => {
                    if !in_placeholder {
                        Err(Error::Parse {
                            string: format.to_owned(),
                            context: "feature format".to_owned(),
                            reason: "unbalanced braces",
                        })?;
                    }
                    if !curr.trim().is_empty() {
                        Err(Error::Parse {
                            string: format.to_owned(),
                            context: "feature format".to_owned(),
                            reason: "placeholder must be empty",
                        })?;
                    }
                    curr.clear();
                    in_placeholder = false;
                }
                '\\' if !escape => escape = true,
                _ => {
                    escape = false;
                    curr.push(c);
                }
            }
        }

        if in_placeholder {
            Err(Error::Parse {
                string: format.to_owned(),
                context: "feature format".to_owned(),
                reason: "unbalanced braces",
            })?;
        }
        parts.push(curr);

        match <[String; 2]>::try_from(parts) {
            Ok([prefix, suffix]) => Ok(Self { prefix, suffix }),
            Err(_) => Err(Error::Parse {
                string: format.to_owned(),
                context: "feature format".to_owned(),
                reason: "expected exactly one {} placeholder",
            }),
        }
    }

    /// Name for a CDS on the given sequence.
    pub fn apply(&self, seq_id: &str) -> String {
        format!("{}{}{}", self.prefix, seq_id, self.suffix)
    }
}

impl Default for FeatureFormat {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: "_CDS".to_owned(),
        }
    }
}

impl TryFrom<String> for FeatureFormat {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl fmt::Display for FeatureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let escape = |s: &str| s.replace('\\', "\\\\").replace('{', "\\{").replace('}', "\\}");
        write!(f, "{}{{}}{}", escape(&self.prefix), escape(&self.suffix))
    }
}

/// Options for checking a FASTA/GFF pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Name given to CDSs lacking both `ID` and `Name` attributes.
    pub feature_format: FeatureFormat,
    /// Identify CDSs by their `Name` attribute before their `ID` attribute.
    pub use_feature_name: bool,
    /// Codons accepted as translation starts.
    pub start_codons: Vec<String>,
    /// Column delimiter of the issues report.
    pub delimiter: char,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            feature_format: FeatureFormat::default(),
            use_feature_name: false,
            start_codons: vec![DEFAULT_START_CODON.to_owned()],
            delimiter: '\t',
        }
    }
}

impl CheckConfig {
    pub fn from_yaml_file(file: impl AsRef<Path>) -> Result<Self> {
        let file = file.as_ref();
        let reader = File::open(file).map_err(|e| Error::file_io(file, e))?;
        serde_yaml::from_reader(reader).map_err(|e| Error::Config {
            file: path_str(file),
            source: e,
        })
    }

    /// The report delimiter as a single byte.
    pub fn delimiter_byte(&self) -> Result<u8> {
        delimiter_byte(self.delimiter, "report delimiter")
    }

    pub(crate) fn is_start_codon(&self, codon: &[u8]) -> bool {
        self.start_codons
            .iter()
            .any(|s| s.as_bytes().eq_ignore_ascii_case(codon))
    }
}
