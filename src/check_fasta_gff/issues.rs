use std::fmt;
use std::str::FromStr;

use crate::errors::*;
use crate::provenance::COMMENT;

/// How a sequence ID is rendered in reports when an issue spans several sequences.
pub const SEQUENCE_WILDCARD: &str = "*";

/// Prefix marking a rendered sequence ID that would otherwise read back as
/// the wildcard or a comment line.
const SEQUENCE_ESCAPE: char = '\\';

/// The sequence an issue belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SequenceRef {
    Id(String),
    /// The issue spans multiple sequences.
    Wildcard,
}

impl SequenceRef {
    pub fn id(id: impl Into<String>) -> Self {
        SequenceRef::Id(id.into())
    }
}

/// Renders the report form: `*` for the wildcard, and IDs equal to `*` or
/// starting with `#` or `\` prefixed with `\`.
impl fmt::Display for SequenceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceRef::Wildcard => write!(f, "{SEQUENCE_WILDCARD}"),
            SequenceRef::Id(id)
                if id == SEQUENCE_WILDCARD
                    || id.starts_with(COMMENT)
                    || id.starts_with(SEQUENCE_ESCAPE) =>
            {
                write!(f, "{SEQUENCE_ESCAPE}{id}")
            }
            SequenceRef::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Parses the report form written by `Display`.
impl From<&str> for SequenceRef {
    fn from(s: &str) -> Self {
        if s == SEQUENCE_WILDCARD {
            SequenceRef::Wildcard
        } else if let Some(id) = s.strip_prefix(SEQUENCE_ESCAPE) {
            SequenceRef::Id(id.to_owned())
        } else {
            SequenceRef::Id(s.to_owned())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueType {
    /// A CDS has neither an `ID` nor a `Name` attribute.
    NoIdOrName,
    /// A CDS shares its feature ID with other CDSs.
    DuplicateFeatureId,
    /// A feature ID is shared by several CDSs (one issue per ID).
    DuplicateFeatureIds,
    MultipleCDS,
    SequenceNotInFasta,
    SequenceNotInGff,
    /// The CDS length is not a multiple of 3.
    IncompleteFeature,
    NoAtgStartCodon,
    NoStopCodon,
    InternalStopCodon,
}

impl IssueType {
    pub const ALL: [IssueType; 10] = [
        IssueType::NoIdOrName,
        IssueType::DuplicateFeatureId,
        IssueType::DuplicateFeatureIds,
        IssueType::MultipleCDS,
        IssueType::SequenceNotInFasta,
        IssueType::SequenceNotInGff,
        IssueType::IncompleteFeature,
        IssueType::NoAtgStartCodon,
        IssueType::NoStopCodon,
        IssueType::InternalStopCodon,
    ];

    pub fn as_str(&self) -> &'static str {
        use IssueType::*;
        match self {
            NoIdOrName => "NoIdOrName",
            DuplicateFeatureId => "DuplicateFeatureId",
            DuplicateFeatureIds => "DuplicateFeatureIds",
            MultipleCDS => "MultipleCDS",
            SequenceNotInFasta => "SequenceNotInFasta",
            SequenceNotInGff => "SequenceNotInGff",
            IncompleteFeature => "IncompleteFeature",
            NoAtgStartCodon => "NoAtgStartCodon",
            NoStopCodon => "NoStopCodon",
            InternalStopCodon => "InternalStopCodon",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        IssueType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::Parse {
                string: s.to_owned(),
                context: "issue type".to_owned(),
                reason: "unknown issue type",
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum IssueData {
    #[default]
    NoData,
    Count(usize),
}

impl fmt::Display for IssueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueData::NoData => Ok(()),
            IssueData::Count(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for IssueData {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(IssueData::NoData);
        }
        s.parse().map(IssueData::Count).map_err(|_| Error::Parse {
            string: s.to_owned(),
            context: "issue data".to_owned(),
            reason: "expected an empty value or a count",
        })
    }
}

/// A problem found in a FASTA/GFF pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Issue {
    pub sequence: SequenceRef,
    /// Feature the issue concerns, empty if it concerns a whole sequence.
    pub feature: String,
    pub issue_type: IssueType,
    pub data: IssueData,
}

impl Issue {
    pub fn new(
        sequence: SequenceRef,
        feature: impl Into<String>,
        issue_type: IssueType,
        data: IssueData,
    ) -> Self {
        Self {
            sequence,
            feature: feature.into(),
            issue_type,
            data,
        }
    }

    /// An issue about a feature on a sequence, without data.
    pub fn for_feature(seq_id: &str, feature: impl Into<String>, issue_type: IssueType) -> Self {
        Self::new(SequenceRef::id(seq_id), feature, issue_type, IssueData::NoData)
    }

    /// An issue about a whole sequence, without data.
    pub fn for_sequence(seq_id: &str, issue_type: IssueType) -> Self {
        Self::for_feature(seq_id, "", issue_type)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.sequence, self.feature, self.issue_type, self.data
        )
    }
}

/// Number of issues of each type, in the order of [`IssueType::ALL`], skipping absent types.
pub fn count_issues(issues: &[Issue]) -> Vec<(IssueType, usize)> {
    IssueType::ALL
        .into_iter()
        .map(|t| (t, issues.iter().filter(|i| i.issue_type == t).count()))
        .filter(|&(_, n)| n > 0)
        .collect()
}
