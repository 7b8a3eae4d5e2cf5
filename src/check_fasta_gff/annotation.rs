use std::fs::File;
use std::path::Path;

use bio::io::gff;
use bio_types::strand::Strand;

use crate::errors::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureType {
    Mrna,
    Cds,
    Other(String),
}

impl From<&str> for FeatureType {
    fn from(s: &str) -> Self {
        match s {
            "mRNA" | "transcript" => FeatureType::Mrna,
            "CDS" => FeatureType::Cds,
            other => FeatureType::Other(other.to_owned()),
        }
    }
}

/// One annotated feature.
///
/// Coordinates are 1-based and inclusive. `seq_id` is the sequence the feature
/// lies on, which for CDSs is the mRNA/transcript sequence they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub name: Option<String>,
    pub feature_type: FeatureType,
    pub seq_id: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

impl Feature {
    pub fn new(
        feature_type: FeatureType,
        seq_id: impl Into<String>,
        start: u64,
        end: u64,
        strand: Strand,
    ) -> Self {
        Self {
            id: None,
            name: None,
            feature_type,
            seq_id: seq_id.into(),
            start,
            end,
            strand,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Identifier of the feature: its `ID`, or its `Name` when there is no `ID`.
    /// `use_name` reverses the preference.
    pub fn key(&self, use_name: bool) -> Option<&str> {
        let (first, second) = if use_name {
            (&self.name, &self.id)
        } else {
            (&self.id, &self.name)
        };
        first.as_deref().or(second.as_deref())
    }

    /// Bases covered by the feature, clamped to the sequence.
    pub fn slice<'a>(&self, sequence: &'a [u8]) -> &'a [u8] {
        let len = sequence.len() as u64;
        let start = self.start.saturating_sub(1).min(len) as usize;
        let end = self.end.min(len) as usize;
        &sequence[start..end.max(start)]
    }
}

fn attr(record: &gff::Record, key: &str) -> Option<String> {
    record
        .attributes()
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_owned())
}

impl From<&gff::Record> for Feature {
    fn from(record: &gff::Record) -> Self {
        Self {
            id: attr(record, "ID"),
            name: attr(record, "Name"),
            feature_type: FeatureType::from(record.feature_type()),
            seq_id: record.seqname().to_owned(),
            start: *record.start(),
            end: *record.end(),
            strand: record.strand().unwrap_or(Strand::Unknown),
        }
    }
}

/// Features of a GFF file, in file order.
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    features: Vec<Feature>,
}

impl Annotation {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn from_gff_file(file: impl AsRef<Path>) -> Result<Self> {
        let file = file.as_ref();
        let handle = File::open(file).map_err(|e| Error::file_io(file, e))?;
        let mut reader = gff::Reader::new(handle, gff::GffType::GFF3);

        let features = reader
            .records()
            .enumerate()
            .map(|(idx, r)| {
                r.map(|record| Feature::from(&record))
                    .map_err(|e| Error::ParseRecord {
                        origin: path_str(file),
                        idx,
                        source: Box::new(e),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!("Read {} features from {}", features.len(), file.display());
        Ok(Self { features })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
