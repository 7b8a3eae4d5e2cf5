use std::path::Path;

use rustc_hash::FxHashMap;

use crate::errors::*;
use crate::fastq::open_fastx;

/// One FASTA sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub sequence: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// FASTA sequences in file order, looked up by ID.
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    records: Vec<SequenceRecord>,
    ids: FxHashMap<String, usize>,
}

impl SequenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read all sequences from a FASTA file. An empty file yields an empty set.
    ///
    /// A sequence ID is the header text up to the first whitespace.
    pub fn from_fasta_file(file: impl AsRef<Path>) -> Result<Self> {
        let file = file.as_ref();
        let mut set = Self::new();
        let Some(mut reader) = open_fastx(file)? else {
            log::warn!("FASTA file {} is empty", file.display());
            return Ok(set);
        };

        let mut idx = 0;
        while let Some(record) = reader.next() {
            let record = record.map_err(|e| Error::ParseRecord {
                origin: path_str(file),
                idx,
                source: Box::new(e),
            })?;
            let header = utf8(record.id());
            let id = header.split_whitespace().next().unwrap_or_default();
            set.insert(SequenceRecord::new(id, record.seq().into_owned()));
            idx += 1;
        }

        log::debug!("Read {} sequences from {}", set.len(), file.display());
        Ok(set)
    }

    /// Add a record. A record with an ID already present replaces the earlier one.
    pub fn insert(&mut self, record: SequenceRecord) {
        use std::collections::hash_map::Entry::*;

        match self.ids.entry(record.id.clone()) {
            Occupied(e) => {
                log::warn!("Sequence {} occurs more than once, keeping the last", record.id);
                self.records[*e.get()] = record;
            }
            Vacant(e) => {
                e.insert(self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&SequenceRecord> {
        self.ids.get(id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<SequenceRecord> for SequenceSet {
    fn from_iter<I: IntoIterator<Item = SequenceRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}
