use rustc_hash::FxHashMap;

use crate::check_fasta_gff::*;

/// An mRNA/transcript sequence and the CDS features annotated on it.
#[derive(Debug, Clone)]
pub struct MrnaEntry<'a> {
    pub seq_id: &'a str,
    pub cds: Vec<&'a Feature>,
}

/// Lookup structures over an annotation.
///
/// Entries are kept in the order their sequence IDs first appear in the
/// annotation, and every sequence with an mRNA or CDS record gets an entry,
/// even one without any CDS.
#[derive(Debug, Clone)]
pub struct FeatureIndex<'a> {
    entries: Vec<MrnaEntry<'a>>,
    positions: FxHashMap<&'a str, usize>,
    key_counts: FxHashMap<&'a str, usize>,
    key_order: Vec<&'a str>,
}

impl<'a> FeatureIndex<'a> {
    pub fn new(annotation: &'a Annotation, use_feature_name: bool) -> Self {
        let mut index = Self {
            entries: Vec::new(),
            positions: FxHashMap::default(),
            key_counts: FxHashMap::default(),
            key_order: Vec::new(),
        };

        for feature in annotation.features() {
            match feature.feature_type {
                FeatureType::Mrna => {
                    index.entry(&feature.seq_id);
                }
                FeatureType::Cds => {
                    index.entry(&feature.seq_id).cds.push(feature);

                    if let Some(key) = feature.key(use_feature_name) {
                        let count = index.key_counts.entry(key).or_insert(0);
                        if *count == 0 {
                            index.key_order.push(key);
                        }
                        *count += 1;
                    }
                }
                FeatureType::Other(_) => (),
            }
        }

        index
    }

    fn entry(&mut self, seq_id: &'a str) -> &mut MrnaEntry<'a> {
        let idx = *self.positions.entry(seq_id).or_insert_with(|| {
            self.entries.push(MrnaEntry {
                seq_id,
                cds: Vec::new(),
            });
            self.entries.len() - 1
        });
        &mut self.entries[idx]
    }

    pub fn entries(&self) -> &[MrnaEntry<'a>] {
        &self.entries
    }

    pub fn get(&self, seq_id: &str) -> Option<&MrnaEntry<'a>> {
        self.positions.get(seq_id).map(|&i| &self.entries[i])
    }

    /// Is the sequence ID referenced by any mRNA or CDS record?
    pub fn contains_sequence(&self, seq_id: &str) -> bool {
        self.positions.contains_key(seq_id)
    }

    /// Number of CDS features carrying the feature ID.
    pub fn key_count(&self, key: &str) -> usize {
        self.key_counts.get(key).copied().unwrap_or(0)
    }

    /// Feature IDs and their counts, in order of first occurrence.
    pub fn key_counts(&self) -> impl Iterator<Item = (&'a str, usize)> + '_ {
        self.key_order.iter().map(|&k| (k, self.key_counts[k]))
    }
}
