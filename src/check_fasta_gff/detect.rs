use bio_types::strand::Strand;
use rustc_hash::FxHashSet;

use crate::check_fasta_gff::*;

const STOP_CODONS: [&[u8]; 3] = [b"TAA", b"TAG", b"TGA"];

static COMP_LUT: [u8; 256] = {
    let mut l = [b'N'; 256];

    l[b'A' as usize] = b'T';
    l[b'C' as usize] = b'G';
    l[b'G' as usize] = b'C';
    l[b'T' as usize] = b'A';
    l
};

fn is_stop_codon(codon: &[u8]) -> bool {
    STOP_CODONS.iter().any(|&stop| stop == codon)
}

/// Bases of all CDSs on a sequence, joined in coordinate order and upper-cased.
///
/// The result is reverse-complemented when the first CDS lies on the reverse strand.
pub fn cds_sequence(cds: &[&Feature], sequence: &[u8]) -> Vec<u8> {
    let mut ordered = cds.to_vec();
    ordered.sort_by_key(|f| (f.start, f.end));

    let mut bases = ordered
        .iter()
        .flat_map(|f| f.slice(sequence))
        .map(|b| b.to_ascii_uppercase())
        .collect::<Vec<_>>();

    if matches!(ordered.first().map(|f| f.strand), Some(Strand::Reverse)) {
        bases.reverse();
        bases.iter_mut().for_each(|b| *b = COMP_LUT[*b as usize]);
    }

    bases
}

/// Applies the consistency rules to a FASTA/GFF pair.
#[derive(Debug, Clone, Default)]
pub struct IssueDetector {
    config: CheckConfig,
}

impl IssueDetector {
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// All issues of the pair.
    ///
    /// Issues of each mRNA come first, in annotation order, followed by one
    /// [`IssueType::DuplicateFeatureIds`] issue per duplicated feature ID and
    /// then the FASTA sequences missing from the annotation, in FASTA order.
    pub fn detect(&self, sequences: &SequenceSet, annotation: &Annotation) -> Vec<Issue> {
        let index = FeatureIndex::new(annotation, self.config.use_feature_name);
        let mut issues = Vec::new();

        for entry in index.entries() {
            self.check_mrna(entry, &index, sequences, &mut issues);
        }

        for (key, count) in index.key_counts().filter(|&(_, n)| n > 1) {
            issues.push(Issue::new(
                SequenceRef::Wildcard,
                key,
                IssueType::DuplicateFeatureIds,
                IssueData::Count(count),
            ));
        }

        for seq_id in sequences.ids() {
            if !index.contains_sequence(seq_id) {
                issues.push(Issue::for_sequence(seq_id, IssueType::SequenceNotInGff));
            }
        }

        log::debug!(
            "Checked {} mRNAs against {} sequences, found {} issues",
            index.entries().len(),
            sequences.len(),
            issues.len()
        );
        issues
    }

    fn check_mrna(
        &self,
        entry: &MrnaEntry,
        index: &FeatureIndex,
        sequences: &SequenceSet,
        issues: &mut Vec<Issue>,
    ) {
        let seq_id = entry.seq_id;
        if entry.cds.is_empty() {
            return;
        }

        // unnamed CDSs share one fallback name and one issue per mRNA
        let fallback = self.config.feature_format.apply(seq_id);
        let names = entry
            .cds
            .iter()
            .map(|cds| {
                cds.key(self.config.use_feature_name)
                    .map(str::to_owned)
                    .unwrap_or_else(|| fallback.clone())
            })
            .collect::<Vec<_>>();
        if entry
            .cds
            .iter()
            .any(|cds| cds.key(self.config.use_feature_name).is_none())
        {
            issues.push(Issue::for_feature(seq_id, fallback.as_str(), IssueType::NoIdOrName));
        }

        let mut seen = FxHashSet::default();
        for key in entry
            .cds
            .iter()
            .filter_map(|cds| cds.key(self.config.use_feature_name))
        {
            if index.key_count(key) > 1 && seen.insert(key) {
                issues.push(Issue::for_feature(seq_id, key, IssueType::DuplicateFeatureId));
            }
        }

        if entry.cds.len() > 1 {
            issues.push(Issue::new(
                SequenceRef::id(seq_id),
                "",
                IssueType::MultipleCDS,
                IssueData::Count(entry.cds.len()),
            ));
        }

        let Some(record) = sequences.get(seq_id) else {
            issues.push(Issue::for_sequence(seq_id, IssueType::SequenceNotInFasta));
            return;
        };

        let sequence = cds_sequence(&entry.cds, &record.sequence);
        for issue_type in self.check_codons(&sequence) {
            issues.push(Issue::for_feature(seq_id, names[0].as_str(), issue_type));
        }
    }

    /// Length and codon issues of a coding sequence.
    ///
    /// A trailing partial codon is never a stop codon. An empty sequence has no codons to check.
    pub fn check_codons(&self, sequence: &[u8]) -> Vec<IssueType> {
        let mut found = Vec::new();

        if sequence.len() % 3 != 0 {
            found.push(IssueType::IncompleteFeature);
        }

        let codons = sequence.chunks(3).collect::<Vec<_>>();
        let Some((&last, init)) = codons.split_last() else {
            return found;
        };

        if !self.config.is_start_codon(codons[0]) {
            found.push(IssueType::NoAtgStartCodon);
        }
        if !is_stop_codon(last) {
            found.push(IssueType::NoStopCodon);
        }
        if init.iter().any(|c| is_stop_codon(c)) {
            found.push(IssueType::InternalStopCodon);
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use IssueType::*;

    fn mrna(seq_id: &str) -> Feature {
        Feature::new(FeatureType::Mrna, seq_id, 1, 1, Strand::Forward)
    }

    fn cds(seq_id: &str, id: &str, start: u64, end: u64) -> Feature {
        Feature::new(FeatureType::Cds, seq_id, start, end, Strand::Forward).with_id(id)
    }

    fn detect(sequences: &[(&str, &str)], features: Vec<Feature>) -> Vec<Issue> {
        let sequences = sequences
            .iter()
            .map(|(id, seq)| SequenceRecord::new(*id, seq.as_bytes()))
            .collect::<SequenceSet>();
        IssueDetector::default().detect(&sequences, &Annotation::new(features))
    }

    #[test]
    fn test_check_codons() {
        let detector = IssueDetector::default();
        assert!(detector.check_codons(b"ATGAAACCCTAA").is_empty());
        assert!(detector.check_codons(b"").is_empty());
        assert_eq!(detector.check_codons(b"ATGAAACCCG"), vec![IncompleteFeature, NoStopCodon]);
        assert_eq!(detector.check_codons(b"CTGAAATAA"), vec![NoAtgStartCodon]);
        assert_eq!(detector.check_codons(b"ATGTAAAAATAG"), vec![InternalStopCodon]);
        assert_eq!(
            detector.check_codons(b"CCCTAGAAAGGG"),
            vec![NoAtgStartCodon, NoStopCodon, InternalStopCodon]
        );
        // a partial trailing codon still gets checked as the last codon
        assert_eq!(
            detector.check_codons(b"ATGTGAAT"),
            vec![IncompleteFeature, NoStopCodon, InternalStopCodon]
        );
        assert_eq!(detector.check_codons(b"AT"), vec![IncompleteFeature, NoAtgStartCodon, NoStopCodon]);
    }

    #[test]
    fn test_cds_sequence_reverse_strand() {
        let seq = b"ggTTATTTCATcc";
        let cds = Feature::new(FeatureType::Cds, "s", 3, 11, Strand::Reverse);
        assert_eq!(cds_sequence(&[&cds], seq), b"ATGAAATAA");
    }

    #[test]
    fn test_cds_sequence_reverse_strand_joined() {
        let seq = b"TTACCCTTTCAT";
        let c2 = Feature::new(FeatureType::Cds, "s", 7, 12, Strand::Reverse).with_id("c2");
        let c1 = Feature::new(FeatureType::Cds, "s", 1, 3, Strand::Reverse).with_id("c1");
        // "TTA" + "TTTCAT" reverse complemented as one region
        assert_eq!(cds_sequence(&[&c2, &c1], seq), b"ATGAAATAA");

        let issues = detect(&[("s", "TTACCCTTTCAT")], vec![mrna("s"), c2, c1]);
        assert_eq!(
            issues,
            vec![Issue::new(SequenceRef::id("s"), "", MultipleCDS, IssueData::Count(2))]
        );
    }

    #[test]
    fn test_cds_sequence_coordinate_order() {
        let seq = b"ATGcccAAAcccTAA";
        let c3 = cds("s", "c3", 13, 15);
        let c1 = cds("s", "c1", 1, 3);
        let c2 = cds("s", "c2", 7, 9);
        assert_eq!(cds_sequence(&[&c3, &c1, &c2], seq), b"ATGAAATAA");
    }

    #[test]
    fn test_valid_cds_has_no_issues() {
        let issues = detect(
            &[("s1", "CCATGAAACCCTAAGG")],
            vec![mrna("s1"), cds("s1", "s1_CDS", 3, 14)],
        );
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn test_multiple_cds() {
        let issues = detect(
            &[("s1", "ATGcccAAAcccTAA")],
            vec![
                mrna("s1"),
                cds("s1", "c1", 1, 3),
                cds("s1", "c2", 7, 9),
                cds("s1", "c3", 13, 15),
            ],
        );
        assert_eq!(
            issues,
            vec![Issue::new(SequenceRef::id("s1"), "", MultipleCDS, IssueData::Count(3))]
        );
    }

    #[test]
    fn test_duplicate_feature_ids() {
        let seqs = [("a", "ATGTAA"), ("b", "ATGTAA"), ("c", "ATGTAA")];
        let issues = detect(
            &seqs,
            vec![cds("a", "dup", 1, 6), cds("b", "dup", 1, 6), cds("c", "dup", 1, 6)],
        );
        assert_eq!(
            issues,
            vec![
                Issue::for_feature("a", "dup", DuplicateFeatureId),
                Issue::for_feature("b", "dup", DuplicateFeatureId),
                Issue::for_feature("c", "dup", DuplicateFeatureId),
                Issue::new(SequenceRef::Wildcard, "dup", DuplicateFeatureIds, IssueData::Count(3)),
            ]
        );
    }

    #[test]
    fn test_duplicate_within_one_mrna() {
        let issues = detect(
            &[("a", "ATGcccTAA")],
            vec![cds("a", "dup", 1, 3), cds("a", "dup", 7, 9)],
        );
        assert_eq!(
            issues,
            vec![
                Issue::for_feature("a", "dup", DuplicateFeatureId),
                Issue::new(SequenceRef::id("a"), "", MultipleCDS, IssueData::Count(2)),
                Issue::new(SequenceRef::Wildcard, "dup", DuplicateFeatureIds, IssueData::Count(2)),
            ]
        );
    }

    #[test]
    fn test_no_id_or_name_uses_feature_format() {
        let unnamed = Feature::new(FeatureType::Cds, "s1", 1, 6, Strand::Forward);
        let sequences = [SequenceRecord::new("s1", "CTGTAA")]
            .into_iter()
            .collect::<SequenceSet>();
        let annotation = Annotation::new(vec![unnamed]);

        let issues = IssueDetector::default().detect(&sequences, &annotation);
        assert_eq!(
            issues,
            vec![
                Issue::for_feature("s1", "s1_CDS", NoIdOrName),
                Issue::for_feature("s1", "s1_CDS", NoAtgStartCodon),
            ]
        );

        let config = CheckConfig {
            feature_format: FeatureFormat::parse("{}-Custom").unwrap(),
            ..Default::default()
        };
        let issues = IssueDetector::new(config).detect(&sequences, &annotation);
        assert_eq!(issues[0], Issue::for_feature("s1", "s1-Custom", NoIdOrName));
    }

    #[test]
    fn test_no_id_or_name_once_per_mrna() {
        let issues = detect(
            &[("m", "ATGAAATAA")],
            vec![
                mrna("m"),
                Feature::new(FeatureType::Cds, "m", 1, 3, Strand::Forward),
                Feature::new(FeatureType::Cds, "m", 4, 9, Strand::Forward),
            ],
        );
        assert_eq!(
            issues,
            vec![
                Issue::for_feature("m", "m_CDS", NoIdOrName),
                Issue::new(SequenceRef::id("m"), "", MultipleCDS, IssueData::Count(2)),
            ]
        );
    }

    #[test]
    fn test_sequence_not_in_fasta_skips_codon_checks() {
        let issues = detect(&[], vec![mrna("s1"), cds("s1", "c1", 1, 10)]);
        assert_eq!(issues, vec![Issue::for_sequence("s1", SequenceNotInFasta)]);
    }

    #[test]
    fn test_sequence_not_in_gff() {
        let issues = detect(
            &[("s1", "ATGTAA"), ("orphan", "ATGTAA")],
            vec![mrna("s1"), cds("s1", "c1", 1, 6)],
        );
        assert_eq!(issues, vec![Issue::for_sequence("orphan", SequenceNotInGff)]);
    }

    #[test]
    fn test_mrna_without_cds() {
        let issues = detect(&[], vec![mrna("s1")]);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_alternative_start_codon() {
        let config = CheckConfig {
            start_codons: vec!["ATG".to_owned(), "CTG".to_owned()],
            ..Default::default()
        };
        assert!(IssueDetector::new(config).check_codons(b"CTGAAATAA").is_empty());
    }

    #[test]
    fn test_detect_is_deterministic() {
        let seqs = [("a", "ATGTAA"), ("b", "CCCGGG"), ("x", "A")];
        let features = vec![
            cds("a", "dup", 1, 6),
            cds("b", "dup", 1, 5),
            cds("missing", "m", 1, 3),
        ];
        assert_eq!(detect(&seqs, features.clone()), detect(&seqs, features));
    }
}
