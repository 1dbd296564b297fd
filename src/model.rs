//! Core data types: transcripts, genomic/cDNA positions, changes and annotations.
//!
//! Mirrors the role of `hgvs::parser::ds` (typed positions with an HGVS-aware
//! anchor/offset split) and `hgvs::data::interface` (the transcript record
//! shape), but trimmed to the single transcript-database shape this crate's
//! dispatcher consumes rather than a generic multi-format HGVS AST.

use serde::{Deserialize, Serialize};

/// Strand of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    pub fn is_plus(&self) -> bool {
        matches!(self, Strand::Plus)
    }
}

/// One exon as a 1-based inclusive genomic interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    pub genomic_start: i64,
    pub genomic_end: i64,
}

impl Exon {
    pub fn len(&self) -> i64 {
        self.genomic_end - self.genomic_start + 1
    }

    pub fn contains(&self, g: i64) -> bool {
        g >= self.genomic_start && g <= self.genomic_end
    }
}

/// An immutable transcript model, shared process-wide (§3 "Ownership & lifecycle").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub accession: String,
    pub chromosome: i32,
    pub strand: Strand,
    pub tx_start: i64,
    pub tx_end: i64,
    /// `None` for non-coding transcripts.
    pub cds_start: Option<i64>,
    pub cds_end: Option<i64>,
    /// Sorted by genomic coordinate regardless of strand (§3 invariant).
    pub exons: Vec<Exon>,
    /// Spliced sequence in transcription order (already revcomp'd for minus strand).
    pub mrna_sequence: Vec<u8>,
    /// 1-based offset of the first coding base within `mrna_sequence`.
    pub ref_cds_start: i64,
}

impl Transcript {
    pub fn is_coding(&self) -> bool {
        self.cds_start.is_some() && self.cds_end.is_some()
    }

    pub fn total_exon_len(&self) -> i64 {
        self.exons.iter().map(Exon::len).sum()
    }
}

/// Which end of the CDS a cDNA anchor counts from.
///
/// Mirrors `hgvs`'s `CdsFrom::{Start, End}` split used in `pos_n_to_c`/
/// `pos_c_to_n`: positions at or before the stop codon count up from the
/// first CDS base (`Start`), positions past the stop codon count up from
/// the last CDS base (`End`, rendered as `*k`). Non-coding transcripts
/// always use `Start`, counting from the first transcribed base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CdnaAnchor {
    Start,
    End,
}

/// An HGVS cDNA position: a base anchor plus an optional signed intron offset.
///
/// `base` never takes the value `0` (HGVS has no `c.0`/`n.0`); callers that
/// compute one indicate a programmer error upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdnaPos {
    pub base: i64,
    pub offset: Option<i64>,
    pub anchor: CdnaAnchor,
}

impl CdnaPos {
    pub fn is_intronic(&self) -> bool {
        self.offset.is_some_and(|o| o != 0)
    }
}

/// A 0-based, strand-independent offset into a transcript's spliced sequence.
pub type TxOffset = i64;

/// A raw (chromosome, position, ref, alt) genome change, as received by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeChange {
    pub chromosome: i32,
    pub position: i64,
    pub reference: String,
    pub alternate: String,
}

impl GenomeChange {
    pub const DELETED_MARKER: &'static str = "-";

    pub fn is_insertion(&self) -> bool {
        self.reference == Self::DELETED_MARKER
    }

    pub fn is_deletion(&self) -> bool {
        self.alternate == Self::DELETED_MARKER
    }

    /// Length of the reference allele, `0` for a pure insertion.
    pub fn ref_len(&self) -> i64 {
        if self.is_insertion() {
            0
        } else {
            self.reference.len() as i64
        }
    }

    /// Length of the alternate allele, `0` for a pure deletion.
    pub fn alt_len(&self) -> i64 {
        if self.is_deletion() {
            0
        } else {
            self.alternate.len() as i64
        }
    }

    /// The genomic interval spanned, inclusive. Empty (end < start) for an
    /// insertion, anchored between `position - 1` and `position` (§3).
    pub fn genomic_interval(&self) -> (i64, i64) {
        if self.is_insertion() {
            (self.position - 1, self.position)
        } else {
            (self.position, self.position + self.ref_len() - 1)
        }
    }

    pub fn is_structural(&self, threshold: i64) -> bool {
        self.ref_len() >= threshold || self.alt_len() >= threshold
    }
}

/// A normalized genome change: same shape as [`GenomeChange`], left-aligned
/// within a single exon by the Change Normalizer (§4.3).
pub type NormalizedChange = GenomeChange;

/// Closed enum of consequence tags emitted by the core (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsequenceTag {
    Snv,
    FsInsertion,
    FsDeletion,
    FsSubstitution,
    NonFsInsertion,
    NonFsDeletion,
    NonFsSubstitution,
    Stopgain,
    Stoploss,
    Synonymous,
    Missense,
    Intronic,
    Utr5,
    Utr3,
    Splicing,
    Upstream,
    Downstream,
    Intergenic,
    NcrnaExonic,
    NcrnaIntronic,
    NcrnaSplicing,
    SvInversion,
    SvInsertion,
    SvDeletion,
    SvSubstitution,
    Error,
}

impl std::fmt::Display for ConsequenceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConsequenceTag::Snv => "SNV",
            ConsequenceTag::FsInsertion => "FS_INSERTION",
            ConsequenceTag::FsDeletion => "FS_DELETION",
            ConsequenceTag::FsSubstitution => "FS_SUBSTITUTION",
            ConsequenceTag::NonFsInsertion => "NON_FS_INSERTION",
            ConsequenceTag::NonFsDeletion => "NON_FS_DELETION",
            ConsequenceTag::NonFsSubstitution => "NON_FS_SUBSTITUTION",
            ConsequenceTag::Stopgain => "STOPGAIN",
            ConsequenceTag::Stoploss => "STOPLOSS",
            ConsequenceTag::Synonymous => "SYNONYMOUS",
            ConsequenceTag::Missense => "MISSENSE",
            ConsequenceTag::Intronic => "INTRONIC",
            ConsequenceTag::Utr5 => "UTR5",
            ConsequenceTag::Utr3 => "UTR3",
            ConsequenceTag::Splicing => "SPLICING",
            ConsequenceTag::Upstream => "UPSTREAM",
            ConsequenceTag::Downstream => "DOWNSTREAM",
            ConsequenceTag::Intergenic => "INTERGENIC",
            ConsequenceTag::NcrnaExonic => "NCRNA_EXONIC",
            ConsequenceTag::NcrnaIntronic => "NCRNA_INTRONIC",
            ConsequenceTag::NcrnaSplicing => "NCRNA_SPLICING",
            ConsequenceTag::SvInversion => "SV_INVERSION",
            ConsequenceTag::SvInsertion => "SV_INSERTION",
            ConsequenceTag::SvDeletion => "SV_DELETION",
            ConsequenceTag::SvSubstitution => "SV_SUBSTITUTION",
            ConsequenceTag::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

/// Which transcript (if any) an annotation refers to.
///
/// Structural-variant annotations against no overlapping transcript use
/// `None` (the "null transcript" of spec.md §4.4 step 3 / §9's inversion
/// note).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRef {
    pub accession: String,
}

impl TranscriptRef {
    pub fn new(accession: impl Into<String>) -> Self {
        Self {
            accession: accession.into(),
        }
    }
}

/// A single per-transcript (or per-neighbor, or intergenic) annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub transcript_ref: Option<TranscriptRef>,
    pub hgvs_text: String,
    pub consequence_tag: ConsequenceTag,
}

impl Annotation {
    pub fn new(
        transcript_ref: Option<TranscriptRef>,
        hgvs_text: impl Into<String>,
        consequence_tag: ConsequenceTag,
    ) -> Self {
        Self {
            transcript_ref,
            hgvs_text,
            consequence_tag,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn genome_change_insertion_interval() {
        let change = GenomeChange {
            chromosome: 1,
            position: 100,
            reference: "-".to_string(),
            alternate: "A".to_string(),
        };
        assert!(change.is_insertion());
        assert_eq!(change.genomic_interval(), (99, 100));
        assert_eq!(change.ref_len(), 0);
        assert_eq!(change.alt_len(), 1);
    }

    #[test]
    fn genome_change_deletion_interval() {
        let change = GenomeChange {
            chromosome: 1,
            position: 100,
            reference: "AGT".to_string(),
            alternate: "-".to_string(),
        };
        assert!(change.is_deletion());
        assert_eq!(change.genomic_interval(), (100, 102));
        assert_eq!(change.alt_len(), 0);
    }

    #[test]
    fn structural_threshold() {
        let small = GenomeChange {
            chromosome: 1,
            position: 1,
            reference: "A".to_string(),
            alternate: "G".to_string(),
        };
        assert!(!small.is_structural(1000));

        let big = GenomeChange {
            chromosome: 1,
            position: 1,
            reference: "-".to_string(),
            alternate: "N".repeat(1500),
        };
        assert!(big.is_structural(1000));
    }

    #[test]
    fn consequence_tag_display() {
        assert_eq!(ConsequenceTag::Splicing.to_string(), "SPLICING");
        assert_eq!(ConsequenceTag::NcrnaSplicing.to_string(), "NCRNA_SPLICING");
    }
}
