//! External interfaces (§6): the three trait seams through which the
//! dispatcher reaches transcript metadata, an interval index, and
//! protein-level annotation, none of which this crate implements itself.
//!
//! Mirrors `data::interface::Provider`'s role as an injected, process-wide
//! read-only data source behind a trait object, but split into three
//! narrower traits because the spec assigns them to three different
//! external collaborators, whereas the teacher's single `Provider` trait
//! conflates gene metadata, transcript exon structure, and sequence lookup.

use std::sync::Arc;

use crate::model::{Annotation, Transcript, TranscriptRef};

/// Chromosome identifier, as the caller's genome build numbers them.
pub type ChromId = i32;

/// Queries an interval index of transcripts over one chromosome.
///
/// Implementations are expected to be `O(log n + k)` per call (an interval
/// tree or equivalent); the dispatcher calls this once per candidate-gather
/// step (§4.4 step 2) and is free to do so from multiple threads at once.
pub trait IntervalIndexProvider: Send + Sync {
    fn search(&self, chrom: ChromId, start: i64, end: i64) -> Vec<TranscriptRef>;
    fn search_large(&self, chrom: ChromId, start: i64, end: i64) -> Vec<TranscriptRef>;
    fn left_neighbor(&self, chrom: ChromId, pos: i64) -> Option<TranscriptRef>;
    fn right_neighbor(&self, chrom: ChromId, pos: i64) -> Option<TranscriptRef>;
}

/// Supplies transcript records and wild-type codon lookups.
pub trait ReferenceDataProvider: Send + Sync {
    fn transcript(&self, tx: &TranscriptRef) -> Option<Arc<Transcript>>;

    /// The wild-type codon covering `cdna_offset` (0-based CDS offset) given
    /// `frame` (0, 1 or 2 bases already consumed into the codon).
    fn wt_codon_at(&self, tx: &Transcript, cdna_offset: i64, frame: u8) -> Option<[u8; 3]>;

    /// The wild-type codon immediately 3' of the one covering `cdna_offset`,
    /// used by builders that need to know what follows a variant (e.g. to
    /// detect a restored stop codon after a frameshift).
    fn wt_codon_after(&self, tx: &Transcript, cdna_offset: i64, frame: u8) -> Option<[u8; 3]>;
}

/// One exonic CDS change, fully resolved to transcript coordinates, handed
/// to an external [`ProteinEffectBuilder`] (§6).
#[derive(Debug, Clone)]
pub struct ExonicChangeCall {
    pub transcript: Arc<Transcript>,
    pub frame_start: u8,
    pub wt_codon: [u8; 3],
    pub wt_codon_after: [u8; 3],
    pub reference: String,
    pub alternate: String,
    /// 0-based offset into the CDS of the first affected base.
    pub rvarstart: i64,
    /// 0-based offset into the CDS of the last affected base, `None` for a
    /// pure insertion.
    pub rvarend: Option<i64>,
    /// 0-based exon index the change falls in.
    pub exon_number: usize,
}

/// Computes the protein-level consequence of one exonic CDS change.
///
/// The core never interprets codons itself (§1 Non-goal: protein-level
/// HGVS); it classifies that a change is exonic-CDS and hands the fully
/// resolved call here. One implementation may cover every
/// [`ExonicChangeCall`] shape, or the caller may dispatch to different
/// builders per shape (single-nucleotide substitution, insertion,
/// single-base deletion, multi-base deletion, block substitution) — the
/// dispatcher does not care which, it only needs *a* builder.
pub trait ProteinEffectBuilder: Send + Sync {
    fn build(&self, call: ExonicChangeCall) -> Annotation;
}
