//! Coordinate Projector: genome ↔ transcript/cDNA position mapping for a
//! single transcript.
//!
//! Our transcript model has no alignment gaps within an exon — exons are
//! plain genomic intervals — so the general CIGAR-based alignment an
//! arbitrary transcript-to-genome mapping would need degenerates to a
//! simple cumulative-exon-length walk; `Projector` implements that
//! degenerate case directly rather than carrying an unused general
//! alignment layer.
//!
//! The anchor/offset split and the `Start`/`End` branching when converting
//! to cDNA positions includes the `+1`/`-1` corrections for HGVS's missing
//! zero position.

use crate::error::{bug_projection_out_of_range, Error};
use crate::model::{CdnaAnchor, CdnaPos, Transcript, TxOffset};

/// Precomputed per-exon cumulative lengths for one transcript, plus the
/// strand/CDS bookkeeping needed to answer coordinate queries in O(1) after
/// an O(exon count) setup.
pub struct Projector<'t> {
    transcript: &'t Transcript,
    /// `cumulative[k]` = sum of exon lengths for exons `0..k` (plus-strand
    /// transcription order). `cumulative[exon_count]` == total exon length.
    cumulative: Vec<i64>,
    /// 0-based transcript offset one past the last CDS base, i.e. the tx
    /// offset of `c.*1`. Computed from the transcript offset of whichever
    /// genomic CDS bound is the translation-stop side — `cds_end` on the
    /// plus strand, `cds_start` on the minus strand, since `cds_start`/
    /// `cds_end` are genomic-ascending bounds independent of strand — rather
    /// than from `cds_end - cds_start`: the genomic span between the two
    /// bounds includes any introns inside the CDS, which would overcount the
    /// number of spliced CDS bases for any transcript whose CDS spans more
    /// than one exon. `None` for non-coding transcripts.
    cds_end_off_exclusive: Option<i64>,
}

impl<'t> Projector<'t> {
    pub fn new(transcript: &'t Transcript) -> Self {
        let mut cumulative = Vec::with_capacity(transcript.exons.len() + 1);
        let mut acc = 0i64;
        cumulative.push(0);
        for exon in &transcript.exons {
            acc += exon.len();
            cumulative.push(acc);
        }
        let mut projector = Self {
            transcript,
            cumulative,
            cds_end_off_exclusive: None,
        };
        if let (Some(cds_start), Some(cds_end)) = (transcript.cds_start, transcript.cds_end) {
            let stop_side_g = if transcript.strand.is_plus() { cds_end } else { cds_start };
            projector.cds_end_off_exclusive = projector.genome_to_tx_offset(stop_side_g).ok().map(|off| off + 1);
        }
        projector
    }

    pub fn transcript(&self) -> &'t Transcript {
        self.transcript
    }

    fn total_exon_len(&self) -> i64 {
        *self.cumulative.last().unwrap_or(&0)
    }

    /// Identify which exon contains (or flanks) `g`; `true` in the second
    /// element means `g` is intronic.
    ///
    /// Errors with [`Error::ProjectionOutOfRange`] if `g` lies outside
    /// `[tx_start, tx_end]`.
    pub fn locate_exon(&self, g: i64) -> Result<(usize, bool), Error> {
        if g < self.transcript.tx_start || g > self.transcript.tx_end {
            return Err(Error::ProjectionOutOfRange {
                accession: self.transcript.accession.clone(),
                position: g,
                tx_start: self.transcript.tx_start,
                tx_end: self.transcript.tx_end,
            });
        }

        for (k, exon) in self.transcript.exons.iter().enumerate() {
            if exon.contains(g) {
                return Ok((k, false));
            }
            if g < exon.genomic_start {
                // g is intronic, between exon k-1 and exon k. Return the
                // closer flanking exon.
                if k == 0 {
                    return Ok((k, true));
                }
                let prev = &self.transcript.exons[k - 1];
                let dist_to_prev = g - prev.genomic_end;
                let dist_to_next = exon.genomic_start - g;
                return Ok(if dist_to_next <= dist_to_prev {
                    (k, true)
                } else {
                    (k - 1, true)
                });
            }
        }

        // g is within tx bounds but past the last exon's end: unreachable
        // given the containment check above combined with the transcript
        // invariant `tx_end >= max(exon_end)`, unless the database is
        // inconsistent.
        bug_projection_out_of_range(&self.transcript.accession, g)
    }

    /// Map a genomic base to its 0-based offset within the spliced
    /// transcript sequence, in transcription order.
    pub fn genome_to_tx_offset(&self, g: i64) -> Result<TxOffset, Error> {
        let (k, is_intron) = self.locate_exon(g)?;
        if is_intron {
            return Err(Error::ProjectionOutOfRange {
                accession: self.transcript.accession.clone(),
                position: g,
                tx_start: self.transcript.tx_start,
                tx_end: self.transcript.tx_end,
            });
        }
        let exon = &self.transcript.exons[k];
        let delta = g - exon.genomic_start;

        Ok(if self.transcript.strand.is_plus() {
            self.cumulative[k] + delta
        } else {
            let total = self.total_exon_len();
            total - (self.cumulative[k] + delta) - 1
        })
    }

    /// Signed intronic offset (distance to the nearest exonic base on the
    /// transcript's strand) for a genomic position known to be intronic.
    fn intron_offset(&self, g: i64, exon_idx: usize) -> i64 {
        let exon = &self.transcript.exons[exon_idx];
        let dist_to_prev_end = g - exon.genomic_end;
        let dist_to_next_start = exon.genomic_start - g;
        // Whichever of the two is positive tells us which side we're on.
        let raw = if dist_to_prev_end > 0 {
            dist_to_prev_end
        } else {
            -dist_to_next_start
        };
        if self.transcript.strand.is_plus() {
            raw
        } else {
            -raw
        }
    }

    /// Transcript offset (possibly intronic) for a genomic position,
    /// returning the 0-based exonic anchor offset plus a signed intron
    /// offset (`0` if exonic).
    pub fn genome_to_tx_offset_with_intron(&self, g: i64) -> Result<(TxOffset, i64), Error> {
        let (k, is_intron) = self.locate_exon(g)?;
        if !is_intron {
            return Ok((self.genome_to_tx_offset(g)?, 0));
        }
        let exon = &self.transcript.exons[k];
        let anchor_g = if g < exon.genomic_start {
            exon.genomic_start
        } else {
            exon.genomic_end
        };
        let anchor_off = self.genome_to_tx_offset(anchor_g)?;
        Ok((anchor_off, self.intron_offset(g, k)))
    }

    /// Convert a transcript offset (0-based, exonic) to an HGVS cDNA
    /// position with zero intron offset.
    pub fn tx_offset_to_cdna_pos(&self, off: TxOffset) -> CdnaPos {
        self.tx_offset_to_cdna_pos_with_intron(off, 0)
    }

    /// Convert a transcript offset plus an intronic delta to an HGVS cDNA
    /// position.
    pub fn tx_offset_to_cdna_pos_with_intron(&self, off: TxOffset, intron_offset: i64) -> CdnaPos {
        if !self.transcript.is_coding() {
            // n. numbering: 1-based from the first transcribed base, no
            // negative/starred zones.
            return CdnaPos {
                base: off + 1,
                offset: if intron_offset == 0 {
                    None
                } else {
                    Some(intron_offset)
                },
                anchor: CdnaAnchor::Start,
            };
        }

        let cds_start_off = self
            .transcript
            .ref_cds_start
            .saturating_sub(1)
            .max(0);
        // First tx offset past the last CDS base (`c.*1`), cached at
        // construction from `cds_end`'s own transcript offset (see the
        // `cds_end_off_exclusive` field doc): this is robust to introns
        // falling inside the CDS span, unlike a `cds_end - cds_start`
        // genomic-distance computation.
        let cds_end_off_exclusive = self.cds_end_off_exclusive.unwrap_or(cds_start_off);

        if off < cds_start_off {
            CdnaPos {
                base: off - cds_start_off,
                offset: if intron_offset == 0 {
                    None
                } else {
                    Some(intron_offset)
                },
                anchor: CdnaAnchor::Start,
            }
        } else if off < cds_end_off_exclusive {
            CdnaPos {
                base: off - cds_start_off + 1,
                offset: if intron_offset == 0 {
                    None
                } else {
                    Some(intron_offset)
                },
                anchor: CdnaAnchor::Start,
            }
        } else {
            CdnaPos {
                base: off - cds_end_off_exclusive + 1,
                offset: if intron_offset == 0 {
                    None
                } else {
                    Some(intron_offset)
                },
                anchor: CdnaAnchor::End,
            }
        }
    }

    /// Convenience: genomic position directly to cDNA position, intron-aware.
    pub fn genome_to_cdna_pos(&self, g: i64) -> Result<CdnaPos, Error> {
        let (anchor_off, intron_off) = self.genome_to_tx_offset_with_intron(g)?;
        Ok(self.tx_offset_to_cdna_pos_with_intron(anchor_off, intron_off))
    }
}
