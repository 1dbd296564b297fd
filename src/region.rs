//! Region Classifier (§4.2): point/interval predicates over a transcript's
//! exon/intron/UTR/CDS/splice/flank structure.
//!
//! Not a standalone component in the teacher — `hgvs-rs` inlines the
//! equivalent exon/CDS bound arithmetic into `mapper::alignment` and
//! `normalizer.rs`. Built fresh per spec.md §4.2, reusing [`crate::coords::Projector`]
//! for exon lookup the same way the teacher's `pos_n_to_c` reuses CDS bounds,
//! and driven by the splice-window constants from [`crate::config::Config`].

use crate::config::Config;
use crate::coords::Projector;
use crate::model::Transcript;

/// Classifies genomic positions and intervals against one transcript.
pub struct Classifier<'a, 't> {
    projector: &'a Projector<'t>,
    config: &'a Config,
}

impl<'a, 't> Classifier<'a, 't> {
    pub fn new(projector: &'a Projector<'t>, config: &'a Config) -> Self {
        Self { projector, config }
    }

    fn transcript(&self) -> &'t Transcript {
        self.projector.transcript()
    }

    pub fn lies_in_exon(&self, p: i64) -> bool {
        self.transcript().exons.iter().any(|e| e.contains(p))
    }

    pub fn lies_in_cds(&self, p: i64) -> bool {
        match (self.transcript().cds_start, self.transcript().cds_end) {
            (Some(s), Some(e)) => self.lies_in_exon(p) && p >= s && p <= e,
            _ => false,
        }
    }

    pub fn lies_in_5utr(&self, p: i64) -> bool {
        match self.transcript().cds_start {
            Some(s) => {
                self.lies_in_exon(p)
                    && if self.transcript().strand.is_plus() {
                        p < s
                    } else {
                        p > self.transcript().cds_end.unwrap_or(s)
                    }
            }
            None => false,
        }
    }

    pub fn lies_in_3utr(&self, p: i64) -> bool {
        match self.transcript().cds_end {
            Some(e) => {
                self.lies_in_exon(p)
                    && if self.transcript().strand.is_plus() {
                        p > e
                    } else {
                        p < self.transcript().cds_start.unwrap_or(e)
                    }
            }
            None => false,
        }
    }

    /// The 3'-adjacent-to-an-exon intronic window on the transcript's strand
    /// (donor), for each exon boundary that actually has a downstream intron.
    fn donor_window(&self, exon_idx: usize) -> Option<(i64, i64)> {
        let exons = &self.transcript().exons;
        let plus = self.transcript().strand.is_plus();
        let len = self.config.splice_donor_len as i64;
        if plus {
            if exon_idx + 1 >= exons.len() {
                return None;
            }
            let end = exons[exon_idx].genomic_end;
            Some((end + 1, end + len))
        } else {
            if exon_idx == 0 {
                return None;
            }
            let start = exons[exon_idx].genomic_start;
            Some((start - len, start - 1))
        }
    }

    /// The 5'-adjacent-to-an-exon intronic window on the transcript's strand
    /// (acceptor).
    fn acceptor_window(&self, exon_idx: usize) -> Option<(i64, i64)> {
        let exons = &self.transcript().exons;
        let plus = self.transcript().strand.is_plus();
        let len = self.config.splice_acceptor_len as i64;
        if plus {
            if exon_idx == 0 {
                return None;
            }
            let start = exons[exon_idx].genomic_start;
            Some((start - len, start - 1))
        } else {
            if exon_idx + 1 >= exons.len() {
                return None;
            }
            let end = exons[exon_idx].genomic_end;
            Some((end + 1, end + len))
        }
    }

    pub fn lies_in_splice_donor(&self, p: i64) -> bool {
        (0..self.transcript().exons.len()).any(|k| {
            self.donor_window(k)
                .is_some_and(|(lo, hi)| p >= lo && p <= hi)
        })
    }

    pub fn lies_in_splice_acceptor(&self, p: i64) -> bool {
        (0..self.transcript().exons.len()).any(|k| {
            self.acceptor_window(k)
                .is_some_and(|(lo, hi)| p >= lo && p <= hi)
        })
    }

    /// The broader splice region: `splice_region_exonic_len` exonic bases at
    /// the boundary plus `splice_region_intronic_len` intronic bases beyond
    /// the donor/acceptor dinucleotide (§4.2).
    pub fn lies_in_splice_region(&self, p: i64) -> bool {
        let exons = &self.transcript().exons;
        let exonic_len = self.config.splice_region_exonic_len as i64;
        let intronic_len = self.config.splice_region_intronic_len as i64;
        for (k, exon) in exons.iter().enumerate() {
            // Exonic side, adjacent to a donor or acceptor.
            if self.donor_window(k).is_some() {
                let (near, far) = if self.transcript().strand.is_plus() {
                    (exon.genomic_end - exonic_len + 1, exon.genomic_end)
                } else {
                    (exon.genomic_start, exon.genomic_start + exonic_len - 1)
                };
                if p >= near && p <= far {
                    return true;
                }
            }
            if self.acceptor_window(k).is_some() {
                let (near, far) = if self.transcript().strand.is_plus() {
                    (exon.genomic_start, exon.genomic_start + exonic_len - 1)
                } else {
                    (exon.genomic_end - exonic_len + 1, exon.genomic_end)
                };
                if p >= near && p <= far {
                    return true;
                }
            }

            // Intronic side, beyond the donor/acceptor dinucleotide.
            if let Some((lo, hi)) = self.donor_window(k) {
                let ext_lo = lo;
                let ext_hi = hi + intronic_len;
                if p >= ext_lo && p <= ext_hi {
                    return true;
                }
            }
            if let Some((lo, hi)) = self.acceptor_window(k) {
                let ext_lo = lo - intronic_len;
                let ext_hi = hi;
                if p >= ext_lo && p <= ext_hi {
                    return true;
                }
            }
        }
        false
    }

    pub fn lies_in_upstream(&self, p: i64) -> bool {
        let d = self.config.near_gene_distance as i64;
        if self.transcript().strand.is_plus() {
            p < self.transcript().tx_start && p >= self.transcript().tx_start - d
        } else {
            p > self.transcript().tx_end && p <= self.transcript().tx_end + d
        }
    }

    pub fn lies_in_downstream(&self, p: i64) -> bool {
        let d = self.config.near_gene_distance as i64;
        if self.transcript().strand.is_plus() {
            p > self.transcript().tx_end && p <= self.transcript().tx_end + d
        } else {
            p < self.transcript().tx_start && p >= self.transcript().tx_start - d
        }
    }

    /// True iff any base in `[start, end]` satisfies `pred`.
    fn overlaps(start: i64, end: i64, pred: impl Fn(i64) -> bool) -> bool {
        (start..=end).any(pred)
    }

    pub fn overlaps_with_exon(&self, start: i64, end: i64) -> bool {
        Self::overlaps(start, end, |p| self.lies_in_exon(p))
    }

    pub fn overlaps_with_cds(&self, start: i64, end: i64) -> bool {
        Self::overlaps(start, end, |p| self.lies_in_cds(p))
    }

    pub fn overlaps_with_5utr(&self, start: i64, end: i64) -> bool {
        Self::overlaps(start, end, |p| self.lies_in_5utr(p))
    }

    pub fn overlaps_with_3utr(&self, start: i64, end: i64) -> bool {
        Self::overlaps(start, end, |p| self.lies_in_3utr(p))
    }

    pub fn overlaps_with_splice_donor(&self, start: i64, end: i64) -> bool {
        Self::overlaps(start, end, |p| self.lies_in_splice_donor(p))
    }

    pub fn overlaps_with_splice_acceptor(&self, start: i64, end: i64) -> bool {
        Self::overlaps(start, end, |p| self.lies_in_splice_acceptor(p))
    }

    pub fn overlaps_with_splice_region(&self, start: i64, end: i64) -> bool {
        Self::overlaps(start, end, |p| self.lies_in_splice_region(p))
    }

    /// True iff the interval overlaps any splicing-relevant window (donor,
    /// acceptor, or the broader region). Splice classification takes
    /// priority over plain intronic classification (§4.2 tie-break).
    pub fn overlaps_with_splicing(&self, start: i64, end: i64) -> bool {
        self.overlaps_with_splice_donor(start, end)
            || self.overlaps_with_splice_acceptor(start, end)
            || self.overlaps_with_splice_region(start, end)
    }
}
