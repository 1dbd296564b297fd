//! HGVS Location Builder (§4.5): renders the `accession:exonK` location
//! string and the `c.`/`n.` DNA change string for a normalized genome
//! change against one transcript.
//!
//! The teacher's equivalent lives in `parser::display` (`Display` impls for
//! a generic HGVS AST covering every variant type HGVS defines). This crate
//! only ever constructs the six variant shapes §3 names, so `render_*`
//! builds the strings directly from a [`GenomeChange`] and a
//! [`Projector`] rather than through an intermediate AST.

use crate::coords::Projector;
use crate::error::Error;
use crate::model::{CdnaAnchor, CdnaPos, GenomeChange, Transcript};

/// Render a single cDNA position: bare integer for exonic positions
/// (`123`, `-5`, `*10`), anchor-plus-offset for intronic ones (`123+4`,
/// `*10-2`).
fn render_cdna_pos(pos: &CdnaPos) -> String {
    let anchored = match pos.anchor {
        CdnaAnchor::Start => pos.base.to_string(),
        CdnaAnchor::End => format!("*{}", pos.base),
    };
    match pos.offset {
        Some(offset) if offset > 0 => format!("{anchored}+{offset}"),
        // A negative offset already carries its own '-' sign.
        Some(offset) => format!("{anchored}{offset}"),
        None => anchored,
    }
}

/// Location string: `"<accession>:exon<k+1>"` if both endpoints of the
/// change fall in the same exon, else just `"<accession>"`.
pub fn render_location(transcript: &Transcript, projector: &Projector, change: &GenomeChange) -> String {
    let (start, end) = change.genomic_interval();
    let same_exon = match (projector.locate_exon(start), projector.locate_exon(end)) {
        (Ok((k1, false)), Ok((k2, false))) if k1 == k2 => Some(k1),
        _ => None,
    };
    match same_exon {
        Some(k) => format!("{}:exon{}", transcript.accession, k + 1),
        None => transcript.accession.clone(),
    }
}

/// DNA string: `"c."`/`"n."` followed by the position expression for
/// insertion, SNV, or multi-base changes (§4.5).
pub fn render_dna_change(
    transcript: &Transcript,
    projector: &Projector,
    change: &GenomeChange,
) -> Result<String, Error> {
    let prefix = if transcript.is_coding() { 'c' } else { 'n' };
    let (start, end) = change.genomic_interval();

    if change.is_insertion() {
        // Zero-length ref interval: the flanking base before the insertion
        // (on the transcript's strand) renders on the left, its neighbor on
        // the right — the inverted order spec.md §4.5 calls out explicitly.
        let last = projector.genome_to_cdna_pos(end)?;
        let first = projector.genome_to_cdna_pos(start)?;
        Ok(format!(
            "{prefix}.{}_{}",
            render_cdna_pos(&last),
            render_cdna_pos(&first)
        ))
    } else if start == end {
        let pos = projector.genome_to_cdna_pos(start)?;
        Ok(format!("{prefix}.{}", render_cdna_pos(&pos)))
    } else {
        let first = projector.genome_to_cdna_pos(start)?;
        let last = projector.genome_to_cdna_pos(end)?;
        Ok(format!(
            "{prefix}.{}_{}",
            render_cdna_pos(&first),
            render_cdna_pos(&last)
        ))
    }
}

/// Full `hgvs_text` for an [`crate::model::Annotation`]: the location
/// string and the DNA change string, joined with `:`.
pub fn render_hgvs_text(
    transcript: &Transcript,
    projector: &Projector,
    change: &GenomeChange,
) -> Result<String, Error> {
    let location = render_location(transcript, projector, change);
    let dna = render_dna_change(transcript, projector, change)?;
    Ok(format!("{location}:{dna}"))
}


/// §8 seed-test table: a minus-strand transcript positioned such that c.7339
/// sits at g.217680 and the stop codon boundary falls between exons, so that
/// both the `+k`/`-k` intron-offset sign convention and the `c.-k`/`c.*k`
/// UTR anchors get exercised end to end on a strand where "ascending c. ->
/// descending g." actually has to hold across an intron. The exons are
/// deliberately 1bp where the table only cares about one base's
/// classification (c.7339's flanking donor/acceptor bases, c.*1's own
/// boundary) and one large padding exon supplies the remaining CDS length.
///
/// The DNA string this engine renders never carries allele letters (§4.5:
/// `"c.<pos>"`, no `G>A`), so only the position half of each seed row is
/// reproduced here; the nucleotide identities in the table are the
/// responsibility of the (out of scope) protein/allele-level callers.
#[cfg(test)]
mod seed_table {
    use super::*;
    use crate::model::{Exon, Strand, Transcript};
    use rstest::rstest;

    fn minus_strand_seed_transcript() -> Transcript {
        Transcript {
            accession: "NM_SEED.1".to_string(),
            chromosome: 1,
            strand: Strand::Minus,
            tx_start: 203_186,
            tx_end: 436_967,
            // Genomic-ascending bounds regardless of strand (§3): the
            // translation stop sits at the genomic minimum on the minus
            // strand, the translation start at the genomic maximum.
            cds_start: Some(217_680),
            cds_end: Some(307_337),
            exons: vec![
                Exon {
                    genomic_start: 203_186,
                    genomic_end: 203_186,
                },
                Exon {
                    genomic_start: 217_680,
                    genomic_end: 217_680,
                },
                Exon {
                    genomic_start: 300_000,
                    genomic_end: 307_337,
                },
                Exon {
                    genomic_start: 436_967,
                    genomic_end: 436_967,
                },
            ],
            mrna_sequence: vec![b'A'; 7341],
            ref_cds_start: 2,
        }
    }

    #[rstest]
    #[case::last_cds_base(217_680, "c.7339")]
    #[case::donor_side_intron(217_679, "c.7339+1")]
    #[case::acceptor_side_intron(217_681, "c.7339-1")]
    #[case::utr5_last_base(436_967, "c.-1")]
    #[case::first_utr3_base(203_186, "c.*1")]
    #[case::utr3_intron_offset(203_187, "c.*1-1")]
    fn minus_strand_cdna_positions(#[case] genomic: i64, #[case] expected: &str) {
        let tx = minus_strand_seed_transcript();
        let projector = Projector::new(&tx);
        let change = GenomeChange {
            chromosome: 1,
            position: genomic,
            reference: "N".to_string(),
            alternate: "N".to_string(),
        };
        assert_eq!(render_dna_change(&tx, &projector, &change).unwrap(), expected);
    }
}
