//! Crate-wide error taxonomy (§7).
//!
//! The teacher splits errors across `data::error`, `mapper::error`,
//! `normalizer`'s inline `mod error`, `validator::error` and `parser::error`
//! because `hgvs-rs` exposes five independently usable subsystems. This
//! crate's modules are only useful together, behind the dispatcher, so their
//! errors are folded into the single taxonomy §7 names explicitly.

use thiserror::Error;

/// Errors the dispatcher can return to its caller, or tag into an annotation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Top-level: the chromosome named by a variant is not known to the
    /// engine. Bubbles up to the caller (§7 policy), aborts annotation of
    /// this variant.
    #[error("unknown chromosome: {0}")]
    ChromosomeUnknown(i32),

    /// The engine reached the end of processing with zero annotations for a
    /// variant that had overlapping transcripts. Indicates a dispatcher bug;
    /// never expected to surface in practice (§8 invariant).
    #[error("annotation list unexpectedly empty for a variant with candidate transcripts")]
    AnnotationEmpty,

    /// A transcript's declared mRNA length or CDS start is inconsistent with
    /// its sequence. Recovered locally: the caller receives one `ERROR`
    /// annotation for the offending transcript and processing continues with
    /// other candidates (§7 policy).
    #[error("transcript database inconsistent for {accession}: {detail}")]
    TranscriptDatabaseInconsistent { accession: String, detail: String },

    /// Internal: a genomic position fell outside `[tx_start, tx_end]`.
    /// Contexts that already guarantee containment must treat this as a
    /// programmer error rather than propagate it (§4.1, §9).
    #[error("position {position} outside transcript {accession} [{tx_start}, {tx_end}]")]
    ProjectionOutOfRange {
        accession: String,
        position: i64,
        tx_start: i64,
        tx_end: i64,
    },
}

/// Panics with the same message `ProjectionOutOfRange` would carry, for call
/// sites that already guarantee containment (§9 "exceptions for impossible
/// paths" — mirrors the teacher's `.expect(...)` style in
/// `mapper/alignment.rs`).
pub(crate) fn bug_projection_out_of_range(accession: &str, position: i64) -> ! {
    panic!("Bug: position {position} claimed to be inside transcript {accession} but projection failed");
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_messages_name_the_tag() {
        let err = Error::ChromosomeUnknown(99);
        assert_eq!(err.to_string(), "unknown chromosome: 99");

        let err = Error::TranscriptDatabaseInconsistent {
            accession: "NM_000001.1".to_string(),
            detail: "cds_start beyond mrna length".to_string(),
        };
        assert!(err.to_string().contains("NM_000001.1"));
    }
}
