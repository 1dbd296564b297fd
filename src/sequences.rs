//! Small sequence utilities carried over from the teacher's `sequences.rs`.
//!
//! Only the pieces the Change Normalizer needs survive: prefix/suffix
//! trimming and reverse-complementing. The teacher's amino-acid translation
//! tables, codon lookups and `build.rs`-generated LUTs are out of scope here
//! (§1: protein-level effects are computed by external builders, not by this
//! crate) and were dropped — see DESIGN.md.

/// Length of the common prefix of `reference` and `alternative`.
pub fn common_prefix_len(reference: &[u8], alternative: &[u8]) -> usize {
    reference
        .iter()
        .zip(alternative.iter())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Length of the common suffix of `reference` and `alternative`, not
/// overlapping any common prefix already consumed.
pub fn common_suffix_len(reference: &[u8], alternative: &[u8]) -> usize {
    let max = reference.len().min(alternative.len());
    reference
        .iter()
        .rev()
        .zip(alternative.iter().rev())
        .take(max)
        .take_while(|(a, b)| a == b)
        .count()
}

/// Reverse-complement a DNA sequence.
pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    bio::alphabets::dna::revcomp(seq)
}
