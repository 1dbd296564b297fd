//! Annotation Dispatcher (§4.4): the top-level `annotate()` entry point.
//!
//! Grounded on `mapper::variant::Mapper`'s top-level dispatch-by-variant-
//! shape pattern (`g_to_t` matching on `HgvsVariant::{TxVariant, CdsVariant}`
//! and delegating to `n_to_g`/`c_to_g`), generalized from "which coordinate
//! system" to "which transcript region", and logged the same way
//! (`log::{debug, warn}`, matching `mapper/variant.rs`'s use of the `log`
//! crate). `Dispatcher` holds the two consumed external providers plus the
//! protein-effect builder it delegates exonic CDS changes to, exactly the
//! role `data::interface::Provider` plays for the teacher, split into three
//! narrower seams (§6).

use std::sync::Arc;

use log::{debug, warn};
use rayon::prelude::*;

use crate::config::Config;
use crate::coords::Projector;
use crate::error::Error;
use crate::external::{ExonicChangeCall, IntervalIndexProvider, ProteinEffectBuilder, ReferenceDataProvider};
use crate::hgvs_location;
use crate::model::{Annotation, ConsequenceTag, GenomeChange, Transcript, TranscriptRef};
use crate::normalize::normalize_in_exon;
use crate::region::Classifier;

/// Per-transcript, per-variant annotation engine (§4.4).
///
/// `annotate` takes `&self` only and never mutates shared state (§5, §9
/// "mutable shared state removed"), so callers may invoke it concurrently
/// from a `rayon` pool exactly as `varfish-server-worker` does for its own
/// per-variant work.
pub struct Dispatcher {
    index: Arc<dyn IntervalIndexProvider>,
    reference: Arc<dyn ReferenceDataProvider>,
    protein_builder: Arc<dyn ProteinEffectBuilder>,
    config: Config,
}

impl Dispatcher {
    pub fn new(
        index: Arc<dyn IntervalIndexProvider>,
        reference: Arc<dyn ReferenceDataProvider>,
        protein_builder: Arc<dyn ProteinEffectBuilder>,
        config: Config,
    ) -> Self {
        Self {
            index,
            reference,
            protein_builder,
            config,
        }
    }

    /// Annotate one genome change against every transcript overlapping it
    /// (§4.4 steps 1-4). Never returns an empty list for a variant the
    /// interval index found candidates for (§8 invariant).
    pub fn annotate(&self, change: &GenomeChange) -> Result<Vec<Annotation>, Error> {
        let chrom = change.chromosome;
        if chrom <= 0 {
            return Err(Error::ChromosomeUnknown(chrom));
        }

        let (start, end) = change.genomic_interval();
        let structural = change.is_structural(self.config.structural_variant_threshold as i64);

        let mut candidates = self.index.search(chrom, start, end);
        if structural {
            candidates.extend(self.index.search_large(chrom, start, end));
        }
        debug!(
            "chrom={chrom} start={start} end={end} structural={structural} candidates={}",
            candidates.len()
        );

        if candidates.is_empty() {
            return Ok(self.annotate_no_candidate(chrom, change, structural));
        }

        let mut annotations = Vec::with_capacity(candidates.len());
        for tx_ref in &candidates {
            if structural {
                annotations.push(build_sv_annotation(Some(tx_ref), chrom, change));
                continue;
            }
            match self.reference.transcript(tx_ref) {
                Some(transcript) => match self.annotate_against_transcript(&transcript, tx_ref, change) {
                    Ok(annotation) => annotations.push(annotation),
                    // §7 policy: a per-candidate `TranscriptDatabaseInconsistent`
                    // is tagged into the output list, not bubbled up — it must
                    // not abort annotation of sibling candidates. Other errors
                    // (e.g. a `ProjectionOutOfRange` that should be unreachable
                    // given the containment this call path already guarantees)
                    // are genuine bugs and propagate to the caller.
                    Err(Error::TranscriptDatabaseInconsistent { accession, detail }) => {
                        warn!("{accession}: transcript database inconsistent: {detail}");
                        annotations.push(Annotation::new(
                            Some(tx_ref.clone()),
                            format!("{accession}: {detail}"),
                            ConsequenceTag::Error,
                        ));
                    }
                    Err(other) => return Err(other),
                },
                None => {
                    warn!(
                        "transcript {} listed by interval index but missing from reference data provider",
                        tx_ref.accession
                    );
                    annotations.push(Annotation::new(
                        Some(tx_ref.clone()),
                        format!("{}:?", tx_ref.accession),
                        ConsequenceTag::Error,
                    ));
                }
            }
        }

        if annotations.is_empty() {
            return Err(Error::AnnotationEmpty);
        }
        Ok(annotations)
    }

    /// Annotate many changes in parallel via `rayon` (§5.1): `annotate` takes
    /// only `&self` and touches no shared mutable state, so a `Dispatcher`
    /// wrapped in an `Arc` can be driven by a `rayon` thread pool exactly as
    /// `varfish-server-worker` drives its own per-variant work.
    pub fn annotate_many(&self, changes: &[GenomeChange]) -> Vec<Result<Vec<Annotation>, Error>> {
        changes.par_iter().map(|change| self.annotate(change)).collect()
    }

    /// §4.4 step 3: no transcript overlaps the change at all.
    fn annotate_no_candidate(&self, chrom: i32, change: &GenomeChange, structural: bool) -> Vec<Annotation> {
        if structural {
            debug!("chrom={chrom}: structural, no candidate -> null-transcript SV annotation");
            return vec![build_sv_annotation(None, chrom, change)];
        }

        let pos = change.position;
        let mut out = Vec::new();
        if let Some(tr) = self.index.left_neighbor(chrom, pos) {
            if let Some(annotation) = self.neighbor_annotation(&tr, pos) {
                out.push(annotation);
            }
        }
        if let Some(tr) = self.index.right_neighbor(chrom, pos) {
            if let Some(annotation) = self.neighbor_annotation(&tr, pos) {
                out.push(annotation);
            }
        }
        if out.is_empty() {
            debug!("chrom={chrom} pos={pos}: no near neighbor -> intergenic");
            out.push(Annotation::new(
                None,
                format!("INTERGENIC:g.{pos}"),
                ConsequenceTag::Intergenic,
            ));
        }
        out
    }

    /// Upstream/downstream check against one flanking transcript, strand-aware.
    fn neighbor_annotation(&self, tr: &TranscriptRef, pos: i64) -> Option<Annotation> {
        let transcript = self.reference.transcript(tr)?;
        let projector = Projector::new(&transcript);
        let classifier = Classifier::new(&projector, &self.config);
        let tag = if classifier.lies_in_upstream(pos) {
            ConsequenceTag::Upstream
        } else if classifier.lies_in_downstream(pos) {
            ConsequenceTag::Downstream
        } else {
            return None;
        };
        debug!("{}: {tag} neighbor of pos={pos}", transcript.accession);
        Some(Annotation::new(
            Some(tr.clone()),
            format!("{}:g.{pos}", transcript.accession),
            tag,
        ))
    }

    /// §4.4 step 4 (non-structural branch): classify against one transcript's
    /// exon/intron/UTR/CDS structure, splice check first.
    fn annotate_against_transcript(
        &self,
        transcript: &Arc<Transcript>,
        tx_ref: &TranscriptRef,
        change: &GenomeChange,
    ) -> Result<Annotation, Error> {
        let projector = Projector::new(transcript);
        let classifier = Classifier::new(&projector, &self.config);
        let normalized = normalize_in_exon(&projector, change);
        let (start, end) = normalized.genomic_interval();
        let coding = transcript.is_coding();

        let text_of = |change: &GenomeChange| hgvs_location::render_hgvs_text(transcript, &projector, change);

        if classifier.overlaps_with_splicing(start, end) {
            let tag = if coding {
                ConsequenceTag::Splicing
            } else {
                ConsequenceTag::NcrnaSplicing
            };
            debug!("{}: {tag}", transcript.accession);
            return Ok(Annotation::new(Some(tx_ref.clone()), text_of(&normalized)?, tag));
        }

        if !classifier.overlaps_with_exon(start, end) {
            let tag = if coding {
                ConsequenceTag::Intronic
            } else {
                ConsequenceTag::NcrnaIntronic
            };
            debug!("{}: {tag}", transcript.accession);
            return Ok(Annotation::new(Some(tx_ref.clone()), text_of(&normalized)?, tag));
        }

        if !coding {
            debug!("{}: NCRNA_EXONIC", transcript.accession);
            return Ok(Annotation::new(
                Some(tx_ref.clone()),
                text_of(&normalized)?,
                ConsequenceTag::NcrnaExonic,
            ));
        }

        // Exonic, coding transcript: CDS takes precedence over UTR when the
        // change touches any CDS base at all (spec.md §4.4 step 2 "else
        // exonic" catch-all for boundary-spanning changes).
        if classifier.overlaps_with_cds(start, end) {
            return self.annotate_exonic_cds(transcript, tx_ref, &projector, &normalized);
        }
        if classifier.overlaps_with_5utr(start, end) {
            debug!("{}: UTR5", transcript.accession);
            return Ok(Annotation::new(
                Some(tx_ref.clone()),
                text_of(&normalized)?,
                ConsequenceTag::Utr5,
            ));
        }
        if classifier.overlaps_with_3utr(start, end) {
            debug!("{}: UTR3", transcript.accession);
            return Ok(Annotation::new(
                Some(tx_ref.clone()),
                text_of(&normalized)?,
                ConsequenceTag::Utr3,
            ));
        }

        // Unreachable for a well-formed transcript: every exonic base of a
        // coding transcript lies in exactly one of 5'UTR/CDS/3'UTR (§3
        // invariant). A transcript violating that invariant is a data bug,
        // not a caller error.
        Err(Error::TranscriptDatabaseInconsistent {
            accession: transcript.accession.clone(),
            detail: format!("exonic position [{start}, {end}] classified in none of 5'UTR/CDS/3'UTR"),
        })
    }

    /// §4.4 step 3 (terminal case): delegate an exonic CDS change to the
    /// external protein-effect builder.
    fn annotate_exonic_cds(
        &self,
        transcript: &Arc<Transcript>,
        tx_ref: &TranscriptRef,
        projector: &Projector,
        change: &GenomeChange,
    ) -> Result<Annotation, Error> {
        let (start, end) = change.genomic_interval();
        let (exon_number, _) = projector.locate_exon(start)?;

        let start_cdna = projector.genome_to_cdna_pos(start)?;
        let rvarstart = start_cdna.base - 1;
        let rvarend = if change.is_insertion() {
            None
        } else {
            Some(projector.genome_to_cdna_pos(end)?.base - 1)
        };
        let frame_start = rvarstart.rem_euclid(3) as u8;

        let wt_codon = match self.reference.wt_codon_at(transcript, rvarstart, frame_start) {
            Some(codon) => codon,
            None => {
                warn!(
                    "{}: missing wild-type codon at cdna offset {rvarstart}",
                    transcript.accession
                );
                return Ok(Annotation::new(
                    Some(tx_ref.clone()),
                    format!("{}: missing reference codon", transcript.accession),
                    ConsequenceTag::Error,
                ));
            }
        };
        let wt_codon_after = self
            .reference
            .wt_codon_after(transcript, rvarstart, frame_start)
            .unwrap_or([b'N'; 3]);

        let (reference, alternate) = if transcript.strand.is_plus() {
            (change.reference.clone(), change.alternate.clone())
        } else {
            (revcomp_allele(&change.reference), revcomp_allele(&change.alternate))
        };

        debug!(
            "{}: exonic CDS at rvarstart={rvarstart}, delegating to protein-effect builder",
            transcript.accession
        );
        Ok(self.protein_builder.build(ExonicChangeCall {
            transcript: transcript.clone(),
            frame_start,
            wt_codon,
            wt_codon_after,
            reference,
            alternate,
            rvarstart,
            rvarend,
            exon_number,
        }))
    }
}

fn revcomp_allele(allele: &str) -> String {
    if allele == GenomeChange::DELETED_MARKER {
        return allele.to_string();
    }
    String::from_utf8(crate::sequences::revcomp(allele.as_bytes())).unwrap_or_else(|_| allele.to_string())
}

enum SvShape {
    Insertion,
    Deletion,
    Substitution,
    Inversion,
}

fn classify_sv(change: &GenomeChange) -> SvShape {
    if change.is_insertion() {
        SvShape::Insertion
    } else if change.is_deletion() {
        SvShape::Deletion
    } else if change.reference.len() == change.alternate.len()
        && crate::sequences::revcomp(change.reference.as_bytes()) == change.alternate.as_bytes()
    {
        SvShape::Inversion
    } else {
        SvShape::Substitution
    }
}

/// Abbreviated allele text for structural-variant formats: `"<alt[0:2]>..<alt[-2:]>"`
/// unconditionally per §6, falling back to the literal text only when the
/// allele is too short for that slicing to even be well-formed.
fn abbreviate(seq: &str) -> String {
    if seq.len() < 2 {
        seq.to_string()
    } else {
        format!("{}..{}", &seq[0..2], &seq[seq.len() - 2..])
    }
}

/// Builds the structural-variant textual annotation (§6 "Structural-variant
/// textual forms"). `transcript_ref` is `None` for the null-transcript
/// no-candidate path, `Some` for a matched candidate — only the inversion
/// form actually needs the transcript's accession; the other three shapes
/// are expressed at the chromosome level, falling back to `"INTERGENIC"`
/// only when no candidate matched at all.
fn build_sv_annotation(transcript_ref: Option<&TranscriptRef>, chrom: i32, change: &GenomeChange) -> Annotation {
    let (start, end) = change.genomic_interval();
    let prefix = match transcript_ref {
        Some(_) => chrom.to_string(),
        None => "INTERGENIC".to_string(),
    };

    match classify_sv(change) {
        SvShape::Inversion => match transcript_ref {
            Some(tr) => Annotation::new(
                Some(tr.clone()),
                format!("{}:g.{start}_{end}inv", tr.accession),
                ConsequenceTag::SvInversion,
            ),
            // §9: inversion with no matched transcript is unreachable in the
            // source (it dereferences a null transcript); here it is an
            // explicit error rather than a crash.
            None => Annotation::new(
                None,
                format!("ERROR:g.{start}_{end}inv: no transcript for inversion breakpoint"),
                ConsequenceTag::Error,
            ),
        },
        SvShape::Insertion => Annotation::new(
            transcript_ref.cloned(),
            format!("{prefix}:g.{}_{}ins{}", change.position, change.position + 1, abbreviate(&change.alternate)),
            ConsequenceTag::SvInsertion,
        ),
        SvShape::Deletion => Annotation::new(
            transcript_ref.cloned(),
            format!("{prefix}:g.{start}_{end}del"),
            ConsequenceTag::SvDeletion,
        ),
        SvShape::Substitution => Annotation::new(
            transcript_ref.cloned(),
            format!("{prefix}:g.{start}_{end}delins{}", abbreviate(&change.alternate)),
            ConsequenceTag::SvSubstitution,
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Exon, Strand};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeIndex {
        hits: Vec<TranscriptRef>,
        left: Option<TranscriptRef>,
        right: Option<TranscriptRef>,
    }

    impl IntervalIndexProvider for FakeIndex {
        fn search(&self, _chrom: i32, _start: i64, _end: i64) -> Vec<TranscriptRef> {
            self.hits.clone()
        }
        fn search_large(&self, _chrom: i32, _start: i64, _end: i64) -> Vec<TranscriptRef> {
            self.hits.clone()
        }
        fn left_neighbor(&self, _chrom: i32, _pos: i64) -> Option<TranscriptRef> {
            self.left.clone()
        }
        fn right_neighbor(&self, _chrom: i32, _pos: i64) -> Option<TranscriptRef> {
            self.right.clone()
        }
    }

    struct FakeReference {
        transcripts: HashMap<String, Arc<Transcript>>,
    }

    impl ReferenceDataProvider for FakeReference {
        fn transcript(&self, tx: &TranscriptRef) -> Option<Arc<Transcript>> {
            self.transcripts.get(&tx.accession).cloned()
        }
        fn wt_codon_at(&self, _tx: &Transcript, _cdna_offset: i64, _frame: u8) -> Option<[u8; 3]> {
            Some([b'A', b'T', b'G'])
        }
        fn wt_codon_after(&self, _tx: &Transcript, _cdna_offset: i64, _frame: u8) -> Option<[u8; 3]> {
            Some([b'C', b'C', b'C'])
        }
    }

    struct RecordingProteinBuilder {
        calls: Mutex<Vec<ExonicChangeCall>>,
    }

    impl ProteinEffectBuilder for RecordingProteinBuilder {
        fn build(&self, call: ExonicChangeCall) -> Annotation {
            let accession = call.transcript.accession.clone();
            self.calls.lock().unwrap().push(call);
            Annotation::new(
                Some(TranscriptRef::new(accession.clone())),
                format!("{accession}:p.?"),
                ConsequenceTag::Missense,
            )
        }
    }

    fn coding_tx(accession: &str) -> Transcript {
        Transcript {
            accession: accession.to_string(),
            chromosome: 1,
            strand: Strand::Plus,
            tx_start: 1,
            tx_end: 1000,
            cds_start: Some(150),
            cds_end: Some(850),
            exons: vec![
                Exon {
                    genomic_start: 1,
                    genomic_end: 500,
                },
                Exon {
                    genomic_start: 600,
                    genomic_end: 1000,
                },
            ],
            mrna_sequence: vec![b'A'; 900],
            ref_cds_start: 150,
        }
    }

    fn dispatcher_for(tx: Transcript, hits: Vec<TranscriptRef>) -> (Dispatcher, Arc<RecordingProteinBuilder>) {
        let accession = tx.accession.clone();
        let mut transcripts = HashMap::new();
        transcripts.insert(accession, Arc::new(tx));
        let builder = Arc::new(RecordingProteinBuilder {
            calls: Mutex::new(Vec::new()),
        });
        let dispatcher = Dispatcher::new(
            Arc::new(FakeIndex {
                hits,
                left: None,
                right: None,
            }),
            Arc::new(FakeReference { transcripts }),
            builder.clone(),
            Config::default(),
        );
        (dispatcher, builder)
    }

    #[test]
    fn intronic_between_exons() {
        let tx = coding_tx("NM_TEST.1");
        let (dispatcher, _) = dispatcher_for(tx, vec![TranscriptRef::new("NM_TEST.1")]);
        let change = GenomeChange {
            chromosome: 1,
            position: 550,
            reference: "A".to_string(),
            alternate: "G".to_string(),
        };
        let annotations = dispatcher.annotate(&change).unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].consequence_tag, ConsequenceTag::Intronic);
    }

    #[test]
    fn splicing_takes_priority_over_intronic() {
        let tx = coding_tx("NM_TEST.1");
        let (dispatcher, _) = dispatcher_for(tx, vec![TranscriptRef::new("NM_TEST.1")]);
        // 2 bases past exon 0's end (501, 502) is the donor dinucleotide.
        let change = GenomeChange {
            chromosome: 1,
            position: 501,
            reference: "A".to_string(),
            alternate: "G".to_string(),
        };
        let annotations = dispatcher.annotate(&change).unwrap();
        assert_eq!(annotations[0].consequence_tag, ConsequenceTag::Splicing);
    }

    #[test]
    fn utr5_classification() {
        let tx = coding_tx("NM_TEST.1");
        let (dispatcher, _) = dispatcher_for(tx, vec![TranscriptRef::new("NM_TEST.1")]);
        let change = GenomeChange {
            chromosome: 1,
            position: 50,
            reference: "A".to_string(),
            alternate: "G".to_string(),
        };
        let annotations = dispatcher.annotate(&change).unwrap();
        assert_eq!(annotations[0].consequence_tag, ConsequenceTag::Utr5);
    }

    #[test]
    fn exonic_cds_delegates_to_protein_builder() {
        let tx = coding_tx("NM_TEST.1");
        let (dispatcher, builder) = dispatcher_for(tx, vec![TranscriptRef::new("NM_TEST.1")]);
        let change = GenomeChange {
            chromosome: 1,
            position: 200,
            reference: "A".to_string(),
            alternate: "G".to_string(),
        };
        let annotations = dispatcher.annotate(&change).unwrap();
        assert_eq!(annotations[0].consequence_tag, ConsequenceTag::Missense);
        assert_eq!(builder.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn structural_deletion_with_no_candidate_is_intergenic() {
        let tx = coding_tx("NM_TEST.1");
        let (dispatcher, _) = dispatcher_for(tx, vec![]);
        let change = GenomeChange {
            chromosome: 1,
            position: 5000,
            reference: "A".repeat(1500),
            alternate: "-".to_string(),
        };
        let annotations = dispatcher.annotate(&change).unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].consequence_tag, ConsequenceTag::SvDeletion);
        assert_eq!(annotations[0].hgvs_text, "INTERGENIC:g.5000_6499del");
    }

    #[test]
    fn non_structural_no_candidate_is_intergenic() {
        let tx = coding_tx("NM_TEST.1");
        let (dispatcher, _) = dispatcher_for(tx, vec![]);
        let change = GenomeChange {
            chromosome: 1,
            position: 50_000,
            reference: "A".to_string(),
            alternate: "G".to_string(),
        };
        let annotations = dispatcher.annotate(&change).unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].consequence_tag, ConsequenceTag::Intergenic);
    }

    #[test]
    fn unknown_chromosome_errors() {
        let tx = coding_tx("NM_TEST.1");
        let (dispatcher, _) = dispatcher_for(tx, vec![]);
        let change = GenomeChange {
            chromosome: 0,
            position: 1,
            reference: "A".to_string(),
            alternate: "G".to_string(),
        };
        assert!(matches!(
            dispatcher.annotate(&change),
            Err(Error::ChromosomeUnknown(0))
        ));
    }
}
