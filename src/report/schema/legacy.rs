//! Normalization of the legacy annotation schema.
//!
//! Legacy rows carry the VEP CSQ annotation as `;`-packed parallel columns
//! with one element per transcript block; the block picked by the annotation
//! pipeline is marked with `CSQ_PICK == "1"`.

use indexmap::IndexMap;

use super::data::{ClinvarInfo, PackedCalls, RawRecord, TranscriptAnnotation, VariantRecord};
use super::Error;

/// Prefix of the packed per-block CSQ columns.
const CSQ_PREFIX: &str = "extra_vcf_info__CSQ_";

/// Row-to-columnar pivot of the packed CSQ columns of one record.
///
/// Temporary structure, discarded after the picked block is selected.
struct CsqBlocks<'a> {
    n_blocks: usize,
    columns: IndexMap<&'a str, Vec<&'a str>>,
}

impl<'a> CsqBlocks<'a> {
    /// Pivot the CSQ columns of `raw`.
    ///
    /// The block count is the split length of the allele column; a CSQ
    /// column without a value contributes empty strings for all blocks.
    fn new(raw: &'a RawRecord) -> Self {
        let n_blocks = raw
            .get("extra_vcf_info__CSQ_Allele")
            .map(|value| value.split(';').count())
            .unwrap_or(0);
        let mut columns = IndexMap::new();
        for (key, value) in raw.iter() {
            if let Some(name) = key.strip_prefix(CSQ_PREFIX) {
                let cells = if value.is_empty() {
                    vec![""; n_blocks]
                } else {
                    value.split(';').collect()
                };
                columns.insert(name, cells);
            }
        }
        Self { n_blocks, columns }
    }

    /// Value of `column` in block `i`, empty when the column is absent.
    fn get(&self, column: &str, i: usize) -> &'a str {
        self.columns
            .get(column)
            .and_then(|cells| cells.get(i))
            .copied()
            .unwrap_or("")
    }

    /// Index of the single block picked by the annotation pipeline.
    fn picked(&self) -> Option<usize> {
        (0..self.n_blocks).find(|&i| self.get("PICK", i) == "1")
    }
}

/// Normalize a row of the legacy schema.
pub(super) fn normalize(raw: &RawRecord) -> Result<VariantRecord, Error> {
    let id = super::raw_id(raw);
    let mut record = super::base_record(raw)?;

    let blocks = CsqBlocks::new(raw);
    let picked = blocks.picked().ok_or(Error::NoPickedBlock { id })?;

    record.annotation = TranscriptAnnotation {
        symbol: blocks.get("SYMBOL", picked).to_string(),
        transcript: blocks.get("Feature", picked).to_string(),
        refseq: non_empty(blocks.get("MANE_SELECT", picked)),
        hgvs_g: non_empty(blocks.get("HGVSg", picked)),
        hgvs_c: non_empty(last_colon_segment(blocks.get("HGVSc", picked))),
        hgvs_p: non_empty(last_colon_segment(blocks.get("HGVSp", picked))),
        consequence: blocks.get("Consequence", picked).to_string(),
        exon: non_empty(blocks.get("EXON", picked)),
        intron: non_empty(blocks.get("INTRON", picked)),
    };
    record.phenotype.inheritance = record
        .phenotype
        .disease
        .as_deref()
        .and_then(inheritance_from_phenotype);
    record.clinvar = ClinvarInfo {
        id: raw.string("clinvar__id"),
        significance: raw.string("clinvar__sig"),
        ..Default::default()
    };
    record.calls = PackedCalls {
        samples: raw.string("vevatacmg_postaggregator__sample"),
        zygosity: raw.string("vevatacmg_postaggregator__zygosity"),
        allele_depth: raw.string("vevatacmg_postaggregator__ad"),
        total_depth: raw.string("vevatacmg_postaggregator__dp"),
        filter: raw.string("vevatacmg_postaggregator__filter"),
    };

    Ok(record)
}

/// Derive the inheritance mode codes from an OMIM phenotype description.
pub(crate) fn inheritance_from_phenotype(phenotype: &str) -> Option<String> {
    const MODES: [(&str, &str); 4] = [
        ("Autosomal dominant", "AD"),
        ("X-linked dominant", "XD"),
        ("Autosomal recessive", "AR"),
        ("X-linked recessive", "XR"),
    ];
    let mut codes: Vec<&str> = MODES
        .iter()
        .filter(|(name, _)| phenotype.contains(name))
        .map(|(_, code)| *code)
        .collect();
    codes.sort_unstable();
    if codes.is_empty() {
        None
    } else {
        Some(codes.join(","))
    }
}

/// The last `:`-separated segment of an HGVS expression.
fn last_colon_segment(value: &str) -> &str {
    value.rsplit(':').next().unwrap_or(value)
}

/// Convert an empty string to `None`.
fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
