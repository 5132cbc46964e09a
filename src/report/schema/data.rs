//! Code for representing variant annotation records internally, corresponds
//! to what the annotation pipeline writes into the variant table.

use indexmap::IndexMap;

use crate::common::Zygosity;

/// One raw row of the variant annotation table, column name to cell value.
///
/// Empty cells are treated as absent values throughout.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    columns: IndexMap<String, String>,
}

/// Supporting code for `RawRecord`.
pub(crate) mod raw_record {
    /// Error type for `RawRecord` accessors.
    #[derive(thiserror::Error, Debug, Clone)]
    pub enum Error {
        #[error("column {0} does not hold a number: {1:?}")]
        InvalidNumber(String, String),
    }
}

impl RawRecord {
    /// Return the value of `column`, treating empty cells as absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Return the value of `column` as an owned `String`, if present.
    pub fn string(&self, column: &str) -> Option<String> {
        self.get(column).map(String::from)
    }

    /// Parse an optional integer column.
    pub fn integer(&self, column: &str) -> Result<Option<i64>, raw_record::Error> {
        self.get(column)
            .map(|value| {
                value.parse::<i64>().map_err(|_| {
                    raw_record::Error::InvalidNumber(column.to_string(), value.to_string())
                })
            })
            .transpose()
    }

    /// Parse an optional floating point column.
    pub fn float(&self, column: &str) -> Result<Option<f64>, raw_record::Error> {
        self.get(column)
            .map(|value| {
                value.parse::<f64>().map_err(|_| {
                    raw_record::Error::InvalidNumber(column.to_string(), value.to_string())
                })
            })
            .transpose()
    }

    /// Iterate over all columns, including the empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Variant identity in SPDI-like form.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VariantIdentity {
    /// Chromosome name.
    pub chrom: String,
    /// 1-based position.
    pub pos: i64,
    /// Reference allele.
    pub reference: String,
    /// Alternative allele.
    pub alternative: String,
}

impl std::fmt::Display for VariantIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.chrom, self.pos, self.reference, self.alternative
        )
    }
}

/// Picked transcript annotation of a variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptAnnotation {
    /// Gene symbol.
    pub symbol: String,
    /// Annotated transcript accession.
    pub transcript: String,
    /// MANE Select RefSeq accession, when one exists.
    pub refseq: Option<String>,
    /// Genomic HGVS expression.
    pub hgvs_g: Option<String>,
    /// Coding HGVS expression.
    pub hgvs_c: Option<String>,
    /// Protein HGVS expression.
    pub hgvs_p: Option<String>,
    /// Predicted consequence terms.
    pub consequence: String,
    /// Exon fraction, e.g. `11/27`.
    pub exon: Option<String>,
    /// Intron fraction, e.g. `3/12`.
    pub intron: Option<String>,
}

impl TranscriptAnnotation {
    /// Transcript accession prefix for HGVS display, preferring the MANE
    /// Select RefSeq accession.
    pub fn transcript_prefix(&self) -> String {
        match &self.refseq {
            Some(refseq) => format!("{refseq}:"),
            None => format!("{}:", self.transcript),
        }
    }

    /// Protein change in `p.(...)` notation with URL-encoded `=` decoded.
    pub fn protein_change(&self) -> Option<String> {
        self.hgvs_p
            .as_deref()
            .filter(|hgvs_p| !hgvs_p.is_empty())
            .map(|hgvs_p| {
                let body = hgvs_p.strip_prefix("p.").unwrap_or(hgvs_p);
                format!("p.({})", body.replace("%3D", "="))
            })
    }
}

/// OMIM phenotype information of the annotated gene.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PhenotypeInfo {
    /// Associated disease description.
    pub disease: Option<String>,
    /// OMIM phenotype identifier.
    pub omim_id: Option<String>,
    /// Comma-joined inheritance mode codes (AD, AR, XD, XR).
    pub inheritance: Option<String>,
}

/// Allele counts from one population frequency source.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new,
)]
pub struct SourceCounts {
    /// Total number of genotyped alleles.
    pub an: Option<i64>,
    /// Number of observed alternative alleles.
    pub ac: Option<i64>,
}

/// Per-source population allele counts of a variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PopulationCounts {
    /// Counts in gnomAD v4 genomes.
    pub gnomad_genomes: SourceCounts,
    /// Counts in gnomAD v4 exomes.
    pub gnomad_exomes: SourceCounts,
}

/// In-silico predictor scores of a variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PredictorScores {
    /// dbscSNV ADA splice score.
    pub splice_ada: Option<f64>,
    /// MetaRNN meta-predictor score.
    pub metarnn: Option<f64>,
    /// REVEL score.
    pub revel: Option<f64>,
    /// AlphaMissense score.
    pub alphamissense: Option<f64>,
    /// phyloP 100-way conservation score.
    pub phylop100: Option<f64>,
    /// GERP RS conservation score.
    pub gerp_rs: Option<f64>,
}

/// ClinVar record of a related variant at the same position.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new,
)]
pub struct RelatedVariant {
    /// ClinVar variation identifier.
    pub id: String,
    /// Protein-level change of the related variant.
    pub change: String,
    /// Overall clinical significance.
    pub significance: String,
    /// ClinVar review status.
    pub review_status: String,
    /// Per-laboratory significance counts, e.g. `"Pathogenic (2)"`.
    pub lab_significance: Option<String>,
}

/// Supporting code for `RelatedVariant`.
pub(crate) mod related_variant {
    /// Error type for decoding related-variant lists.
    #[derive(thiserror::Error, Debug, Clone)]
    pub enum Error {
        #[error("malformed related-variant list: {0}")]
        Decode(String),
    }
}

impl RelatedVariant {
    /// Decode a serialized list of related variants.
    ///
    /// The annotation pipeline stores these as a JSON array of 5-element
    /// arrays `[id, change, significance, review_status, lab_significance]`.
    pub fn decode_list(raw: &str) -> Result<Vec<Self>, related_variant::Error> {
        let entries: Vec<(String, String, String, String, Option<String>)> =
            serde_json::from_str(raw)
                .map_err(|e| related_variant::Error::Decode(e.to_string()))?;
        Ok(entries
            .into_iter()
            .map(|(id, change, significance, review_status, lab_significance)| {
                Self::new(id, change, significance, review_status, lab_significance)
            })
            .collect())
    }
}

/// ClinVar cross-reference of a variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClinvarInfo {
    /// ClinVar variation identifier.
    pub id: Option<String>,
    /// Overall clinical significance.
    pub significance: Option<String>,
    /// Per-laboratory significance counts, e.g.
    /// `"Pathogenic (2); Uncertain significance (1)"`.
    pub lab_significance: Option<String>,
    /// Variants with the same amino-acid change at the same position.
    pub equivalents: Vec<RelatedVariant>,
    /// Variants with a different amino-acid change at the same position.
    pub alternatives: Vec<RelatedVariant>,
}

/// Multi-sample call columns packed as `;`-joined strings.
///
/// All fields share the same per-sample ordering and element count within
/// one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PackedCalls {
    /// Sample identifiers.
    pub samples: Option<String>,
    /// Zygosity per sample.
    pub zygosity: Option<String>,
    /// Allele depth per sample, each element possibly `,`-packed as ref,alt.
    pub allele_depth: Option<String>,
    /// Total read depth per sample.
    pub total_depth: Option<String>,
    /// Variant filter status per sample.
    pub filter: Option<String>,
}

impl PackedCalls {
    /// Sample identifiers as a list.
    pub fn sample_ids(&self) -> Vec<&str> {
        self.samples
            .as_deref()
            .map(|samples| samples.split(';').collect())
            .unwrap_or_default()
    }
}

/// Canonical variant record produced by schema normalization.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariantRecord {
    /// Clinical annotation code as entered by the curation step.
    pub note: String,
    /// VCF-style variant identity.
    pub identity: VariantIdentity,
    /// Gap-padded reference allele used for indel sizing.
    pub ref_base: String,
    /// Gap-padded alternative allele used for indel sizing.
    pub alt_base: String,
    /// dbSNP identifier.
    pub rsid: Option<String>,
    /// Picked transcript annotation.
    pub annotation: TranscriptAnnotation,
    /// OMIM phenotype information.
    pub phenotype: PhenotypeInfo,
    /// Per-source population allele counts.
    pub frequencies: PopulationCounts,
    /// In-silico predictor scores.
    pub scores: PredictorScores,
    /// ClinVar cross-reference.
    pub clinvar: ClinvarInfo,
    /// Packed multi-sample call columns.
    pub calls: PackedCalls,
}

/// Scalar call information for one sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SampleCall {
    /// The sample name.
    pub sample: String,
    /// Zygosity of the call, if known.
    pub zygosity: Option<Zygosity>,
    /// Alternative allele read depth.
    pub allele_depth: Option<String>,
    /// Total read depth at the site.
    pub total_depth: Option<String>,
}

/// A variant record projected onto a single sample.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SampleVariant {
    /// The cohort-wide variant record.
    pub record: VariantRecord,
    /// Scalar call of the projected sample.
    pub call: SampleCall,
}
