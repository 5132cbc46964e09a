//! Annotation table schemas and their normalization into the canonical
//! record shape.

pub mod data;
pub mod legacy;

use data::{
    ClinvarInfo, PackedCalls, PhenotypeInfo, PopulationCounts, PredictorScores, RawRecord,
    RelatedVariant, SourceCounts, TranscriptAnnotation, VariantIdentity, VariantRecord,
};

/// Marker column whose presence identifies the current annotation schema.
pub const SCHEMA_MARKER_COLUMN: &str = "vep_csq__symbol";

/// Annotation table schema generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// Current schema with unpacked `vep_csq__*` columns.
    Current,
    /// Legacy schema with `;`-packed per-block CSQ columns.
    Legacy,
}

impl SchemaKind {
    /// Detect the schema generation from the table's column names.
    pub fn detect<'a>(mut columns: impl Iterator<Item = &'a str>) -> Self {
        if columns.any(|column| column == SCHEMA_MARKER_COLUMN) {
            SchemaKind::Current
        } else {
            SchemaKind::Legacy
        }
    }
}

/// Error type for schema normalization.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// The legacy CSQ annotation of the record has no picked block.
    #[error("variant {id}: no picked annotation block")]
    NoPickedBlock {
        /// Identity of the offending record.
        id: String,
    },
    /// A column failed to parse.
    #[error("variant {id}: {source}")]
    Column {
        /// Identity of the offending record.
        id: String,
        /// The underlying accessor error.
        #[source]
        source: data::raw_record::Error,
    },
    /// A ClinVar related-variant column failed to decode.
    #[error("variant {id}: {source}")]
    RelatedVariants {
        /// Identity of the offending record.
        id: String,
        /// The underlying decoding error.
        #[source]
        source: data::related_variant::Error,
    },
}

/// Normalize one raw row into the canonical record shape.
pub fn normalize(raw: &RawRecord, kind: SchemaKind) -> Result<VariantRecord, Error> {
    match kind {
        SchemaKind::Current => current(raw),
        SchemaKind::Legacy => legacy::normalize(raw),
    }
}

/// Best-effort identity string for error messages on a raw row.
pub(crate) fn raw_id(raw: &RawRecord) -> String {
    format!(
        "{}-{}-{}-{}",
        raw.get("base__chrom").unwrap_or("?"),
        raw.get("extra_vcf_info__pos").unwrap_or("?"),
        raw.get("extra_vcf_info__ref").unwrap_or("?"),
        raw.get("extra_vcf_info__alt").unwrap_or("?"),
    )
}

/// Extract the columns shared by both schema generations.
pub(crate) fn base_record(raw: &RawRecord) -> Result<VariantRecord, Error> {
    let id = raw_id(raw);
    let column = &|source| Error::Column {
        id: id.clone(),
        source,
    };

    Ok(VariantRecord {
        note: raw.string("base__note").unwrap_or_default(),
        identity: VariantIdentity {
            chrom: raw.string("base__chrom").unwrap_or_default(),
            pos: raw
                .integer("extra_vcf_info__pos")
                .map_err(column)?
                .unwrap_or_default(),
            reference: raw.string("extra_vcf_info__ref").unwrap_or_default(),
            alternative: raw.string("extra_vcf_info__alt").unwrap_or_default(),
        },
        ref_base: raw.string("base__ref_base").unwrap_or_default(),
        alt_base: raw.string("base__alt_base").unwrap_or_default(),
        rsid: raw.string("dbsnp__rsid"),
        annotation: TranscriptAnnotation::default(),
        phenotype: PhenotypeInfo {
            disease: raw.string("vep_omim_pheno__pheno"),
            omim_id: raw.string("vep_omim_pheno__id"),
            inheritance: None,
        },
        frequencies: PopulationCounts {
            gnomad_genomes: SourceCounts {
                an: raw.integer("gnomad4genomes__AN").map_err(column)?,
                ac: raw.integer("gnomad4genomes__AC").map_err(column)?,
            },
            gnomad_exomes: SourceCounts {
                an: raw.integer("gnomad4exomes__AN").map_err(column)?,
                ac: raw.integer("gnomad4exomes__AC").map_err(column)?,
            },
        },
        scores: PredictorScores {
            splice_ada: raw.float("dbscsnv__ada_score").map_err(column)?,
            metarnn: raw.float("metarnn__score").map_err(column)?,
            revel: raw.float("revel__score").map_err(column)?,
            alphamissense: raw.float("alphamissense__score").map_err(column)?,
            phylop100: raw.float("phylop100__score").map_err(column)?,
            gerp_rs: raw.float("gerp__gerp_rs").map_err(column)?,
        },
        clinvar: ClinvarInfo::default(),
        calls: PackedCalls::default(),
    })
}

/// Normalize a row of the current schema.
fn current(raw: &RawRecord) -> Result<VariantRecord, Error> {
    let id = raw_id(raw);
    let mut record = base_record(raw)?;

    record.annotation = TranscriptAnnotation {
        symbol: raw.string(SCHEMA_MARKER_COLUMN).unwrap_or_default(),
        transcript: raw.string("vep_csq__transcript").unwrap_or_default(),
        refseq: raw.string("vep_csq__refseq"),
        hgvs_g: raw.string("vep_csq__hgvsg"),
        hgvs_c: raw.string("vep_csq__hgvsc"),
        hgvs_p: raw.string("vep_csq__hgvsp"),
        consequence: raw.string("vep_csq__consequence").unwrap_or_default(),
        exon: raw.string("vep_csq__exon"),
        intron: raw.string("vep_csq__intron"),
    };
    record.phenotype.inheritance = raw.string("vep_omim_pheno__inher");
    record.clinvar = ClinvarInfo {
        id: raw.string("clinvar_new__id"),
        significance: raw.string("clinvar_new__sig"),
        lab_significance: raw.string("clinvar_new__sig_subs"),
        equivalents: decode_related(raw, "clinvar_new__equivalents", &id)?,
        alternatives: decode_related(raw, "clinvar_new__alternatives", &id)?,
    };
    record.calls = PackedCalls {
        samples: raw.string("tagsampler_new__samples"),
        zygosity: raw.string("tagsampler_new__zygosity"),
        allele_depth: raw.string("tagsampler_new__ad"),
        total_depth: raw.string("tagsampler_new__dp"),
        filter: raw.string("tagsampler_new__filter"),
    };

    Ok(record)
}

/// Decode an optional related-variant column.
fn decode_related(
    raw: &RawRecord,
    column: &str,
    id: &str,
) -> Result<Vec<RelatedVariant>, Error> {
    raw.get(column)
        .map(RelatedVariant::decode_list)
        .transpose()
        .map_err(|source| Error::RelatedVariants {
            id: id.to_string(),
            source,
        })
        .map(Option::unwrap_or_default)
}
