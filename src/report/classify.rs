//! Classification of projected variants into report categories and the
//! derivation of their display fields.

use itertools::Itertools;

use crate::report::annos::GeneAnnotations;
use crate::report::evidence::{self, FrequencyAggregate};
use crate::report::schema::data::SampleVariant;

/// Clinical annotation code attached to a variant by the curation step.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum NoteCode {
    /// Causative, pathogenic (code `1`).
    #[strum(serialize = "1")]
    #[serde(rename = "1")]
    Pathogenic,
    /// Causative, likely pathogenic (code `2`).
    #[strum(serialize = "2")]
    #[serde(rename = "2")]
    LikelyPathogenic,
    /// Causative, uncertain significance (code `3`).
    #[strum(serialize = "3")]
    #[serde(rename = "3")]
    UncertainSignificance,
    /// Clinically significant but unrelated to the referral diagnosis
    /// (code `7`).
    #[strum(serialize = "7")]
    #[serde(rename = "7")]
    SecondaryFinding,
    /// Carrier status for a recessive condition (code `8`).
    #[strum(serialize = "8")]
    #[serde(rename = "8")]
    Carrier,
}

impl NoteCode {
    /// Lower-case clinical significance label, for the codes that define one.
    pub fn significance(&self) -> Option<&'static str> {
        match self {
            NoteCode::Pathogenic => Some("патогенный"),
            NoteCode::LikelyPathogenic => Some("вероятно патогенный"),
            NoteCode::UncertainSignificance => {
                Some("вариант с неизвестной клинической значимостью")
            }
            NoteCode::SecondaryFinding | NoteCode::Carrier => None,
        }
    }

    /// Report category label.
    pub fn category(&self) -> &'static str {
        match self {
            NoteCode::Pathogenic | NoteCode::LikelyPathogenic | NoteCode::UncertainSignificance => {
                "Каузативный"
            }
            NoteCode::SecondaryFinding => "Не связан с основным диагнозом",
            NoteCode::Carrier => "Носительство",
        }
    }

    /// Result table receiving variants with this code.
    pub fn table_section(&self) -> TableSection {
        match self {
            NoteCode::Pathogenic => TableSection::SnvPathogenic,
            NoteCode::LikelyPathogenic => TableSection::SnvLikelyPathogenic,
            NoteCode::UncertainSignificance => TableSection::SnvUncertain,
            NoteCode::SecondaryFinding => TableSection::SecondaryFindings,
            NoteCode::Carrier => TableSection::Carrier,
        }
    }

    /// Whether variants with this code are described in the interpretation
    /// narrative.
    pub fn in_narrative(&self) -> bool {
        !matches!(self, NoteCode::Carrier)
    }
}

/// Result table sections of the report, in document order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum TableSection {
    /// Pathogenic sequence variants, the probable cause of disease.
    SnvPathogenic,
    /// Likely pathogenic sequence variants.
    SnvLikelyPathogenic,
    /// Sequence variants of uncertain clinical significance.
    SnvUncertain,
    /// Structural variants.
    Cnv,
    /// Variants in mitochondrial DNA.
    Mitochondrial,
    /// Clinically significant short tandem repeat expansions.
    ShortTandemRepeat,
    /// Clinically significant variants unrelated to the referral diagnosis.
    SecondaryFindings,
    /// Carrier findings.
    Carrier,
}

/// Functional consequence classes distinguished by the narrative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ConsequenceKind {
    /// Amino-acid substitution.
    Missense,
    /// Synonymous change with possible splicing impact.
    Synonymous,
    /// Intronic change with possible splicing impact.
    Intronic,
    /// Frameshifting insertion or deletion.
    Frameshift,
    /// Premature stop codon.
    Nonsense,
    /// Canonical splice-site disruption.
    SpliceSite,
}

impl ConsequenceKind {
    /// Ordered substring patterns of the matching cascade.
    ///
    /// Consequence strings can satisfy several patterns at once (a
    /// frameshift consequence may also name a stop codon); the first match
    /// in this order wins.
    const PATTERNS: [(&'static str, ConsequenceKind); 6] = [
        ("missense", ConsequenceKind::Missense),
        ("synon", ConsequenceKind::Synonymous),
        ("intron", ConsequenceKind::Intronic),
        ("shift", ConsequenceKind::Frameshift),
        ("stop", ConsequenceKind::Nonsense),
        ("splice", ConsequenceKind::SpliceSite),
    ];

    /// Match `consequence` against the cascade.
    pub fn detect(consequence: &str) -> Option<Self> {
        Self::PATTERNS
            .iter()
            .find(|(pattern, _)| consequence.contains(pattern))
            .map(|(_, kind)| *kind)
    }
}

/// Russian display label for a ClinVar significance value.
///
/// Both the space and underscore spellings occur in the data.
pub fn clinvar_significance_label(significance: &str) -> Option<&'static str> {
    match significance {
        "Pathogenic" => Some("патогенный"),
        "Pathogenic/Likely_pathogenic" | "Pathogenic/Likely pathogenic" => {
            Some("патогенный / вероятно патогенный")
        }
        "Likely_pathogenic" | "Likely pathogenic" => Some("вероятно патогенный"),
        "Uncertain_significance" | "Uncertain significance" => {
            Some("вариант с неизвестной клинической значимостью")
        }
        _ => None,
    }
}

/// Russian display label for an inheritance mode code.
pub fn inheritance_label(code: &str) -> Option<&'static str> {
    match code {
        "AD" => Some("Аутосомно-доминантный"),
        "XD" => Some("Х-сцепленный доминантный"),
        "AR" => Some("Аутосомно-рецессивный"),
        "XR" => Some("Х-сцепленный рецессивный"),
        _ => None,
    }
}

/// Error type for classification.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// The clinical annotation code is outside the known code set.
    #[error("variant {id}: unknown note code {note:?}")]
    UnknownNote {
        /// Identity of the offending record.
        id: String,
        /// The raw code value.
        note: String,
    },
    /// The consequence of a narrative-eligible variant matches no known
    /// pattern.
    #[error("variant {id}: unrecognized consequence {consequence:?}")]
    UnrecognizedConsequence {
        /// Identity of the offending record.
        id: String,
        /// The raw consequence value.
        consequence: String,
    },
}

/// A sample-scoped variant with derived report display fields.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClassifiedVariant {
    /// Parsed clinical annotation code.
    pub note: NoteCode,
    /// Consequence class, when one of the known patterns matches.
    pub consequence_kind: Option<ConsequenceKind>,
    /// Report category label.
    pub category: String,
    /// Gene symbol.
    pub gene: String,
    /// Associated disease description.
    pub disease: Option<String>,
    /// Multi-line DNA/protein change description.
    pub variation: String,
    /// Zygosity with inheritance mode.
    pub zygosity_inheritance: String,
    /// Population frequency display value.
    pub frequency: String,
    /// Alternative/total read depth display value.
    pub coverage: String,
    /// Pathogenicity display label.
    pub pathogenicity: String,
    /// The underlying projected variant.
    pub variant: SampleVariant,
}

/// Classify a projected variant, deriving all display fields.
///
/// Localized gene-level `annotations` override the disease and inheritance
/// texts when present; a missing key keeps the computed value.
pub fn classify(
    variant: SampleVariant,
    annotations: Option<&GeneAnnotations>,
) -> Result<ClassifiedVariant, Error> {
    let record = &variant.record;
    let annotation = &record.annotation;

    let note: NoteCode = record.note.parse().map_err(|_| Error::UnknownNote {
        id: record.identity.to_string(),
        note: record.note.clone(),
    })?;

    let consequence_kind = ConsequenceKind::detect(&annotation.consequence);
    if note.in_narrative() && consequence_kind.is_none() {
        return Err(Error::UnrecognizedConsequence {
            id: record.identity.to_string(),
            consequence: annotation.consequence.clone(),
        });
    }

    let spdi = record.identity.to_string();
    let transcript_prefix = annotation.transcript_prefix();
    let protein_change = annotation.protein_change();
    let variation = [
        Some(spdi.as_str()),
        Some(transcript_prefix.as_str()),
        annotation.hgvs_c.as_deref(),
        protein_change.as_deref(),
        record.rsid.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .join("\n");

    let mut disease = record.phenotype.disease.clone();
    let mut inheritance = record
        .phenotype
        .inheritance
        .as_deref()
        .filter(|codes| !codes.is_empty())
        .map(|codes| {
            codes
                .split(',')
                .map(|code| inheritance_label(code).unwrap_or(code))
                .join(", ")
        });
    if let Some(annotations) = annotations {
        if note == NoteCode::SecondaryFinding {
            if let Some(text) = annotations.secondary_disease(&annotation.symbol) {
                disease = Some(text.to_string());
            }
            if let Some(text) = annotations.secondary_inheritance(&annotation.symbol) {
                inheritance = Some(text.to_string());
            }
        } else if let Some(text) = annotations.disease(&annotation.symbol) {
            disease = Some(text.to_string());
        }
    }

    let zygosity_inheritance = format!(
        "{}\n({})",
        variant
            .call
            .zygosity
            .map(|zygosity| zygosity.table_label())
            .unwrap_or("-"),
        inheritance.as_deref().unwrap_or("-"),
    );

    let frequency = FrequencyAggregate::with_record(record)
        .frequency()
        .map(evidence::format_percent)
        .unwrap_or_else(|| "н/д".to_string());

    let coverage = format!(
        "{}x/{}x",
        variant.call.allele_depth.as_deref().unwrap_or("_"),
        variant.call.total_depth.as_deref().unwrap_or("_"),
    );

    let pathogenicity = match note {
        NoteCode::Carrier => record
            .clinvar
            .significance
            .as_deref()
            .and_then(clinvar_significance_label)
            .unwrap_or("-")
            .to_string(),
        NoteCode::SecondaryFinding => "-".to_string(),
        _ => note
            .significance()
            .map(capitalize)
            .unwrap_or_else(|| "-".to_string()),
    };

    Ok(ClassifiedVariant {
        note,
        consequence_kind,
        category: note.category().to_string(),
        gene: annotation.symbol.clone(),
        disease,
        variation,
        zygosity_inheritance,
        frequency,
        coverage,
        pathogenicity,
        variant,
    })
}

/// Capitalize the first character of a label.
fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::report::annos::GeneAnnotations;
    use crate::report::schema::data::{
        ClinvarInfo, PackedCalls, PhenotypeInfo, PopulationCounts, SampleVariant, SourceCounts,
        TranscriptAnnotation, VariantIdentity, VariantRecord,
    };

    use super::{ConsequenceKind, Error, NoteCode, TableSection};

    fn projected(note: &str) -> SampleVariant {
        let record = VariantRecord {
            note: note.into(),
            identity: VariantIdentity {
                chrom: "chr7".into(),
                pos: 117_559_590,
                reference: "G".into(),
                alternative: "A".into(),
            },
            rsid: Some("rs113993960".into()),
            annotation: TranscriptAnnotation {
                symbol: "CFTR".into(),
                transcript: "ENST00000003084".into(),
                refseq: Some("NM_000492.4".into()),
                hgvs_c: Some("c.1521G>A".into()),
                hgvs_p: Some("p.Gly508Arg".into()),
                consequence: "missense_variant".into(),
                exon: Some("11/27".into()),
                ..Default::default()
            },
            phenotype: PhenotypeInfo {
                disease: Some("Cystic fibrosis (CF)".into()),
                omim_id: Some("MIM:219700".into()),
                inheritance: Some("AD,AR".into()),
            },
            frequencies: PopulationCounts {
                gnomad_genomes: SourceCounts::new(Some(100), Some(1)),
                gnomad_exomes: SourceCounts::new(Some(300), Some(1)),
            },
            calls: PackedCalls {
                samples: Some("case.1".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let call = crate::report::schema::data::SampleCall {
            sample: "case.1".into(),
            zygosity: Some(crate::common::Zygosity::Het),
            allele_depth: Some("25".into()),
            total_depth: Some("60".into()),
        };
        SampleVariant { record, call }
    }

    #[rstest]
    #[case("1", NoteCode::Pathogenic, "Каузативный", TableSection::SnvPathogenic)]
    #[case(
        "2",
        NoteCode::LikelyPathogenic,
        "Каузативный",
        TableSection::SnvLikelyPathogenic
    )]
    #[case(
        "3",
        NoteCode::UncertainSignificance,
        "Каузативный",
        TableSection::SnvUncertain
    )]
    #[case(
        "7",
        NoteCode::SecondaryFinding,
        "Не связан с основным диагнозом",
        TableSection::SecondaryFindings
    )]
    #[case("8", NoteCode::Carrier, "Носительство", TableSection::Carrier)]
    fn classify_note_codes(
        #[case] note: &str,
        #[case] expected_note: NoteCode,
        #[case] expected_category: &str,
        #[case] expected_section: TableSection,
    ) {
        let classified = super::classify(projected(note), None).expect("classification");
        assert_eq!(classified.note, expected_note);
        assert_eq!(classified.category, expected_category);
        assert_eq!(classified.note.table_section(), expected_section);
    }

    #[test]
    fn classify_rejects_unknown_note() {
        let result = super::classify(projected("4"), None);
        assert!(matches!(result, Err(Error::UnknownNote { .. })));
        assert_eq!(
            result.unwrap_err().to_string(),
            "variant chr7-117559590-G-A: unknown note code \"4\""
        );
    }

    #[test]
    fn classify_rejects_unmatched_consequence_for_narrative_notes() {
        let mut variant = projected("1");
        variant.record.annotation.consequence = "inframe_deletion".into();
        let result = super::classify(variant, None);
        assert!(matches!(result, Err(Error::UnrecognizedConsequence { .. })));
    }

    #[test]
    fn carrier_tolerates_unmatched_consequence() {
        let mut variant = projected("8");
        variant.record.annotation.consequence = "inframe_deletion".into();
        let classified = super::classify(variant, None).expect("classification");
        assert_eq!(classified.consequence_kind, None);
    }

    #[test]
    fn display_fields() {
        let classified = super::classify(projected("1"), None).expect("classification");
        assert_eq!(
            classified.variation,
            "chr7-117559590-G-A\nNM_000492.4:\nc.1521G>A\np.(Gly508Arg)\nrs113993960"
        );
        assert_eq!(
            classified.zygosity_inheritance,
            "Гетерозигота\n(Аутосомно-доминантный, Аутосомно-рецессивный)"
        );
        assert_eq!(classified.frequency, "0.5%");
        assert_eq!(classified.coverage, "25x/60x");
        assert_eq!(classified.pathogenicity, "Патогенный");
        assert_eq!(classified.gene, "CFTR");
    }

    #[test]
    fn display_fields_for_missing_data() {
        let mut variant = projected("1");
        variant.record.frequencies = Default::default();
        variant.record.phenotype.inheritance = None;
        variant.call.zygosity = None;
        variant.call.allele_depth = None;
        variant.call.total_depth = None;
        let classified = super::classify(variant, None).expect("classification");
        assert_eq!(classified.frequency, "н/д");
        assert_eq!(classified.coverage, "_x/_x");
        assert_eq!(classified.zygosity_inheritance, "-\n(-)");
    }

    #[rstest]
    #[case(Some("Likely_pathogenic"), "вероятно патогенный")]
    #[case(Some("Conflicting interpretations"), "-")]
    #[case(None, "-")]
    fn carrier_pathogenicity_from_clinvar(
        #[case] significance: Option<&str>,
        #[case] expected: &str,
    ) {
        let mut variant = projected("8");
        variant.record.clinvar = ClinvarInfo {
            significance: significance.map(String::from),
            ..Default::default()
        };
        let classified = super::classify(variant, None).expect("classification");
        assert_eq!(classified.pathogenicity, expected);
    }

    #[test]
    fn annotations_override_disease_and_inheritance() {
        let annotations: GeneAnnotations = serde_json::from_str(
            r#"{
                "omim": {"disease": {"CFTR": "Муковисцидоз (MIM:219700)"}},
                "secondary": {
                    "disease": {"CFTR": "Муковисцидоз, вторичная находка"},
                    "inheritance": {"CFTR": "Аутосомно-рецессивный"}
                }
            }"#,
        )
        .unwrap();

        let causative = super::classify(projected("1"), Some(&annotations)).unwrap();
        assert_eq!(
            causative.disease.as_deref(),
            Some("Муковисцидоз (MIM:219700)")
        );

        let secondary = super::classify(projected("7"), Some(&annotations)).unwrap();
        assert_eq!(
            secondary.disease.as_deref(),
            Some("Муковисцидоз, вторичная находка")
        );
        assert_eq!(
            secondary.zygosity_inheritance,
            "Гетерозигота\n(Аутосомно-рецессивный)"
        );

        let unknown_gene = {
            let mut variant = projected("1");
            variant.record.annotation.symbol = "TTN".into();
            super::classify(variant, Some(&annotations)).unwrap()
        };
        assert_eq!(unknown_gene.disease.as_deref(), Some("Cystic fibrosis (CF)"));
    }

    #[rstest]
    #[case("missense_variant", Some(ConsequenceKind::Missense))]
    #[case("synonymous_variant", Some(ConsequenceKind::Synonymous))]
    #[case("intron_variant", Some(ConsequenceKind::Intronic))]
    #[case("frameshift_variant", Some(ConsequenceKind::Frameshift))]
    #[case("stop_gained", Some(ConsequenceKind::Nonsense))]
    #[case("splice_donor_variant", Some(ConsequenceKind::SpliceSite))]
    // a frameshift consequence naming a stop codon stays a frameshift
    #[case("frameshift_variant,stop_gained", Some(ConsequenceKind::Frameshift))]
    // the intron pattern outranks the splice pattern
    #[case("splice_donor_variant,intron_variant", Some(ConsequenceKind::Intronic))]
    // missense outranks everything that follows it
    #[case(
        "missense_variant,splice_region_variant",
        Some(ConsequenceKind::Missense)
    )]
    #[case("inframe_deletion", None)]
    fn consequence_kind_priority(
        #[case] consequence: &str,
        #[case] expected: Option<ConsequenceKind>,
    ) {
        assert_eq!(ConsequenceKind::detect(consequence), expected);
    }
}
