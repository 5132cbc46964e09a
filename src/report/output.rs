//! Data structures for the exportable report data and the storage upload
//! rows.
//!
//! The report data is consumed by the document-rendering collaborator; the
//! upload rows are written as TSV for import into the reported-variants
//! store.

use chrono::NaiveDate;
use indexmap::IndexMap;
use strum::IntoEnumIterator;

use crate::common::sample_display_id;
use crate::report::classify::{ClassifiedVariant, TableSection};
use crate::report::narrative::Paragraph;

/// Case description placeholders completed by the clinician.
#[derive(
    Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new,
)]
pub struct CaseInfo {
    /// Sample number shown on the report.
    pub sample_number: String,
    /// Patient sex.
    pub sex: String,
    /// Patient age.
    pub age: String,
    /// Preliminary diagnosis.
    pub diagnosis: String,
}

impl CaseInfo {
    /// Placeholder case block for `sample`.
    pub fn with_sample(sample: &str) -> Self {
        Self::new(
            sample_display_id(sample).to_string(),
            "_".into(),
            "_".into(),
            "_".into(),
        )
    }
}

/// Sequencing run characteristics of the assay.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SequencingInfo {
    /// Assay name.
    pub method: String,
    /// Mean genome coverage after sequencing.
    pub mean_depth: String,
    /// Number of sequenced bases.
    pub base_count: String,
    /// Read layout.
    pub read_type: String,
    /// Read length.
    pub read_length: String,
    /// Output quality criteria.
    pub quality_criteria: Vec<String>,
}

impl Default for SequencingInfo {
    fn default() -> Self {
        Self {
            method: "полногеномное секвенирование (Whole Genome Sequencing)".into(),
            mean_depth: "_x".into(),
            base_count: "не менее 90 млрд".into(),
            read_type: "парно-концевое".into(),
            read_length: "150".into(),
            quality_criteria: vec![
                "1.    число прочтений с качеством Q20: не менее 90% от числа прочтений, \
                 полученных в результате секвенирования"
                    .into(),
                "2.    число прочтений с качеством Q30: не менее 80% от числа прочтений, \
                 полученных в результате секвенирования"
                    .into(),
            ],
        }
    }
}

/// Exportable report data for one sample.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, derive_builder::Builder)]
pub struct ReportData {
    /// Case description block.
    pub case: CaseInfo,
    /// Sequencing characteristics block.
    pub sequencing: SequencingInfo,
    /// Result tables in document order. Empty sections are kept so the
    /// renderer can emit their "not found" form.
    pub tables: IndexMap<TableSection, Vec<ClassifiedVariant>>,
    /// Interpretation paragraphs.
    pub interpretation: Vec<Paragraph>,
    /// Reference list in citation order.
    pub bibliography: Vec<String>,
    /// Report issue date.
    pub issued_on: NaiveDate,
    /// Reporting clinician.
    pub clinician: String,
}

/// Group classified variants into the report's table sections.
///
/// Every section is present in the result, including the ones this worker
/// never fills (CNV, mitochondrial DNA, STR).
pub fn table_buckets(
    variants: &[ClassifiedVariant],
) -> IndexMap<TableSection, Vec<ClassifiedVariant>> {
    let mut tables: IndexMap<TableSection, Vec<ClassifiedVariant>> = TableSection::iter()
        .map(|section| (section, Vec::new()))
        .collect();
    for variant in variants {
        tables
            .entry(variant.note.table_section())
            .or_default()
            .push(variant.clone());
    }
    tables
}

/// Assemble the exportable report data for one sample.
pub fn assemble(
    sample: &str,
    variants: &[ClassifiedVariant],
    interpretation: Vec<Paragraph>,
    bibliography: Vec<String>,
    issued_on: NaiveDate,
    clinician: &str,
) -> Result<ReportData, anyhow::Error> {
    ReportDataBuilder::default()
        .case(CaseInfo::with_sample(sample))
        .sequencing(SequencingInfo::default())
        .tables(table_buckets(variants))
        .interpretation(interpretation)
        .bibliography(bibliography)
        .issued_on(issued_on)
        .clinician(clinician.to_string())
        .build()
        .map_err(|e| anyhow::anyhow!("could not build report data: {}", e))
}

/// Flattened storage row for the reported-variants table.
///
/// Serialized column names match the storage schema of the laboratory
/// database.
#[allow(clippy::too_many_arguments)]
#[derive(
    Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new,
)]
pub struct UploadRecord {
    /// Gene symbol.
    #[serde(rename = "Ген")]
    pub gene: String,
    /// Associated disease description.
    #[serde(rename = "Ассоциированное заболевание (OMIM)")]
    pub disease: String,
    /// DNA/protein change description.
    #[serde(rename = "Изменение ДНК (HG38) (Изменение белка)")]
    pub variation: String,
    /// Zygosity with inheritance mode.
    #[serde(rename = "Зиготность (Тип наследования)")]
    pub zygosity_inheritance: String,
    /// Population frequency display value.
    #[serde(rename = "Частота*")]
    pub frequency: String,
    /// Alternative/total read depth display value.
    #[serde(rename = "Кол-во прочтений (АЛТ/ОБЩ)")]
    pub coverage: String,
    /// Pathogenicity display label.
    #[serde(rename = "Патогенность")]
    pub pathogenicity: String,
    /// Report category label.
    #[serde(rename = "Тип")]
    pub category: String,
    /// Sample number the row belongs to.
    #[serde(rename = "Номер образца")]
    pub sample_number: String,
    /// Patient sex.
    #[serde(rename = "Пол пациента")]
    pub sex: String,
    /// Patient age.
    #[serde(rename = "Возраст пациента")]
    pub age: String,
    /// Preliminary diagnosis.
    #[serde(rename = "Предварительный диагноз")]
    pub diagnosis: String,
}

impl UploadRecord {
    /// Key used by the storage collaborator for existence checks.
    pub fn sample_key(&self) -> &str {
        &self.sample_number
    }
}

/// Flatten the classified variants into storage upload rows, repeating the
/// per-sample case columns on every row.
pub fn upload_rows(case: &CaseInfo, variants: &[ClassifiedVariant]) -> Vec<UploadRecord> {
    variants
        .iter()
        .map(|variant| {
            UploadRecord::new(
                variant.gene.clone(),
                variant.disease.clone().unwrap_or_default(),
                variant.variation.clone(),
                variant.zygosity_inheritance.clone(),
                variant.frequency.clone(),
                variant.coverage.clone(),
                variant.pathogenicity.clone(),
                variant.category.clone(),
                case.sample_number.clone(),
                case.sex.clone(),
                case.age.clone(),
                case.diagnosis.clone(),
            )
        })
        .collect()
}
