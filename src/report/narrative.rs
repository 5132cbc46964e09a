//! Rule-based composition of the interpretation narrative.

use itertools::Itertools;

use crate::common::sample_display_id;
use crate::report::classify::{
    clinvar_significance_label, ClassifiedVariant, ConsequenceKind,
};
use crate::report::evidence::{self, Conservation, FrequencyAggregate};
use crate::report::schema::data::{RelatedVariant, TranscriptAnnotation, VariantRecord};

/// Base reference list every report starts from.
const BASE_SOURCES: &[&str] = &[
    "http://www.omim.org/",
    "http://www.ncbi.nlm.nih.gov/snp/",
    "http://gnomad.broadinstitute.org/",
    "http://www.ncbi.nlm.nih.gov/clinvar/",
    "https://franklin.genoox.com/clinical",
    "http://www.ensembl.org/",
    "https://www.uniprot.org/",
    "https://www.deciphergenomics.org/",
    "https://mitomap.org",
    "https://www.clinicalgenome.org/",
];

/// Lead-in sentence of the interpretation section.
const SEARCH_CRITERIA: &str = "Был проведен поиск вариантов, ассоциированных с направительным \
     диагнозом у пробанда и прочими наследственными заболеваниями со сходными фенотипическими \
     проявлениями.";

/// Closing methodology sentence.
const GUIDELINES: &str = "Оценка клинической значимости (патогенности) выявленных вариантов \
     проводилась на основании российских рекомендаций для интерпретации данных, полученных \
     методами массового параллельного секвенирования (MPS).";

/// Closing disclaimer, rendered in bold.
const DISCLAIMER: &str =
    "Результаты данного исследования могут быть правильно интерпретированы только врачом-генетиком.";

/// Ordered reference list with 1-based citation indices.
#[derive(Debug, Clone)]
pub struct Bibliography {
    entries: Vec<String>,
}

impl Default for Bibliography {
    fn default() -> Self {
        Self {
            entries: BASE_SOURCES.iter().map(|source| source.to_string()).collect(),
        }
    }
}

impl Bibliography {
    /// Append `source` and return its 1-based citation index.
    ///
    /// Entries are never reused; citing the same source twice yields two
    /// entries with distinct indices, so citation numbering stays stable
    /// under any processing order.
    pub fn cite(&mut self, source: String) -> usize {
        self.entries.push(source);
        self.entries.len()
    }

    /// All entries in citation order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Consume the bibliography, yielding the entries in citation order.
    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

/// One formatted text run within a paragraph.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new,
)]
pub struct Run {
    /// Run text.
    pub text: String,
    /// Render in italics (gene symbols).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    /// Render in bold.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
}

/// One paragraph of the interpretation narrative.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Paragraph {
    /// Formatted runs, concatenated by the document renderer.
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Paragraph with a single plain run.
    pub fn text(text: impl Into<String>) -> Self {
        let mut paragraph = Self::default();
        paragraph.push(text);
        paragraph
    }

    /// Paragraph with a single bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::new(text.into(), false, true)],
        }
    }

    /// Append a plain run.
    pub fn push(&mut self, text: impl Into<String>) {
        self.runs.push(Run::new(text.into(), false, false));
    }

    /// Append an italic run.
    pub fn push_italic(&mut self, text: impl Into<String>) {
        self.runs.push(Run::new(text.into(), true, false));
    }
}

/// Compose the interpretation section for one sample.
///
/// `variants` is the sample's classified list in cohort order; only the
/// codes taking part in the narrative are described. Citation indices come
/// from the sample's own `bibliography`.
pub fn compose(
    variants: &[ClassifiedVariant],
    target_sample: Option<&str>,
    bibliography: &mut Bibliography,
) -> Vec<Paragraph> {
    let mut paragraphs = vec![Paragraph::text(SEARCH_CRITERIA)];

    let described: Vec<_> = variants
        .iter()
        .filter(|variant| variant.note.in_narrative())
        .collect();
    if described.is_empty() {
        paragraphs.push(Paragraph::text(
            "\nЗначимых изменений, соответствующих критериям поиска, не обнаружено.",
        ));
    } else {
        for classified in described {
            if let Some(kind) = classified.consequence_kind {
                describe_variant(classified, kind, target_sample, bibliography, &mut paragraphs);
            }
        }
        paragraphs.push(Paragraph::text(
            "\nДругих значимых изменений, соответствующих критериям поиска, не обнаружено.",
        ));
    }

    paragraphs.push(Paragraph::text(GUIDELINES));
    paragraphs.push(Paragraph::bold(DISCLAIMER));
    paragraphs
}

/// Emit the paragraph block describing one variant.
fn describe_variant(
    classified: &ClassifiedVariant,
    kind: ConsequenceKind,
    target_sample: Option<&str>,
    bibliography: &mut Bibliography,
    paragraphs: &mut Vec<Paragraph>,
) {
    let variant = &classified.variant;
    let record = &variant.record;
    let annotation = &record.annotation;

    // introduction with identifiers, location and the leading-to clause
    let hgvs_c_msg = annotation
        .hgvs_c
        .as_ref()
        .map(|hgvs_c| format!("{}{}", annotation.transcript_prefix(), hgvs_c));
    let variation_msg = [
        annotation.hgvs_g.as_deref(),
        hgvs_c_msg.as_deref(),
        record.rsid.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .join(", ");
    let zygosity_msg = variant
        .call
        .zygosity
        .map(|zygosity| zygosity.phrase())
        .unwrap_or_default();
    let location_msg = location_phrase(annotation).unwrap_or_default();
    let total_depth = variant.call.total_depth.as_deref().unwrap_or("_");

    let mut intro = Paragraph::text("\n");
    intro.push(format!(
        "Обнаружен ранее _ описанный в литературе вариант ({variation_msg}) {zygosity_msg} \
         {location_msg} гена "
    ));
    intro.push_italic(annotation.symbol.clone());
    intro.push(format!(
        ", {}, с глубиной прочтения {total_depth}x.",
        leading_to_clause(record, kind)
    ));
    paragraphs.push(intro);

    // disease association
    if let Some(disease) = classified.disease.as_deref().filter(|text| !text.is_empty()) {
        let mut paragraph = Paragraph::text("Патогенные варианты в гене ");
        paragraph.push_italic(annotation.symbol.clone());
        match record.phenotype.omim_id.as_deref() {
            Some(omim_id) => paragraph.push(format!(" приводят к {disease} ({omim_id}).")),
            None => paragraph.push(format!(" приводят к {disease}.")),
        }
        paragraphs.push(paragraph);
    }

    // population frequency
    let aggregate = FrequencyAggregate::with_record(record);
    match aggregate.frequency() {
        Some(frequency) => paragraphs.push(Paragraph::text(format!(
            "Вариант встречается в базе данных популяционных частот gnomAD v4.1.0 с частотой \
             {} ({} аллел(ей)).",
            evidence::format_percent(frequency),
            aggregate.allele_count,
        ))),
        None => paragraphs.push(Paragraph::text(
            "Вариант не встречается в базе данных популяционных частот gnomAD v4.1.0.",
        )),
    }

    // computational evidence
    paragraphs.push(computational_evidence(record, kind));

    // ClinVar laboratory annotations
    if record.clinvar.significance.is_some() {
        let mut messages = lab_significance_messages(record.clinvar.lab_significance.as_deref());
        if messages.is_empty() {
            messages.extend(record.clinvar.significance.as_deref().map(|significance| {
                format!(
                    "как {}",
                    clinvar_significance_label(significance).unwrap_or(significance)
                )
            }));
        }
        if !messages.is_empty() {
            let clinvar_id = record.clinvar.id.as_deref().unwrap_or_default();
            let index = bibliography.cite(clinvar_url(clinvar_id));
            paragraphs.push(Paragraph::text(format!(
                "Вариант аннотирован {} в базе данных ClinVar [{index}].",
                messages.iter().join(", "),
            )));
        }
    }

    // equivalent and alternative variants at the same position
    for equivalent in &record.clinvar.equivalents {
        let index = bibliography.cite(clinvar_url(&equivalent.id));
        paragraphs.push(Paragraph::text(format!(
            "Вариант с такой же аминокислотной заменой {} в той же позиции аннотирован {} \
             [{index}].",
            equivalent.change,
            related_messages(equivalent).iter().join(", "),
        )));
    }
    for alternative in &record.clinvar.alternatives {
        let index = bibliography.cite(clinvar_url(&alternative.id));
        paragraphs.push(Paragraph::text(format!(
            "Вариант с другой аминокислотной заменой {} в той же позиции аннотирован {} \
             [{index}].",
            alternative.change,
            related_messages(alternative).iter().join(", "),
        )));
    }

    // co-occurrence in the other cohort samples
    if target_sample.is_some() {
        let others: Vec<&str> = record
            .calls
            .sample_ids()
            .into_iter()
            .filter(|sample| *sample != variant.call.sample)
            .map(sample_display_id)
            .collect();
        if !others.is_empty() {
            paragraphs.push(Paragraph::text(format!(
                "Вариант обнаружен у {}",
                others.iter().join(", ")
            )));
        }
    }

    // closing classification and recommendations
    if let Some(significance) = classified.note.significance() {
        paragraphs.push(Paragraph::text(format!(
            "По совокупности сведений вариант расценивается как {significance}."
        )));
    }
    paragraphs.push(Paragraph::text(
        "Рекомендуется сопоставление фенотипа пациента с фенотипом заболеваний, ассоциированных \
         с геном.",
    ));
    paragraphs.push(Paragraph::text(
        "Вариант требует обязательного подтверждения генотипа референсным методом \
         (секвенирование по методу Сэнгера).",
    ));
}

/// The "leading-to" clause of the intro sentence for one consequence class.
fn leading_to_clause(record: &VariantRecord, kind: ConsequenceKind) -> String {
    let protein_msg = record.annotation.protein_change().unwrap_or_default();
    match kind {
        ConsequenceKind::Missense => {
            format!("который приводит к аминокислотной замене {protein_msg}")
        }
        ConsequenceKind::Synonymous => {
            format!("который приводит / может приводить к аберрантному сплайсингу {protein_msg}")
        }
        ConsequenceKind::Intronic => {
            "который приводит / может приводить к аберрантному сплайсингу".to_string()
        }
        ConsequenceKind::Frameshift => {
            let size = indel_size(record);
            let direction = if size > 0 { "вставке" } else { "удалению" };
            format!(
                "который приводит к {direction} {} нуклеотидов, сдвигу рамки считывания и \
                 образованию преждевременного стоп-кодона {protein_msg}",
                size.abs()
            )
        }
        ConsequenceKind::Nonsense => {
            format!("который приводит к образованию преждевременного стоп-кодона {protein_msg}")
        }
        ConsequenceKind::SpliceSite => {
            "который приводит к разрушению канонического сайта сплайсинга".to_string()
        }
    }
}

/// The computational-evidence paragraph for one consequence class.
fn computational_evidence(record: &VariantRecord, kind: ConsequenceKind) -> Paragraph {
    let insilico = evidence::predict_insilico(&record.scores);
    let mut paragraph = Paragraph::default();
    match kind {
        ConsequenceKind::Missense => {
            if let Some(conservation) = evidence::conservation(record.scores.gerp_rs) {
                paragraph.push(match conservation {
                    Conservation::HighlyConserved => {
                        "Вариант расположен в высококонсервативной позиции. "
                    }
                    Conservation::Conserved => "Вариант расположен в консервативной позиции. ",
                    Conservation::NonConserved => {
                        "Вариант расположен в неконсервативной позиции. "
                    }
                });
            }
            paragraph.push(if insilico {
                "Компьютерные алгоритмы предсказывают патогенный эффект варианта на белок."
            } else {
                "Компьютерные алгоритмы предсказывают нейтральный эффект варианта на белок."
            });
        }
        ConsequenceKind::Frameshift | ConsequenceKind::Nonsense => {
            paragraph.push(
                "Вариант с большой долей вероятности приводит к потере функции соответствующей \
                 копии гена.",
            );
        }
        ConsequenceKind::SpliceSite => {
            if insilico {
                paragraph.push(
                    "Вариант предсказан приводить к аберрантному сплайсингу компьютерными \
                     алгоритмами. ",
                );
                paragraph.push(
                    "Вариант с большой долей вероятности приводит к потере функции \
                     соответствующей копии гена.",
                );
            } else {
                paragraph.push(
                    "Вариант не предсказан приводить к аберрантному сплайсингу компьютерными \
                     алгоритмами. ",
                );
            }
        }
        ConsequenceKind::Synonymous | ConsequenceKind::Intronic => {
            paragraph.push(if insilico {
                "Вариант предсказан приводить к аберрантному сплайсингу компьютерными \
                 алгоритмами. "
            } else {
                "Вариант не предсказан приводить к аберрантному сплайсингу компьютерными \
                 алгоритмами. "
            });
            paragraph.push("Требуется проведение функционального анализа.");
        }
    }
    paragraph
}

/// Exon/intron location phrase of the intro sentence.
fn location_phrase(annotation: &TranscriptAnnotation) -> Option<String> {
    if let Some(exon) = annotation.exon.as_deref() {
        let (index, total) = exon.split_once('/').unwrap_or((exon, ""));
        Some(format!("в {index} экзоне из {total} экзонов"))
    } else if let Some(intron) = annotation.intron.as_deref() {
        let (index, total) = intron.split_once('/').unwrap_or((intron, ""));
        Some(format!("в {index} интроне из {total} интронов"))
    } else {
        None
    }
}

/// Signed indel length with gap characters stripped.
fn indel_size(record: &VariantRecord) -> i64 {
    let length = |allele: &str| allele.chars().filter(|c| *c != '-').count() as i64;
    length(&record.alt_base) - length(&record.ref_base)
}

/// Parse a per-laboratory significance counts string such as
/// `"Pathogenic (2); Uncertain significance (1)"` into display messages.
///
/// Malformed entries are skipped rather than reported.
fn lab_significance_messages(lab_significance: Option<&str>) -> Vec<String> {
    let Some(lab_significance) = lab_significance else {
        return Vec::new();
    };
    lab_significance
        .split("; ")
        .filter_map(|entry| {
            let entry = entry.strip_suffix(')')?;
            let (significance, count) = entry.rsplit_once(" (")?;
            Some(format!(
                "как {} {} лабораторией(ями)",
                clinvar_significance_label(significance).unwrap_or(significance),
                count
            ))
        })
        .collect()
}

/// Display messages for a related ClinVar variant, falling back to its raw
/// significance when no laboratory counts are recorded.
fn related_messages(related: &RelatedVariant) -> Vec<String> {
    let messages = lab_significance_messages(related.lab_significance.as_deref());
    if messages.is_empty() {
        vec![related.significance.clone()]
    } else {
        messages
    }
}

/// ClinVar citation URL for a variation identifier.
fn clinvar_url(id: &str) -> String {
    format!("https://www.ncbi.nlm.nih.gov/clinvar/variation/{id}")
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::report::classify::{self, ClassifiedVariant};
    use crate::report::project;
    use crate::report::schema::data::{
        ClinvarInfo, PackedCalls, PopulationCounts, RelatedVariant, SourceCounts,
        TranscriptAnnotation, VariantIdentity, VariantRecord,
    };

    use super::{Bibliography, Paragraph, BASE_SOURCES};

    fn paragraph_text(paragraph: &Paragraph) -> String {
        paragraph.runs.iter().map(|run| run.text.as_str()).collect()
    }

    fn narrative_text(paragraphs: &[Paragraph]) -> Vec<String> {
        paragraphs.iter().map(paragraph_text).collect()
    }

    fn duo_record(note: &str) -> VariantRecord {
        VariantRecord {
            note: note.into(),
            identity: VariantIdentity {
                chrom: "chr7".into(),
                pos: 117_559_590,
                reference: "G".into(),
                alternative: "A".into(),
            },
            ref_base: "G".into(),
            alt_base: "A".into(),
            annotation: TranscriptAnnotation {
                symbol: "CFTR".into(),
                transcript: "ENST00000003084".into(),
                refseq: Some("NM_000492.4".into()),
                hgvs_g: Some("g.117559590G>A".into()),
                hgvs_c: Some("c.1521G>A".into()),
                hgvs_p: Some("p.Gly508Arg".into()),
                consequence: "missense_variant".into(),
                exon: Some("11/27".into()),
                ..Default::default()
            },
            calls: PackedCalls {
                samples: Some("case.1;mother.1".into()),
                zygosity: Some("het;hom".into()),
                allele_depth: Some("10,20;30".into()),
                total_depth: Some("40;60".into()),
                filter: Some("PASS;PASS".into()),
            },
            ..Default::default()
        }
    }

    fn classified_for(record: &VariantRecord, sample: &str) -> ClassifiedVariant {
        let projected = project::for_sample(record, sample).expect("projection");
        classify::classify(projected, None).expect("classification")
    }

    #[test]
    fn bibliography_starts_from_the_base_list() {
        let mut bibliography = Bibliography::default();
        assert_eq!(bibliography.entries().len(), BASE_SOURCES.len());
        let index = bibliography.cite("https://example.com/1".into());
        assert_eq!(index, BASE_SOURCES.len() + 1);
    }

    #[test]
    fn bibliography_never_reuses_indices() {
        let mut bibliography = Bibliography::default();
        let first = bibliography.cite("https://www.ncbi.nlm.nih.gov/clinvar/variation/7108".into());
        let second =
            bibliography.cite("https://www.ncbi.nlm.nih.gov/clinvar/variation/7108".into());
        assert_eq!(second, first + 1);
        assert_eq!(bibliography.entries().len(), BASE_SOURCES.len() + 2);
    }

    #[test]
    fn no_causative_variants_yield_the_no_findings_sentence() {
        let mut bibliography = Bibliography::default();
        let paragraphs = super::compose(&[], None, &mut bibliography);
        let text = narrative_text(&paragraphs);
        assert_eq!(text.len(), 4);
        assert!(text[1].contains("Значимых изменений"), "text = {text:?}");
        assert!(paragraphs[3].runs[0].bold);
    }

    #[test]
    fn duo_cohort_without_frequency_data() {
        // a variant seen het in the proband and hom in the mother, with no
        // population frequency data and no ClinVar annotation
        let record = duo_record("1");

        for (sample, zygosity_phrase) in [
            ("case.1", "в гетерозиготном состоянии"),
            ("mother.1", "в гомозиготном состоянии"),
        ] {
            let classified = classified_for(&record, sample);
            assert_eq!(classified.category, "Каузативный");

            let mut bibliography = Bibliography::default();
            let paragraphs =
                super::compose(&[classified], None, &mut bibliography);
            let text = narrative_text(&paragraphs).join("\n");

            assert!(text.contains(zygosity_phrase), "text = {text}");
            assert!(
                text.contains("Вариант не встречается в базе данных популяционных частот"),
                "text = {text}"
            );
            // no ClinVar data, so no footnote beyond the base list
            assert_eq!(bibliography.entries().len(), BASE_SOURCES.len());
            assert!(!text.contains("Вариант обнаружен у"), "text = {text}");
        }
    }

    #[test]
    fn intro_sentence_carries_identifiers_and_location() {
        let record = duo_record("1");
        let classified = classified_for(&record, "case.1");
        let mut bibliography = Bibliography::default();
        let paragraphs = super::compose(&[classified], None, &mut bibliography);
        let intro = paragraph_text(&paragraphs[1]);

        assert!(
            intro.contains("(g.117559590G>A, NM_000492.4:c.1521G>A)"),
            "intro = {intro}"
        );
        assert!(intro.contains("в 11 экзоне из 27 экзонов"), "intro = {intro}");
        assert!(
            intro.contains("аминокислотной замене p.(Gly508Arg)"),
            "intro = {intro}"
        );
        assert!(intro.contains("с глубиной прочтения 40x."), "intro = {intro}");
        // the gene symbol is an italic run of its own
        let italic_runs: Vec<_> = paragraphs[1]
            .runs
            .iter()
            .filter(|run| run.italic)
            .collect();
        assert_eq!(italic_runs.len(), 1);
        assert_eq!(italic_runs[0].text, "CFTR");
    }

    #[test]
    fn found_frequency_sentence_shows_percent_and_allele_count() {
        let mut record = duo_record("1");
        record.frequencies = PopulationCounts {
            gnomad_genomes: SourceCounts::new(Some(100), Some(1)),
            gnomad_exomes: SourceCounts::new(Some(300), Some(1)),
        };
        let classified = classified_for(&record, "case.1");
        let mut bibliography = Bibliography::default();
        let text = narrative_text(&super::compose(&[classified], None, &mut bibliography));
        assert!(
            text.iter().any(|paragraph| paragraph
                .contains("с частотой 0.5% (2 аллел(ей))")),
            "text = {text:?}"
        );
    }

    #[test]
    fn secondary_finding_with_lab_counts_cites_one_new_entry() {
        // two laboratory messages, one citation, citing the appended index
        let mut record = duo_record("7");
        record.clinvar = ClinvarInfo {
            id: Some("7108".into()),
            significance: Some("Pathogenic".into()),
            lab_significance: Some("Pathogenic (2); Uncertain significance (1)".into()),
            ..Default::default()
        };
        let classified = classified_for(&record, "case.1");

        let mut bibliography = Bibliography::default();
        let paragraphs = super::compose(&[classified], None, &mut bibliography);
        let text = narrative_text(&paragraphs);

        assert_eq!(bibliography.entries().len(), BASE_SOURCES.len() + 1);
        let expected_index = BASE_SOURCES.len() + 1;
        let clinvar_sentence = text
            .iter()
            .find(|paragraph| paragraph.contains("в базе данных ClinVar"))
            .expect("ClinVar sentence");
        assert_eq!(
            clinvar_sentence,
            &format!(
                "Вариант аннотирован как патогенный 2 лабораторией(ями), как вариант с \
                 неизвестной клинической значимостью 1 лабораторией(ями) в базе данных ClinVar \
                 [{expected_index}]."
            )
        );
        // the secondary-finding code defines no significance label, so no
        // closing classification sentence is emitted
        assert!(
            !text.iter().any(|paragraph| paragraph.contains("расценивается")),
            "text = {text:?}"
        );
    }

    #[test]
    fn clinvar_significance_without_lab_counts_falls_back() {
        let mut record = duo_record("2");
        record.clinvar = ClinvarInfo {
            id: Some("5555".into()),
            significance: Some("Likely_pathogenic".into()),
            ..Default::default()
        };
        let classified = classified_for(&record, "case.1");
        let mut bibliography = Bibliography::default();
        let text = narrative_text(&super::compose(&[classified], None, &mut bibliography));
        assert!(
            text.iter().any(|paragraph| paragraph.contains(
                "Вариант аннотирован как вероятно патогенный в базе данных ClinVar"
            )),
            "text = {text:?}"
        );
    }

    #[test]
    fn same_clinvar_id_cited_by_two_variants_gets_two_entries() {
        let mut record = duo_record("1");
        record.clinvar = ClinvarInfo {
            id: Some("7108".into()),
            significance: Some("Pathogenic".into()),
            ..Default::default()
        };
        let first = classified_for(&record, "case.1");
        let second = classified_for(&record, "case.1");

        let mut bibliography = Bibliography::default();
        let text =
            narrative_text(&super::compose(&[first, second], None, &mut bibliography));

        assert_eq!(bibliography.entries().len(), BASE_SOURCES.len() + 2);
        let first_index = BASE_SOURCES.len() + 1;
        let second_index = BASE_SOURCES.len() + 2;
        assert!(
            text.iter().any(|p| p.contains(&format!("[{first_index}]"))),
            "text = {text:?}"
        );
        assert!(
            text.iter().any(|p| p.contains(&format!("[{second_index}]"))),
            "text = {text:?}"
        );
    }

    #[test]
    fn equivalents_and_alternatives_each_cite_their_own_entry() {
        let mut record = duo_record("1");
        record.clinvar = ClinvarInfo {
            equivalents: vec![RelatedVariant::new(
                "7110".into(),
                "p.Gly508Arg".into(),
                "Pathogenic".into(),
                "criteria provided".into(),
                Some("Pathogenic (3)".into()),
            )],
            alternatives: vec![RelatedVariant::new(
                "7111".into(),
                "p.Gly508Trp".into(),
                "Likely pathogenic".into(),
                "criteria provided".into(),
                None,
            )],
            ..Default::default()
        };
        let classified = classified_for(&record, "case.1");
        let mut bibliography = Bibliography::default();
        let text = narrative_text(&super::compose(&[classified], None, &mut bibliography));

        assert_eq!(bibliography.entries().len(), BASE_SOURCES.len() + 2);
        assert!(
            text.iter().any(|p| p.contains(
                "Вариант с такой же аминокислотной заменой p.Gly508Arg в той же позиции \
                 аннотирован как патогенный 3 лабораторией(ями) [11]."
            )),
            "text = {text:?}"
        );
        // without laboratory counts the raw significance is used verbatim
        assert!(
            text.iter().any(|p| p.contains(
                "Вариант с другой аминокислотной заменой p.Gly508Trp в той же позиции \
                 аннотирован Likely pathogenic [12]."
            )),
            "text = {text:?}"
        );
    }

    #[test]
    fn co_occurrence_is_listed_only_with_a_target_sample() {
        let record = duo_record("1");
        let classified = classified_for(&record, "case.1");

        let mut bibliography = Bibliography::default();
        let without_target =
            narrative_text(&super::compose(&[classified.clone()], None, &mut bibliography));
        assert!(
            !without_target.iter().any(|p| p.contains("Вариант обнаружен у")),
            "text = {without_target:?}"
        );

        let mut bibliography = Bibliography::default();
        let with_target = narrative_text(&super::compose(
            &[classified],
            Some("case.1"),
            &mut bibliography,
        ));
        assert!(
            with_target.iter().any(|p| p == "Вариант обнаружен у mother"),
            "text = {with_target:?}"
        );
    }

    #[rstest]
    // insertions and deletions are sized after stripping gap characters
    #[case("-", "TCT", "вставке 3 нуклеотидов")]
    #[case("TCT", "-", "удалению 3 нуклеотидов")]
    fn frameshift_clause_names_indel_size(
        #[case] ref_base: &str,
        #[case] alt_base: &str,
        #[case] expected: &str,
    ) {
        let mut record = duo_record("1");
        record.ref_base = ref_base.into();
        record.alt_base = alt_base.into();
        record.annotation.consequence = "frameshift_variant".into();
        let classified = classified_for(&record, "case.1");
        let mut bibliography = Bibliography::default();
        let text = narrative_text(&super::compose(&[classified], None, &mut bibliography));
        assert!(
            text.iter().any(|p| p.contains(expected)),
            "text = {text:?}"
        );
        assert!(
            text.iter().any(|p| p.contains("потере функции")),
            "text = {text:?}"
        );
    }

    #[rstest]
    // splice-site variants predicted to disrupt splicing also lose function
    #[case("splice_acceptor_variant", Some(0.99), "Вариант предсказан", true)]
    #[case("splice_acceptor_variant", None, "Вариант не предсказан", false)]
    // synonymous variants always ask for functional analysis
    #[case("synonymous_variant", None, "Требуется проведение функционального анализа.", false)]
    fn computational_evidence_branches(
        #[case] consequence: &str,
        #[case] splice_ada: Option<f64>,
        #[case] expected: &str,
        #[case] lof_expected: bool,
    ) {
        let mut record = duo_record("3");
        record.annotation.consequence = consequence.into();
        record.scores.splice_ada = splice_ada;
        let classified = classified_for(&record, "case.1");
        let mut bibliography = Bibliography::default();
        let text = narrative_text(&super::compose(&[classified], None, &mut bibliography));
        assert!(text.iter().any(|p| p.contains(expected)), "text = {text:?}");
        assert_eq!(
            text.iter().any(|p| p.contains("потере функции")),
            lof_expected,
            "text = {text:?}"
        );
    }

    #[test]
    fn closing_classification_uses_the_note_label() {
        let record = duo_record("3");
        let classified = classified_for(&record, "case.1");
        let mut bibliography = Bibliography::default();
        let text = narrative_text(&super::compose(&[classified], None, &mut bibliography));
        assert!(
            text.iter().any(|p| p
                == "По совокупности сведений вариант расценивается как вариант с неизвестной \
                    клинической значимостью."),
            "text = {text:?}"
        );
        assert!(
            text.iter()
                .any(|p| p.contains("подтверждения генотипа референсным методом")),
            "text = {text:?}"
        );
    }
}
