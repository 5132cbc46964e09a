//! Aggregation of population-frequency and in-silico evidence.

use crate::report::schema::data::{PredictorScores, VariantRecord};

/// Lowest-severity calling thresholds of the in-silico predictor cascade.
const SPLICE_ADA_CALL: f64 = 0.957813;
const METARNN_CALL: f64 = 0.748;
const REVEL_CALL: f64 = 0.644;
const ALPHAMISSENSE_CALL: f64 = 0.787;
const PHYLOP100_CALL: f64 = 7.52;

/// GERP RS thresholds for conservation classification.
const GERP_HIGHLY_CONSERVED: f64 = 2.0;
const GERP_CONSERVED: f64 = 0.0;

/// Combined allele counts across the population frequency sources.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new,
)]
pub struct FrequencyAggregate {
    /// Summed allele number.
    pub allele_number: i64,
    /// Summed alternative allele count.
    pub allele_count: i64,
}

impl FrequencyAggregate {
    /// Combine the gnomAD genomes and exomes counts of `record`.
    ///
    /// Sources without data contribute nothing to either sum.
    pub fn with_record(record: &VariantRecord) -> Self {
        let sources = [
            record.frequencies.gnomad_genomes,
            record.frequencies.gnomad_exomes,
        ];
        let allele_number: i64 = sources.iter().filter_map(|counts| counts.an).sum();
        let allele_count: i64 = if allele_number > 0 {
            sources.iter().filter_map(|counts| counts.ac).sum()
        } else {
            0
        };
        Self {
            allele_number,
            allele_count,
        }
    }

    /// Allele frequency; undefined when no alleles were genotyped.
    ///
    /// `None` renders downstream as "not available", which is distinct from
    /// a defined frequency of zero.
    pub fn frequency(&self) -> Option<f64> {
        (self.allele_number > 0).then(|| self.allele_count as f64 / self.allele_number as f64)
    }
}

/// Single boolean pathogenicity verdict from the predictor cascade.
///
/// Predictors are consulted in fixed priority order and the first one with a
/// usable score decides alone. A score of zero counts as absent.
pub fn predict_insilico(scores: &PredictorScores) -> bool {
    let cascade = [
        (scores.splice_ada, SPLICE_ADA_CALL),
        (scores.metarnn, METARNN_CALL),
        (scores.revel, REVEL_CALL),
        (scores.alphamissense, ALPHAMISSENSE_CALL),
        (scores.phylop100, PHYLOP100_CALL),
    ];
    for (score, threshold) in cascade {
        if let Some(score) = score.filter(|score| *score != 0.0) {
            return score >= threshold;
        }
    }
    false
}

/// Conservation class of a position, derived from the GERP RS score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conservation {
    /// Highly conserved position.
    HighlyConserved,
    /// Conserved position.
    Conserved,
    /// Non-conserved position.
    NonConserved,
}

/// Classify the GERP RS score; a zero score counts as absent.
pub fn conservation(gerp_rs: Option<f64>) -> Option<Conservation> {
    let score = gerp_rs.filter(|score| *score != 0.0)?;
    Some(if score >= GERP_HIGHLY_CONSERVED {
        Conservation::HighlyConserved
    } else if score >= GERP_CONSERVED {
        Conservation::Conserved
    } else {
        Conservation::NonConserved
    })
}

/// Format a fraction as a percentage with the minimal unambiguous precision.
///
/// The precision starts at one significant decimal of the percentage and is
/// bumped by one digit when the rounded value would show a bare mantissa of
/// 1, which would read as a threshold boundary.
pub fn format_percent(fraction: f64) -> String {
    let percent = 100.0 * fraction;
    if percent <= 0.0 {
        return "0%".to_string();
    }
    let mut digits = std::cmp::max(1, -percent.log10().floor() as i32);
    if ((10f64.powi(digits) * percent).round() - 1.0).abs() < f64::EPSILON {
        digits += 1;
    }
    let scale = 10f64.powi(digits);
    let mut rendered = format!("{:.*}", digits as usize, (percent * scale).round() / scale);
    while rendered.ends_with('0') && !rendered.ends_with(".0") {
        rendered.pop();
    }
    format!("{rendered}%")
}
