//! Projection of cohort-wide variant records onto a single sample.

use crate::report::schema::data::{SampleCall, SampleVariant, VariantRecord};

/// Filter status value required for a call to be reported.
const FILTER_PASS: &str = "PASS";

/// Project `record` onto `sample`.
///
/// Returns `None` when the sample is not listed for the variant or when its
/// call did not pass quality filtering; both are expected conditions that
/// exclude the variant from the sample's report.
///
/// The scalar values are taken at the sample's index in the packed sample-id
/// list; all packed call fields share that ordering. The allele depth keeps
/// only the last `,`-separated token, dropping the reference-allele depth of
/// ref,alt-packed values.
pub fn for_sample(record: &VariantRecord, sample: &str) -> Option<SampleVariant> {
    let samples = record.calls.sample_ids();
    let idx = samples.iter().position(|s| *s == sample)?;

    let field_at = |packed: &Option<String>| -> Option<String> {
        packed
            .as_deref()
            .and_then(|packed| packed.split(';').nth(idx))
            .filter(|value| !value.is_empty())
            .map(String::from)
    };

    if field_at(&record.calls.filter).as_deref() != Some(FILTER_PASS) {
        tracing::trace!(
            "variant {} did not pass filtering for sample {}",
            record.identity,
            sample
        );
        return None;
    }

    let call = SampleCall {
        sample: sample.to_string(),
        zygosity: field_at(&record.calls.zygosity).and_then(|zygosity| zygosity.parse().ok()),
        allele_depth: field_at(&record.calls.allele_depth)
            .map(|depth| depth.rsplit(',').next().unwrap_or(&depth).to_string()),
        total_depth: field_at(&record.calls.total_depth),
    };

    Some(SampleVariant {
        record: record.clone(),
        call,
    })
}
