//! Implementation of the `report generate` subcommand.

use std::path::Path;

use anyhow::Context;
use indexmap::IndexSet;

use crate::common::sample_display_id;
use crate::report::annos::GeneAnnotations;
use crate::report::schema::data::{RawRecord, VariantRecord};
use crate::report::{classify, narrative, output, project, schema};

/// Command line arguments for the `report generate` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "Generate per-sample clinical report data", long_about = None)]
pub struct Args {
    /// Path to the variant annotation TSV file.
    #[arg(long, required = true)]
    pub path_input: String,
    /// Path to the output directory.
    #[arg(long, required = true)]
    pub path_output: String,
    /// Path to the localized gene annotation JSON file.
    #[arg(long)]
    pub path_annotations: Option<String>,
    /// Target (proband) sample in a duo/trio.
    #[arg(long)]
    pub target_sample: Option<String>,
    /// Reporting clinician name.
    #[arg(long, default_value = "")]
    pub clinician: String,
    /// Explicit cohort sample list; derived from the data when omitted.
    #[arg(long, value_delimiter = ',')]
    pub samples: Vec<String>,
    /// Abort on the first defective record instead of skipping it.
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

/// Main entry point for the `report generate` subcommand.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let annotations = args
        .path_annotations
        .as_ref()
        .map(|path| GeneAnnotations::load(Path::new(path)))
        .transpose()?;

    tracing::info!("Loading variant annotation table...");
    let (kind, raw_records) = load_table(Path::new(&args.path_input))?;
    tracing::info!(
        "... done loading {} records with {:?} schema",
        raw_records.len(),
        kind
    );

    let mut records = Vec::new();
    for raw in &raw_records {
        match schema::normalize(raw, kind) {
            Ok(record) => records.push(record),
            Err(e) if args.strict => return Err(e).context("defective input record"),
            Err(e) => tracing::warn!("skipping defective record: {}", e),
        }
    }

    let samples = cohort_samples(&records, &args.samples);
    anyhow::ensure!(!samples.is_empty(), "no samples found in the input data");
    tracing::info!("cohort samples: {:?}", &samples);
    if let Some(target_sample) = &args.target_sample {
        if !samples.contains(target_sample) {
            tracing::warn!("target sample {} is not part of the cohort", target_sample);
        }
    }

    std::fs::create_dir_all(&args.path_output)
        .with_context(|| format!("could not create output directory {}", &args.path_output))?;
    let issued_on = chrono::Local::now().date_naive();

    for sample in &samples {
        tracing::info!("Building report data for sample {}...", sample);

        let mut classified = Vec::new();
        for record in &records {
            let Some(projected) = project::for_sample(record, sample) else {
                continue;
            };
            match classify::classify(projected, annotations.as_ref()) {
                Ok(variant) => classified.push(variant),
                Err(e) if args.strict => return Err(e).context("defective input record"),
                Err(e) => tracing::warn!("skipping defective record: {}", e),
            }
        }
        tracing::info!("... {} variants reportable for the sample", classified.len());

        let mut bibliography = narrative::Bibliography::default();
        let interpretation = narrative::compose(
            &classified,
            args.target_sample.as_deref(),
            &mut bibliography,
        );
        let report = output::assemble(
            sample,
            &classified,
            interpretation,
            bibliography.into_entries(),
            issued_on,
            &args.clinician,
        )?;

        let path_report = Path::new(&args.path_output)
            .join(format!("report-{}.json", sample_display_id(sample)));
        let file = std::fs::File::create(&path_report)
            .with_context(|| format!("could not create {}", path_report.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &report)
            .with_context(|| format!("could not write {}", path_report.display()))?;

        let path_rows = Path::new(&args.path_output).join(format!(
            "reported-variants-{}.tsv",
            sample_display_id(sample)
        ));
        write_upload_rows(&path_rows, &output::upload_rows(&report.case, &classified))?;

        tracing::info!(
            "... wrote {} and {}",
            path_report.display(),
            path_rows.display()
        );
    }

    Ok(())
}

/// Read the variant annotation TSV and detect its schema generation.
///
/// Rows without a clinical annotation code were not curated for the report
/// and are dropped here.
fn load_table(path: &Path) -> Result<(schema::SchemaKind, Vec<RawRecord>), anyhow::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("could not open {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let kind = schema::SchemaKind::detect(headers.iter());

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let raw: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        if raw.get("base__note").is_none() {
            continue;
        }
        records.push(raw);
    }
    Ok((kind, records))
}

/// Cohort sample ids: the explicit list when given, otherwise the union of
/// the per-variant packed sample lists in order of first appearance.
fn cohort_samples(records: &[VariantRecord], explicit: &[String]) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    let mut samples = IndexSet::new();
    for record in records {
        for sample in record.calls.sample_ids() {
            samples.insert(sample.to_string());
        }
    }
    samples.into_iter().collect()
}

/// Write the storage upload rows as TSV.
fn write_upload_rows(path: &Path, rows: &[output::UploadRecord]) -> Result<(), anyhow::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("could not create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
