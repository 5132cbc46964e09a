//! Common functionality.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Zygosity of a variant call in one sample.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
pub enum Zygosity {
    /// Heterozygous call.
    #[strum(serialize = "het")]
    Het,
    /// Homozygous call.
    #[strum(serialize = "hom")]
    Hom,
}

impl Zygosity {
    /// Label used in the result tables.
    pub fn table_label(&self) -> &'static str {
        match self {
            Zygosity::Het => "Гетерозигота",
            Zygosity::Hom => "Гомозигота",
        }
    }

    /// Phrase used in the interpretation text.
    pub fn phrase(&self) -> &'static str {
        match self {
            Zygosity::Het => "в гетерозиготном состоянии",
            Zygosity::Hom => "в гомозиготном состоянии",
        }
    }
}

/// Display form of a sample identifier, truncated at the first dot.
///
/// Sequencing sample ids carry a lane/flowcell suffix after the dot that is
/// not part of the laboratory sample number.
pub fn sample_display_id(sample: &str) -> &str {
    sample.split('.').next().unwrap_or(sample)
}
