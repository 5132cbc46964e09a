//! Localized gene-level annotation texts.

use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;

/// Localized disease and inheritance texts keyed by gene symbol.
///
/// The dictionary is maintained by the clinical team and loaded from a JSON
/// file; a missing key always means "keep the computed value".
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct GeneAnnotations {
    /// Texts for the OMIM-associated genes.
    #[serde(default)]
    pub omim: DiseaseAnnotations,
    /// Texts for the secondary-findings gene list.
    #[serde(default)]
    pub secondary: SecondaryAnnotations,
}

/// Disease descriptions keyed by gene symbol.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct DiseaseAnnotations {
    /// Gene symbol to localized disease description.
    #[serde(default)]
    pub disease: IndexMap<String, String>,
}

/// Disease and inheritance descriptions for secondary-findings genes.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SecondaryAnnotations {
    /// Gene symbol to localized disease description.
    #[serde(default)]
    pub disease: IndexMap<String, String>,
    /// Gene symbol to localized inheritance description.
    #[serde(default)]
    pub inheritance: IndexMap<String, String>,
}

impl GeneAnnotations {
    /// Load the dictionary from a JSON file.
    pub fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("could not open gene annotations {}", path.display()))?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("could not parse gene annotations {}", path.display()))
    }

    /// Localized disease text for `symbol`.
    pub fn disease(&self, symbol: &str) -> Option<&str> {
        self.omim.disease.get(symbol).map(String::as_str)
    }

    /// Localized disease text for a secondary finding in `symbol`.
    pub fn secondary_disease(&self, symbol: &str) -> Option<&str> {
        self.secondary.disease.get(symbol).map(String::as_str)
    }

    /// Localized inheritance text for a secondary finding in `symbol`.
    pub fn secondary_inheritance(&self, symbol: &str) -> Option<&str> {
        self.secondary.inheritance.get(symbol).map(String::as_str)
    }
}
