//! Raw measurement records and the replicate lookup tables used to group them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IsotopeLabel {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Precursor {
    Peptide {
        sequence: String,
        #[serde(default)]
        modified_sequence: Option<String>,
    },
    Molecule {
        name: String,
    },
}

impl Precursor {
    /// Modified sequence when known, otherwise the plain sequence or ion name.
    pub fn identity(&self) -> &str {
        match self {
            Precursor::Peptide {
                sequence,
                modified_sequence,
            } => modified_sequence.as_deref().unwrap_or(sequence),
            Precursor::Molecule { name } => name,
        }
    }
}

/// One precursor measured in one sample file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub sample_file_id: i64,
    pub precursor: Precursor,
    pub charge: u32,
    pub isotope_label: IsotopeLabel,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub retention_time: Option<f64>,
    /// Enclosing group (protein or molecule list) used for sibling colors.
    #[serde(default)]
    pub group: Option<String>,
}

/// Already-resolved metadata tables supplied alongside the records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookups {
    /// Sample file id to replicate id.
    #[serde(default)]
    pub sample_files: HashMap<i64, i64>,
    /// Replicate id to replicate name.
    #[serde(default)]
    pub replicates: HashMap<i64, String>,
    /// Replicate id to annotation name/value pairs.
    #[serde(default)]
    pub annotations: HashMap<i64, HashMap<String, String>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedReplicate<'a> {
    pub id: i64,
    pub name: &'a str,
    annotations: Option<&'a HashMap<String, String>>,
}

impl<'a> ResolvedReplicate<'a> {
    pub fn annotation(&self, name: &str) -> Option<&'a str> {
        self.annotations?.get(name).map(String::as_str)
    }
}

impl Lookups {
    pub fn resolve(&self, sample_file_id: i64) -> Option<ResolvedReplicate<'_>> {
        let id = *self.sample_files.get(&sample_file_id)?;
        let name = self.replicates.get(&id)?;
        Some(ResolvedReplicate {
            id,
            name,
            annotations: self.annotations.get(&id),
        })
    }
}
