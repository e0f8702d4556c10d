//! Serde model of the curated classification lookup.
use crate::error::Result;
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TaxonRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub family_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub family_typos: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genera: Vec<GenusRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GenusRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub genus_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genus_typos: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genus_species: Vec<SpeciesRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SpeciesRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub species_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub species_typos: Vec<String>,
}

// The lookup file uses `null` and missing keys interchangeably.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads the JSON array of family records.
pub fn load_taxonomy(file_path: &Path) -> Result<Vec<TaxonRecord>> {
    let reader = BufReader::new(File::open(file_path)?);
    let records: Vec<TaxonRecord> = serde_json::from_reader(reader)?;
    Ok(records)
}
