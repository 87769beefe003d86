use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One typed cell of a SPARQL result row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SparqlValue {
    pub value: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl SparqlValue {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            value_type: Some("literal".to_string()),
            lang: None,
            datatype: None,
        }
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            value_type: Some("uri".to_string()),
            lang: None,
            datatype: None,
        }
    }
}

/// One row of a SPARQL result, mapping variable names to typed values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Binding {
    #[serde(flatten)]
    pub vars: HashMap<String, SparqlValue>,
}

impl Binding {
    pub fn value(&self, var: &str) -> Option<&str> {
        self.vars.get(var).map(|v| v.value.as_str())
    }

    pub fn set(&mut self, var: impl Into<String>, value: SparqlValue) {
        self.vars.insert(var.into(), value);
    }
}

/// Body of a `format=json` SPARQL response. Only `results.bindings` is used.
#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResponse {
    pub results: SparqlResults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResults {
    pub bindings: Vec<Binding>,
}

impl SparqlResponse {
    pub fn into_bindings(self) -> Vec<Binding> {
        self.results.bindings
    }
}

/// A work-location statement with its optional time qualifiers.
///
/// Equality covers the full (location, start, end, point-in-time) tuple,
/// which is what batch de-duplication keys on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkLocation {
    pub location: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub point_in_time: Option<String>,
}

/// Flat per-person record assembled from SPARQL result rows.
///
/// Scalar fields stay `None` until filled from a matching row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonInfo {
    pub name: Option<String>,
    pub id: Option<String>,
    pub birth_place: Option<String>,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub death_place: Option<String>,
    pub gender: Option<String>,
    pub citizenship: Option<String>,
    #[serde(default)]
    pub occupations: Vec<String>,
    #[serde(default)]
    pub work_locations: Vec<WorkLocation>,
    #[serde(default)]
    pub influences: Vec<String>,
    #[serde(default)]
    pub exhibitions: Vec<String>,
}

impl PersonInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Result of a bulk Wikidata ID lookup over many names.
///
/// `ids` holds one winning ID per resolved name, `all_ids` every acceptable
/// candidate seen, and `counts` the number of result rows per queried name
/// (zero for names the endpoint did not resolve at all).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdHarvest {
    pub ids: HashMap<String, String>,
    pub all_ids: HashMap<String, Vec<String>>,
    pub counts: HashMap<String, usize>,
}

/// Output of the pipeline transform stage.
#[derive(Debug, Clone)]
pub struct HarvestOutput {
    pub records: Vec<PersonInfo>,
    pub csv_output: String,
    pub json_output: String,
}
