use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EnaError;

const PACKAGED_CATALOG: &str = include_str!("../data/catalog.json");

/// Context key for display/download/batch lookups on the record retrieval endpoint.
/// Retrieval contexts carry a `retrieve:` prefix so they never collide with a
/// result type of the same name.
pub const VIEW_CONTEXT: &str = "retrieve:view";
/// Context key for lookups on taxon retrieval.
pub const TAXON_CONTEXT: &str = "retrieve:taxon";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Result,
    TaxonomyResult,
    Display,
    Download,
    Fields,
    SortFields,
    FilterFields,
    BatchDisplay,
}

impl Parameter {
    pub const NAMES: &'static [&'static str] = &[
        "result",
        "taxonomy_result",
        "display",
        "download",
        "fields",
        "sortfields",
        "filter_fields",
        "batch_display",
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Parameter::Result => "result",
            Parameter::TaxonomyResult => "taxonomy_result",
            Parameter::Display => "display",
            Parameter::Download => "download",
            Parameter::Fields => "fields",
            Parameter::SortFields => "sortfields",
            Parameter::FilterFields => "filter_fields",
            Parameter::BatchDisplay => "batch_display",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Parameter {
    type Err = EnaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "result" => Ok(Parameter::Result),
            "taxonomy_result" => Ok(Parameter::TaxonomyResult),
            "display" => Ok(Parameter::Display),
            "download" => Ok(Parameter::Download),
            "fields" | "returnable_fields" => Ok(Parameter::Fields),
            "sortfields" | "sortable_fields" => Ok(Parameter::SortFields),
            "filter_fields" => Ok(Parameter::FilterFields),
            "batch_display" => Ok(Parameter::BatchDisplay),
            _ => Err(EnaError::UnknownParameter(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResultInfo {
    pub description: String,
    #[serde(default)]
    pub returnable_fields: Vec<String>,
    #[serde(default)]
    pub filter_fields: BTreeMap<String, FilterField>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilterField {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilterType {
    pub operators: Vec<String>,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SpecialFilter {
    pub description: String,
    pub parameters: Vec<String>,
    pub example: String,
}

/// Legal values for every categorical request parameter.
///
/// Lookups are two-level: parameter, then an optional context (a result
/// type, or one of [`VIEW_CONTEXT`] / [`TAXON_CONTEXT`]). A context the
/// catalog does not describe yields an empty set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    max_length: u64,
    results: BTreeMap<String, ResultInfo>,
    taxonomy_results: BTreeMap<String, String>,
    display_options: BTreeMap<String, String>,
    download_options: BTreeMap<String, String>,
    display_contexts: BTreeMap<String, Vec<String>>,
    download_contexts: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    batch_displays: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    filter_types: BTreeMap<String, FilterType>,
    #[serde(default)]
    special_filters: BTreeMap<String, BTreeMap<String, SpecialFilter>>,
}

impl Catalog {
    pub fn packaged() -> Result<Self, EnaError> {
        Self::from_json(PACKAGED_CATALOG)
    }

    pub fn from_path(path: &Path) -> Result<Self, EnaError> {
        let content = fs::read_to_string(path)
            .map_err(|err| EnaError::Filesystem(format!("read {}: {err}", path.display())))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, EnaError> {
        let catalog: Catalog =
            serde_json::from_str(content).map_err(|err| EnaError::CatalogParse(err.to_string()))?;
        catalog.check_consistency()?;
        tracing::debug!(
            results = catalog.results.len(),
            displays = catalog.display_options.len(),
            "option catalog loaded"
        );
        Ok(catalog)
    }

    fn check_consistency(&self) -> Result<(), EnaError> {
        if self.max_length == 0 {
            return Err(EnaError::CatalogParse(
                "max_length must be greater than zero".to_string(),
            ));
        }
        let contexts = [
            ("display", &self.display_contexts, &self.display_options),
            ("download", &self.download_contexts, &self.download_options),
            ("batch display", &self.batch_displays, &self.display_options),
        ];
        for (label, subsets, known) in contexts {
            for (context, values) in subsets {
                if let Some(value) = values.iter().find(|value| !known.contains_key(*value)) {
                    return Err(EnaError::CatalogParse(format!(
                        "{label} context {context} lists unknown option {value}"
                    )));
                }
            }
        }
        for taxonomy_result in self.taxonomy_results.keys() {
            if !self.results.contains_key(taxonomy_result) {
                return Err(EnaError::CatalogParse(format!(
                    "taxonomy result {taxonomy_result} is not a result"
                )));
            }
        }
        Ok(())
    }

    /// Legal values for a parameter named by string.
    pub fn values_for(
        &self,
        parameter: &str,
        context: Option<&str>,
    ) -> Result<BTreeSet<&str>, EnaError> {
        let parameter: Parameter = parameter.parse()?;
        Ok(self.values(parameter, context))
    }

    pub fn values(&self, parameter: Parameter, context: Option<&str>) -> BTreeSet<&str> {
        match parameter {
            Parameter::Result => keys(&self.results),
            Parameter::TaxonomyResult => keys(&self.taxonomy_results),
            Parameter::Display => match context {
                Some(context) => subset(&self.display_contexts, context),
                None => keys(&self.display_options),
            },
            Parameter::Download => match context {
                Some(context) => subset(&self.download_contexts, context),
                None => keys(&self.download_options),
            },
            Parameter::BatchDisplay => match context {
                Some(context) => subset(&self.batch_displays, context),
                None => self
                    .batch_displays
                    .values()
                    .flatten()
                    .map(String::as_str)
                    .collect(),
            },
            Parameter::Fields => match context {
                Some(result) => self
                    .returnable_fields(result)
                    .iter()
                    .map(String::as_str)
                    .collect(),
                None => self
                    .results
                    .values()
                    .flat_map(|info| info.returnable_fields.iter())
                    .map(String::as_str)
                    .collect(),
            },
            Parameter::SortFields | Parameter::FilterFields => match context {
                Some(result) => self
                    .results
                    .get(result)
                    .map(|info| keys(&info.filter_fields))
                    .unwrap_or_default(),
                None => self
                    .results
                    .values()
                    .flat_map(|info| info.filter_fields.keys())
                    .map(String::as_str)
                    .collect(),
            },
        }
    }

    pub fn contains(&self, parameter: Parameter, context: Option<&str>, value: &str) -> bool {
        self.values(parameter, context).contains(value)
    }

    pub fn max_length(&self) -> u64 {
        self.max_length
    }

    pub fn results(&self) -> &BTreeMap<String, ResultInfo> {
        &self.results
    }

    pub fn result(&self, result: &str) -> Option<&ResultInfo> {
        self.results.get(result)
    }

    pub fn taxonomy_results(&self) -> &BTreeMap<String, String> {
        &self.taxonomy_results
    }

    pub fn display_options(&self) -> &BTreeMap<String, String> {
        &self.display_options
    }

    pub fn download_options(&self) -> &BTreeMap<String, String> {
        &self.download_options
    }

    pub fn filter_types(&self) -> &BTreeMap<String, FilterType> {
        &self.filter_types
    }

    pub fn special_filters(&self) -> &BTreeMap<String, BTreeMap<String, SpecialFilter>> {
        &self.special_filters
    }

    /// Returnable fields of a result in catalog order; empty for unknown results.
    pub fn returnable_fields(&self, result: &str) -> &[String] {
        self.results
            .get(result)
            .map(|info| info.returnable_fields.as_slice())
            .unwrap_or(&[])
    }

    pub fn filter_fields(&self, result: &str) -> Option<&BTreeMap<String, FilterField>> {
        self.results.get(result).map(|info| &info.filter_fields)
    }

    pub fn is_batch_display(&self, context: &str, display: &str) -> bool {
        self.contains(Parameter::BatchDisplay, Some(context), display)
    }
}

fn keys<V>(map: &BTreeMap<String, V>) -> BTreeSet<&str> {
    map.keys().map(String::as_str).collect()
}

fn subset<'a>(map: &'a BTreeMap<String, Vec<String>>, context: &str) -> BTreeSet<&'a str> {
    map.get(context)
        .map(|values| values.iter().map(String::as_str).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn packaged_catalog_loads() {
        let catalog = Catalog::packaged().unwrap();
        assert_eq!(catalog.results().len(), 18);
        assert_eq!(catalog.max_length(), 100_000);
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let catalog = Catalog::packaged().unwrap();
        let err = catalog.values_for("colour", None).unwrap_err();
        assert_matches!(err, EnaError::UnknownParameter(name) if name == "colour");
    }

    #[test]
    fn inconsistent_context_is_rejected() {
        let raw = r#"{
            "max_length": 10,
            "results": {},
            "taxonomy_results": {},
            "display_options": {"xml": "XML"},
            "download_options": {},
            "display_contexts": {"retrieve:view": ["xml", "fasta"]},
            "download_contexts": {}
        }"#;
        let err = Catalog::from_json(raw).unwrap_err();
        assert_matches!(err, EnaError::CatalogParse(message) if message.contains("fasta"));
    }

    #[test]
    fn zero_max_length_is_rejected() {
        let raw = r#"{
            "max_length": 0,
            "results": {},
            "taxonomy_results": {},
            "display_options": {},
            "download_options": {},
            "display_contexts": {},
            "download_contexts": {}
        }"#;
        let err = Catalog::from_json(raw).unwrap_err();
        assert_matches!(err, EnaError::CatalogParse(message) if message.contains("max_length"));
    }

    #[test]
    fn taxon_result_and_taxon_retrieval_are_separate_contexts() {
        let catalog = Catalog::packaged().unwrap();
        assert!(catalog.contains(Parameter::Download, Some("taxon"), "gzip"));
        assert!(!catalog.contains(Parameter::Download, Some(TAXON_CONTEXT), "gzip"));
        assert!(catalog.contains(Parameter::Download, Some(TAXON_CONTEXT), "txt"));
    }
}
