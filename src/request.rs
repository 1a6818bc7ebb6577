use serde::{Deserialize, Serialize};

use crate::catalog::{TAXON_CONTEXT, VIEW_CONTEXT};
use crate::domain::{FieldSelection, PageLength, SequenceFormat, SubsequenceRange};
use crate::error::EnaError;
use crate::validate::Validator;

const TAXON_PREFIX: &str = "Taxon:";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchParams {
    pub query: String,
    pub result: String,
    pub display: String,
    #[serde(default)]
    pub free_text: bool,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub sort_fields: Option<Vec<String>>,
    #[serde(default)]
    pub download: Option<String>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub length: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSearch {
    pub(crate) query: String,
    pub(crate) result: String,
    pub(crate) display: String,
    pub(crate) free_text: bool,
    pub(crate) fields: Option<Vec<String>>,
    pub(crate) sort_fields: Option<Vec<String>>,
    pub(crate) download: Option<String>,
    pub(crate) offset: u64,
    pub(crate) length: PageLength,
}

impl SearchParams {
    pub fn validate(&self, validator: &Validator<'_>) -> Result<ValidatedSearch, EnaError> {
        let result = validator.check_result(&self.result)?;
        let display = validator.check_display(&self.display, &result)?;
        let download = self
            .download
            .as_deref()
            .map(|download| validator.check_download(download, &result))
            .transpose()?;
        let fields = self
            .fields
            .as_ref()
            .map(|names| validator.check_returnable_fields(&FieldSelection::from_names(names), &result))
            .transpose()?;
        let sort_fields = self
            .sort_fields
            .as_ref()
            .map(|names| validator.check_sortable_fields(&FieldSelection::from_names(names), &result))
            .transpose()?;
        let offset = validator.check_offset(self.offset.unwrap_or(0))?;
        let length = validator.check_length(self.length.unwrap_or(0))?;
        let query = validator.check_query(&self.query)?;

        Ok(ValidatedSearch {
            query,
            result,
            display,
            free_text: self.free_text,
            fields,
            sort_fields,
            download,
            offset,
            length,
        })
    }
}

impl ValidatedSearch {
    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn download(&self) -> Option<&str> {
        self.download.as_deref()
    }

    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn length(&self) -> PageLength {
        self.length
    }

    pub fn sequence_format(&self) -> Option<SequenceFormat> {
        SequenceFormat::from_display(&self.display)
    }

    pub fn count(&self) -> ValidatedCount {
        ValidatedCount {
            query: self.query.clone(),
            result: self.result.clone(),
            free_text: self.free_text,
        }
    }

    pub(crate) fn page(&self, offset: u64, length: u64) -> ValidatedSearch {
        ValidatedSearch {
            offset,
            length: PageLength::Limit(length),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCount {
    pub(crate) query: String,
    pub(crate) result: String,
    pub(crate) free_text: bool,
}

impl ValidatedCount {
    pub fn new(
        validator: &Validator<'_>,
        query: &str,
        result: &str,
        free_text: bool,
    ) -> Result<Self, EnaError> {
        let result = validator.check_result(result)?;
        let query = validator.check_query(query)?;
        Ok(Self {
            query,
            result,
            free_text,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrieveParams {
    pub ids: Vec<String>,
    pub display: String,
    #[serde(default)]
    pub download: Option<String>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub length: Option<i64>,
    #[serde(default)]
    pub range_start: Option<i64>,
    #[serde(default)]
    pub range_stop: Option<i64>,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub header: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonParams {
    pub ids: Vec<String>,
    pub display: String,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub download: Option<String>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub length: Option<i64>,
    #[serde(default)]
    pub range_start: Option<i64>,
    #[serde(default)]
    pub range_stop: Option<i64>,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub header: bool,
}

/// A retrieval request whose ids, display and options passed the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRetrieve {
    pub(crate) ids: Vec<String>,
    pub(crate) display: String,
    pub(crate) taxonomy_result: Option<String>,
    pub(crate) download: Option<String>,
    pub(crate) offset: u64,
    pub(crate) length: PageLength,
    pub(crate) range: Option<SubsequenceRange>,
    pub(crate) expanded: bool,
    pub(crate) header: bool,
    pub(crate) batch: bool,
}

impl ValidatedRetrieve {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn download(&self) -> Option<&str> {
        self.download.as_deref()
    }

    pub fn range(&self) -> Option<SubsequenceRange> {
        self.range
    }

    pub fn is_batch(&self) -> bool {
        self.batch
    }

    pub fn sequence_format(&self) -> Option<SequenceFormat> {
        SequenceFormat::from_display(&self.display)
    }
}

struct RetrieveParts<'p> {
    ids: &'p [String],
    display: &'p str,
    download: Option<&'p str>,
    offset: Option<i64>,
    length: Option<i64>,
    range_start: Option<i64>,
    range_stop: Option<i64>,
    expanded: bool,
    header: bool,
}

impl RetrieveParams {
    pub fn validate(&self, validator: &Validator<'_>) -> Result<ValidatedRetrieve, EnaError> {
        validate_retrieve(
            validator,
            VIEW_CONTEXT,
            RetrieveParts {
                ids: &self.ids,
                display: &self.display,
                download: self.download.as_deref(),
                offset: self.offset,
                length: self.length,
                range_start: self.range_start,
                range_stop: self.range_stop,
                expanded: self.expanded,
                header: self.header,
            },
            None,
        )
    }
}

impl TaxonParams {
    pub fn validate(&self, validator: &Validator<'_>) -> Result<ValidatedRetrieve, EnaError> {
        let taxonomy_result = self
            .result
            .as_deref()
            .map(|result| validator.check_taxonomy_result(result))
            .transpose()?;
        let mut validated = validate_retrieve(
            validator,
            TAXON_CONTEXT,
            RetrieveParts {
                ids: &self.ids,
                display: &self.display,
                download: self.download.as_deref(),
                offset: self.offset,
                length: self.length,
                range_start: self.range_start,
                range_stop: self.range_stop,
                expanded: self.expanded,
                header: self.header,
            },
            taxonomy_result,
        )?;
        validated.ids = validated
            .ids
            .into_iter()
            .map(|id| {
                if id.starts_with(TAXON_PREFIX) {
                    id
                } else {
                    format!("{TAXON_PREFIX}{id}")
                }
            })
            .collect();
        Ok(validated)
    }
}

fn validate_retrieve(
    validator: &Validator<'_>,
    context: &str,
    parts: RetrieveParts<'_>,
    taxonomy_result: Option<String>,
) -> Result<ValidatedRetrieve, EnaError> {
    let ids = split_ids(parts.ids);
    if ids.is_empty() {
        return Err(EnaError::InvalidRequest(
            "at least one id is required".to_string(),
        ));
    }
    let display = validator.check_display(parts.display, context)?;
    let download = parts
        .download
        .map(|download| validator.check_download(download, context))
        .transpose()?;
    let offset = validator.check_offset(parts.offset.unwrap_or(0))?;
    let length = validator.check_length(parts.length.unwrap_or(0))?;
    let range = validator.check_range(parts.range_start, parts.range_stop)?;
    let batch = validator.catalog().is_batch_display(context, &display);

    Ok(ValidatedRetrieve {
        ids,
        display,
        taxonomy_result,
        download,
        offset,
        length,
        range,
        expanded: parts.expanded,
        header: parts.header,
        batch,
    })
}

fn split_ids(ids: &[String]) -> Vec<String> {
    ids.iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Run,
    Analysis,
}

impl ReportKind {
    pub fn result(&self) -> &'static str {
        match self {
            ReportKind::Run => "read_run",
            ReportKind::Analysis => "analysis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileReportParams {
    pub accession: String,
    pub kind: ReportKind,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFileReport {
    pub(crate) accession: String,
    pub(crate) result: String,
    pub(crate) fields: Option<Vec<String>>,
}

impl FileReportParams {
    pub fn validate(&self, validator: &Validator<'_>) -> Result<ValidatedFileReport, EnaError> {
        let result = validator.check_result(self.kind.result())?;
        let fields = self
            .fields
            .as_ref()
            .map(|names| validator.check_returnable_fields(&FieldSelection::from_names(names), &result))
            .transpose()?;
        let accession = self.accession.trim();
        if accession.is_empty() {
            return Err(EnaError::InvalidRequest(
                "an accession is required".to_string(),
            ));
        }
        Ok(ValidatedFileReport {
            accession: accession.to_string(),
            result,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn taxon_ids_get_prefixed_once() {
        let catalog = Catalog::packaged().unwrap();
        let validator = Validator::new(&catalog);
        let params = TaxonParams {
            ids: vec!["9606,Taxon:10090".to_string()],
            display: "xml".to_string(),
            ..TaxonParams::default()
        };
        let validated = params.validate(&validator).unwrap();
        assert_eq!(validated.ids(), ["Taxon:9606", "Taxon:10090"]);
        assert!(validated.is_batch());
    }

    #[test]
    fn retrieve_requires_ids() {
        let catalog = Catalog::packaged().unwrap();
        let validator = Validator::new(&catalog);
        let params = RetrieveParams {
            ids: vec![" , ".to_string()],
            display: "fasta".to_string(),
            ..RetrieveParams::default()
        };
        assert_matches!(params.validate(&validator), Err(EnaError::InvalidRequest(_)));
    }
}
