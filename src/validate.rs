use crate::catalog::{Catalog, Parameter};
use crate::domain::{FieldSelection, PageLength, SubsequenceRange};
use crate::error::EnaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Returnable,
    Sortable,
}

impl FieldKind {
    fn parameter(self) -> Parameter {
        match self {
            FieldKind::Returnable => Parameter::Fields,
            FieldKind::Sortable => Parameter::SortFields,
        }
    }

    fn label(self) -> &'static str {
        match self {
            FieldKind::Returnable => "returnable",
            FieldKind::Sortable => "sortable",
        }
    }
}

/// Checks candidate parameters against a catalog. Every check is pure and
/// returns the normalized value or the first error found.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    catalog: &'a Catalog,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn check_result(&self, result: &str) -> Result<String, EnaError> {
        self.check_member(result, Parameter::Result, |value, valid| {
            EnaError::InvalidResult { value, valid }
        })
    }

    pub fn check_taxonomy_result(&self, result: &str) -> Result<String, EnaError> {
        self.check_member(result, Parameter::TaxonomyResult, |value, valid| {
            EnaError::InvalidOption {
                parameter: "taxonomy result".to_string(),
                value,
                context: "taxon retrieval".to_string(),
                valid,
            }
        })
    }

    /// `context` is a result type or a retrieval context such as
    /// [`crate::catalog::VIEW_CONTEXT`].
    pub fn check_display(&self, display: &str, context: &str) -> Result<String, EnaError> {
        self.check_option(Parameter::Display, display, context)
    }

    pub fn check_download(&self, download: &str, context: &str) -> Result<String, EnaError> {
        self.check_option(Parameter::Download, download, context)
    }

    pub fn check_returnable_fields(
        &self,
        selection: &FieldSelection,
        result: &str,
    ) -> Result<Vec<String>, EnaError> {
        self.check_fields(selection, result, FieldKind::Returnable)
    }

    pub fn check_sortable_fields(
        &self,
        selection: &FieldSelection,
        result: &str,
    ) -> Result<Vec<String>, EnaError> {
        self.check_fields(selection, result, FieldKind::Sortable)
    }

    pub fn check_length(&self, length: i64) -> Result<PageLength, EnaError> {
        if length < 0 {
            return Err(EnaError::InvalidLength {
                value: length,
                reason: "must be a non-negative integer".to_string(),
            });
        }
        let length = length as u64;
        if length == 0 {
            return Ok(PageLength::Unbounded);
        }
        let max = self.catalog.max_length();
        if length > max {
            return Err(EnaError::InvalidLength {
                value: length as i64,
                reason: format!("higher than the limit length ({max})"),
            });
        }
        Ok(PageLength::Limit(length))
    }

    pub fn check_offset(&self, offset: i64) -> Result<u64, EnaError> {
        if offset < 0 {
            return Err(EnaError::InvalidLength {
                value: offset,
                reason: "offset must be a non-negative integer".to_string(),
            });
        }
        Ok(offset as u64)
    }

    pub fn check_range(
        &self,
        start: Option<i64>,
        stop: Option<i64>,
    ) -> Result<Option<SubsequenceRange>, EnaError> {
        SubsequenceRange::from_bounds(start, stop)
    }

    /// Query text is owned by the upstream grammar; only presence is checked.
    pub fn check_query(&self, query: &str) -> Result<String, EnaError> {
        if query.trim().is_empty() {
            return Err(EnaError::InvalidRequest("query must not be empty".to_string()));
        }
        Ok(query.to_string())
    }

    fn check_member<F>(
        &self,
        candidate: &str,
        parameter: Parameter,
        make_error: F,
    ) -> Result<String, EnaError>
    where
        F: FnOnce(String, Vec<String>) -> EnaError,
    {
        let legal = self.catalog.values(parameter, None);
        if legal.contains(candidate) {
            return Ok(candidate.to_string());
        }
        Err(make_error(candidate.to_string(), owned(legal)))
    }

    fn check_option(
        &self,
        parameter: Parameter,
        candidate: &str,
        context: &str,
    ) -> Result<String, EnaError> {
        let legal = self.catalog.values(parameter, Some(context));
        if legal.contains(candidate) {
            return Ok(candidate.to_string());
        }
        Err(EnaError::InvalidOption {
            parameter: parameter.to_string(),
            value: candidate.to_string(),
            context: context.to_string(),
            valid: owned(legal),
        })
    }

    fn check_fields(
        &self,
        selection: &FieldSelection,
        result: &str,
        kind: FieldKind,
    ) -> Result<Vec<String>, EnaError> {
        match selection {
            FieldSelection::All => Ok(match kind {
                FieldKind::Returnable => self.catalog.returnable_fields(result).to_vec(),
                FieldKind::Sortable => owned(self.catalog.values(kind.parameter(), Some(result))),
            }),
            FieldSelection::Named(names) => {
                let legal = self.catalog.values(kind.parameter(), Some(result));
                if let Some(field) = names.iter().find(|name| !legal.contains(name.as_str())) {
                    return Err(EnaError::InvalidField {
                        field: field.clone(),
                        kind: kind.label().to_string(),
                        result: result.to_string(),
                    });
                }
                Ok(names.clone())
            }
        }
    }
}

fn owned<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn length_zero_is_unbounded() {
        let catalog = Catalog::packaged().unwrap();
        let validator = Validator::new(&catalog);
        assert_eq!(validator.check_length(0).unwrap(), PageLength::Unbounded);
        assert_eq!(validator.check_length(25).unwrap(), PageLength::Limit(25));
    }

    #[test]
    fn length_negative_or_above_limit() {
        let catalog = Catalog::packaged().unwrap();
        let validator = Validator::new(&catalog);
        assert_matches!(
            validator.check_length(-1),
            Err(EnaError::InvalidLength { value: -1, .. })
        );
        assert_matches!(
            validator.check_length(100_001),
            Err(EnaError::InvalidLength { .. })
        );
    }

    #[test]
    fn blank_query_is_rejected() {
        let catalog = Catalog::packaged().unwrap();
        let validator = Validator::new(&catalog);
        assert_matches!(validator.check_query("  "), Err(EnaError::InvalidRequest(_)));
    }
}
