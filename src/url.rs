use crate::domain::PageLength;
use crate::request::{ValidatedCount, ValidatedFileReport, ValidatedRetrieve, ValidatedSearch};

pub const DEFAULT_BASE_URL: &str = "https://www.ebi.ac.uk/ena";

/// Turns validated requests into ENA endpoint URLs. Never touches the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    base_url: String,
}

impl Default for UrlBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl UrlBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn search_url(&self, search: &ValidatedSearch) -> String {
        let mut query = QueryString::default();
        query.push("result", &search.result);
        if let Some(fields) = search.fields.as_deref().filter(|fields| !fields.is_empty()) {
            query.push_list("fields", fields);
        }
        if let Some(sort_fields) = search
            .sort_fields
            .as_deref()
            .filter(|fields| !fields.is_empty())
        {
            query.push_list("sortfields", sort_fields);
        }
        query.push_raw("query", &encode_query(&search.query, search.free_text));
        query.push("display", &search.display);
        if let Some(download) = &search.download {
            query.push("download", download);
        }
        push_pagination(&mut query, search.offset, search.length);
        format!("{}{}", self.search_endpoint(search.free_text), query.finish())
    }

    pub fn count_url(&self, count: &ValidatedCount) -> String {
        let mut query = QueryString::default();
        query.push("result", &count.result);
        query.push_raw("query", &encode_query(&count.query, count.free_text));
        query.flag("resultcount");
        format!("{}{}", self.search_endpoint(count.free_text), query.finish())
    }

    /// One URL for batch-capable displays, otherwise one per id.
    pub fn retrieve_urls(&self, retrieve: &ValidatedRetrieve) -> Vec<String> {
        if retrieve.batch {
            vec![self.retrieve_url(retrieve, &retrieve.ids)]
        } else {
            retrieve
                .ids
                .iter()
                .map(|id| self.retrieve_url(retrieve, std::slice::from_ref(id)))
                .collect()
        }
    }

    pub fn retrieve_url(&self, retrieve: &ValidatedRetrieve, ids: &[String]) -> String {
        let segment = ids
            .iter()
            .map(|id| match retrieve.range {
                Some(range) => format!("{}:{range}", encode_id(id)),
                None => encode_id(id),
            })
            .collect::<Vec<_>>()
            .join(",");

        let mut query = QueryString::default();
        push_pagination(&mut query, retrieve.offset, retrieve.length);
        if let Some(result) = &retrieve.taxonomy_result {
            query.push("result", result);
        }
        if retrieve.expanded {
            query.push("expanded", "true");
        }
        if retrieve.header {
            query.push("header", "true");
        }
        if let Some(download) = &retrieve.download {
            query.push("download", download);
        }

        let url = format!(
            "{}/browser/api/{}/{}",
            self.base_url,
            urlencoding::encode(&retrieve.display),
            segment
        );
        if query.is_empty() {
            url
        } else {
            format!("{url}?{}", query.finish())
        }
    }

    pub fn file_report_url(&self, report: &ValidatedFileReport) -> String {
        let mut query = QueryString::default();
        query.push("accession", &report.accession);
        query.push("result", &report.result);
        if let Some(fields) = report.fields.as_deref().filter(|fields| !fields.is_empty()) {
            query.push_list("fields", fields);
        }
        format!("{}/data/warehouse/filereport?{}", self.base_url, query.finish())
    }

    fn search_endpoint(&self, free_text: bool) -> String {
        if free_text {
            format!("{}/data/search?", self.base_url)
        } else {
            format!("{}/data/warehouse/search?", self.base_url)
        }
    }
}

fn push_pagination(query: &mut QueryString, offset: u64, length: PageLength) {
    if offset > 0 {
        query.push("offset", &offset.to_string());
    }
    if let Some(limit) = length.limit() {
        query.push("length", &limit.to_string());
    }
}

#[derive(Debug, Default)]
struct QueryString {
    pairs: Vec<String>,
}

impl QueryString {
    fn push(&mut self, key: &str, value: &str) {
        self.pairs.push(format!("{key}={}", urlencoding::encode(value)));
    }

    fn push_raw(&mut self, key: &str, encoded: &str) {
        self.pairs.push(format!("{key}={encoded}"));
    }

    /// Items are encoded one by one so the separating commas stay literal.
    fn push_list(&mut self, key: &str, values: &[String]) {
        let joined = values
            .iter()
            .map(|value| urlencoding::encode(value).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        self.pairs.push(format!("{key}={joined}"));
    }

    fn flag(&mut self, key: &str) {
        self.pairs.push(key.to_string());
    }

    fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn finish(self) -> String {
        self.pairs.join("&")
    }
}

/// Percent-encodes a filter expression. `AND`/`OR`/`NOT` are unreserved
/// letters and pass through unchanged; free-text queries keep `+` as the
/// word separator.
pub fn encode_query(query: &str, free_text: bool) -> String {
    if free_text {
        query
            .split('+')
            .map(|part| urlencoding::encode(part).into_owned())
            .collect::<Vec<_>>()
            .join("+")
    } else {
        urlencoding::encode(query).into_owned()
    }
}

fn encode_id(id: &str) -> String {
    id.split(':')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join(":")
}
