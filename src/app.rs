use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::Catalog;
use crate::client::Fetcher;
use crate::decode::{
    decode_result_count, decode_sequence, decode_tabular, decompress_gzip,
};
use crate::domain::{ResultRecord, SequenceFormat, SequenceRecord};
use crate::error::EnaError;
use crate::output::TextOutput;
use crate::request::{
    FileReportParams, ReportKind, RetrieveParams, SearchParams, TaxonParams, ValidatedCount,
    ValidatedRetrieve,
};
use crate::url::UrlBuilder;
use crate::validate::Validator;

const TABULAR_DISPLAY: &str = "report";
const GZIP_DOWNLOAD: &str = "gzip";

/// What an operation hands back: decoded rows or sequences, raw text for
/// displays that are not decoded (xml, html, text), or a saved file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Retrieved {
    Records(Vec<ResultRecord>),
    Sequences(Vec<SequenceRecord>),
    Text(String),
    Saved { path: PathBuf, bytes: u64 },
}

impl Retrieved {
    pub fn len(&self) -> usize {
        match self {
            Retrieved::Records(records) => records.len(),
            Retrieved::Sequences(records) => records.len(),
            Retrieved::Text(text) => usize::from(!text.is_empty()),
            Retrieved::Saved { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy)]
enum Decoding {
    Tabular,
    Sequence(SequenceFormat),
    Raw,
}

impl Decoding {
    fn for_display(display: &str) -> Self {
        match SequenceFormat::from_display(display) {
            Some(format) => Decoding::Sequence(format),
            None if display == TABULAR_DISPLAY => Decoding::Tabular,
            None => Decoding::Raw,
        }
    }
}

pub struct App<F: Fetcher> {
    catalog: Catalog,
    urls: UrlBuilder,
    fetcher: F,
}

impl<F: Fetcher> App<F> {
    pub fn new(catalog: Catalog, urls: UrlBuilder, fetcher: F) -> Self {
        Self {
            catalog,
            urls,
            fetcher,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    pub fn validator(&self) -> Validator<'_> {
        Validator::new(&self.catalog)
    }

    pub fn search(&self, params: &SearchParams, file: Option<&Path>) -> Result<Retrieved, EnaError> {
        let search = params.validate(&self.validator())?;
        let url = self.urls.search_url(&search);
        tracing::info!(result = search.result(), display = search.display(), "search");
        let body = self.fetcher.fetch(&url)?;
        self.finish(
            vec![body],
            Decoding::for_display(search.display()),
            search.download(),
            file,
        )
    }

    /// Pages through every hit of a FASTA/FASTQ search, one request per
    /// `max_length` records.
    pub fn search_all(
        &self,
        params: &SearchParams,
        file: Option<&Path>,
    ) -> Result<Retrieved, EnaError> {
        let search = params.validate(&self.validator())?;
        let Some(format) = search.sequence_format() else {
            return Err(EnaError::InvalidRequest(format!(
                "fetching all results is only supported for fasta or fastq display, not {}",
                search.display()
            )));
        };

        let total = self.fetch_count(&search.count())?;
        let page = self.catalog.max_length();
        tracing::info!(result = search.result(), total, page, "search all");

        let mut bodies = Vec::new();
        let mut offset = 1u64;
        while offset <= total {
            let url = self.urls.search_url(&search.page(offset, page));
            bodies.push(self.fetcher.fetch(&url)?);
            offset += page;
        }
        self.finish(
            bodies,
            Decoding::Sequence(format),
            search.download(),
            file,
        )
    }

    pub fn count(&self, query: &str, result: &str, free_text: bool) -> Result<u64, EnaError> {
        let count = ValidatedCount::new(&self.validator(), query, result, free_text)?;
        self.fetch_count(&count)
    }

    pub fn retrieve_data(
        &self,
        params: &RetrieveParams,
        file: Option<&Path>,
    ) -> Result<Retrieved, EnaError> {
        let retrieve = params.validate(&self.validator())?;
        tracing::info!(ids = retrieve.ids().len(), display = retrieve.display(), "retrieve data");
        self.retrieve(&retrieve, file)
    }

    pub fn retrieve_taxons(
        &self,
        params: &TaxonParams,
        file: Option<&Path>,
    ) -> Result<Retrieved, EnaError> {
        let retrieve = params.validate(&self.validator())?;
        tracing::info!(ids = retrieve.ids().len(), display = retrieve.display(), "retrieve taxons");
        self.retrieve(&retrieve, file)
    }

    pub fn retrieve_run_report(
        &self,
        accession: &str,
        fields: Option<Vec<String>>,
        file: Option<&Path>,
    ) -> Result<Retrieved, EnaError> {
        self.retrieve_file_report(
            &FileReportParams {
                accession: accession.to_string(),
                kind: ReportKind::Run,
                fields,
            },
            file,
        )
    }

    pub fn retrieve_analysis_report(
        &self,
        accession: &str,
        fields: Option<Vec<String>>,
        file: Option<&Path>,
    ) -> Result<Retrieved, EnaError> {
        self.retrieve_file_report(
            &FileReportParams {
                accession: accession.to_string(),
                kind: ReportKind::Analysis,
                fields,
            },
            file,
        )
    }

    pub fn retrieve_file_report(
        &self,
        params: &FileReportParams,
        file: Option<&Path>,
    ) -> Result<Retrieved, EnaError> {
        let report = params.validate(&self.validator())?;
        let url = self.urls.file_report_url(&report);
        tracing::info!(accession = %params.accession, kind = ?params.kind, "file report");
        let body = self.fetcher.fetch(&url)?;
        self.finish(vec![body], Decoding::Tabular, None, file)
    }

    fn retrieve(
        &self,
        retrieve: &ValidatedRetrieve,
        file: Option<&Path>,
    ) -> Result<Retrieved, EnaError> {
        let urls = self.urls.retrieve_urls(retrieve);
        let bodies = urls
            .iter()
            .map(|url| self.fetcher.fetch(url))
            .collect::<Result<Vec<_>, EnaError>>()?;
        self.finish(
            bodies,
            Decoding::for_display(retrieve.display()),
            retrieve.download(),
            file,
        )
    }

    fn fetch_count(&self, count: &ValidatedCount) -> Result<u64, EnaError> {
        let url = self.urls.count_url(count);
        let body = self.fetcher.fetch(&url)?;
        decode_result_count(&String::from_utf8_lossy(&body))
    }

    fn finish(
        &self,
        bodies: Vec<Vec<u8>>,
        decoding: Decoding,
        download: Option<&str>,
        file: Option<&Path>,
    ) -> Result<Retrieved, EnaError> {
        let gzipped = download == Some(GZIP_DOWNLOAD);
        if let Some(path) = file {
            // Several tabular bodies each carry a header; merge them under one.
            if matches!(decoding, Decoding::Tabular) && bodies.len() > 1 && !gzipped {
                let records = decode_records(&body_texts(bodies, false)?)?;
                let mut merged = Vec::new();
                TextOutput::write_records(&mut merged, &records)
                    .map_err(|err| EnaError::Filesystem(err.to_string()))?;
                return save(path, &[merged]);
            }
            return save(path, &bodies);
        }

        let texts = body_texts(bodies, gzipped)?;
        match decoding {
            Decoding::Tabular => Ok(Retrieved::Records(decode_records(&texts)?)),
            Decoding::Sequence(format) => {
                let mut records = Vec::new();
                for text in &texts {
                    records.extend(decode_sequence(text, format)?);
                }
                Ok(Retrieved::Sequences(records))
            }
            Decoding::Raw => Ok(Retrieved::Text(texts.concat())),
        }
    }
}

fn body_texts(bodies: Vec<Vec<u8>>, gzipped: bool) -> Result<Vec<String>, EnaError> {
    bodies
        .into_iter()
        .map(|body| {
            let body = if gzipped { decompress_gzip(&body)? } else { body };
            Ok(String::from_utf8_lossy(&body).into_owned())
        })
        .collect()
}

fn decode_records(texts: &[String]) -> Result<Vec<ResultRecord>, EnaError> {
    let mut records = Vec::new();
    for text in texts {
        records.extend(decode_tabular(text)?);
    }
    Ok(records)
}

fn save(path: &Path, bodies: &[Vec<u8>]) -> Result<Retrieved, EnaError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| EnaError::Filesystem(err.to_string()))?;
    }
    let mut file = File::create(path)
        .map_err(|err| EnaError::Filesystem(format!("create {}: {err}", path.display())))?;
    let mut written = 0u64;
    for body in bodies {
        file.write_all(body)
            .map_err(|err| EnaError::Filesystem(err.to_string()))?;
        written += body.len() as u64;
    }
    tracing::info!(path = %path.display(), bytes = written, "saved response");
    Ok(Retrieved::Saved {
        path: path.to_path_buf(),
        bytes: written,
    })
}
