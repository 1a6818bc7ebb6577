use std::io::Read;
use std::sync::LazyLock;

use bio::io::{fasta, fastq};
use flate2::read::GzDecoder;
use regex::Regex;

use crate::domain::{ResultRecord, SequenceFormat, SequenceRecord};
use crate::error::EnaError;

static RESULT_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Number of results:\s*([0-9][0-9,]*)\s*$").expect("valid count regex")
});

/// Decodes a tab-separated response: header line, then one record per line.
/// A row whose column count differs from the header is an error.
pub fn decode_tabular(raw: &str) -> Result<Vec<ResultRecord>, EnaError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .flexible(false)
        .from_reader(raw.as_bytes());

    let headers = reader.headers().map_err(tabular_error)?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(tabular_error)?;
        records.push(ResultRecord::from_pairs(
            headers
                .iter()
                .zip(row.iter())
                .map(|(name, value)| (name.to_string(), value.to_string())),
        ));
    }
    tracing::debug!(rows = records.len(), columns = headers.len(), "decoded tabular response");
    Ok(records)
}

fn tabular_error(err: csv::Error) -> EnaError {
    let location = err
        .position()
        .map(|pos| format!("line {}", pos.line()))
        .unwrap_or_else(|| "unknown line".to_string());
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} columns, found {len}"),
        _ => err.to_string(),
    };
    EnaError::MalformedResponse { location, message }
}

/// Splits FASTA/FASTQ text into records. Parsing is delegated to `bio`.
pub fn decode_sequence(raw: &str, format: SequenceFormat) -> Result<Vec<SequenceRecord>, EnaError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let records = match format {
        SequenceFormat::Fasta => fasta::Reader::new(raw.as_bytes())
            .records()
            .enumerate()
            .map(|(index, record)| {
                let record = record.map_err(|err| sequence_error(format, index, err.to_string()))?;
                Ok(SequenceRecord {
                    id: record.id().to_string(),
                    description: record.desc().map(str::to_string),
                    sequence: String::from_utf8_lossy(record.seq()).into_owned(),
                    quality: None,
                })
            })
            .collect::<Result<Vec<_>, EnaError>>()?,
        SequenceFormat::Fastq => fastq::Reader::new(raw.as_bytes())
            .records()
            .enumerate()
            .map(|(index, record)| {
                let record = record.map_err(|err| sequence_error(format, index, err.to_string()))?;
                if let Err(message) = record.check() {
                    return Err(sequence_error(format, index, message.to_string()));
                }
                Ok(SequenceRecord {
                    id: record.id().to_string(),
                    description: record.desc().map(str::to_string),
                    sequence: String::from_utf8_lossy(record.seq()).into_owned(),
                    quality: Some(String::from_utf8_lossy(record.qual()).into_owned()),
                })
            })
            .collect::<Result<Vec<_>, EnaError>>()?,
    };
    tracing::debug!(records = records.len(), %format, "decoded sequence response");
    Ok(records)
}

fn sequence_error(format: SequenceFormat, index: usize, message: String) -> EnaError {
    EnaError::MalformedResponse {
        location: format!("{format} record {}", index + 1),
        message,
    }
}

/// Parses the `Number of results: N` line of a result-count response.
pub fn decode_result_count(raw: &str) -> Result<u64, EnaError> {
    let first = raw.lines().next().unwrap_or_default();
    let digits = RESULT_COUNT
        .captures(first)
        .and_then(|captures| captures.get(1))
        .map(|count| count.as_str().replace(',', ""))
        .ok_or_else(|| EnaError::MalformedResponse {
            location: "line 1".to_string(),
            message: format!("expected a result count, found {:?}", first.trim()),
        })?;
    digits.parse().map_err(|_| EnaError::MalformedResponse {
        location: "line 1".to_string(),
        message: format!("{digits:?} is not a count"),
    })
}

pub fn decompress_gzip(bytes: &[u8]) -> Result<Vec<u8>, EnaError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|err| EnaError::MalformedResponse {
            location: "gzip body".to_string(),
            message: err.to_string(),
        })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn count_with_thousands_separator() {
        assert_eq!(decode_result_count("Number of results: 12,345\n").unwrap(), 12_345);
    }

    #[test]
    fn count_with_other_label_is_malformed() {
        assert_matches!(
            decode_result_count("Error: 404"),
            Err(EnaError::MalformedResponse { .. })
        );
    }

    #[test]
    fn count_without_colon_is_malformed() {
        assert_matches!(
            decode_result_count("<html>"),
            Err(EnaError::MalformedResponse { .. })
        );
    }
}
