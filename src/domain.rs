use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::EnaError;

/// 1-based inclusive sub-sequence positions, `start <= stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubsequenceRange {
    start: u64,
    stop: u64,
}

impl SubsequenceRange {
    pub fn new(start: i64, stop: i64) -> Result<Self, EnaError> {
        if start < 1 {
            return Err(EnaError::InvalidRange(format!(
                "start ({start}) must be at least 1"
            )));
        }
        if stop < start {
            return Err(EnaError::InvalidRange(format!(
                "start ({start}) must not exceed stop ({stop})"
            )));
        }
        Ok(Self {
            start: start as u64,
            stop: stop as u64,
        })
    }

    /// Both bounds or neither; a single bound is an error.
    pub fn from_bounds(start: Option<i64>, stop: Option<i64>) -> Result<Option<Self>, EnaError> {
        match (start, stop) {
            (None, None) => Ok(None),
            (Some(start), Some(stop)) => Self::new(start, stop).map(Some),
            (Some(start), None) => Err(EnaError::InvalidRange(format!(
                "start ({start}) given without stop"
            ))),
            (None, Some(stop)) => Err(EnaError::InvalidRange(format!(
                "stop ({stop}) given without start"
            ))),
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn stop(&self) -> u64 {
        self.stop
    }
}

impl fmt::Display for SubsequenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.stop)
    }
}

impl FromStr for SubsequenceRange {
    type Err = EnaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (start, stop) = trimmed
            .split_once('-')
            .ok_or_else(|| EnaError::InvalidRange(format!("expected start-stop, got {value}")))?;
        let parse = |bound: &str| {
            let bound = bound.trim();
            if bound.is_empty() {
                return Ok(None);
            }
            bound
                .parse::<i64>()
                .map(Some)
                .map_err(|_| EnaError::InvalidRange(format!("{bound} is not an integer position")))
        };
        Self::from_bounds(parse(start)?, parse(stop)?)?
            .ok_or_else(|| EnaError::InvalidRange(format!("expected start-stop, got {value}")))
    }
}

/// Number of records to return; zero means no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageLength {
    #[default]
    Unbounded,
    Limit(u64),
}

impl PageLength {
    pub fn limit(&self) -> Option<u64> {
        match self {
            PageLength::Unbounded => None,
            PageLength::Limit(limit) => Some(*limit),
        }
    }
}

/// Requested columns: every field of the result, or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldSelection {
    All,
    Named(Vec<String>),
}

impl FieldSelection {
    pub const ALL_SENTINEL: &'static str = "all";

    /// Accepts repeated and comma-separated names alike.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut named = Vec::new();
        for entry in names {
            for name in entry.as_ref().split(',') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                if name.eq_ignore_ascii_case(Self::ALL_SENTINEL) {
                    return FieldSelection::All;
                }
                named.push(name.to_string());
            }
        }
        if named.is_empty() {
            FieldSelection::All
        } else {
            FieldSelection::Named(named)
        }
    }
}

/// Sequence framing understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceFormat {
    Fasta,
    Fastq,
}

impl SequenceFormat {
    pub fn from_display(display: &str) -> Option<Self> {
        match display {
            "fasta" => Some(SequenceFormat::Fasta),
            "fastq" => Some(SequenceFormat::Fastq),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceFormat::Fasta => "fasta",
            SequenceFormat::Fastq => "fastq",
        }
    }
}

impl fmt::Display for SequenceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of a tabular response, columns in header order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultRecord {
    columns: Vec<(String, String)>,
}

impl ResultRecord {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            columns: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for ResultRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceRecord {
    pub id: String,
    pub description: Option<String>,
    pub sequence: String,
    pub quality: Option<String>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_range_valid() {
        let range: SubsequenceRange = "3-63".parse().unwrap();
        assert_eq!((range.start(), range.stop()), (3, 63));
        assert_eq!(range.to_string(), "3-63");
    }

    #[test]
    fn parse_range_single_position() {
        let range: SubsequenceRange = "7-7".parse().unwrap();
        assert_eq!(range.start(), range.stop());
    }

    #[test]
    fn parse_range_missing_bound() {
        assert_matches!(
            "10-".parse::<SubsequenceRange>(),
            Err(EnaError::InvalidRange(_))
        );
        assert_matches!(
            "-10".parse::<SubsequenceRange>(),
            Err(EnaError::InvalidRange(_))
        );
    }

    #[test]
    fn field_selection_sentinel() {
        assert_eq!(FieldSelection::from_names(["all"]), FieldSelection::All);
        assert_eq!(
            FieldSelection::from_names(Vec::<String>::new()),
            FieldSelection::All
        );
        assert_eq!(
            FieldSelection::from_names(["run_accession,fastq_ftp", "tax_id"]),
            FieldSelection::Named(vec![
                "run_accession".to_string(),
                "fastq_ftp".to_string(),
                "tax_id".to_string()
            ])
        );
    }
}
