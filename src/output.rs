use std::collections::BTreeMap;
use std::io::{self, Write};

use bio::io::{fasta, fastq};
use serde::Serialize;

use crate::app::Retrieved;
use crate::catalog::{Catalog, FilterField};
use crate::domain::{ResultRecord, SequenceRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        Self::write(&mut stdout, value)
    }

    pub fn write<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        out.write_all(json.as_bytes())?;
        out.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn write_retrieved<W: Write>(out: &mut W, retrieved: &Retrieved) -> io::Result<()> {
        match retrieved {
            Retrieved::Records(records) => Self::write_records(out, records),
            Retrieved::Sequences(records) => Self::write_sequences(out, records),
            Retrieved::Text(text) => {
                out.write_all(text.as_bytes())?;
                if !text.ends_with('\n') && !text.is_empty() {
                    out.write_all(b"\n")?;
                }
                Ok(())
            }
            Retrieved::Saved { path, bytes } => {
                writeln!(out, "saved {bytes} bytes to {}", path.display())
            }
        }
    }

    /// Rows in order; a header line precedes the first row and every row
    /// whose columns differ from the previous one.
    pub fn write_records<W: Write>(out: &mut W, records: &[ResultRecord]) -> io::Result<()> {
        let mut header: Option<Vec<&str>> = None;
        for record in records {
            let fields = record.fields().collect::<Vec<_>>();
            if header.as_ref() != Some(&fields) {
                writeln!(out, "{}", fields.join("\t"))?;
                header = Some(fields);
            }
            writeln!(out, "{}", record.values().collect::<Vec<_>>().join("\t"))?;
        }
        Ok(())
    }

    pub fn write_sequences<W: Write>(out: &mut W, records: &[SequenceRecord]) -> io::Result<()> {
        for record in records {
            match &record.quality {
                Some(quality) => {
                    let mut writer = fastq::Writer::new(&mut *out);
                    writer.write(
                        &record.id,
                        record.description.as_deref(),
                        record.sequence.as_bytes(),
                        quality.as_bytes(),
                    )?;
                    writer.flush()?;
                }
                None => {
                    let mut writer = fasta::Writer::new(&mut *out);
                    writer.write(
                        &record.id,
                        record.description.as_deref(),
                        record.sequence.as_bytes(),
                    )?;
                    writer.flush()?;
                }
            }
        }
        Ok(())
    }

    pub fn write_descriptions<W: Write>(
        out: &mut W,
        entries: &BTreeMap<String, String>,
    ) -> io::Result<()> {
        for (name, description) in entries {
            writeln!(out, "{name}\t{description}")?;
        }
        Ok(())
    }

    pub fn write_results<W: Write>(out: &mut W, catalog: &Catalog) -> io::Result<()> {
        for (name, info) in catalog.results() {
            writeln!(out, "{name}\t{}", info.description)?;
        }
        Ok(())
    }

    pub fn write_list<W: Write>(out: &mut W, values: &[String]) -> io::Result<()> {
        for value in values {
            writeln!(out, "{value}")?;
        }
        Ok(())
    }

    /// One row per field with the results that can be filtered on it.
    pub fn write_filter_fields<W: Write>(
        out: &mut W,
        catalog: &Catalog,
        fields: &BTreeMap<String, FilterField>,
    ) -> io::Result<()> {
        writeln!(out, "field\tdescription\ttype\tresults")?;
        for (name, field) in fields {
            let results = catalog
                .results()
                .iter()
                .filter(|(_, info)| info.filter_fields.contains_key(name))
                .map(|(result, _)| result.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(out, "{name}\t{}\t{}\t{results}", field.description, field.kind)?;
        }
        Ok(())
    }

    pub fn write_filter_types<W: Write>(out: &mut W, catalog: &Catalog) -> io::Result<()> {
        writeln!(out, "type\toperators/parameters\tvalues/description")?;
        for (name, filter) in catalog.filter_types() {
            writeln!(
                out,
                "{name}\t{}\t{}",
                filter.operators.join(", "),
                filter.values.join(", ")
            )?;
        }
        for functions in catalog.special_filters().values() {
            for (name, function) in functions {
                writeln!(
                    out,
                    "{name}\t{}\t{}",
                    function.parameters.join(", "),
                    function.description
                )?;
            }
        }
        Ok(())
    }
}
