//! I/O utilities for ingestion, delimiter resolution, and cleaned output.
//!
//! All file I/O flows through this module:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Ingestion**: raw bytes are decoded as UTF-8 and, failing that, as
//!   Latin-1 before being parsed into an all-text [`Frame`].
//! - **stdin/stdout**: the `-` path convention routes through standard streams.
//! - **Output**: cleaned frames are written with `QuoteStyle::Necessary`.

use std::{
    borrow::Cow,
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::{debug, warn};

use crate::{
    columns::is_na_token,
    error::{IngestError, ReadError},
    frame::Frame,
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn resolve_output_delimiter(path: Option<&Path>, provided: Option<u8>, fallback: u8) -> u8 {
    if let Some(delim) = provided {
        return delim;
    }
    if let Some(path) = path {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => return DEFAULT_TSV_DELIMITER,
            Some(ext) if ext.eq_ignore_ascii_case("csv") => return DEFAULT_CSV_DELIMITER,
            _ => {}
        }
    }
    fallback
}

pub fn read_input_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        std::io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading standard input")?;
    } else {
        File::open(path)
            .with_context(|| format!("Opening input file {path:?}"))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    Ok(bytes)
}

/// Decodes and parses raw upload content. UTF-8 is tried first; any failure
/// (invalid bytes or malformed rows) triggers one retry as Latin-1.
pub fn ingest_bytes(bytes: &[u8], delimiter: u8) -> Result<Frame, IngestError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let primary = match read_table(bytes, UTF_8, delimiter) {
        Ok(frame) => return Ok(frame),
        Err(err) => err,
    };
    warn!("Reading as UTF-8 failed ({primary}); retrying as Latin-1");
    read_table(bytes, WINDOWS_1252, delimiter).map_err(|fallback| IngestError { primary, fallback })
}

fn read_table(
    bytes: &[u8],
    encoding: &'static Encoding,
    delimiter: u8,
) -> Result<Frame, ReadError> {
    let text = decode_bytes(bytes, encoding)?;
    let frame = parse_delimited(&text, delimiter)?;
    debug!(
        "Read {} row(s) x {} column(s) as {}",
        frame.row_count(),
        frame.column_count(),
        encoding.name()
    );
    Ok(frame)
}

pub fn decode_bytes<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Result<Cow<'a, str>, ReadError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or(ReadError::Encoding(encoding.name()))
}

pub fn parse_delimited(text: &str, delimiter: u8) -> Result<Frame, ReadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(ReadError::MissingHeader);
    }
    let names = dedupe_headers(headers.iter());
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];

    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > names.len() {
            return Err(ReadError::RaggedRow {
                row: row_idx + 2,
                found: record.len(),
                expected: names.len(),
            });
        }
        for (col_idx, column) in cells.iter_mut().enumerate() {
            let value = record
                .get(col_idx)
                .filter(|raw| !is_na_token(raw))
                .map(str::to_string);
            column.push(value);
        }
    }

    Ok(Frame::from_text_columns(names.into_iter().zip(cells).collect()))
}

/// Repeated header names get a `.N` suffix so every column stays addressable.
fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for header in headers {
        let mut candidate = header.to_string();
        let mut suffix = 1;
        while names.contains(&candidate) {
            candidate = format!("{header}.{suffix}");
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}

pub fn open_csv_writer(path: Option<&Path>, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let base: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };

    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(base))
}

/// Writes every column of `frame`, missing cells as empty fields.
pub fn write_frame<W: Write>(writer: &mut csv::Writer<W>, frame: &Frame) -> Result<()> {
    writer
        .write_record(frame.column_names())
        .context("Writing output headers")?;
    for row in 0..frame.row_count() {
        writer
            .write_record(frame.row_display(row))
            .with_context(|| format!("Writing output row {}", row + 2))?;
    }
    writer.flush().context("Flushing output writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ColumnData;

    #[test]
    fn latin1_bytes_fall_back_to_second_encoding() {
        let bytes = b"City,Fare\nS\xE3o Paulo,12\n";
        let frame = ingest_bytes(bytes, b',').expect("fallback decode");
        assert_eq!(
            frame.column("City"),
            Some(&ColumnData::Text(vec![Some("São Paulo".to_string())]))
        );
    }

    #[test]
    fn na_tokens_become_missing_cells() {
        let frame = ingest_bytes(b"a,b\nNA,1\n,null\n", b',').expect("ingest");
        assert_eq!(frame.column("a").map(ColumnData::missing_count), Some(2));
        assert_eq!(frame.column("b").map(ColumnData::missing_count), Some(1));
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_rejected() {
        let frame = ingest_bytes(b"a,b,c\n1,2\n", b',').expect("ingest");
        assert_eq!(frame.row_count(), 1);
        assert_eq!(frame.column("c").map(ColumnData::missing_count), Some(1));

        let err = ingest_bytes(b"a,b\n1,2,3\n", b',').expect_err("ragged row");
        assert!(matches!(err.primary, ReadError::RaggedRow { row: 2, .. }));
        assert!(matches!(err.fallback, ReadError::RaggedRow { .. }));
    }

    #[test]
    fn empty_input_is_fatal() {
        let err = ingest_bytes(b"", b',').expect_err("empty");
        assert!(matches!(err.primary, ReadError::MissingHeader));
    }

    #[test]
    fn bom_is_stripped_and_duplicate_headers_renamed() {
        let frame = ingest_bytes(b"\xEF\xBB\xBFDate,x,x\n2024-01-01,1,2\n", b',').expect("ingest");
        assert_eq!(frame.column_names(), vec!["Date", "x", "x.1"]);
    }

    #[test]
    fn resolve_input_delimiter_uses_extension() {
        assert_eq!(resolve_input_delimiter(Path::new("rides.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(Path::new("rides.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(Path::new("rides.tsv"), Some(b';')), b';');
    }
}
