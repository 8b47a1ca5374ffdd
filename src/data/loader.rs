use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellValue, LoggerTable};
use super::sanitize::{ExclusionSet, LineSanitizer};
use crate::error::LoadError;

/// Delimiters tried by [`detect_delimiter`], in order of preference.
const DELIMITER_CANDIDATES: [u8; 4] = [b'\t', b',', b';', b'|'];

/// How many retained lines feed delimiter detection.
const SNIFF_LINES: usize = 20;

/// Rows echoed when the timestamp column is missing.
const PREVIEW_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a logger table from a file.  Dispatch by extension.
///
/// * `.parquet` / `.pq` – a full-table export written by this tool
/// * anything else      – delimited logger text, sanitized line by line
///
/// Either way the sanitizer's timestamp column must be present and the
/// table must hold at least one row.
pub fn load_file(path: &Path, sanitizer: &LineSanitizer) -> Result<LoggerTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        _ => load_delimited(path, sanitizer)?,
    };

    let timestamp_column = &sanitizer.config().timestamp_column;
    if !table.has_column(timestamp_column) {
        return Err(LoadError::MissingTimestampColumn {
            column: timestamp_column.clone(),
            preview: table.preview(PREVIEW_ROWS),
        });
    }
    if table.is_empty() {
        return Err(LoadError::NoDataRows);
    }

    log::info!(
        "Loaded {} rows with columns {:?}",
        table.len(),
        table.column_names()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path, sanitizer: &LineSanitizer) -> Result<LoggerTable, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = decode_text(&bytes);
    let lines: Vec<&str> = text.lines().collect();

    let excluded = sanitizer.exclusions(&lines);
    log::debug!("Sanitizer excluded {} of {} lines", excluded.len(), lines.len());

    parse_lines(&lines, &excluded, &sanitizer.config().comment_marker)
}

/// Decode raw file bytes: UTF-8 with an optional BOM, invalid sequences dropped.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => String::from_utf8_lossy(bytes).replace('\u{FFFD}', ""),
    }
}

/// Parse the lines that survived sanitizing into a table.
///
/// The first retained line is the header. Rows with more fields than the
/// header are skipped, rows with fewer are padded with nulls. Only the total
/// number of skipped rows is reported.
pub fn parse_lines<S: AsRef<str>>(
    lines: &[S],
    excluded: &ExclusionSet,
    comment_marker: &str,
) -> Result<LoggerTable, LoadError> {
    let retained: Vec<&str> = lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !excluded.contains(i))
        .map(|(_, l)| l.as_ref())
        .filter(|l| !l.trim().is_empty() && !l.starts_with(comment_marker))
        .collect();

    if retained.is_empty() {
        return Err(LoadError::NoHeader);
    }

    let delimiter = detect_delimiter(&retained);
    let text = retained.join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        match result {
            Ok(record) if record.len() <= header.len() => {
                rows.push(record.iter().map(CellValue::parse).collect());
            }
            Ok(_) | Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} malformed rows");
    }

    Ok(LoggerTable::from_rows(header, rows))
}

/// Pick the field delimiter from a sample of lines.
///
/// A candidate qualifies when it splits the header line; the one whose field
/// count on the sample lines matches the header's most often wins. Falls back
/// to tab.
pub fn detect_delimiter(lines: &[&str]) -> u8 {
    let Some(header) = lines.first() else {
        return b'\t';
    };
    let sample = &lines[..lines.len().min(SNIFF_LINES)];

    let mut best: Option<(u8, usize)> = None;
    for &candidate in &DELIMITER_CANDIDATES {
        let c = candidate as char;
        let header_count = header.matches(c).count();
        if header_count == 0 {
            continue;
        }
        let agreeing = sample
            .iter()
            .filter(|l| l.matches(c).count() == header_count)
            .count();
        if best.map_or(true, |(_, score)| agreeing > score) {
            best = Some((candidate, agreeing));
        }
    }

    best.map_or(b'\t', |(d, _)| d)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Reload a table written by the parquet export.
///
/// Float and integer columns map to numeric cells, everything else is cast
/// to text.
fn load_parquet(path: &Path) -> Result<LoggerTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let header: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); header.len()];
    for batch_result in reader {
        let batch = batch_result?;
        for (cells, col) in columns.iter_mut().zip(batch.columns()) {
            append_cells(cells, col)?;
        }
    }

    let n_rows = columns.first().map_or(0, Vec::len);
    let rows = (0..n_rows)
        .map(|row| columns.iter().map(|c| c[row].clone()).collect())
        .collect();
    Ok(LoggerTable::from_rows(header, rows))
}

// -- Arrow helpers --

fn append_cells(cells: &mut Vec<CellValue>, col: &ArrayRef) -> Result<(), LoadError> {
    let n = col.len();
    match col.data_type() {
        DataType::Float64 => {
            let arr = col.as_primitive::<Float64Type>();
            cells.extend((0..n).map(|i| numeric_cell(arr.is_null(i), || CellValue::Float(arr.value(i)))));
        }
        DataType::Float32 => {
            let arr = col.as_primitive::<Float32Type>();
            cells.extend((0..n).map(|i| numeric_cell(arr.is_null(i), || CellValue::Float(arr.value(i) as f64))));
        }
        DataType::Int64 => {
            let arr = col.as_primitive::<Int64Type>();
            cells.extend((0..n).map(|i| numeric_cell(arr.is_null(i), || CellValue::Integer(arr.value(i)))));
        }
        DataType::Int32 => {
            let arr = col.as_primitive::<Int32Type>();
            cells.extend((0..n).map(|i| numeric_cell(arr.is_null(i), || CellValue::Integer(arr.value(i) as i64))));
        }
        _ => {
            let text = cast(col, &DataType::Utf8)?;
            let strings = text.as_string::<i32>();
            cells.extend((0..n).map(|i| {
                if strings.is_null(i) {
                    CellValue::Null
                } else {
                    CellValue::Text(strings.value(i).to_string())
                }
            }));
        }
    }
    Ok(())
}

fn numeric_cell(is_null: bool, value: impl FnOnce() -> CellValue) -> CellValue {
    if is_null {
        CellValue::Null
    } else {
        value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_and_invalid_bytes_are_dropped() {
        let bytes = b"\xEF\xBB\xBFLogger-id\tDate_time\n\xFFL1\t2023-01-01T00:00:00\n";
        assert_eq!(
            decode_text(bytes),
            "Logger-id\tDate_time\nL1\t2023-01-01T00:00:00\n"
        );
    }

    #[test]
    fn delimiter_is_sniffed_from_consistent_splits() {
        let tsv = ["a\tb\tc", "1\t2\t3", "4\t5\t6"];
        assert_eq!(detect_delimiter(&tsv), b'\t');

        let csv = ["Date_time,TMP1,TMP2", "2023-01-01T00:00:00,20.0,21.0"];
        assert_eq!(detect_delimiter(&csv), b',');

        // Decimal commas do not beat a consistent semicolon split.
        let semi = ["a;b", "1,5;2,5", "3,0;4"];
        assert_eq!(detect_delimiter(&semi), b';');

        assert_eq!(detect_delimiter(&["single"]), b'\t');
    }

    #[test]
    fn excluded_and_overlong_rows_do_not_reach_the_table() {
        let lines = [
            "# logger boot",
            "Logger-id\tDate_time\tTMP1",
            "L1\t2023-01-01T00:00:00\t20.0",
            "L1\t2023-01-01T00:01:00\t21.0\tstray\tfields",
            "",
            "L1\t2023-01-01T00:02:00",
        ];
        let sanitizer = LineSanitizer::default();
        let excluded = sanitizer.exclusions(&lines);
        let table = parse_lines(&lines, &excluded, "#").unwrap();

        assert_eq!(table.column_names(), vec!["Logger-id", "Date_time", "TMP1"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell("TMP1", 0), Some(&CellValue::Float(20.0)));
        assert_eq!(table.cell("TMP1", 1), Some(&CellValue::Null));
    }

    #[test]
    fn nothing_retained_means_no_header() {
        let lines = ["# only", "# comments"];
        let excluded = LineSanitizer::default().exclusions(&lines);
        assert!(matches!(
            parse_lines(&lines, &excluded, "#"),
            Err(LoadError::NoHeader)
        ));
    }

    #[test]
    fn blank_header_names_are_filled_in() {
        let lines = ["Date_time\tTMP1\t", "2023-01-01T00:00:00\t20.0\t"];
        let table = parse_lines(&lines, &ExclusionSet::new(), "#").unwrap();
        assert_eq!(table.column_names(), vec!["Date_time", "TMP1", "Unnamed: 2"]);
    }
}
