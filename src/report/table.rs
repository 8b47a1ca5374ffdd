use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{Format, Workbook};

use super::create_file;
use crate::data::model::{CellValue, Column, LoggerTable};
use crate::error::ExportError;

/// Worksheet limits of the xlsx format, header row included.
const XLSX_MAX_ROWS: usize = 1_048_576;
const XLSX_MAX_COLUMNS: usize = 16_384;

/// Comma-separated copy of the loaded table, header first.
pub fn write_table_csv(path: &Path, table: &LoggerTable) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(create_file(path)?);
    writer.write_record(table.column_names())?;
    for row in 0..table.len() {
        writer.write_record(table.columns.iter().map(|c| c.cells[row].to_string()))?;
    }
    writer.flush().map_err(|e| ExportError::from_io(path, e))
}

/// Excel workbook copy of the loaded table: one sheet, bold header row.
///
/// Numbers are stored as numbers; nulls and non-finite readings stay blank.
pub fn write_table_xlsx(path: &Path, table: &LoggerTable) -> Result<(), ExportError> {
    if table.len() + 1 > XLSX_MAX_ROWS || table.columns.len() > XLSX_MAX_COLUMNS {
        return Err(ExportError::SheetLimit {
            rows: table.len(),
            columns: table.columns.len(),
        });
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("table")?;
    let header = Format::new().set_bold();

    for (col, column) in table.columns.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, column.name.as_str(), &header)?;
        for (row, cell) in column.cells.iter().enumerate() {
            let row = row as u32 + 1;
            match cell {
                CellValue::Text(t) => {
                    sheet.write_string(row, col, t.as_str())?;
                }
                CellValue::Integer(_) | CellValue::Float(_) => {
                    if let Some(v) = cell.as_f64().filter(|v| v.is_finite()) {
                        sheet.write_number(row, col, v)?;
                    }
                }
                CellValue::Null => {}
            }
        }
    }

    // Saved through `create_file` so a workbook open in Excel reports as locked.
    let bytes = workbook.save_to_buffer()?;
    let mut out = create_file(path)?;
    out.write_all(&bytes)
        .and_then(|_| out.flush())
        .map_err(|e| ExportError::from_io(path, e))
}

/// Parquet copy of the loaded table.
///
/// Integer-only columns become Int64, other numeric columns Float64 and
/// everything else Utf8; nulls are kept.
pub fn write_table_parquet(path: &Path, table: &LoggerTable) -> Result<(), ExportError> {
    let mut fields = Vec::with_capacity(table.columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns.len());
    for column in &table.columns {
        let (data_type, array) = column_array(column);
        fields.push(Field::new(&column.name, data_type, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let mut writer = ArrowWriter::try_new(create_file(path)?, schema, None)?;
    writer.write(&batch)?;
    let mut inner = writer.into_inner()?;
    inner.flush().map_err(|e| ExportError::from_io(path, e))
}

fn column_array(column: &Column) -> (DataType, ArrayRef) {
    let all_integer = column
        .cells
        .iter()
        .all(|c| matches!(c, CellValue::Null | CellValue::Integer(_)));

    if all_integer {
        let values: Vec<Option<i64>> = column
            .cells
            .iter()
            .map(|c| match c {
                CellValue::Integer(i) => Some(*i),
                _ => None,
            })
            .collect();
        (DataType::Int64, Arc::new(Int64Array::from(values)))
    } else if column.is_numeric() {
        let values: Vec<Option<f64>> = column.cells.iter().map(CellValue::as_f64).collect();
        (DataType::Float64, Arc::new(Float64Array::from(values)))
    } else {
        let values: Vec<Option<String>> = column
            .cells
            .iter()
            .map(|c| (!c.is_null()).then(|| c.to_string()))
            .collect();
        (DataType::Utf8, Arc::new(StringArray::from(values)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_copy_keeps_header_and_nulls() {
        let table = LoggerTable::from_rows(
            vec!["Date_time".into(), "TMP1".into()],
            vec![
                vec![CellValue::parse("2023-01-01T00:00:00"), CellValue::Float(20.5)],
                vec![CellValue::parse("2023-01-01T00:01:00"), CellValue::Null],
            ],
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        write_table_csv(&path, &table).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Date_time,TMP1\n2023-01-01T00:00:00,20.5\n2023-01-01T00:01:00,\n"
        );
    }

    #[test]
    fn workbook_copy_is_a_zip_container() {
        let table = LoggerTable::from_rows(
            vec!["Logger-id".into(), "Date_time".into(), "TMP1".into()],
            vec![
                vec![
                    CellValue::parse("L1"),
                    CellValue::parse("2023-01-01T00:00:00"),
                    CellValue::Float(20.5),
                ],
                vec![
                    CellValue::parse("L1"),
                    CellValue::parse("2023-01-01T00:01:00"),
                    CellValue::Float(f64::NAN),
                ],
            ],
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.xlsx");
        write_table_xlsx(&path, &table).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn oversized_tables_do_not_fit_a_sheet() {
        let header = (0..=XLSX_MAX_COLUMNS).map(|i| format!("c{i}")).collect();
        let table = LoggerTable::from_rows(header, Vec::new());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.xlsx");
        assert!(matches!(
            write_table_xlsx(&path, &table),
            Err(ExportError::SheetLimit { columns, .. }) if columns == XLSX_MAX_COLUMNS + 1
        ));
        assert!(!path.exists());
    }

    #[test]
    fn column_types_follow_cells() {
        let ints = Column {
            name: "Vbatt".into(),
            cells: vec![CellValue::Integer(4100), CellValue::Null],
        };
        let floats = Column {
            name: "TMP1".into(),
            cells: vec![CellValue::Integer(20), CellValue::Float(20.5)],
        };
        let text = Column {
            name: "Logger-id".into(),
            cells: vec![CellValue::Text("L1".into())],
        };
        assert_eq!(column_array(&ints).0, DataType::Int64);
        assert_eq!(column_array(&floats).0, DataType::Float64);
        assert_eq!(column_array(&text).0, DataType::Utf8);
    }
}
