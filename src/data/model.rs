use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the logger table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what a delimited logger file can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl CellValue {
    /// Guess the type of a raw field.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        CellValue::Text(s.to_string())
    }

    /// Numeric view of the cell, `None` for text and null.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Null => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// One named column of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<CellValue>,
}

impl Column {
    /// True when every non-null cell is a number.
    pub fn is_numeric(&self) -> bool {
        self.cells
            .iter()
            .all(|c| matches!(c, CellValue::Null | CellValue::Integer(_) | CellValue::Float(_)))
    }

    /// Last non-null cell rendered as text.
    pub fn last_text(&self) -> Option<String> {
        self.cells
            .iter()
            .rev()
            .find(|c| !c.is_null())
            .map(|c| c.to_string())
    }

    /// First non-null cell rendered as text.
    pub fn first_text(&self) -> Option<String> {
        self.cells
            .iter()
            .find(|c| !c.is_null())
            .map(|c| c.to_string())
    }
}

// ---------------------------------------------------------------------------
// LoggerTable – the complete loaded log
// ---------------------------------------------------------------------------

/// The parsed logger records, stored column by column.
///
/// Built once by the loader and read-only afterwards. All columns have the
/// same number of cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoggerTable {
    pub columns: Vec<Column>,
}

impl LoggerTable {
    /// Build a table from a header and row-major cells.
    ///
    /// Short rows are padded with [`CellValue::Null`]; callers drop long rows
    /// before handing them over.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut columns: Vec<Column> = header
            .into_iter()
            .map(|name| Column {
                name,
                cells: Vec::with_capacity(rows.len()),
            })
            .collect();

        for row in rows {
            let mut row = row.into_iter();
            for column in &mut columns {
                column.cells.push(row.next().unwrap_or(CellValue::Null));
            }
        }

        LoggerTable { columns }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cell at `row` of the named column.
    pub fn cell(&self, name: &str, row: usize) -> Option<&CellValue> {
        self.column(name)?.cells.get(row)
    }

    /// Plain-text rendering of the first and last rows, for diagnostics.
    pub fn preview(&self, max_rows: usize) -> String {
        let mut out = String::new();
        out.push_str(&self.column_names().join("\t"));
        out.push('\n');

        let n = self.len();
        let head = max_rows / 2 + max_rows % 2;
        let tail = max_rows / 2;
        let write_row = |out: &mut String, row: usize| {
            let cells: Vec<String> = self.columns.iter().map(|c| c.cells[row].to_string()).collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        };

        if n <= max_rows {
            for row in 0..n {
                write_row(&mut out, row);
            }
        } else {
            for row in 0..head {
                write_row(&mut out, row);
            }
            out.push_str("...\n");
            for row in n - tail..n {
                write_row(&mut out, row);
            }
        }

        out.push_str(&format!("[{} rows x {} columns]", n, self.columns.len()));
        out
    }
}
