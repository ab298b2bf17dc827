use crate::utils::error::Result;

/// Orientation of the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// First row is the header, remaining rows are records.
    RowMajor,
    /// Each physical row is one logical column: the field name followed
    /// by its values. The former first column becomes the header.
    Transposed,
}

/// A parsed tabular file: header row plus string-valued records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Index of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// CSV reader that normalizes the input orientation before handing the
/// data to the aggregation step.
#[derive(Debug, Clone)]
pub struct TableReader {
    shape: InputShape,
    delimiter: u8,
}

impl TableReader {
    pub fn new(shape: InputShape) -> Self {
        Self {
            shape,
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse `data` into a [`Table`]. Records of unequal length are a
    /// parse error and abort the whole run.
    pub fn read(&self, data: &[u8]) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .from_reader(data);

        let mut cells: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            cells.push(record.iter().map(|f| f.trim().to_string()).collect());
        }

        let cells = match self.shape {
            InputShape::RowMajor => cells,
            InputShape::Transposed => transpose(cells),
        };

        let mut iter = cells.into_iter();
        let header = iter.next().unwrap_or_default();
        Ok(Table {
            header,
            rows: iter.collect(),
        })
    }
}

/// Reorient row-major cells so that cell (i, j) becomes cell (j, i).
/// All rows are the same length here; the CSV reader rejects ragged input.
fn transpose(cells: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let columns = cells.first().map_or(0, Vec::len);
    let mut out: Vec<Vec<String>> = vec![Vec::with_capacity(cells.len()); columns];
    for row in cells {
        for (i, cell) in row.into_iter().enumerate() {
            out[i].push(cell);
        }
    }
    out
}
