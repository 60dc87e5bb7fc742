/// Delimited text reader producing typed tables
use occucube_core::{CubeError, CubeResult};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::table::{Table, Value};

/// Pick the field delimiter from the file extension and header line
pub fn detect_delimiter(path: &Path, header_line: &str) -> u8 {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tsv") || e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);

    if by_extension || header_line.contains('\t') {
        b'\t'
    } else if !header_line.contains(',') && header_line.contains(';') {
        b';'
    } else {
        b','
    }
}

fn is_null(raw: &str) -> bool {
    raw.is_empty() || raw == "NA"
}

#[derive(Debug, Clone, Default)]
pub struct TableReader {
    delimiter: Option<u8>,
}

impl TableReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed delimiter instead of detecting one
    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.delimiter = delimiter.map(|d| d as u8);
        self
    }

    pub fn read_path(&self, path: &Path) -> CubeResult<Table> {
        let file = File::open(path).map_err(|e| {
            CubeError::Io(std::io::Error::new(
                e.kind(),
                format!("Cannot open {}: {}", path.display(), e),
            ))
        })?;
        let mut reader = BufReader::new(file);

        let delimiter = match self.delimiter {
            Some(d) => d,
            None => {
                let header = reader.fill_buf()?;
                let end = header.iter().position(|b| *b == b'\n').unwrap_or(header.len());
                detect_delimiter(path, &String::from_utf8_lossy(&header[..end]))
            }
        };

        tracing::debug!(
            "Reading {} with delimiter {:?}",
            path.display(),
            delimiter as char
        );
        let table = Self::read(reader, delimiter)?;
        tracing::info!("Read {} rows from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parse a whole delimited stream; types come from the header
    pub fn read<R: Read>(input: R, delimiter: u8) -> CubeResult<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(input);

        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();
        if columns.iter().all(|c| c.is_empty()) {
            return Err(CubeError::InvalidInput("table has no header".to_string()));
        }

        let mut table = Table::new(columns);
        let mut invalid = vec![0usize; table.columns.len()];

        for record in csv_reader.records() {
            let record = record?;
            let row: Vec<Value> = record
                .iter()
                .zip(&table.types)
                .enumerate()
                .map(|(i, (raw, ty))| {
                    let raw = raw.trim();
                    if is_null(raw) {
                        return Value::Null;
                    }
                    ty.parse(raw).unwrap_or_else(|| {
                        invalid[i] += 1;
                        Value::Null
                    })
                })
                .collect();
            table.rows.push(row);
        }

        for (i, count) in invalid.into_iter().enumerate() {
            if count > 0 {
                tracing::warn!(
                    "{} value(s) in column '{}' could not be read as {:?} and were left empty",
                    count,
                    table.columns[i],
                    table.types[i]
                );
                table.invalid_cells.insert(table.columns[i].clone(), count);
            }
        }

        Ok(table)
    }
}
