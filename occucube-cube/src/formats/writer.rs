/// Delimited text output of the merged cube and mapping table
use occucube_core::{CubeError, CubeResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::aggregate::CubeCell;
use crate::mapping::MappingEntry;

pub const CUBE_COLUMNS: [&str; 5] = ["year", "eea_cell_code", "taxonKey", "n", "min_coord_uncertainty"];

pub const MAPPING_COLUMNS: [&str; 5] = ["taxonKey", "scientificName", "rank", "taxonomicStatus", "includes"];

/// Shortest text that reads back as the same real; `10.0` is written `10`
pub fn format_real(value: f64) -> String {
    value.to_string()
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct TableWriter {
    delimiter: u8,
    includes_separator: String,
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new(',', " | ")
    }
}

impl TableWriter {
    pub fn new(delimiter: char, includes_separator: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter as u8,
            includes_separator: includes_separator.into(),
        }
    }

    fn csv_writer<W: Write>(&self, out: W) -> csv::Writer<W> {
        csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(out)
    }

    pub fn write_cube<W: Write>(&self, out: W, cells: &[CubeCell]) -> CubeResult<()> {
        let mut writer = self.csv_writer(out);
        writer.write_record(CUBE_COLUMNS)?;
        for cell in cells {
            writer.write_record([
                opt(cell.year),
                cell.cell.clone().unwrap_or_default(),
                cell.key.to_string(),
                cell.count.to_string(),
                opt(cell.min_uncertainty.map(format_real)),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_mapping<W: Write>(&self, out: W, entries: &[MappingEntry]) -> CubeResult<()> {
        let mut writer = self.csv_writer(out);
        writer.write_record(MAPPING_COLUMNS)?;
        for entry in entries {
            writer.write_record([
                entry.key.to_string(),
                entry.scientific_name.clone().unwrap_or_default(),
                opt(entry.rank.as_ref()),
                opt(entry.taxonomic_status.as_ref()),
                entry.includes.join(&self.includes_separator),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_cube_file(&self, path: &Path, cells: &[CubeCell]) -> CubeResult<()> {
        let file = create(path)?;
        self.write_cube(BufWriter::new(file), cells)?;
        tracing::info!("Wrote {} cube rows to {}", cells.len(), path.display());
        Ok(())
    }

    pub fn write_mapping_file(&self, path: &Path, entries: &[MappingEntry]) -> CubeResult<()> {
        let file = create(path)?;
        self.write_mapping(BufWriter::new(file), entries)?;
        tracing::info!("Wrote {} mapping rows to {}", entries.len(), path.display());
        Ok(())
    }
}

fn create(path: &Path) -> CubeResult<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    File::create(path).map_err(|e| {
        CubeError::Io(std::io::Error::new(
            e.kind(),
            format!("Cannot create {}: {}", path.display(), e),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use occucube_core::{TaxonKey, TaxonRank, TaxonomicStatus};
    use pretty_assertions::assert_eq;

    fn cell(year: Option<i64>, key: u64, count: u64, min: Option<f64>) -> CubeCell {
        CubeCell {
            year,
            cell: Some("1kmE3900N3100".to_string()),
            key: TaxonKey(key),
            count,
            min_uncertainty: min,
        }
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(10.0), "10");
        assert_eq!(format_real(30.5), "30.5");
        assert_eq!(format_real(0.0), "0");
    }

    #[test]
    fn test_cube_nulls_are_empty_fields() {
        let mut out = Vec::new();
        TableWriter::default()
            .write_cube(&mut out, &[cell(Some(2020), 1, 2, Some(10.0)), cell(None, 2, 1, None)])
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "year,eea_cell_code,taxonKey,n,min_coord_uncertainty\n\
             2020,1kmE3900N3100,1,2,10\n\
             ,1kmE3900N3100,2,1,\n"
        );
    }

    #[test]
    fn test_mapping_includes_joined_and_quoted() {
        let entry = MappingEntry {
            key: TaxonKey(5),
            scientific_name: Some("Pelophylax esculentus (Linnaeus, 1758)".to_string()),
            rank: Some(TaxonRank::Species),
            taxonomic_status: Some(TaxonomicStatus::Accepted),
            includes: vec!["5: Pelophylax esculentus".to_string(), "7: Rana minor".to_string()],
        };
        let missing = MappingEntry {
            key: TaxonKey(9),
            scientific_name: None,
            rank: None,
            taxonomic_status: None,
            includes: vec!["9".to_string()],
        };

        let mut out = Vec::new();
        TableWriter::new('\t', "; ").write_mapping(&mut out, &[entry, missing]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "taxonKey\tscientificName\trank\ttaxonomicStatus\tincludes");
        assert_eq!(
            lines[1],
            "5\tPelophylax esculentus (Linnaeus, 1758)\tSPECIES\tACCEPTED\t5: Pelophylax esculentus; 7: Rana minor"
        );
        assert_eq!(lines[2], "9\t\t\t\t9");
    }

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/cube.csv");
        TableWriter::default().write_cube_file(&path, &[]).unwrap();
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "year,eea_cell_code,taxonKey,n,min_coord_uncertainty\n"
        );
    }
}
