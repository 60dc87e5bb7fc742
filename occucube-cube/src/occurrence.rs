//! Projection of typed tables into occurrence and taxon-of-interest records

use occucube_core::{CubeError, CubeResult, TaxonKey, TaxonRank, TaxonomicStatus};
use occucube_taxonomy::{Bucket, TaxonOfInterest};
use std::path::Path;

use crate::formats::{Table, TableReader, Value};

/// One raw sighting; only the columns the cube needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccurrenceRecord {
    pub year: Option<i64>,
    pub cell: Option<String>,
    pub taxon_key: Option<TaxonKey>,
    pub accepted_taxon_key: Option<TaxonKey>,
    pub species_key: Option<TaxonKey>,
    pub scientific_name: Option<String>,
    pub uncertainty: Option<f64>,
}

impl OccurrenceRecord {
    /// Value of the bucket's grouping column
    pub fn grouping_key(&self, bucket: Bucket) -> Option<TaxonKey> {
        match bucket {
            Bucket::Species => self.species_key,
            Bucket::Infraspecific => self.accepted_taxon_key,
            Bucket::Synonym => self.taxon_key,
        }
    }

    /// Raw identifier folded into the canonical key; `taxonKey` in every bucket
    pub fn raw_key(&self) -> Option<TaxonKey> {
        self.taxon_key
    }
}

/// Keys may arrive as integers or, for columns typed as text, digit strings
fn key_value(value: &Value) -> Option<TaxonKey> {
    match value {
        Value::Int(v) => TaxonKey::try_from(*v).ok(),
        Value::Text(s) => s.trim().parse::<u64>().ok().map(TaxonKey),
        _ => None,
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s.clone()),
        Value::Int(v) => Some(v.to_string()),
        Value::Real(v) => Some(v.to_string()),
        Value::Null => None,
    }
}

fn required(table: &Table, name: &str) -> CubeResult<usize> {
    table
        .column_index(name)
        .ok_or_else(|| CubeError::MissingColumn(name.to_string()))
}

pub fn occurrences_from_table(table: &Table) -> CubeResult<Vec<OccurrenceRecord>> {
    let taxon = required(table, "taxonKey")?;
    let year = required(table, "year")?;
    let cell = required(table, "eea_cell_code")?;
    let accepted = table.column_index("acceptedTaxonKey");
    let species = table.column_index("speciesKey");
    let name = table.column_index("scientificName");
    let uncertainty = table.column_index("coordinateUncertaintyInMeters");

    let records = (0..table.len())
        .map(|row| OccurrenceRecord {
            year: table.value(row, year).as_int(),
            cell: text_value(table.value(row, cell)),
            taxon_key: key_value(table.value(row, taxon)),
            accepted_taxon_key: accepted.and_then(|c| key_value(table.value(row, c))),
            species_key: species.and_then(|c| key_value(table.value(row, c))),
            scientific_name: name.and_then(|c| text_value(table.value(row, c))),
            uncertainty: uncertainty.and_then(|c| table.value(row, c).as_real()),
        })
        .collect();

    Ok(records)
}

pub fn taxa_from_table(table: &Table) -> CubeResult<Vec<TaxonOfInterest>> {
    let rank = required(table, "rank")?;
    let status = required(table, "taxonomicStatus")?;
    let backbone = table.column_index("backboneTaxonKey");
    let key = table.column_index("key");
    if backbone.is_none() && key.is_none() {
        return Err(CubeError::MissingColumn("backboneTaxonKey or key".to_string()));
    }
    let species = table.column_index("speciesKey");
    let name = table.column_index("scientificName");

    let taxa = (0..table.len())
        .map(|row| TaxonOfInterest {
            backbone_taxon_key: backbone.and_then(|c| key_value(table.value(row, c))),
            key: key.and_then(|c| key_value(table.value(row, c))),
            scientific_name: name.and_then(|c| text_value(table.value(row, c))),
            rank: text_value(table.value(row, rank)).and_then(|r| r.parse::<TaxonRank>().ok()),
            taxonomic_status: text_value(table.value(row, status))
                .and_then(|s| s.parse::<TaxonomicStatus>().ok()),
            species_key: species.and_then(|c| key_value(table.value(row, c))),
        })
        .collect();

    Ok(taxa)
}

pub fn read_occurrences(path: &Path, delimiter: Option<char>) -> CubeResult<Vec<OccurrenceRecord>> {
    let table = TableReader::new().with_delimiter(delimiter).read_path(path)?;
    occurrences_from_table(&table)
}

pub fn read_taxa(path: &Path, delimiter: Option<char>) -> CubeResult<Vec<TaxonOfInterest>> {
    let table = TableReader::new().with_delimiter(delimiter).read_path(path)?;
    taxa_from_table(&table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(data: &str) -> Table {
        TableReader::read(data.as_bytes(), b',').unwrap()
    }

    #[test]
    fn test_occurrence_projection() {
        let t = table(
            "gbifID,year,eea_cell_code,taxonKey,acceptedTaxonKey,speciesKey,scientificName,coordinateUncertaintyInMeters\n\
             1,2020,E1,7,5,2,Rana minor,30\n\
             2,,E2,8,,,,\n",
        );
        let records = occurrences_from_table(&t).unwrap();

        assert_eq!(
            records[0],
            OccurrenceRecord {
                year: Some(2020),
                cell: Some("E1".into()),
                taxon_key: Some(TaxonKey(7)),
                accepted_taxon_key: Some(TaxonKey(5)),
                species_key: Some(TaxonKey(2)),
                scientific_name: Some("Rana minor".into()),
                uncertainty: Some(30.0),
            }
        );
        assert_eq!(records[1].year, None);
        assert_eq!(records[1].grouping_key(Bucket::Synonym), Some(TaxonKey(8)));
        assert_eq!(records[1].grouping_key(Bucket::Species), None);
    }

    #[test]
    fn test_optional_occurrence_columns() {
        let t = table("taxonKey,year,eea_cell_code\n3,2019,E9\n");
        let records = occurrences_from_table(&t).unwrap();
        assert_eq!(records[0].accepted_taxon_key, None);
        assert_eq!(records[0].uncertainty, None);
    }

    #[test]
    fn test_required_occurrence_columns() {
        let t = table("taxonKey,year\n3,2019\n");
        let err = occurrences_from_table(&t).unwrap_err();
        assert!(matches!(err, CubeError::MissingColumn(c) if c == "eea_cell_code"));
    }

    #[test]
    fn test_taxa_projection_reads_text_key_column() {
        let t = table(
            "key,scientificName,rank,taxonomicStatus,speciesKey\n\
             1,Bufo bufo,species,accepted,1\n\
             99,Rana fusca,SPECIES,SYNONYM,\n\
             10,Rana,GENUS,NA,\n",
        );
        let taxa = taxa_from_table(&t).unwrap();

        assert_eq!(taxa[0].own_key(), Some(TaxonKey(1)));
        assert_eq!(taxa[0].rank, Some(TaxonRank::Species));
        assert_eq!(taxa[0].taxonomic_status, Some(TaxonomicStatus::Accepted));
        assert_eq!(taxa[1].taxonomic_status, Some(TaxonomicStatus::Synonym));
        assert_eq!(taxa[1].species_key, None);
        assert_eq!(taxa[2].taxonomic_status, None);
    }

    #[test]
    fn test_taxa_require_a_key_column() {
        let t = table("rank,taxonomicStatus\nSPECIES,ACCEPTED\n");
        assert!(matches!(taxa_from_table(&t), Err(CubeError::MissingColumn(_))));
    }
}
